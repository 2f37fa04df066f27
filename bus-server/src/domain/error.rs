//! Network validation errors.
//!
//! These errors surface dataset inconsistencies discovered while building
//! the routing structures. They are distinct from parse/IO errors (which
//! live in the dataset layer) and from query-time "not found" results.

/// Errors raised while validating the network and building the routing
/// graph.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NetworkError {
    /// A bus's stop sequence names a stop that was never declared.
    #[error("bus {bus} stops at undeclared stop {stop}")]
    UnknownStop { bus: String, stop: String },

    /// Two consecutive stops on a bus route have no measured road distance.
    #[error("no road distance between {from} and {to}")]
    MissingDistance { from: String, to: String },

    /// The configured bus speed is zero, negative, or not finite.
    #[error("bus speed must be positive, got {0}")]
    InvalidBusSpeed(f64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = NetworkError::UnknownStop {
            bus: "1".into(),
            stop: "Nowhere".into(),
        };
        assert_eq!(err.to_string(), "bus 1 stops at undeclared stop Nowhere");

        let err = NetworkError::MissingDistance {
            from: "A".into(),
            to: "B".into(),
        };
        assert_eq!(err.to_string(), "no road distance between A and B");

        let err = NetworkError::InvalidBusSpeed(0.0);
        assert_eq!(err.to_string(), "bus speed must be positive, got 0");
    }
}
