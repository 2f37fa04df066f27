//! Bus line records.

/// A bus line with its fully expanded stop sequence.
///
/// The sequence already includes the return leg for non-circular routes
/// (expansion happens when the dataset is parsed), so consumers can treat
/// every bus as a plain ordered list of visited stops.
#[derive(Debug, Clone, PartialEq)]
pub struct Bus {
    pub name: String,
    pub stops: Vec<String>,
}

impl Bus {
    pub fn new(name: impl Into<String>, stops: Vec<String>) -> Self {
        Self {
            name: name.into(),
            stops,
        }
    }
}
