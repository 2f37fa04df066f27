//! Stop records and road-distance lookup.

use std::collections::HashMap;

use super::Point;

/// A named stop in the network.
#[derive(Debug, Clone, PartialEq)]
pub struct Stop {
    pub name: String,
    pub position: Point,
    /// Measured road distances to neighboring stops, in meters.
    ///
    /// A distance may be recorded on either endpoint of a pair; see
    /// [`road_distance`].
    pub road_distances: HashMap<String, u32>,
}

impl Stop {
    pub fn new(name: impl Into<String>, position: Point) -> Self {
        Self {
            name: name.into(),
            position,
            road_distances: HashMap::new(),
        }
    }
}

/// Road distance in meters between two adjacent stops.
///
/// The forward entry (recorded on `from`) wins; otherwise the reverse entry
/// recorded on `to` is used, since datasets typically declare each measured
/// pair once. Returns `None` when neither stop records the other.
pub fn road_distance(from: &Stop, to: &Stop) -> Option<u32> {
    from.road_distances
        .get(&to.name)
        .or_else(|| to.road_distances.get(&from.name))
        .copied()
}
