//! Domain types for the bus network.
//!
//! These records describe the network as the routing layers consume it:
//! stops with positions and measured road distances, buses with fully
//! expanded stop sequences, and the routing parameters. Validation that
//! spans records (a bus naming a stop that doesn't exist, a missing road
//! distance) is reported through [`NetworkError`].

mod bus;
mod config;
mod error;
mod geo;
mod stop;

pub use bus::Bus;
pub use config::RoutingConfig;
pub use error::NetworkError;
pub use geo::{EARTH_RADIUS_M, Point};
pub use stop::{Stop, road_distance};
