//! Network dataset loading.
//!
//! Parses the JSON network description the server is started with: routing
//! settings plus a flat list of stop and bus records, tagged by `"type"`.
//! Bus records carry their one-way stop sequence and a round-trip flag;
//! conversion to domain records expands non-circular routes with their
//! return leg so the rest of the system never sees the flag.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::domain::{Bus, Point, RoutingConfig, Stop};

/// Errors loading or parsing a dataset document.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    /// The dataset file could not be read.
    #[error("failed to read dataset: {0}")]
    Io(#[from] std::io::Error),

    /// The document is not valid dataset JSON.
    #[error("failed to parse dataset: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Routing parameters as they appear in the document.
#[derive(Debug, Clone, Deserialize)]
pub struct RoutingSettingsRecord {
    /// Wait before boarding, in minutes.
    pub bus_wait_time: u32,

    /// Bus speed in km/h.
    pub bus_speed: f64,
}

/// A stop declaration.
#[derive(Debug, Clone, Deserialize)]
pub struct StopRecord {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,

    /// Measured road distances to neighboring stops, in meters. Optional;
    /// a pair may be declared on either endpoint.
    #[serde(default)]
    pub road_distances: HashMap<String, u32>,
}

/// A bus declaration with its one-way stop sequence.
#[derive(Debug, Clone, Deserialize)]
pub struct BusRecord {
    pub name: String,
    pub stops: Vec<String>,

    /// Whether the sequence already returns to its start. Non-round-trip
    /// routes are mirrored on conversion.
    pub is_roundtrip: bool,
}

/// One record of the dataset body.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum BaseRecord {
    Stop(StopRecord),
    Bus(BusRecord),
}

/// A parsed network description document.
#[derive(Debug, Clone, Deserialize)]
pub struct Dataset {
    pub routing_settings: RoutingSettingsRecord,
    pub base_requests: Vec<BaseRecord>,
}

impl Dataset {
    /// Parses a dataset document from JSON text.
    pub fn from_json(text: &str) -> Result<Self, DatasetError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Reads and parses a dataset file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    /// Converts the document into domain records, expanding non-circular
    /// bus routes with their return legs.
    pub fn into_network(self) -> (Vec<Stop>, Vec<Bus>, RoutingConfig) {
        let config = RoutingConfig {
            bus_wait_time_mins: self.routing_settings.bus_wait_time,
            bus_speed_kmh: self.routing_settings.bus_speed,
        };

        let mut stops = Vec::new();
        let mut buses = Vec::new();
        for record in self.base_requests {
            match record {
                BaseRecord::Stop(record) => stops.push(Stop {
                    name: record.name,
                    position: Point {
                        latitude: record.latitude,
                        longitude: record.longitude,
                    },
                    road_distances: record.road_distances,
                }),
                BaseRecord::Bus(record) => buses.push(Bus {
                    name: record.name,
                    stops: expand_stops(record.stops, record.is_roundtrip),
                }),
            }
        }
        (stops, buses, config)
    }
}

/// Appends the return leg to a non-circular stop sequence.
///
/// `[A, B, C]` becomes `[A, B, C, B, A]`; the end stop is not repeated.
/// Round-trip and single-stop sequences are returned unchanged.
fn expand_stops(mut stops: Vec<String>, is_roundtrip: bool) -> Vec<String> {
    if is_roundtrip || stops.len() <= 1 {
        return stops;
    }
    let one_way_len = stops.len();
    stops.reserve(one_way_len - 1);
    for idx in (0..one_way_len - 1).rev() {
        let stop = stops[idx].clone();
        stops.push(stop);
    }
    stops
}
