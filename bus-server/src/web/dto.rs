//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::register::{BusSummary, StopSummary};
use crate::transit::{Itinerary, ItineraryItem};

/// Response for a stop query.
#[derive(Debug, Serialize)]
pub struct StopResponse {
    /// Buses serving the stop, sorted by name.
    pub buses: Vec<String>,
}

impl From<&StopSummary> for StopResponse {
    fn from(summary: &StopSummary) -> Self {
        Self {
            buses: summary.buses.iter().cloned().collect(),
        }
    }
}

/// Response for a bus query.
#[derive(Debug, Serialize)]
pub struct BusResponse {
    /// Total stops visited, repeats included.
    pub stop_count: usize,

    /// Distinct stops visited.
    pub unique_stop_count: usize,

    /// Road length of the full route, in meters.
    pub road_route_length: u64,

    /// Great-circle length of the full route, in meters.
    pub geo_route_length: f64,
}

impl From<&BusSummary> for BusResponse {
    fn from(summary: &BusSummary) -> Self {
        Self {
            stop_count: summary.stop_count,
            unique_stop_count: summary.unique_stop_count,
            road_route_length: summary.road_route_length,
            geo_route_length: summary.geo_route_length,
        }
    }
}

/// Query parameters for a route request.
#[derive(Debug, Deserialize)]
pub struct RouteRequest {
    /// Stop to start from.
    pub from: String,

    /// Stop to reach.
    pub to: String,
}

/// One rendered itinerary step.
#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum RouteItem {
    /// Wait at a stop for the next bus.
    Wait { stop_name: String, time: f64 },

    /// Ride a bus past `span_count` stops.
    Bus {
        bus: String,
        time: f64,
        span_count: usize,
    },
}

/// Response for a route query.
#[derive(Debug, Serialize)]
pub struct RouteResponse {
    /// Total travel time in minutes.
    pub total_time: f64,

    /// Ordered itinerary steps.
    pub items: Vec<RouteItem>,
}

impl From<&Itinerary> for RouteResponse {
    fn from(itinerary: &Itinerary) -> Self {
        let items = itinerary
            .items
            .iter()
            .map(|item| match item {
                ItineraryItem::Wait { stop_name, time } => RouteItem::Wait {
                    stop_name: stop_name.clone(),
                    time: *time,
                },
                ItineraryItem::Ride {
                    bus_name,
                    time,
                    span_count,
                } => RouteItem::Bus {
                    bus: bus_name.clone(),
                    time: *time,
                    span_count: *span_count,
                },
            })
            .collect();
        Self {
            total_time: itinerary.total_time,
            items,
        }
    }
}

/// Error body for not-found responses.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
