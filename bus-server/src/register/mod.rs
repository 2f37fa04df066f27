//! Network register: per-stop and per-bus summaries plus route queries.
//!
//! The register is the one component the service layer talks to. It indexes
//! the parsed network, precomputes the aggregate statistics each query kind
//! needs, and owns the [`TransitRouter`] for route queries.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use tracing::debug;

use crate::domain::{Bus, NetworkError, RoutingConfig, Stop, road_distance};
use crate::transit::{Itinerary, RouteError, TransitRouter};

/// Aggregate information about one stop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StopSummary {
    /// Names of the buses serving this stop, sorted.
    pub buses: BTreeSet<String>,
}

/// Aggregate information about one bus line, over its expanded stop
/// sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct BusSummary {
    /// Total stops visited, repeats included.
    pub stop_count: usize,
    /// Distinct stops visited.
    pub unique_stop_count: usize,
    /// Sum of road distances between consecutive stops, in meters.
    pub road_route_length: u64,
    /// Sum of great-circle distances between consecutive stops, in meters.
    pub geo_route_length: f64,
}

/// Immutable view of the whole network: summaries plus routing.
///
/// Built once from the parsed records; queries never mutate it.
pub struct TransitRegister {
    stops: BTreeMap<String, StopSummary>,
    buses: BTreeMap<String, BusSummary>,
    router: TransitRouter,
}

impl TransitRegister {
    /// Indexes the records, computes summaries, and builds the router.
    ///
    /// Later records replace earlier ones with the same name. Fails fast on
    /// the same conditions as [`TransitRouter::new`]: a bus through an
    /// undeclared stop, a missing road distance, or a bad speed.
    pub fn new(
        stop_records: Vec<Stop>,
        bus_records: Vec<Bus>,
        config: RoutingConfig,
    ) -> Result<Self, NetworkError> {
        let stops_by_name: BTreeMap<String, Stop> = stop_records
            .into_iter()
            .map(|stop| (stop.name.clone(), stop))
            .collect();
        let buses_by_name: BTreeMap<String, Bus> = bus_records
            .into_iter()
            .map(|bus| (bus.name.clone(), bus))
            .collect();

        let mut stops: BTreeMap<String, StopSummary> = stops_by_name
            .keys()
            .map(|name| (name.clone(), StopSummary::default()))
            .collect();

        let mut buses = BTreeMap::new();
        for bus in buses_by_name.values() {
            buses.insert(bus.name.clone(), summarize_bus(bus, &stops_by_name)?);
            for stop_name in &bus.stops {
                // summarize_bus has already rejected unknown stops
                stops
                    .get_mut(stop_name)
                    .expect("bus stops validated against the stop index")
                    .buses
                    .insert(bus.name.clone());
            }
        }

        let router = TransitRouter::new(&stops_by_name, &buses_by_name, config)?;

        debug!(
            stops = stops.len(),
            buses = buses.len(),
            "transit register built"
        );
        Ok(Self {
            stops,
            buses,
            router,
        })
    }

    /// Summary for a stop, or `None` if the name is unknown.
    pub fn stop(&self, name: &str) -> Option<&StopSummary> {
        self.stops.get(name)
    }

    /// Summary for a bus, or `None` if the name is unknown.
    pub fn bus(&self, name: &str) -> Option<&BusSummary> {
        self.buses.get(name)
    }

    /// Fastest itinerary between two stops.
    pub fn find_route(&self, stop_from: &str, stop_to: &str) -> Result<Itinerary, RouteError> {
        self.router.find_route(stop_from, stop_to)
    }
}

fn summarize_bus(
    bus: &Bus,
    stops_by_name: &BTreeMap<String, Stop>,
) -> Result<BusSummary, NetworkError> {
    let records = bus
        .stops
        .iter()
        .map(|name| {
            stops_by_name
                .get(name)
                .ok_or_else(|| NetworkError::UnknownStop {
                    bus: bus.name.clone(),
                    stop: name.clone(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut road_route_length: u64 = 0;
    let mut geo_route_length = 0.0;
    for pair in records.windows(2) {
        road_route_length += u64::from(road_distance(pair[0], pair[1]).ok_or_else(|| {
            NetworkError::MissingDistance {
                from: pair[0].name.clone(),
                to: pair[1].name.clone(),
            }
        })?);
        geo_route_length += pair[0].position.distance_m(pair[1].position);
    }

    let unique: HashSet<&str> = bus.stops.iter().map(String::as_str).collect();

    Ok(BusSummary {
        stop_count: bus.stops.len(),
        unique_stop_count: unique.len(),
        road_route_length,
        geo_route_length,
    })
}
