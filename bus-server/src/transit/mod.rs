//! Routing over the bus network.
//!
//! This module turns stops and bus lines into a weighted graph, runs the
//! all-pairs router over it, and translates computed paths back into
//! rider-facing itineraries.
//!
//! Each physical stop is split into two vertices: an *at-stop* vertex
//! (standing at the stop, having just arrived or just set out) and a
//! *boarding* vertex (waited out, ready to depart). A single wait edge
//! at-stop -> boarding per stop carries the configured boarding wait, so
//! "wait once per stop" is one edge rather than something re-derived per
//! bus line. Bus edges then run boarding(i) -> at-stop(j) for every ordered
//! pair of positions on a line, letting the search ride through any number
//! of stops on one bus without paying repeated waits.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::domain::{Bus, NetworkError, RoutingConfig, Stop, road_distance};
use crate::graph::{DirectedWeightedGraph, Edge, Router, VertexId};

/// The two graph vertices a stop is split into.
#[derive(Debug, Clone, Copy)]
struct StopVertices {
    /// Standing at the stop. Queries start and end here, and bus edges
    /// arrive here.
    at_stop: VertexId,
    /// Ready to depart; bus edges leave from here. The wait edge is the
    /// only way in.
    boarding: VertexId,
}

/// What an edge means in rider terms. Parallel array to the graph's edges.
#[derive(Debug, Clone, PartialEq)]
enum EdgeLabel {
    /// Waiting at a stop for the next bus.
    Wait,
    /// Riding one bus past `span_count` stops without getting off.
    Ride { bus_name: String, span_count: usize },
}

/// One step of a rider itinerary.
#[derive(Debug, Clone, PartialEq)]
pub enum ItineraryItem {
    /// Wait at `stop_name` for `time` minutes.
    Wait { stop_name: String, time: f64 },
    /// Ride bus `bus_name` for `time` minutes, passing `span_count` stops.
    Ride {
        bus_name: String,
        time: f64,
        span_count: usize,
    },
}

/// A complete answer to a route query.
#[derive(Debug, Clone, PartialEq)]
pub struct Itinerary {
    /// Total travel time in minutes; always the sum of the item times.
    pub total_time: f64,
    pub items: Vec<ItineraryItem>,
}

/// Why a route query produced no itinerary.
///
/// Both variants are semantic "not found" rather than faults, but they are
/// distinct so the caller can render different messages.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RouteError {
    /// The named stop does not exist in the network.
    #[error("unknown stop {0}")]
    UnknownStop(String),

    /// Both stops exist but no bus connects them.
    #[error("no route from {from} to {to}")]
    NoRoute { from: String, to: String },
}

/// Shortest-time router over the bus network.
///
/// Built once from the complete set of stops and buses; immutable
/// afterwards. The underlying all-pairs table is computed during
/// construction, so queries only pay for path materialization.
pub struct TransitRouter {
    graph: Arc<DirectedWeightedGraph>,
    router: Router,
    stop_vertices: BTreeMap<String, StopVertices>,
    /// Vertex id -> originating stop name.
    vertex_stops: Vec<String>,
    /// Edge id -> rider meaning.
    edge_labels: Vec<EdgeLabel>,
}

impl TransitRouter {
    /// Builds the routing graph and precomputes all shortest paths.
    ///
    /// Fails fast on a non-positive bus speed, a bus naming an undeclared
    /// stop, or a missing road distance between consecutive stops.
    pub fn new(
        stops: &BTreeMap<String, Stop>,
        buses: &BTreeMap<String, Bus>,
        config: RoutingConfig,
    ) -> Result<Self, NetworkError> {
        if !config.bus_speed_kmh.is_finite() || config.bus_speed_kmh <= 0.0 {
            return Err(NetworkError::InvalidBusSpeed(config.bus_speed_kmh));
        }

        let vertex_count = stops.len() * 2;
        let mut graph = DirectedWeightedGraph::new(vertex_count);
        let mut vertex_stops = vec![String::new(); vertex_count];
        let mut edge_labels = Vec::new();
        let mut stop_vertices = BTreeMap::new();

        Self::fill_stop_edges(
            stops,
            config,
            &mut graph,
            &mut vertex_stops,
            &mut edge_labels,
            &mut stop_vertices,
        );
        Self::fill_bus_edges(
            stops,
            buses,
            config,
            &mut graph,
            &mut edge_labels,
            &stop_vertices,
        )?;

        let graph = Arc::new(graph);
        debug!(
            stops = stops.len(),
            buses = buses.len(),
            vertices = graph.vertex_count(),
            edges = graph.edge_count(),
            "transit graph built"
        );

        // All edges are in place; the all-pairs table is computed here and
        // never refreshed.
        let router = Router::new(Arc::clone(&graph));

        Ok(Self {
            graph,
            router,
            stop_vertices,
            vertex_stops,
            edge_labels,
        })
    }

    /// Splits each stop into its vertex pair and adds the wait edge.
    ///
    /// Stops are processed in name order, so vertex assignment is
    /// deterministic for a given network. All wait edges precede any bus
    /// edge in the edge list.
    fn fill_stop_edges(
        stops: &BTreeMap<String, Stop>,
        config: RoutingConfig,
        graph: &mut DirectedWeightedGraph,
        vertex_stops: &mut [String],
        edge_labels: &mut Vec<EdgeLabel>,
        stop_vertices: &mut BTreeMap<String, StopVertices>,
    ) {
        let mut next_vertex = 0;
        for name in stops.keys() {
            let at_stop = VertexId(next_vertex);
            let boarding = VertexId(next_vertex + 1);
            next_vertex += 2;

            vertex_stops[at_stop.0] = name.clone();
            vertex_stops[boarding.0] = name.clone();
            stop_vertices.insert(name.clone(), StopVertices { at_stop, boarding });

            edge_labels.push(EdgeLabel::Wait);
            let edge_id = graph.add_edge(Edge {
                from: at_stop,
                to: boarding,
                weight: f64::from(config.bus_wait_time_mins),
            });
            debug_assert_eq!(edge_id.0, edge_labels.len() - 1);
        }
    }

    /// Adds one ride edge per reachable sub-span of every bus line.
    ///
    /// For a line visiting n stops this adds O(n²) edges: from each
    /// position's boarding vertex to every later position's at-stop vertex,
    /// weighted by the cumulative road distance at the configured speed.
    fn fill_bus_edges(
        stops: &BTreeMap<String, Stop>,
        buses: &BTreeMap<String, Bus>,
        config: RoutingConfig,
        graph: &mut DirectedWeightedGraph,
        edge_labels: &mut Vec<EdgeLabel>,
        stop_vertices: &BTreeMap<String, StopVertices>,
    ) -> Result<(), NetworkError> {
        for bus in buses.values() {
            if bus.stops.len() <= 1 {
                continue;
            }

            let records = bus
                .stops
                .iter()
                .map(|name| {
                    stops.get(name).ok_or_else(|| NetworkError::UnknownStop {
                        bus: bus.name.clone(),
                        stop: name.clone(),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;

            for start_idx in 0..bus.stops.len() - 1 {
                let boarding = stop_vertices[bus.stops[start_idx].as_str()].boarding;
                let mut total_distance_m: u64 = 0;

                for finish_idx in start_idx + 1..bus.stops.len() {
                    let leg_m = road_distance(records[finish_idx - 1], records[finish_idx])
                        .ok_or_else(|| NetworkError::MissingDistance {
                            from: bus.stops[finish_idx - 1].clone(),
                            to: bus.stops[finish_idx].clone(),
                        })?;
                    total_distance_m += u64::from(leg_m);

                    edge_labels.push(EdgeLabel::Ride {
                        bus_name: bus.name.clone(),
                        span_count: finish_idx - start_idx,
                    });
                    let edge_id = graph.add_edge(Edge {
                        from: boarding,
                        to: stop_vertices[bus.stops[finish_idx].as_str()].at_stop,
                        weight: total_distance_m as f64 / config.speed_meters_per_min(),
                    });
                    debug_assert_eq!(edge_id.0, edge_labels.len() - 1);
                }
            }
        }
        Ok(())
    }

    /// Finds the fastest itinerary between two stops.
    ///
    /// Both endpoints resolve to their at-stop vertices: the rider starts
    /// standing at the stop, so an itinerary that boards a bus always opens
    /// with a wait step. The route handle is released before returning, so
    /// the router's cache never accumulates across queries.
    pub fn find_route(&self, stop_from: &str, stop_to: &str) -> Result<Itinerary, RouteError> {
        let from = self.resolve(stop_from)?;
        let to = self.resolve(stop_to)?;

        let Some(summary) = self.router.build_route(from, to) else {
            trace!(from = stop_from, to = stop_to, "no route");
            return Err(RouteError::NoRoute {
                from: stop_from.to_string(),
                to: stop_to.to_string(),
            });
        };

        let mut items = Vec::with_capacity(summary.edge_count);
        for edge_idx in 0..summary.edge_count {
            let edge_id = self.router.route_edge(summary.id, edge_idx);
            let edge = self.graph.edge(edge_id);
            match &self.edge_labels[edge_id.0] {
                EdgeLabel::Wait => items.push(ItineraryItem::Wait {
                    stop_name: self.vertex_stops[edge.from.0].clone(),
                    time: edge.weight,
                }),
                EdgeLabel::Ride {
                    bus_name,
                    span_count,
                } => items.push(ItineraryItem::Ride {
                    bus_name: bus_name.clone(),
                    time: edge.weight,
                    span_count: *span_count,
                }),
            }
        }
        self.router.remove_route(summary.id);

        trace!(
            from = stop_from,
            to = stop_to,
            total_time = summary.weight,
            steps = items.len(),
            "route found"
        );
        Ok(Itinerary {
            total_time: summary.weight,
            items,
        })
    }

    fn resolve(&self, stop: &str) -> Result<VertexId, RouteError> {
        self.stop_vertices
            .get(stop)
            .map(|vertices| vertices.at_stop)
            .ok_or_else(|| RouteError::UnknownStop(stop.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Point;

    fn stop(name: &str, distances: &[(&str, u32)]) -> (String, Stop) {
        let mut stop = Stop::new(name, Point::default());
        for &(other, meters) in distances {
            stop.road_distances.insert(other.to_string(), meters);
        }
        (name.to_string(), stop)
    }

    fn bus(name: &str, stops: &[&str]) -> (String, Bus) {
        (
            name.to_string(),
            Bus::new(name, stops.iter().map(|s| s.to_string()).collect()),
        )
    }

    fn config(wait_mins: u32, speed_kmh: f64) -> RoutingConfig {
        RoutingConfig {
            bus_wait_time_mins: wait_mins,
            bus_speed_kmh: speed_kmh,
        }
    }

    /// Three stops on one line: A --1000m-- B --2000m-- C, bus "1" running
    /// A->B->C and back, 5 minute wait, 30 km/h.
    fn abc_network() -> TransitRouter {
        let stops = BTreeMap::from([
            stop("A", &[("B", 1000)]),
            stop("B", &[("C", 2000)]),
            stop("C", &[]),
        ]);
        let buses = BTreeMap::from([bus("1", &["A", "B", "C", "B", "A"])]);
        TransitRouter::new(&stops, &buses, config(5, 30.0)).unwrap()
    }

    #[test]
    fn rides_through_an_intermediate_stop_on_one_bus() {
        let router = abc_network();
        let itinerary = router.find_route("A", "C").unwrap();

        // 3000 m at 30 km/h (500 m/min) is 6 minutes; 5 minutes wait first.
        assert_eq!(itinerary.total_time, 11.0);
        assert_eq!(
            itinerary.items,
            vec![
                ItineraryItem::Wait {
                    stop_name: "A".to_string(),
                    time: 5.0,
                },
                ItineraryItem::Ride {
                    bus_name: "1".to_string(),
                    time: 6.0,
                    span_count: 2,
                },
            ]
        );
    }

    #[test]
    fn direct_neighbors_ride_a_single_span() {
        let router = abc_network();
        let itinerary = router.find_route("A", "B").unwrap();

        assert_eq!(itinerary.total_time, 7.0);
        assert_eq!(
            itinerary.items,
            vec![
                ItineraryItem::Wait {
                    stop_name: "A".to_string(),
                    time: 5.0,
                },
                ItineraryItem::Ride {
                    bus_name: "1".to_string(),
                    time: 2.0,
                    span_count: 1,
                },
            ]
        );
    }

    #[test]
    fn return_leg_is_routable() {
        let router = abc_network();
        let itinerary = router.find_route("C", "A").unwrap();
        assert_eq!(itinerary.total_time, 11.0);
        assert_eq!(itinerary.items.len(), 2);
    }

    #[test]
    fn same_stop_query_is_empty() {
        let router = abc_network();
        let itinerary = router.find_route("B", "B").unwrap();
        assert_eq!(itinerary.total_time, 0.0);
        assert!(itinerary.items.is_empty());
    }

    #[test]
    fn unknown_stops_are_reported_by_name() {
        let router = abc_network();
        assert_eq!(
            router.find_route("A", "Z"),
            Err(RouteError::UnknownStop("Z".to_string()))
        );
        assert_eq!(
            router.find_route("Z", "A"),
            Err(RouteError::UnknownStop("Z".to_string()))
        );
    }

    #[test]
    fn transferring_between_buses_waits_again() {
        // Bus "1": A↔B, bus "2": B↔C. Changing at B costs a second wait.
        let stops = BTreeMap::from([
            stop("A", &[("B", 1000)]),
            stop("B", &[("C", 2000)]),
            stop("C", &[]),
        ]);
        let buses = BTreeMap::from([bus("1", &["A", "B", "A"]), bus("2", &["B", "C", "B"])]);
        let router = TransitRouter::new(&stops, &buses, config(5, 30.0)).unwrap();

        let itinerary = router.find_route("A", "C").unwrap();
        assert_eq!(itinerary.total_time, 16.0); // 5 + 2 + 5 + 4
        assert_eq!(
            itinerary.items,
            vec![
                ItineraryItem::Wait {
                    stop_name: "A".to_string(),
                    time: 5.0,
                },
                ItineraryItem::Ride {
                    bus_name: "1".to_string(),
                    time: 2.0,
                    span_count: 1,
                },
                ItineraryItem::Wait {
                    stop_name: "B".to_string(),
                    time: 5.0,
                },
                ItineraryItem::Ride {
                    bus_name: "2".to_string(),
                    time: 4.0,
                    span_count: 1,
                },
            ]
        );
    }

    #[test]
    fn disconnected_stops_have_no_route() {
        let stops = BTreeMap::from([
            stop("A", &[("B", 1000)]),
            stop("B", &[]),
            stop("C", &[("D", 1000)]),
            stop("D", &[]),
        ]);
        let buses = BTreeMap::from([bus("1", &["A", "B", "A"]), bus("2", &["C", "D", "C"])]);
        let router = TransitRouter::new(&stops, &buses, config(5, 30.0)).unwrap();

        assert_eq!(
            router.find_route("A", "D"),
            Err(RouteError::NoRoute {
                from: "A".to_string(),
                to: "D".to_string(),
            })
        );
        // Within each cluster routing still works.
        assert!(router.find_route("A", "B").is_ok());
        assert!(router.find_route("C", "D").is_ok());
    }

    #[test]
    fn stop_with_no_buses_is_unreachable_but_known() {
        let stops = BTreeMap::from([
            stop("A", &[("B", 1000)]),
            stop("B", &[]),
            stop("Lonely", &[]),
        ]);
        let buses = BTreeMap::from([bus("1", &["A", "B", "A"])]);
        let router = TransitRouter::new(&stops, &buses, config(5, 30.0)).unwrap();

        assert!(matches!(
            router.find_route("A", "Lonely"),
            Err(RouteError::NoRoute { .. })
        ));
        // Standing where you already are is always possible.
        assert_eq!(router.find_route("Lonely", "Lonely").unwrap().total_time, 0.0);
    }

    #[test]
    fn single_stop_bus_adds_no_edges() {
        let stops = BTreeMap::from([stop("A", &[]), stop("B", &[])]);
        let buses = BTreeMap::from([bus("1", &["A"])]);
        let router = TransitRouter::new(&stops, &buses, config(5, 30.0)).unwrap();

        // Only the two wait edges exist.
        assert_eq!(router.graph.edge_count(), 2);
        assert!(matches!(
            router.find_route("A", "B"),
            Err(RouteError::NoRoute { .. })
        ));
    }

    #[test]
    fn wait_edges_come_before_bus_edges() {
        let router = abc_network();
        let stop_count = router.stop_vertices.len();
        assert!(
            router.edge_labels[..stop_count]
                .iter()
                .all(|label| *label == EdgeLabel::Wait)
        );
        assert!(
            router.edge_labels[stop_count..]
                .iter()
                .all(|label| matches!(label, EdgeLabel::Ride { .. }))
        );
    }

    #[test]
    fn route_cache_is_empty_between_queries() {
        let router = abc_network();
        router.find_route("A", "C").unwrap();
        router.find_route("C", "A").unwrap();
        router.find_route("A", "Z").unwrap_err();
        assert_eq!(router.router.cached_route_count(), 0);
    }

    #[test]
    fn total_time_equals_sum_of_items() {
        let router = abc_network();
        for (from, to) in [("A", "B"), ("A", "C"), ("B", "C"), ("C", "A")] {
            let itinerary = router.find_route(from, to).unwrap();
            let sum: f64 = itinerary
                .items
                .iter()
                .map(|item| match item {
                    ItineraryItem::Wait { time, .. } => *time,
                    ItineraryItem::Ride { time, .. } => *time,
                })
                .sum();
            assert_eq!(sum, itinerary.total_time, "{from} -> {to}");
        }
    }

    #[test]
    fn rejects_non_positive_speed() {
        let stops = BTreeMap::from([stop("A", &[])]);
        let buses = BTreeMap::new();
        assert_eq!(
            TransitRouter::new(&stops, &buses, config(5, 0.0)).unwrap_err(),
            NetworkError::InvalidBusSpeed(0.0)
        );
        assert!(TransitRouter::new(&stops, &buses, config(5, -30.0)).is_err());
    }

    #[test]
    fn rejects_bus_through_undeclared_stop() {
        let stops = BTreeMap::from([stop("A", &[("B", 1000)])]);
        let buses = BTreeMap::from([bus("1", &["A", "B", "A"])]);
        assert_eq!(
            TransitRouter::new(&stops, &buses, config(5, 30.0)).unwrap_err(),
            NetworkError::UnknownStop {
                bus: "1".to_string(),
                stop: "B".to_string(),
            }
        );
    }

    #[test]
    fn rejects_missing_road_distance() {
        let stops = BTreeMap::from([stop("A", &[]), stop("B", &[])]);
        let buses = BTreeMap::from([bus("1", &["A", "B", "A"])]);
        assert_eq!(
            TransitRouter::new(&stops, &buses, config(5, 30.0)).unwrap_err(),
            NetworkError::MissingDistance {
                from: "A".to_string(),
                to: "B".to_string(),
            }
        );
    }
}
