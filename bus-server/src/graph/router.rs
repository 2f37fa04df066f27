//! All-pairs shortest-path routing over a [`DirectedWeightedGraph`].
//!
//! The router computes the full all-pairs table eagerly at construction, so
//! building it is the dominant one-time cost and every query afterwards is
//! cheap. Paths are materialized on demand: `build_route` expands the edge
//! sequence once, parks it in a cache under a fresh [`RouteId`], and callers
//! read edges out by index before releasing the handle with `remove_route`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::debug;

use super::{DirectedWeightedGraph, EdgeId, VertexId};

/// Handle to a materialized route, unique for the router's lifetime.
///
/// Ids are minted monotonically by [`Router::build_route`] and are never
/// reused, so a stale handle can be detected rather than silently aliasing
/// a newer route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RouteId(pub u64);

/// Summary of a built route.
///
/// `weight` and `edge_count` always agree with the cached edge sequence
/// behind `id`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteSummary {
    pub id: RouteId,
    pub weight: f64,
    pub edge_count: usize,
}

/// One cell of the all-pairs table: best known weight for an ordered vertex
/// pair, plus the last edge on that best path.
///
/// `prev_edge` is `None` exactly for the zero-length self path; during
/// backtracking its absence is the terminator ("the path starts here").
#[derive(Debug, Clone, Copy)]
struct RouteCell {
    weight: f64,
    prev_edge: Option<EdgeId>,
}

#[derive(Debug, Default)]
struct RouteCache {
    next_id: u64,
    expanded: HashMap<RouteId, Vec<EdgeId>>,
}

/// All-pairs shortest-path engine.
///
/// Construction runs a Floyd–Warshall variant driven by explicit edge
/// relaxation, which is cubic in the vertex count. That cost is paid once
/// per network; the finished table is immutable. The only mutable state is
/// the route-handle cache, which sits behind its own lock so one router can
/// be shared across threads.
///
/// Weights must be non-negative; [`DirectedWeightedGraph::add_edge`]
/// enforces that, and the relaxation makes no attempt to detect negative
/// cycles.
pub struct Router {
    graph: Arc<DirectedWeightedGraph>,
    vertex_count: usize,
    /// Row-major `(from, to)` table, `None` where no path is known.
    cells: Vec<Option<RouteCell>>,
    cache: Mutex<RouteCache>,
}

impl Router {
    /// Builds the all-pairs table for `graph`.
    ///
    /// The graph must be fully populated: the router never sees edges added
    /// afterwards (the shared graph is append-only, but the table is
    /// computed from a snapshot taken here and never refreshed).
    pub fn new(graph: Arc<DirectedWeightedGraph>) -> Self {
        let vertex_count = graph.vertex_count();
        let mut cells: Vec<Option<RouteCell>> = vec![None; vertex_count * vertex_count];

        // Seed: zero-weight self paths, then direct edges. Parallel edges
        // between the same pair collapse to the lightest here.
        for vertex in 0..vertex_count {
            cells[vertex * vertex_count + vertex] = Some(RouteCell {
                weight: 0.0,
                prev_edge: None,
            });
            for &edge_id in graph.outgoing(VertexId(vertex)) {
                let edge = graph.edge(edge_id);
                let cell = &mut cells[vertex * vertex_count + edge.to.0];
                if cell.is_none_or(|existing| edge.weight < existing.weight) {
                    *cell = Some(RouteCell {
                        weight: edge.weight,
                        prev_edge: Some(edge_id),
                    });
                }
            }
        }

        // Relax every pair through each vertex in turn. The predecessor
        // recorded is always the edge nearest the destination, which is what
        // backward reconstruction needs.
        for through in 0..vertex_count {
            for from in 0..vertex_count {
                let Some(first_leg) = cells[from * vertex_count + through] else {
                    continue;
                };
                for to in 0..vertex_count {
                    let Some(second_leg) = cells[through * vertex_count + to] else {
                        continue;
                    };
                    let candidate = first_leg.weight + second_leg.weight;
                    let cell = &mut cells[from * vertex_count + to];
                    if cell.is_none_or(|existing| candidate < existing.weight) {
                        *cell = Some(RouteCell {
                            weight: candidate,
                            prev_edge: second_leg.prev_edge.or(first_leg.prev_edge),
                        });
                    }
                }
            }
        }

        debug!(
            vertices = vertex_count,
            edges = graph.edge_count(),
            "all-pairs shortest-path table computed"
        );

        Self {
            graph,
            vertex_count,
            cells,
            cache: Mutex::new(RouteCache::default()),
        }
    }

    fn cell(&self, from: VertexId, to: VertexId) -> Option<RouteCell> {
        self.cells[from.0 * self.vertex_count + to.0]
    }

    /// Materializes the shortest route from `from` to `to`.
    ///
    /// Returns `None` when no path exists. Otherwise the expanded edge
    /// sequence is cached under the returned id until `remove_route` is
    /// called; callers must release the handle once they are done reading
    /// edges, or the cache grows without bound.
    ///
    /// `from == to` yields a summary with weight 0 and no edges.
    ///
    /// # Panics
    ///
    /// Panics if either vertex is out of range.
    pub fn build_route(&self, from: VertexId, to: VertexId) -> Option<RouteSummary> {
        let target_cell = self.cell(from, to)?;

        // Walk the predecessor chain backwards from `to`. Each predecessor
        // edge is the last edge of the best path to its own target, so
        // stepping to its origin stays on the shortest path until the chain
        // runs out at `from`.
        let mut edges = Vec::new();
        let mut prev_edge = target_cell.prev_edge;
        while let Some(edge_id) = prev_edge {
            edges.push(edge_id);
            let origin = self.graph.edge(edge_id).from;
            prev_edge = self
                .cell(from, origin)
                .expect("prefix of a computed route is present in the table")
                .prev_edge;
        }
        edges.reverse();

        let mut cache = self.cache.lock().expect("route cache poisoned");
        let id = RouteId(cache.next_id);
        cache.next_id += 1;
        let edge_count = edges.len();
        cache.expanded.insert(id, edges);

        Some(RouteSummary {
            id,
            weight: target_cell.weight,
            edge_count,
        })
    }

    /// Reads one edge of a cached route by position.
    ///
    /// # Panics
    ///
    /// Panics if `route_id` was never minted or has been removed, or if
    /// `edge_idx` is out of bounds for the route.
    pub fn route_edge(&self, route_id: RouteId, edge_idx: usize) -> EdgeId {
        let cache = self.cache.lock().expect("route cache poisoned");
        let edges = cache
            .expanded
            .get(&route_id)
            .unwrap_or_else(|| panic!("unknown route {route_id:?}"));
        edges[edge_idx]
    }

    /// Releases a cached route.
    ///
    /// Removing an id that was never issued, or has already been removed,
    /// is a no-op.
    pub fn remove_route(&self, route_id: RouteId) {
        let mut cache = self.cache.lock().expect("route cache poisoned");
        cache.expanded.remove(&route_id);
    }

    /// Number of routes currently held in the cache.
    pub fn cached_route_count(&self) -> usize {
        let cache = self.cache.lock().expect("route cache poisoned");
        cache.expanded.len()
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::graph::Edge;
    use proptest::prelude::*;

    /// Reference all-pairs distances by exhaustive Bellman–Ford relaxation.
    ///
    /// With non-negative weights a shortest path has at most `n - 1` edges,
    /// so `n` full relaxation rounds reach a fixed point.
    fn reference_distances(graph: &DirectedWeightedGraph) -> Vec<Vec<Option<f64>>> {
        let n = graph.vertex_count();
        let mut dist: Vec<Vec<Option<f64>>> = vec![vec![None; n]; n];
        for source in 0..n {
            dist[source][source] = Some(0.0);
            for _ in 0..n {
                for edge_idx in 0..graph.edge_count() {
                    let edge = graph.edge(EdgeId(edge_idx));
                    if let Some(upstream) = dist[source][edge.from.0] {
                        let candidate = upstream + edge.weight;
                        if dist[source][edge.to.0].is_none_or(|best| candidate < best) {
                            dist[source][edge.to.0] = Some(candidate);
                        }
                    }
                }
            }
        }
        dist
    }

    /// Strategy: a small graph with integer-valued weights, so weight sums
    /// compare exactly regardless of summation order.
    fn small_graph() -> impl Strategy<Value = Arc<DirectedWeightedGraph>> {
        (1usize..6).prop_flat_map(|n| {
            proptest::collection::vec((0..n, 0..n, 0u32..=10), 0..16).prop_map(move |edges| {
                let mut graph = DirectedWeightedGraph::new(n);
                for (from, to, weight) in edges {
                    graph.add_edge(Edge {
                        from: VertexId(from),
                        to: VertexId(to),
                        weight: f64::from(weight),
                    });
                }
                Arc::new(graph)
            })
        })
    }

    proptest! {
        /// The engine agrees with brute-force relaxation on every pair,
        /// including which pairs are unreachable.
        #[test]
        fn matches_reference_distances(graph in small_graph()) {
            let reference = reference_distances(&graph);
            let router = Router::new(Arc::clone(&graph));

            for from in 0..graph.vertex_count() {
                for to in 0..graph.vertex_count() {
                    let summary = router.build_route(VertexId(from), VertexId(to));
                    match (summary, reference[from][to]) {
                        (Some(summary), Some(expected)) => {
                            prop_assert_eq!(summary.weight, expected);
                            router.remove_route(summary.id);
                        }
                        (None, None) => {}
                        (got, want) => {
                            prop_assert!(
                                false,
                                "({},{}): engine {:?}, reference {:?}",
                                from,
                                to,
                                got,
                                want
                            );
                        }
                    }
                }
            }
        }

        /// Every materialized route is a connected edge path from `from` to
        /// `to` whose weights sum to the summary weight.
        #[test]
        fn routes_are_connected_and_consistent(graph in small_graph()) {
            let router = Router::new(Arc::clone(&graph));

            for from in 0..graph.vertex_count() {
                for to in 0..graph.vertex_count() {
                    let Some(summary) = router.build_route(VertexId(from), VertexId(to)) else {
                        continue;
                    };

                    let mut position = VertexId(from);
                    let mut total = 0.0;
                    for idx in 0..summary.edge_count {
                        let edge = *graph.edge(router.route_edge(summary.id, idx));
                        prop_assert_eq!(edge.from, position);
                        position = edge.to;
                        total += edge.weight;
                    }
                    prop_assert_eq!(position, VertexId(to));
                    prop_assert_eq!(total, summary.weight);

                    router.remove_route(summary.id);
                }
            }
            prop_assert_eq!(router.cached_route_count(), 0);
        }
    }
}
