use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use log::warn;
use model::{Coordinate, Polyline};
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;

use crate::cache::CachedOsmSource;
use crate::cache::OsmGraphSource;
use crate::error::AstarError;
use crate::graph::RoadGraph;

pub const WALKING_SPEED_MPS: f64 = 1.4;
const BBOX_PADDING_DEGREES: f64 = 0.01;

/// `BinaryHeap` is a max-heap; `MinScored` reverses the ordering by score so
/// the lowest f-score is popped first, matching the open-set's pop-minimum
/// semantics without a custom heap implementation.
#[derive(Copy, Clone, PartialEq)]
struct MinScored(f64, NodeIndex);

impl Eq for MinScored {}

impl PartialOrd for MinScored {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MinScored {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .0
            .partial_cmp(&self.0)
            .unwrap_or(Ordering::Equal)
            .then_with(|| self.1.index().cmp(&other.1.index()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AstarOutcome {
    Routed,
    NoPath,
}

#[derive(Debug, Clone)]
pub struct AstarResult {
    pub path: Polyline,
    pub distance_m: f64,
    pub duration_s: f64,
    pub outcome: AstarOutcome,
}

impl AstarResult {
    fn empty(outcome: AstarOutcome) -> Self {
        Self {
            path: Polyline::empty(),
            distance_m: 0.0,
            duration_s: 0.0,
            outcome,
        }
    }
}

/// Shortest walking path between two coordinates on an OSM-derived road
/// graph, cached by bounding box.
pub struct GeodesicAstarPlanner<S: OsmGraphSource> {
    source: CachedOsmSource<S>,
}

impl<S: OsmGraphSource> GeodesicAstarPlanner<S> {
    pub fn new(source: S, cache_dir: impl Into<std::path::PathBuf>) -> Self {
        Self { source: CachedOsmSource::new(source, cache_dir) }
    }

    /// Computes the shortest walking path from `start` to `goal`. Returns an
    /// empty, non-fatal result when no road graph node is connected between
    /// the two snapped endpoints.
    pub async fn route(&self, start: Coordinate, goal: Coordinate) -> Result<AstarResult, AstarError> {
        let bbox = padded_bbox(start, goal);
        let graph = self.source.graph_for_bbox(bbox).await?;

        let Some(start_node) = graph.nearest_node(start.lat, start.lon) else {
            return Err(AstarError::NoSnapTarget);
        };
        let Some(goal_node) = graph.nearest_node(goal.lat, goal.lon) else {
            return Err(AstarError::NoSnapTarget);
        };

        match a_star(&graph, start_node, goal_node) {
            Some(node_path) => {
                let coords: Vec<Coordinate> = node_path
                    .iter()
                    .filter_map(|&index| graph.node_coords(index))
                    .map(|(lat, lon)| Coordinate::new(lat, lon))
                    .collect();

                let polyline = Polyline(coords);
                let distance_m = polyline.length_m();
                Ok(AstarResult {
                    duration_s: distance_m / WALKING_SPEED_MPS,
                    path: polyline,
                    distance_m,
                    outcome: AstarOutcome::Routed,
                })
            }
            None => {
                warn!("no path found between snapped endpoints {start_node:?} -> {goal_node:?}");
                Ok(AstarResult::empty(AstarOutcome::NoPath))
            }
        }
    }
}

fn padded_bbox(start: Coordinate, goal: Coordinate) -> (f64, f64, f64, f64) {
    utility::geo::padded_bbox(&[(start.lat, start.lon), (goal.lat, goal.lon)], BBOX_PADDING_DEGREES)
}

/// Classical A* with an explicit open-set membership `HashSet`, so checking
/// "is this node already queued" is O(1) instead of scanning the heap.
fn a_star(graph: &RoadGraph, start: NodeIndex, goal: NodeIndex) -> Option<Vec<NodeIndex>> {
    let mut open_set = HashSet::new();
    let mut open_heap = BinaryHeap::new();
    let mut came_from: HashMap<NodeIndex, NodeIndex> = HashMap::new();
    let mut g_score: HashMap<NodeIndex, f64> = HashMap::new();

    g_score.insert(start, 0.0);
    open_heap.push(MinScored(heuristic(graph, start, goal), start));
    open_set.insert(start);

    while let Some(MinScored(_, current)) = open_heap.pop() {
        open_set.remove(&current);

        if current == goal {
            return Some(reconstruct_path(&came_from, current));
        }

        let current_g = *g_score.get(&current).unwrap_or(&f64::INFINITY);

        for edge in graph.edges(current) {
            let neighbor = edge.target();
            let edge_length = graph.edge_length_m(current, neighbor, edge.weight());
            let tentative_g = current_g + edge_length;

            if tentative_g < *g_score.get(&neighbor).unwrap_or(&f64::INFINITY) {
                came_from.insert(neighbor, current);
                g_score.insert(neighbor, tentative_g);
                let f_score = tentative_g + heuristic(graph, neighbor, goal);

                if !open_set.contains(&neighbor) {
                    open_heap.push(MinScored(f_score, neighbor));
                    open_set.insert(neighbor);
                }
            }
        }
    }

    None
}

fn heuristic(graph: &RoadGraph, node: NodeIndex, goal: NodeIndex) -> f64 {
    match (graph.node_coords(node), graph.node_coords(goal)) {
        (Some((lat1, lon1)), Some((lat2, lon2))) => {
            utility::geo::haversine_distance_m(lat1, lon1, lat2, lon2)
        }
        _ => f64::INFINITY,
    }
}

fn reconstruct_path(came_from: &HashMap<NodeIndex, NodeIndex>, mut current: NodeIndex) -> Vec<NodeIndex> {
    let mut path = vec![current];
    while let Some(&previous) = came_from.get(&current) {
        path.push(previous);
        current = previous;
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use crate::graph::{RoadGraphData, RoadNode};

    use super::*;

    struct FixedSource(RoadGraphData);

    #[async_trait]
    impl OsmGraphSource for FixedSource {
        async fn fetch_graph(&self, _bbox: (f64, f64, f64, f64)) -> Result<RoadGraphData, AstarError> {
            Ok(self.0.clone())
        }
    }

    fn line_graph() -> RoadGraphData {
        RoadGraphData {
            nodes: vec![
                RoadNode { osm_id: 1, lat: 0.0, lon: 0.0 },
                RoadNode { osm_id: 2, lat: 0.0, lon: 0.01 },
                RoadNode { osm_id: 3, lat: 0.0, lon: 0.02 },
            ],
            edges: vec![
                (1, 2, 1000.0),
                (2, 1, 1000.0),
                (2, 3, 1000.0),
                (3, 2, 1000.0),
            ],
        }
    }

    #[tokio::test]
    async fn routes_through_connected_graph() {
        let dir = std::env::temp_dir().join(format!("astar-test-{}", std::process::id()));
        let planner = GeodesicAstarPlanner::new(FixedSource(line_graph()), dir);

        let result = planner
            .route(Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 0.02))
            .await
            .unwrap();

        assert_eq!(result.outcome, AstarOutcome::Routed);
        assert_eq!(result.path.vertex_count(), 3);
        assert!((result.distance_m - 2000.0).abs() < 1.0);
        assert!((result.duration_s - 2000.0 / WALKING_SPEED_MPS).abs() < 1.0);
    }

    #[tokio::test]
    async fn disconnected_graph_yields_no_path() {
        let mut data = line_graph();
        data.nodes.push(RoadNode { osm_id: 4, lat: 5.0, lon: 5.0 });

        let dir = std::env::temp_dir().join(format!("astar-test-disc-{}", std::process::id()));
        let planner = GeodesicAstarPlanner::new(FixedSource(data), dir);

        let result = planner
            .route(Coordinate::new(0.0, 0.0), Coordinate::new(5.0, 5.0))
            .await
            .unwrap();

        assert_eq!(result.outcome, AstarOutcome::NoPath);
        assert!(result.path.is_empty());
    }
}
