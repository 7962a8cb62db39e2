use std::ops::{Deref, DerefMut};

use petgraph::graph::{DiGraph, NodeIndex};
use rstar::{Point as RstarPoint, RTree};
use serde::{Deserialize, Serialize};
use utility::geo::haversine_distance_m;

/// A node of the drivable/walkable road graph, as snapped from an OSM way.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoadNode {
    pub osm_id: i64,
    pub lat: f64,
    pub lon: f64,
}

/// A directed edge between two road nodes, carrying the stored "length"
/// attribute used as the A* edge cost.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoadEdge {
    pub length_m: f64,
}

/// The flattened form a [`RoadGraph`] is cached and transmitted as: a plain
/// node list plus `(from_osm_id, to_osm_id, length_m)` edge triples, directed
/// both ways for a two-way street.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoadGraphData {
    pub nodes: Vec<RoadNode>,
    pub edges: Vec<(i64, i64, f64)>,
}

/// Point wrapper used to build the spatial index over graph nodes. `rstar`
/// requires a type implementing `Point`; we store the owning `NodeIndex`
/// alongside the coordinates so a nearest-neighbor query can be mapped back
/// onto the graph.
#[derive(Debug, Copy, Clone, PartialEq)]
struct IndexedPoint {
    index: Option<NodeIndex>,
    lon: f64,
    lat: f64,
}

impl RstarPoint for IndexedPoint {
    type Scalar = f64;
    const DIMENSIONS: usize = 2;

    fn generate(mut generator: impl FnMut(usize) -> Self::Scalar) -> Self {
        Self {
            index: None,
            lon: generator(0),
            lat: generator(1),
        }
    }

    fn nth(&self, index: usize) -> Self::Scalar {
        match index {
            0 => self.lon,
            1 => self.lat,
            _ => unreachable!(),
        }
    }

    fn nth_mut(&mut self, index: usize) -> &mut Self::Scalar {
        match index {
            0 => &mut self.lon,
            1 => &mut self.lat,
            _ => unreachable!(),
        }
    }
}

/// A road graph for one bounding box, backed by a `petgraph` `DiGraph` with an
/// `rstar` spatial index over its nodes for nearest-node snapping.
#[derive(Debug, Clone)]
pub struct RoadGraph {
    graph: DiGraph<RoadNode, RoadEdge>,
    rtree: RTree<IndexedPoint>,
}

impl RoadGraph {
    pub fn from_data(data: &RoadGraphData) -> Self {
        let mut graph = DiGraph::new();
        let mut index_by_osm_id = std::collections::HashMap::with_capacity(data.nodes.len());

        for node in &data.nodes {
            let index = graph.add_node(*node);
            index_by_osm_id.insert(node.osm_id, index);
        }

        for &(from_id, to_id, length_m) in &data.edges {
            if let (Some(&from), Some(&to)) =
                (index_by_osm_id.get(&from_id), index_by_osm_id.get(&to_id))
            {
                graph.add_edge(from, to, RoadEdge { length_m });
            }
        }

        let rtree = build_rtree(&graph);
        Self { graph, rtree }
    }

    /// Nearest graph node to `(lat, lon)` by planar distance in degrees, per
    /// the `rstar` index built at construction time.
    pub fn nearest_node(&self, lat: f64, lon: f64) -> Option<NodeIndex> {
        self.rtree
            .nearest_neighbor(&IndexedPoint {
                index: None,
                lon,
                lat,
            })
            .and_then(|point| point.index)
    }

    pub fn node_coords(&self, index: NodeIndex) -> Option<(f64, f64)> {
        self.graph.node_weight(index).map(|node| (node.lat, node.lon))
    }

    /// Edge cost between two adjacent nodes: the stored length, falling back
    /// to great-circle distance between endpoint coordinates if missing.
    pub fn edge_length_m(&self, from: NodeIndex, to: NodeIndex, weight: &RoadEdge) -> f64 {
        if weight.length_m.is_finite() && weight.length_m >= 0.0 {
            return weight.length_m;
        }
        match (self.node_coords(from), self.node_coords(to)) {
            (Some((lat1, lon1)), Some((lat2, lon2))) => {
                haversine_distance_m(lat1, lon1, lat2, lon2)
            }
            _ => f64::INFINITY,
        }
    }
}

impl Deref for RoadGraph {
    type Target = DiGraph<RoadNode, RoadEdge>;

    fn deref(&self) -> &Self::Target {
        &self.graph
    }
}

impl DerefMut for RoadGraph {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.graph
    }
}

fn build_rtree(graph: &DiGraph<RoadNode, RoadEdge>) -> RTree<IndexedPoint> {
    let points: Vec<IndexedPoint> = graph
        .node_indices()
        .map(|index| {
            let node = graph.node_weight(index).expect("node index from node_indices");
            IndexedPoint {
                index: Some(index),
                lon: node.lon,
                lat: node.lat,
            }
        })
        .collect();

    RTree::bulk_load(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_data() -> RoadGraphData {
        RoadGraphData {
            nodes: vec![
                RoadNode { osm_id: 1, lat: 0.0, lon: 0.0 },
                RoadNode { osm_id: 2, lat: 0.0, lon: 1.0 },
                RoadNode { osm_id: 3, lat: 1.0, lon: 1.0 },
            ],
            edges: vec![(1, 2, 1000.0), (2, 1, 1000.0), (2, 3, 1500.0), (3, 2, 1500.0)],
        }
    }

    #[test]
    fn snaps_to_nearest_node() {
        let graph = RoadGraph::from_data(&sample_data());
        let nearest = graph.nearest_node(0.01, 0.01).unwrap();
        assert_eq!(graph.node_coords(nearest), Some((0.0, 0.0)));
    }

    #[test]
    fn edges_are_bidirectional() {
        let graph = RoadGraph::from_data(&sample_data());
        assert_eq!(graph.edge_count(), 4);
    }
}
