use chrono::{DateTime, Utc};

use crate::{ClientId, Coordinate, Polyline};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetType {
    Poi,
    StopPoint,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentType {
    Direct,
    Multimodal,
    Fallback,
}

impl SegmentType {
    pub fn as_str(self) -> &'static str {
        match self {
            SegmentType::Direct => "direct",
            SegmentType::Multimodal => "multimodal",
            SegmentType::Fallback => "fallback",
        }
    }
}

impl std::fmt::Display for SegmentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A direct stop id meaning "this chosen row has no boarding stop", used for
/// `segment_type = direct` rows so `(client, stop_id, segment_type)` stays a
/// meaningful uniqueness key even for walking-only routes.
pub const DIRECT_STOP_ID: &str = "direct";

/// A cached shortest-walking-path result, produced by the A* planner (C1) and
/// read back by the scorer (C4).
#[derive(Debug, Clone)]
pub struct AstarRoute {
    pub client_id: ClientId,
    pub stop_id: String,
    pub target_type: TargetType,
    pub origin: Coordinate,
    pub destination: Coordinate,
    pub path: Polyline,
    pub distance_m: f64,
    pub efficiency_score: Option<f64>,
    pub decision_context: String,
    pub predicted_eta: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl AstarRoute {
    pub fn duration_s(&self, walking_speed_mps: f64) -> f64 {
        if walking_speed_mps <= 0.0 {
            return f64::INFINITY;
        }
        self.distance_m / walking_speed_mps
    }
}

/// A cached "walk to the boarding stop" leg, produced by the MAPF leg
/// planner (C2). The in-vehicle portion is represented separately by a
/// [`crate::departure::DepartureCandidate`], not by geometry here.
#[derive(Debug, Clone)]
pub struct MapfRoute {
    pub client_id: ClientId,
    pub stop_id: String,
    pub destination: Coordinate,
    pub path: Polyline,
    pub success: bool,
    pub decision_context: String,
    pub created_at: DateTime<Utc>,
}

/// The single currently-advised route for a client, unique by
/// `(client_id, stop_id, segment_type)`. Newer rows replace older ones via
/// upsert; there is never more than one row per key.
#[derive(Debug, Clone)]
pub struct ChosenRoute {
    pub client_id: ClientId,
    pub stop_id: String,
    pub origin: Coordinate,
    pub destination: Coordinate,
    pub path: Polyline,
    pub segment_type: SegmentType,
    pub is_chosen: bool,
    pub created_at: DateTime<Utc>,
}

impl ChosenRoute {
    /// Whether `self` and `other` represent the same advised route for
    /// reroute-change comparison purposes: same segment kind, same boarding
    /// stop, and the same geometry.
    pub fn same_route_as(&self, other: &ChosenRoute) -> bool {
        self.segment_type == other.segment_type
            && self.stop_id == other.stop_id
            && self.path == other.path
    }
}

/// An audit row written whenever a reroute changes the chosen route.
#[derive(Debug, Clone)]
pub struct RerouteEvent {
    pub route: ChosenRoute,
    pub reason: String,
    pub previous_stop_id: Option<String>,
    pub previous_segment_type: Option<SegmentType>,
}

/// One row out of `view_routes_unified`: a chosen or rerouted route together
/// with the session window the publisher needs to build a topic and a dedup
/// key.
#[derive(Debug, Clone)]
pub struct UnifiedRoute {
    pub client_id: ClientId,
    pub session_id: String,
    pub stop_id: String,
    pub destination: Coordinate,
    pub path: Polyline,
    pub created_at: DateTime<Utc>,
}
