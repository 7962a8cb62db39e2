use chrono::{DateTime, Utc};
use model::{
    departure::{DepartureCandidate, DepartureStatus, SwitchProfile},
    geodata::{ActiveClient, GeoPoint},
    poi::CombinedPoi,
    route::{AstarRoute, ChosenRoute, MapfRoute, SegmentType, TargetType, UnifiedRoute},
    transit::Stop,
    Coordinate,
};
use sqlx::FromRow;
use utility::id::Id;

use crate::error::DbError;
use crate::wkt_codec::{wkt_to_coordinate, wkt_to_polyline};

fn parse_target_type(raw: &str) -> Result<TargetType, DbError> {
    match raw {
        "poi" => Ok(TargetType::Poi),
        "stop_point" => Ok(TargetType::StopPoint),
        other => Err(DbError::Malformed(format!("unknown target_type {other:?}"))),
    }
}

pub fn target_type_as_str(target_type: TargetType) -> &'static str {
    match target_type {
        TargetType::Poi => "poi",
        TargetType::StopPoint => "stop_point",
    }
}

fn parse_segment_type(raw: &str) -> Result<SegmentType, DbError> {
    match raw {
        "direct" => Ok(SegmentType::Direct),
        "multimodal" => Ok(SegmentType::Multimodal),
        "fallback" => Ok(SegmentType::Fallback),
        other => Err(DbError::Malformed(format!("unknown segment_type {other:?}"))),
    }
}

fn parse_departure_status(raw: &str) -> Result<DepartureStatus, DbError> {
    match raw {
        "on_time" => Ok(DepartureStatus::OnTime),
        "delayed" => Ok(DepartureStatus::Delayed),
        "cancelled" => Ok(DepartureStatus::Cancelled),
        other => Err(DbError::Malformed(format!("unknown departure status {other:?}"))),
    }
}

#[derive(Debug, FromRow)]
pub struct ActiveClientRow {
    pub client_id: String,
    pub session_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: Option<f64>,
    pub speed: Option<f64>,
    pub activity: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl ActiveClientRow {
    pub fn into_geo_point(self) -> GeoPoint {
        GeoPoint {
            client_id: self.client_id,
            session_id: self.session_id,
            location: Coordinate::new(self.latitude, self.longitude),
            elevation: self.elevation,
            speed: self.speed,
            activity: self.activity,
            timestamp: self.timestamp,
        }
    }

    pub fn into_active_client(self) -> ActiveClient {
        ActiveClient {
            client_id: self.client_id.clone(),
            session_id: self.session_id.clone(),
            latest_location: self.into_geo_point(),
        }
    }
}

#[derive(Debug, FromRow)]
pub struct CombinedPoiRow {
    pub client_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub is_predicted: bool,
    pub poi_rank: Option<i32>,
    pub predicted_visit_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<CombinedPoiRow> for CombinedPoi {
    fn from(row: CombinedPoiRow) -> Self {
        CombinedPoi {
            client_id: row.client_id,
            location: Coordinate::new(row.latitude, row.longitude),
            is_predicted: row.is_predicted,
            poi_rank: row.poi_rank,
            predicted_visit_time: row.predicted_visit_time,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct StopRow {
    pub id: String,
    pub name: Option<String>,
    pub location_type: i32,
    pub parent_station: Option<String>,
    pub platform_code: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl StopRow {
    pub fn into_stop(self) -> (Id<Stop>, Stop) {
        let stop = Stop {
            name: self.name,
            location: match (self.latitude, self.longitude) {
                (Some(lat), Some(lon)) => Some(Coordinate::new(lat, lon)),
                _ => None,
            },
            location_type: self.location_type,
            parent_station: self.parent_station.map(Id::new),
            platform_code: self.platform_code,
        };
        (Id::new(self.id), stop)
    }
}

#[derive(Debug, FromRow)]
pub struct AstarRouteRow {
    pub client_id: String,
    pub stop_id: String,
    pub target_type: String,
    pub origin: String,
    pub destination: String,
    pub path: String,
    pub distance_m: f64,
    pub efficiency_score: Option<f64>,
    pub decision_context: String,
    pub predicted_eta: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl AstarRouteRow {
    pub fn into_astar_route(self) -> Result<AstarRoute, DbError> {
        Ok(AstarRoute {
            client_id: self.client_id,
            stop_id: self.stop_id,
            target_type: parse_target_type(&self.target_type)?,
            origin: wkt_to_coordinate(&self.origin)?,
            destination: wkt_to_coordinate(&self.destination)?,
            path: wkt_to_polyline(&self.path)?,
            distance_m: self.distance_m,
            efficiency_score: self.efficiency_score,
            decision_context: self.decision_context,
            predicted_eta: self.predicted_eta,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub struct MapfRouteRow {
    pub client_id: String,
    pub stop_id: String,
    pub destination: String,
    pub path: String,
    pub success: bool,
    pub decision_context: String,
    pub created_at: DateTime<Utc>,
}

impl MapfRouteRow {
    pub fn into_mapf_route(self) -> Result<MapfRoute, DbError> {
        Ok(MapfRoute {
            client_id: self.client_id,
            stop_id: self.stop_id,
            destination: wkt_to_coordinate(&self.destination)?,
            path: wkt_to_polyline(&self.path)?,
            success: self.success,
            decision_context: self.decision_context,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub struct DepartureCandidateRow {
    pub client_id: String,
    pub stop_id: String,
    pub trip_id: String,
    pub route_id: String,
    pub departure_time: DateTime<Utc>,
    pub delay_seconds: i32,
    pub status: String,
    pub trip_headsign: Option<String>,
}

impl DepartureCandidateRow {
    pub fn into_departure_candidate(self) -> Result<DepartureCandidate, DbError> {
        Ok(DepartureCandidate {
            client_id: self.client_id,
            stop_id: self.stop_id,
            trip_id: self.trip_id,
            route_id: self.route_id,
            departure_time: self.departure_time,
            delay_seconds: self.delay_seconds,
            status: parse_departure_status(&self.status)?,
            trip_headsign: self.trip_headsign,
        })
    }
}

#[derive(Debug, FromRow)]
pub struct SwitchProfileRow {
    pub avg_switch_seconds: f64,
}

impl From<SwitchProfileRow> for SwitchProfile {
    fn from(row: SwitchProfileRow) -> Self {
        SwitchProfile {
            avg_switch_seconds: row.avg_switch_seconds,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct ChosenRouteRow {
    pub client_id: String,
    pub stop_id: String,
    pub origin: String,
    pub destination: String,
    pub path: String,
    pub segment_type: String,
    pub is_chosen: bool,
    pub created_at: DateTime<Utc>,
}

impl ChosenRouteRow {
    pub fn into_chosen_route(self) -> Result<ChosenRoute, DbError> {
        Ok(ChosenRoute {
            client_id: self.client_id,
            stop_id: self.stop_id,
            origin: wkt_to_coordinate(&self.origin)?,
            destination: wkt_to_coordinate(&self.destination)?,
            path: wkt_to_polyline(&self.path)?,
            segment_type: parse_segment_type(&self.segment_type)?,
            is_chosen: self.is_chosen,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub struct UnifiedRouteRow {
    pub client_id: String,
    pub session_id: String,
    pub stop_id: String,
    pub destination: String,
    pub path: String,
    pub created_at: DateTime<Utc>,
}

impl UnifiedRouteRow {
    pub fn into_unified_route(self) -> Result<UnifiedRoute, DbError> {
        Ok(UnifiedRoute {
            client_id: self.client_id,
            session_id: self.session_id,
            stop_id: self.stop_id,
            destination: wkt_to_coordinate(&self.destination)?,
            path: wkt_to_polyline(&self.path)?,
            created_at: self.created_at,
        })
    }
}
