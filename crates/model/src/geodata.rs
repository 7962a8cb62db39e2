use chrono::{DateTime, Utc};

use crate::{ClientId, Coordinate, Timestamped};

/// One reading from the per-client location stream. Appended by the ingestion
/// collaborator and never mutated; the core only ever reads the latest one
/// per active client.
#[derive(Debug, Clone)]
pub struct GeoPoint {
    pub client_id: ClientId,
    pub session_id: String,
    pub location: Coordinate,
    pub elevation: Option<f64>,
    pub speed: Option<f64>,
    pub activity: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl GeoPoint {
    pub fn speed_or_zero(&self) -> f64 {
        self.speed.unwrap_or(0.0)
    }
}

impl Timestamped for GeoPoint {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// An active client as reported by `view_active_clients_geodata`: just enough
/// to key a planning cycle.
#[derive(Debug, Clone)]
pub struct ActiveClient {
    pub client_id: ClientId,
    pub session_id: String,
    pub latest_location: GeoPoint,
}
