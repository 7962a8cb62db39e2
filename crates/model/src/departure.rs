use chrono::{DateTime, Utc};

use crate::ClientId;

/// Live-transit status for a scheduled departure, as surfaced by GTFS-RT
/// decoding (a collaborator; this crate only holds the decoded shape).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepartureStatus {
    OnTime,
    Delayed,
    Cancelled,
}

/// The earliest scheduled-plus-realtime departure the live-departure oracle
/// (C5) found to align with a client's A* ETA at a stop.
#[derive(Debug, Clone)]
pub struct DepartureCandidate {
    pub client_id: ClientId,
    pub stop_id: String,
    pub trip_id: String,
    pub route_id: String,
    pub departure_time: DateTime<Utc>,
    pub delay_seconds: i32,
    pub status: DepartureStatus,
    pub trip_headsign: Option<String>,
}

impl DepartureCandidate {
    pub fn has_passed(&self, now: DateTime<Utc>, grace_seconds: i64) -> bool {
        (now - self.departure_time).num_seconds() > grace_seconds
    }
}

/// A client's historical average switching time at a stop, used by the
/// scorer's tie-breaker.
#[derive(Debug, Clone, Copy)]
pub struct SwitchProfile {
    pub avg_switch_seconds: f64,
}
