use chrono::{DateTime, Utc};

use crate::ClientId;

/// A session is the half-open interval `[start, end)` during which a client's
/// geodata belongs to one continuous trip. `end` is `None` while the session
/// is still active.
#[derive(Debug, Clone)]
pub struct Session {
    pub client_id: ClientId,
    pub session_id: String,
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
}

impl Session {
    pub fn is_active(&self) -> bool {
        self.end.is_none()
    }
}
