use chrono::{DateTime, Utc};

pub mod departure;
pub mod geodata;
pub mod poi;
pub mod route;
pub mod session;
pub mod transit;

/// Clients are identified by the string id the ingestion pipeline assigns them;
/// there is no separate internal primary key to manage.
pub type ClientId = String;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// A route geometry in WGS84. Stored and transmitted as WKT text at the
/// database/MQTT boundary; held in memory as plain coordinate pairs so the
/// core never has to depend on a full geometry engine just to compare paths.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polyline(pub Vec<Coordinate>);

impl Polyline {
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn vertex_count(&self) -> usize {
        self.0.len()
    }

    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.0.iter().map(|c| (c.lat, c.lon))
    }

    /// Total great-circle length in meters.
    pub fn length_m(&self) -> f64 {
        self.0
            .windows(2)
            .map(|pair| {
                utility::geo::haversine_distance_m(
                    pair[0].lat,
                    pair[0].lon,
                    pair[1].lat,
                    pair[1].lon,
                )
            })
            .sum()
    }
}

/// Marker for a timestamped reading that belongs to a session, mirroring the
/// tuple the ingestion pipeline appends to the geodata table.
pub trait Timestamped {
    fn timestamp(&self) -> DateTime<Utc>;
}
