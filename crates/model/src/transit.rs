use utility::id::{HasId, Id};

use crate::Coordinate;

/// A GTFS stop. `location_type = 0` is a boarding stop (platform); other
/// values (station, entrance, ...) exist in the static feed but are never
/// targets of the fallback nearest-stop lookup.
#[derive(Debug, Clone)]
pub struct Stop {
    pub name: Option<String>,
    pub location: Option<Coordinate>,
    pub location_type: i32,
    pub parent_station: Option<Id<Stop>>,
    pub platform_code: Option<String>,
}

impl HasId for Stop {
    type IdType = String;
}

impl Stop {
    pub fn is_boardable(&self) -> bool {
        self.location_type == 0
    }
}

/// A scheduled transit line ("route" in GTFS terms; renamed here to avoid
/// colliding with this repo's own notion of a chosen route).
#[derive(Debug, Clone)]
pub struct TransitLine {
    pub short_name: Option<String>,
    pub long_name: Option<String>,
}

impl HasId for TransitLine {
    type IdType = String;
}

#[derive(Debug, Clone)]
pub struct Trip {
    pub line_id: Id<TransitLine>,
    pub headsign: Option<String>,
}

impl HasId for Trip {
    type IdType = String;
}

#[derive(Debug, Clone)]
pub struct StopTime {
    pub trip_id: Id<Trip>,
    pub stop_id: Id<Stop>,
    pub stop_sequence: i32,
}
