use geo_types::{Coord, LineString, Point};
use wkt::{ToWkt, TryFromWkt};

use model::{Coordinate, Polyline};

use crate::error::DbError;

/// Encodes a polyline as `ST_GeomFromText`-compatible WKT text. An empty
/// polyline round-trips as `LINESTRING EMPTY` rather than a degenerate
/// single-point line.
pub fn polyline_to_wkt(polyline: &Polyline) -> String {
    if polyline.is_empty() {
        return "LINESTRING EMPTY".to_owned();
    }
    let line = LineString::new(
        polyline
            .0
            .iter()
            .map(|c| Coord { x: c.lon, y: c.lat })
            .collect(),
    );
    line.wkt_string()
}

/// Parses `ST_AsText` output back into a polyline. A line with fewer than
/// two vertices is a geometry error per the invariant that a non-empty path
/// always has at least two vertices; callers treat it as "no path".
pub fn wkt_to_polyline(wkt_text: &str) -> Result<Polyline, DbError> {
    let trimmed = wkt_text.trim();
    if trimmed.eq_ignore_ascii_case("LINESTRING EMPTY") || trimmed.is_empty() {
        return Ok(Polyline::empty());
    }
    let line = LineString::<f64>::try_from_wkt_str(trimmed)
        .map_err(|err| DbError::Malformed(format!("invalid linestring wkt: {err}")))?;
    let points: Vec<Coordinate> =
        line.coords().map(|c| Coordinate::new(c.y, c.x)).collect();
    if points.len() == 1 {
        return Err(DbError::Malformed(
            "linestring has a single vertex".to_owned(),
        ));
    }
    Ok(Polyline(points))
}

pub fn coordinate_to_wkt(point: Coordinate) -> String {
    Point::new(point.lon, point.lat).wkt_string()
}

pub fn wkt_to_coordinate(wkt_text: &str) -> Result<Coordinate, DbError> {
    let point = Point::<f64>::try_from_wkt_str(wkt_text.trim())
        .map_err(|err| DbError::Malformed(format!("invalid point wkt: {err}")))?;
    Ok(Coordinate::new(point.y(), point.x()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_polyline() {
        let polyline = Polyline(vec![
            Coordinate::new(59.33, 18.07),
            Coordinate::new(59.34, 18.09),
        ]);
        let wkt_text = polyline_to_wkt(&polyline);
        let decoded = wkt_to_polyline(&wkt_text).unwrap();
        assert_eq!(decoded, polyline);
    }

    #[test]
    fn empty_polyline_round_trips() {
        let wkt_text = polyline_to_wkt(&Polyline::empty());
        let decoded = wkt_to_polyline(&wkt_text).unwrap();
        assert!(decoded.is_empty());
    }

    #[test]
    fn single_vertex_line_is_malformed() {
        let err = wkt_to_polyline("LINESTRING(18.07 59.33)");
        assert!(err.is_err());
    }
}
