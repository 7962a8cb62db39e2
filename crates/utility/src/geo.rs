pub const EARTH_RADIUS_KM: f64 = 6371.0;

fn to_radians(degrees: f64) -> f64 {
    degrees * std::f64::consts::PI / 180.0
}

fn to_degrees(radians: f64) -> f64 {
    radians * 180.0 / std::f64::consts::PI
}

pub fn calculate_bounding_box(
    lat: f64,
    lon: f64,
    radius_km: f64,
) -> ((f64, f64), (f64, f64)) {
    // Convert latitude and longitude from degrees to radians
    let lat_rad = to_radians(lat);
    let lon_rad = to_radians(lon);

    // Latitude bounds
    let min_lat = lat_rad - radius_km / EARTH_RADIUS_KM;
    let max_lat = lat_rad + radius_km / EARTH_RADIUS_KM;

    // Longitude bounds (adjusted by latitude)
    let min_lon = lon_rad - radius_km / (EARTH_RADIUS_KM * lat_rad.cos());
    let max_lon = lon_rad + radius_km / (EARTH_RADIUS_KM * lat_rad.cos());

    // Convert bounds back to degrees
    let min_lat_deg = to_degrees(min_lat);
    let max_lat_deg = to_degrees(max_lat);
    let min_lon_deg = to_degrees(min_lon);
    let max_lon_deg = to_degrees(max_lon);

    ((min_lat_deg, min_lon_deg), (max_lat_deg, max_lon_deg))
}

pub fn haversine_distance(
    latitude_1: f64,
    longitude_1: f64,
    latitude2: f64,
    longitude_2: f64,
) -> f64 {
    let lat1_rad = to_radians(latitude_1);
    let lon1_rad = to_radians(longitude_1);
    let lat2_rad = to_radians(latitude2);
    let lon2_rad = to_radians(longitude_2);

    let dlat = lat2_rad - lat1_rad;
    let dlon = lon2_rad - lon1_rad;

    let a = (dlat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

pub const EARTH_RADIUS_M: f64 = EARTH_RADIUS_KM * 1000.0;

/// Great-circle distance in meters, used as the A* heuristic and for POI/stop
/// nearest-neighbor lookups.
pub fn haversine_distance_m(
    latitude_1: f64,
    longitude_1: f64,
    latitude_2: f64,
    longitude_2: f64,
) -> f64 {
    haversine_distance(latitude_1, longitude_1, latitude_2, longitude_2) * 1000.0
}

/// Bounding box `(west, south, east, north)` around a set of (lat, lon) points,
/// padded by `padding_degrees` on every side.
pub fn padded_bbox(points: &[(f64, f64)], padding_degrees: f64) -> (f64, f64, f64, f64) {
    let lats = points.iter().map(|(lat, _)| *lat);
    let lons = points.iter().map(|(_, lon)| *lon);

    let north = lats.clone().fold(f64::MIN, f64::max) + padding_degrees;
    let south = lats.fold(f64::MAX, f64::min) - padding_degrees;
    let east = lons.clone().fold(f64::MIN, f64::max) + padding_degrees;
    let west = lons.fold(f64::MAX, f64::min) - padding_degrees;

    (west, south, east, north)
}

/// Projects WGS84 degrees to Web Mercator (EPSG:3857) meters. Good enough at
/// city scale for the reroute watcher's point-to-polyline distance check.
pub fn to_web_mercator(lat: f64, lon: f64) -> (f64, f64) {
    let x = lon.to_radians() * EARTH_RADIUS_M;
    let y = (lat.to_radians() / 2.0 + std::f64::consts::FRAC_PI_4)
        .tan()
        .ln()
        * EARTH_RADIUS_M;
    (x, y)
}

/// Shortest distance in meters from a point to a polyline, both given as WGS84
/// (lat, lon) pairs. Empty or single-vertex lines return `f64::INFINITY`.
pub fn point_to_polyline_distance_m(point: (f64, f64), line: &[(f64, f64)]) -> f64 {
    if line.len() < 2 {
        return f64::INFINITY;
    }

    let p = to_web_mercator(point.0, point.1);
    let projected: Vec<(f64, f64)> = line
        .iter()
        .map(|(lat, lon)| to_web_mercator(*lat, *lon))
        .collect();

    projected
        .windows(2)
        .map(|segment| point_to_segment_distance(p, segment[0], segment[1]))
        .fold(f64::INFINITY, f64::min)
}

fn point_to_segment_distance(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
    let (px, py) = p;
    let (ax, ay) = a;
    let (bx, by) = b;

    let dx = bx - ax;
    let dy = by - ay;
    let len_sq = dx * dx + dy * dy;

    let t = if len_sq <= f64::EPSILON {
        0.0
    } else {
        (((px - ax) * dx + (py - ay) * dy) / len_sq).clamp(0.0, 1.0)
    };

    let closest_x = ax + t * dx;
    let closest_y = ay + t * dy;

    ((px - closest_x).powi(2) + (py - closest_y).powi(2)).sqrt()
}
