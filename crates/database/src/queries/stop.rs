use model::{transit::Stop, Coordinate};
use sqlx::{Executor, Postgres};
use utility::{geo, id::Id};

use crate::{error::Result, rows::StopRow};

use super::convert_error;

/// Nearest GTFS stop with `location_type = 0`, used as the fallback target
/// when a client has no combined POI. Bounded by a generous bounding box so
/// the nearest-neighbor scan stays index-friendly; great-circle distance
/// breaks ties within the box.
pub async fn fetch_nearest_boardable_stop<'c, E>(
    executor: E,
    near: Coordinate,
) -> Result<Option<(Id<Stop>, Stop)>>
where
    E: Executor<'c, Database = Postgres>,
{
    let (west, south, east, north) =
        geo::padded_bbox(&[(near.lat, near.lon)], 0.2);

    let rows: Vec<StopRow> = sqlx::query_as(
        "
        SELECT id, name, location_type, parent_station, platform_code,
               latitude, longitude
        FROM gtfs_stops
        WHERE location_type = 0
          AND latitude BETWEEN $1 AND $2
          AND longitude BETWEEN $3 AND $4;
        ",
    )
    .bind(south)
    .bind(north)
    .bind(west)
    .bind(east)
    .fetch_all(executor)
    .await
    .map_err(convert_error)?;

    Ok(rows
        .into_iter()
        .map(StopRow::into_stop)
        .filter_map(|(id, stop)| stop.location.map(|location| (id, stop, location)))
        .map(|(id, stop, location)| {
            let distance =
                geo::haversine_distance_m(near.lat, near.lon, location.lat, location.lon);
            (distance, id, stop)
        })
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, id, stop)| (id, stop)))
}
