use model::route::RerouteEvent;
use sqlx::{Executor, Postgres};

use crate::{
    error::Result,
    wkt_codec::{coordinate_to_wkt, polyline_to_wkt},
};

use super::convert_error;

pub async fn insert_reroute_event<'c, E>(
    executor: E,
    event: &RerouteEvent,
) -> Result<()>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query(
        "
        INSERT INTO reroutes (
            client_id, stop_id, origin, destination, path, segment_type,
            reason, previous_stop_id, previous_segment_type
        )
        VALUES (
            $1, $2, ST_GeomFromText($3), ST_GeomFromText($4),
            ST_GeomFromText($5), $6, $7, $8, $9
        );
        ",
    )
    .bind(&event.route.client_id)
    .bind(&event.route.stop_id)
    .bind(coordinate_to_wkt(event.route.origin))
    .bind(coordinate_to_wkt(event.route.destination))
    .bind(polyline_to_wkt(&event.route.path))
    .bind(event.route.segment_type.as_str())
    .bind(&event.reason)
    .bind(&event.previous_stop_id)
    .bind(event.previous_segment_type.map(|s| s.as_str()))
    .execute(executor)
    .await
    .map_err(convert_error)?;

    Ok(())
}
