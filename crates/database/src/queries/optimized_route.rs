use model::route::{ChosenRoute, DIRECT_STOP_ID};
use sqlx::{Executor, Postgres};

use crate::{
    error::Result,
    rows::ChosenRouteRow,
    wkt_codec::{coordinate_to_wkt, polyline_to_wkt},
};

use super::convert_error;

pub async fn fetch_current_chosen_route<'c, E>(
    executor: E,
    client_id: &str,
) -> Result<Option<ChosenRoute>>
where
    E: Executor<'c, Database = Postgres>,
{
    let row: Option<ChosenRouteRow> = sqlx::query_as(
        "
        SELECT client_id, stop_id,
               ST_AsText(origin) AS origin,
               ST_AsText(destination) AS destination,
               ST_AsText(path) AS path,
               segment_type, is_chosen, created_at
        FROM optimized_routes
        WHERE client_id = $1 AND is_chosen
        ORDER BY created_at DESC
        LIMIT 1;
        ",
    )
    .bind(client_id)
    .fetch_optional(executor)
    .await
    .map_err(convert_error)?;

    row.map(ChosenRouteRow::into_chosen_route).transpose()
}

/// Upserts by `(client_id, stop_id, segment_type)`: at most one row for that
/// key at any time. The stop_id sentinel `"direct"` keeps the key meaningful
/// for walking-only rows, per [`DIRECT_STOP_ID`].
pub async fn upsert_chosen_route<'c, E>(executor: E, route: &ChosenRoute) -> Result<()>
where
    E: Executor<'c, Database = Postgres>,
{
    debug_assert!(
        route.segment_type != model::route::SegmentType::Direct
            || route.stop_id == DIRECT_STOP_ID
    );

    sqlx::query(
        "
        INSERT INTO optimized_routes (
            client_id, stop_id, origin, destination, path, segment_type,
            is_chosen
        )
        VALUES (
            $1, $2, ST_GeomFromText($3), ST_GeomFromText($4),
            ST_GeomFromText($5), $6, $7
        )
        ON CONFLICT (client_id, stop_id, segment_type)
        DO UPDATE SET
            origin = EXCLUDED.origin,
            destination = EXCLUDED.destination,
            path = EXCLUDED.path,
            is_chosen = EXCLUDED.is_chosen,
            created_at = now();
        ",
    )
    .bind(&route.client_id)
    .bind(&route.stop_id)
    .bind(coordinate_to_wkt(route.origin))
    .bind(coordinate_to_wkt(route.destination))
    .bind(polyline_to_wkt(&route.path))
    .bind(route.segment_type.as_str())
    .bind(route.is_chosen)
    .execute(executor)
    .await
    .map_err(convert_error)?;

    Ok(())
}
