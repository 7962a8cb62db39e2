use model::route::MapfRoute;
use sqlx::{Executor, Postgres};

use crate::{
    error::Result,
    rows::MapfRouteRow,
    wkt_codec::{coordinate_to_wkt, polyline_to_wkt},
};

use super::convert_error;

pub async fn fetch_latest_mapf_route<'c, E>(
    executor: E,
    client_id: &str,
    stop_id: &str,
) -> Result<Option<MapfRoute>>
where
    E: Executor<'c, Database = Postgres>,
{
    let row: Option<MapfRouteRow> = sqlx::query_as(
        "
        SELECT client_id, stop_id,
               ST_AsText(destination) AS destination,
               ST_AsText(path) AS path,
               success, decision_context, created_at
        FROM mapf_routes
        WHERE client_id = $1 AND stop_id = $2
        ORDER BY created_at DESC
        LIMIT 1;
        ",
    )
    .bind(client_id)
    .bind(stop_id)
    .fetch_optional(executor)
    .await
    .map_err(convert_error)?;

    row.map(MapfRouteRow::into_mapf_route).transpose()
}

pub async fn insert_mapf_route<'c, E>(executor: E, route: &MapfRoute) -> Result<()>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query(
        "
        INSERT INTO mapf_routes (
            client_id, stop_id, destination, path, success, decision_context
        )
        VALUES ($1, $2, ST_GeomFromText($3), ST_GeomFromText($4), $5, $6);
        ",
    )
    .bind(&route.client_id)
    .bind(&route.stop_id)
    .bind(coordinate_to_wkt(route.destination))
    .bind(polyline_to_wkt(&route.path))
    .bind(route.success)
    .bind(&route.decision_context)
    .execute(executor)
    .await
    .map_err(convert_error)?;

    Ok(())
}
