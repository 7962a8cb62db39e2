use model::route::{AstarRoute, TargetType};
use sqlx::{Executor, Postgres};

use crate::{
    error::Result,
    rows::{target_type_as_str, AstarRouteRow},
    wkt_codec::{coordinate_to_wkt, polyline_to_wkt},
};
use model::Coordinate;

use super::convert_error;

pub async fn fetch_latest_astar_route<'c, E>(
    executor: E,
    client_id: &str,
    stop_id: &str,
) -> Result<Option<AstarRoute>>
where
    E: Executor<'c, Database = Postgres>,
{
    let row: Option<AstarRouteRow> = sqlx::query_as(
        "
        SELECT client_id, stop_id, target_type,
               ST_AsText(origin) AS origin,
               ST_AsText(destination) AS destination,
               ST_AsText(path) AS path,
               distance_m, efficiency_score, decision_context,
               predicted_eta, created_at
        FROM astar_routes
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

    row.map(AstarRouteRow::into_astar_route).transpose()
}

/// Persists a minimal A* row (empty path, zero distance) when no cached
/// route to the selector's target exists yet; the scorer reads this back
/// immediately as the seed for a `fallback` chosen row.
pub async fn seed_fallback_astar_route<'c, E>(
    executor: E,
    client_id: &str,
    stop_id: &str,
    target_type: TargetType,
    origin: Coordinate,
    destination: Coordinate,
) -> Result<AstarRoute>
where
    E: Executor<'c, Database = Postgres>,
{
    let row: AstarRouteRow = sqlx::query_as(
        "
        INSERT INTO astar_routes (
            client_id, stop_id, target_type, origin, destination, path,
            distance_m, efficiency_score, decision_context, predicted_eta
        )
        VALUES (
            $1, $2, $3, ST_GeomFromText($4), ST_GeomFromText($5),
            ST_GeomFromText('LINESTRING EMPTY'), 0, NULL, 'fallback_astar', NULL
        )
        RETURNING client_id, stop_id, target_type,
                  ST_AsText(origin) AS origin,
                  ST_AsText(destination) AS destination,
                  ST_AsText(path) AS path,
                  distance_m, efficiency_score, decision_context,
                  predicted_eta, created_at;
        ",
    )
    .bind(client_id)
    .bind(stop_id)
    .bind(target_type_as_str(target_type))
    .bind(coordinate_to_wkt(origin))
    .bind(coordinate_to_wkt(destination))
    .fetch_one(executor)
    .await
    .map_err(convert_error)?;

    row.into_astar_route()
}

/// Persists a freshly computed A* path, tagged with the decision context of
/// its call site ("routed_to_poi", "fallback_stop_point", "fallback_astar").
pub async fn insert_astar_route<'c, E>(
    executor: E,
    route: &AstarRoute,
) -> Result<()>
where
    E: Executor<'c, Database = Postgres>,
{
    sqlx::query(
        "
        INSERT INTO astar_routes (
            client_id, stop_id, target_type, origin, destination, path,
            distance_m, efficiency_score, decision_context, predicted_eta
        )
        VALUES (
            $1, $2, $3, ST_GeomFromText($4), ST_GeomFromText($5),
            ST_GeomFromText($6), $7, $8, $9, $10
        );
        ",
    )
    .bind(&route.client_id)
    .bind(&route.stop_id)
    .bind(target_type_as_str(route.target_type))
    .bind(coordinate_to_wkt(route.origin))
    .bind(coordinate_to_wkt(route.destination))
    .bind(polyline_to_wkt(&route.path))
    .bind(route.distance_m)
    .bind(route.efficiency_score)
    .bind(&route.decision_context)
    .bind(route.predicted_eta)
    .execute(executor)
    .await
    .map_err(convert_error)?;

    Ok(())
}
