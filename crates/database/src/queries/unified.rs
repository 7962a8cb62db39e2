use chrono::{DateTime, Utc};
use model::route::UnifiedRoute;
use sqlx::{Executor, Postgres};

use crate::{error::Result, rows::UnifiedRouteRow};

use super::convert_error;

/// The union of `optimized_routes` and `reroutes` created since `since`,
/// joined to each client's current session window — the publisher's source
/// of truth for what to emit next.
pub async fn fetch_fresh_unified_routes<'c, E>(
    executor: E,
    since: DateTime<Utc>,
) -> Result<Vec<UnifiedRoute>>
where
    E: Executor<'c, Database = Postgres>,
{
    let rows: Vec<UnifiedRouteRow> = sqlx::query_as(
        "
        SELECT client_id, session_id, stop_id,
               ST_AsText(destination) AS destination,
               ST_AsText(path) AS path,
               created_at
        FROM view_routes_unified
        WHERE created_at >= $1
        ORDER BY created_at ASC;
        ",
    )
    .bind(since)
    .fetch_all(executor)
    .await
    .map_err(convert_error)?;

    rows.into_iter()
        .map(UnifiedRouteRow::into_unified_route)
        .collect()
}
