use model::departure::{DepartureCandidate, SwitchProfile};
use sqlx::{Executor, Postgres};

use crate::{
    error::Result,
    rows::{DepartureCandidateRow, SwitchProfileRow},
};

use super::convert_error;

/// Earliest viable departure for (client, stop): smallest non-negative
/// delay first, then earliest scheduled time.
pub async fn fetch_departure_candidate<'c, E>(
    executor: E,
    client_id: &str,
    stop_id: &str,
) -> Result<Option<DepartureCandidate>>
where
    E: Executor<'c, Database = Postgres>,
{
    let row: Option<DepartureCandidateRow> = sqlx::query_as(
        "
        SELECT client_id, stop_id, trip_id, route_id, departure_time,
               delay_seconds, status, trip_headsign
        FROM view_departure_candidates
        WHERE client_id = $1 AND stop_id = $2
        ORDER BY coalesce(delay_seconds, 0) ASC, departure_time ASC
        LIMIT 1;
        ",
    )
    .bind(client_id)
    .bind(stop_id)
    .fetch_optional(executor)
    .await
    .map_err(convert_error)?;

    row.map(DepartureCandidateRow::into_departure_candidate)
        .transpose()
}

pub async fn fetch_switch_profile<'c, E>(
    executor: E,
    client_id: &str,
    stop_id: &str,
) -> Result<Option<SwitchProfile>>
where
    E: Executor<'c, Database = Postgres>,
{
    let row: Option<SwitchProfileRow> = sqlx::query_as(
        "
        SELECT avg_switch_seconds
        FROM client_switch_profiles
        WHERE client_id = $1 AND stop_id = $2;
        ",
    )
    .bind(client_id)
    .bind(stop_id)
    .fetch_optional(executor)
    .await
    .map_err(convert_error)?;

    Ok(row.map(SwitchProfile::from))
}

pub async fn fetch_top_favored_routes<'c, E>(
    executor: E,
    client_id: &str,
    limit: u32,
) -> Result<Vec<String>>
where
    E: Executor<'c, Database = Postgres>,
{
    let rows: Vec<(String,)> = sqlx::query_as(
        "
        SELECT route_id
        FROM view_client_favored_routes
        WHERE client_id = $1
        ORDER BY usage_count DESC
        LIMIT $2;
        ",
    )
    .bind(client_id)
    .bind(limit as i64)
    .fetch_all(executor)
    .await
    .map_err(convert_error)?;

    Ok(rows.into_iter().map(|(route_id,)| route_id).collect())
}

/// Historical usage counts `(astar, mapf)` for this client, the raw material
/// the scorer normalizes into `p_hist`.
pub async fn fetch_usage_ratios<'c, E>(
    executor: E,
    client_id: &str,
) -> Result<(f64, f64)>
where
    E: Executor<'c, Database = Postgres>,
{
    let row: (i64, i64) = sqlx::query_as(
        "
        SELECT
            count(*) FILTER (WHERE segment_type = 'direct') AS astar_count,
            count(*) FILTER (WHERE segment_type = 'multimodal') AS mapf_count
        FROM optimized_routes
        WHERE client_id = $1;
        ",
    )
    .bind(client_id)
    .fetch_one(executor)
    .await
    .map_err(convert_error)?;

    Ok((row.0 as f64, row.1 as f64))
}
