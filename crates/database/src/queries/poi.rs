use model::poi::CombinedPoi;
use sqlx::{Executor, Postgres};

use crate::{error::Result, rows::CombinedPoiRow};

use super::convert_error;

/// `view_combined_pois` already orders rows predicted-first, rank desc,
/// predicted_visit_time desc, created_at desc, so the head row is the
/// selector's answer; the scorer's in-memory [`CombinedPoi::best`] exists for
/// callers (and tests) that pulled more than one row.
pub async fn fetch_best_combined_poi<'c, E>(
    executor: E,
    client_id: &str,
) -> Result<Option<CombinedPoi>>
where
    E: Executor<'c, Database = Postgres>,
{
    let row: Option<CombinedPoiRow> = sqlx::query_as(
        "
        SELECT client_id, latitude, longitude, is_predicted, poi_rank,
               predicted_visit_time, created_at
        FROM view_combined_pois
        WHERE client_id = $1
        ORDER BY
            is_predicted DESC,
            poi_rank DESC NULLS LAST,
            predicted_visit_time DESC NULLS LAST,
            created_at DESC
        LIMIT 1;
        ",
    )
    .bind(client_id)
    .fetch_optional(executor)
    .await
    .map_err(convert_error)?;

    Ok(row.map(CombinedPoi::from))
}
