use model::geodata::{ActiveClient, GeoPoint};
use sqlx::{Executor, Postgres};

use crate::{error::Result, rows::ActiveClientRow};

use super::convert_error;

/// Clients with an open session and a reading in the geodata table, one row
/// per client keyed by its latest timestamp.
pub async fn fetch_active_clients<'c, E>(executor: E) -> Result<Vec<ActiveClient>>
where
    E: Executor<'c, Database = Postgres>,
{
    let rows: Vec<ActiveClientRow> = sqlx::query_as(
        "
        SELECT client_id, session_id, latitude, longitude, elevation, speed,
               activity, timestamp
        FROM view_active_clients_geodata;
        ",
    )
    .fetch_all(executor)
    .await
    .map_err(convert_error)?;

    Ok(rows.into_iter().map(ActiveClientRow::into_active_client).collect())
}

pub async fn fetch_latest_location<'c, E>(
    executor: E,
    client_id: &str,
) -> Result<Option<GeoPoint>>
where
    E: Executor<'c, Database = Postgres>,
{
    let row: Option<ActiveClientRow> = sqlx::query_as(
        "
        SELECT client_id, session_id, latitude, longitude, elevation, speed,
               activity, timestamp
        FROM geodata
        WHERE client_id = $1
        ORDER BY timestamp DESC
        LIMIT 1;
        ",
    )
    .bind(client_id)
    .fetch_optional(executor)
    .await
    .map_err(convert_error)?;

    Ok(row.map(ActiveClientRow::into_geo_point))
}
