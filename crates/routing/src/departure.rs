use database::RoutingDatabase;
use model::departure::DepartureCandidate;

use crate::error::PlanError;

const FAVORED_ROUTE_LIMIT: u32 = 5;

/// The earliest viable departure for a client at a stop — already ordered
/// by `coalesce(delay_seconds, 0)` then `departure_time` by the query layer.
/// `None` means no aligned departure exists.
pub async fn fetch_aligned_departure(
    db: &dyn RoutingDatabase,
    client_id: &str,
    stop_id: &str,
) -> Result<Option<DepartureCandidate>, PlanError> {
    Ok(db.fetch_departure_candidate(client_id, stop_id).await?)
}

pub async fn fetch_top_favored_routes(db: &dyn RoutingDatabase, client_id: &str) -> Result<Vec<String>, PlanError> {
    Ok(db.fetch_top_favored_routes(client_id, FAVORED_ROUTE_LIMIT).await?)
}
