use database::RoutingDatabase;
use model::poi::CombinedPoi;
use model::route::TargetType;
use model::transit::Stop;
use model::Coordinate;
use utility::id::Id;

use crate::error::PlanError;

/// The single destination the planning pipeline should route to this cycle,
/// together with the stop_id its route caches are keyed by.
pub struct Target {
    pub target_type: TargetType,
    pub destination: Coordinate,
    /// The real GTFS stop id when the fallback found a boarding stop;
    /// `model::route::DIRECT_STOP_ID` when the target is a plain POI with no
    /// associated boarding point.
    pub stop_id: String,
    pub combined_poi: Option<CombinedPoi>,
    pub stop: Option<Stop>,
}

/// Picks one target per client: the best combined POI (detected + predicted,
/// per [`CombinedPoi::best`]'s ordering), or, if none exists, the nearest
/// boardable GTFS stop to the client's latest location.
pub async fn select_target(
    db: &dyn RoutingDatabase,
    client_id: &str,
    latest_location: Coordinate,
) -> Result<Option<Target>, PlanError> {
    if let Some(poi) = db.fetch_best_combined_poi(client_id).await? {
        return Ok(Some(Target {
            target_type: TargetType::Poi,
            destination: poi.location,
            stop_id: model::route::DIRECT_STOP_ID.to_owned(),
            combined_poi: Some(poi),
            stop: None,
        }));
    }

    match db.fetch_nearest_boardable_stop(latest_location).await? {
        Some((stop_id, stop)) => Ok(Some(Target {
            target_type: TargetType::StopPoint,
            destination: stop.location.unwrap_or(latest_location),
            stop_id: stop_id_to_string(&stop_id),
            combined_poi: None,
            stop: Some(stop),
        })),
        None => Ok(None),
    }
}

fn stop_id_to_string(id: &Id<Stop>) -> String {
    id.to_string()
}
