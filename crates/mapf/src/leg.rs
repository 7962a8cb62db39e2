use chrono::Utc;
use database::error::Result;
use database::RoutingDatabase;
use log::debug;
use model::route::MapfRoute;
use model::Coordinate;

/// Wraps the latest cached A* walking path to `stop_id` as a multimodal
/// "to-stop" leg. The in-vehicle portion of the trip is represented
/// separately by a departure candidate, not by geometry here.
///
/// Returns `Ok(None)` when no A* route has been computed yet for this
/// (client, destination) pair — the leg planner never synthesizes a path of
/// its own.
pub async fn plan_leg(
    db: &dyn RoutingDatabase,
    client_id: &str,
    destination: Coordinate,
    stop_id: &str,
) -> Result<Option<MapfRoute>> {
    let Some(astar_route) = db.fetch_latest_astar_route(client_id, stop_id).await? else {
        debug!("no cached astar route for client {client_id} stop {stop_id}, skipping leg");
        return Ok(None);
    };

    let leg = MapfRoute {
        client_id: client_id.to_owned(),
        stop_id: stop_id.to_owned(),
        destination,
        path: astar_route.path,
        success: true,
        decision_context: "multimodal_leg".to_owned(),
        created_at: Utc::now(),
    };

    db.insert_mapf_route(&leg).await?;
    Ok(Some(leg))
}
