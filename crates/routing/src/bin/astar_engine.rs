use std::time::Duration;

use astar::cache::OverpassSource;
use astar::{AstarOutcome, GeodesicAstarPlanner};
use chrono::Utc;
use database::{DatabaseConnectionInfo, PgDatabase, RoutingDatabase};
use log::{error, info, warn};
use model::route::{AstarRoute, TargetType};
use routing::config::{
    RoutingConfig, ASTAR_FAILURE_BACKOFF_SECONDS, ASTAR_GRACE_SECONDS, ASTAR_TICK_SECONDS,
};
use routing::selector::select_target;

fn decision_context(target_type: TargetType) -> &'static str {
    match target_type {
        TargetType::Poi => "routed_to_poi",
        TargetType::StopPoint => "fallback_stop_point",
    }
}

/// One A* cycle: for every active client, selects this cycle's target (C3)
/// and computes and persists a real A* route to it (C1). Mirrors the
/// supervisor's per-client isolation policy by logging and continuing past
/// a single client's failure rather than aborting the cycle.
async fn run_cycle(
    db: &dyn RoutingDatabase,
    planner: &GeodesicAstarPlanner<OverpassSource>,
) -> Result<(), database::DbError> {
    let clients = db.fetch_active_clients().await?;
    if clients.is_empty() {
        info!("no active clients this astar cycle");
        return Ok(());
    }

    for client in clients {
        let Some(location) = db.fetch_latest_location(&client.client_id).await? else {
            continue;
        };

        let target = match select_target(db, &client.client_id, location.location).await {
            Ok(Some(target)) => target,
            Ok(None) => continue,
            Err(why) => {
                warn!("target selection failed for client {}: {why}", client.client_id);
                continue;
            }
        };

        let result = match planner.route(location.location, target.destination).await {
            Ok(result) => result,
            Err(why) => {
                warn!("astar route failed for client {}: {why}", client.client_id);
                continue;
            }
        };

        if result.outcome == AstarOutcome::NoPath {
            info!("no path found for client {} to its current target", client.client_id);
            continue;
        }

        let route = AstarRoute {
            client_id: client.client_id.clone(),
            stop_id: target.stop_id.clone(),
            target_type: target.target_type,
            origin: location.location,
            destination: target.destination,
            path: result.path,
            distance_m: result.distance_m,
            efficiency_score: Some(result.distance_m),
            decision_context: decision_context(target.target_type).to_owned(),
            predicted_eta: None,
            created_at: Utc::now(),
        };

        if let Err(why) = db.insert_astar_route(&route).await {
            warn!("failed to persist astar route for client {}: {why}", client.client_id);
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    env_logger::init();
    info!("astar module started");

    let config = RoutingConfig::from_env();

    let database_connection_info =
        DatabaseConnectionInfo::from_env().expect("expected database connection info in env.");
    let db = PgDatabase::connect(database_connection_info)
        .await
        .expect("could not connect to database.");

    let planner = GeodesicAstarPlanner::new(OverpassSource::new(), config.osm_cache_dir.clone());

    tokio::time::sleep(Duration::from_secs(ASTAR_GRACE_SECONDS)).await;

    loop {
        match run_cycle(&db, &planner).await {
            Ok(()) => tokio::time::sleep(Duration::from_secs(ASTAR_TICK_SECONDS)).await,
            Err(why) => {
                error!("astar module crash: {why}");
                tokio::time::sleep(Duration::from_secs(ASTAR_FAILURE_BACKOFF_SECONDS)).await;
            }
        }
    }
}
