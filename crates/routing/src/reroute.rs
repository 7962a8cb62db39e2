use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use log::{error, info, warn};
use model::route::{ChosenRoute, RerouteEvent, SegmentType};

use crate::config::{
    RoutingConfig, DEPARTURE_DELAY_THRESHOLD_SECONDS, DEPARTURE_PASSED_GRACE_SECONDS,
    DEVIATION_STREAKS_REQUIRED, DEVIATION_THRESHOLD_DIRECT_M, DEVIATION_THRESHOLD_MULTIMODAL_M,
};
use crate::model_runtime::ModelRuntime;
use crate::pipeline;
use crate::shutdown::{is_shutting_down, ShutdownReceiver};

/// In-memory, per-client count of consecutive failing deviation ticks.
/// Process-local and reset on restart; losing at most one extra tick of
/// tolerance on a restart is acceptable.
#[derive(Default)]
struct DeviationStreaks(HashMap<String, u32>);

impl DeviationStreaks {
    fn record_failure(&mut self, client_id: &str) -> u32 {
        let streak = self.0.entry(client_id.to_owned()).or_insert(0);
        *streak += 1;
        *streak
    }

    fn reset(&mut self, client_id: &str) {
        self.0.remove(client_id);
    }
}

async fn deviation_reason(
    db: &dyn database::RoutingDatabase,
    streaks: &mut DeviationStreaks,
    client_id: &str,
    chosen: &ChosenRoute,
) -> Result<Option<String>, database::DbError> {
    let Some(latest) = db.fetch_latest_location(client_id).await? else {
        return Ok(None);
    };

    let line: Vec<(f64, f64)> = chosen.path.points().collect();
    let distance_m =
        utility::geo::point_to_polyline_distance_m((latest.location.lat, latest.location.lon), &line);

    let threshold = if chosen.segment_type == SegmentType::Multimodal {
        DEVIATION_THRESHOLD_MULTIMODAL_M
    } else {
        DEVIATION_THRESHOLD_DIRECT_M
    };

    if distance_m <= threshold {
        streaks.reset(client_id);
        return Ok(None);
    }

    let streak = streaks.record_failure(client_id);
    if streak < DEVIATION_STREAKS_REQUIRED {
        return Ok(None);
    }

    streaks.reset(client_id);
    Ok(Some(format!("off_path_{}m", distance_m.round() as i64)))
}

async fn gtfs_shift_reason(
    db: &dyn database::RoutingDatabase,
    client_id: &str,
    chosen: &ChosenRoute,
) -> Result<Option<String>, database::DbError> {
    if chosen.segment_type != SegmentType::Multimodal {
        return Ok(None);
    }

    if chosen.stop_id == model::route::DIRECT_STOP_ID {
        return Ok(Some("missing_stop_id".to_owned()));
    }

    let Some(departure) = db.fetch_departure_candidate(client_id, &chosen.stop_id).await? else {
        return Ok(Some("no_departure_candidate".to_owned()));
    };

    let now = Utc::now();
    if departure.has_passed(now, DEPARTURE_PASSED_GRACE_SECONDS) {
        return Ok(Some("departure_passed".to_owned()));
    }

    if departure.delay_seconds > DEPARTURE_DELAY_THRESHOLD_SECONDS {
        return Ok(Some(format!("delay_{}s", departure.delay_seconds)));
    }

    Ok(None)
}

async fn check_client(
    db: &dyn database::RoutingDatabase,
    model: Option<&ModelRuntime>,
    streaks: &mut DeviationStreaks,
    client_id: &str,
) -> Result<(), database::DbError> {
    let Some(chosen) = db.fetch_current_chosen_route(client_id).await? else {
        return Ok(());
    };

    let reason = match deviation_reason(db, streaks, client_id, &chosen).await? {
        Some(reason) => Some(reason),
        None => gtfs_shift_reason(db, client_id, &chosen).await?,
    };

    let Some(reason) = reason else {
        return Ok(());
    };

    info!("rerouting client {client_id}: {reason}");
    let previous = chosen.clone();

    match pipeline::plan_for_client(db, model, client_id).await {
        Ok(Some(new_chosen)) if !new_chosen.same_route_as(&previous) => {
            let event = RerouteEvent {
                route: new_chosen,
                reason,
                previous_stop_id: Some(previous.stop_id),
                previous_segment_type: Some(previous.segment_type),
            };
            db.insert_reroute_event(&event).await?;
        }
        Ok(_) => {}
        Err(why) => warn!("reroute planning failed for client {client_id}: {why}"),
    }

    Ok(())
}

/// The reroute watcher loop (C7): a fast-tick pass over active clients
/// checking for off-path deviation and GTFS shifts, triggering a full
/// replanning pass when either fires.
pub async fn run_reroute_loop(
    config: RoutingConfig,
    db: Arc<dyn database::RoutingDatabase>,
    model: Arc<Option<ModelRuntime>>,
    mut shutdown: ShutdownReceiver,
) {
    let mut streaks = DeviationStreaks::default();

    while !is_shutting_down(&shutdown) {
        match db.fetch_active_clients().await {
            Ok(clients) => {
                for client in clients {
                    if let Err(why) =
                        check_client(db.as_ref(), model.as_ref().as_ref(), &mut streaks, &client.client_id).await
                    {
                        error!("reroute check failed for client {}: {why}", client.client_id);
                    }
                }
            }
            Err(why) => error!("failed to fetch active clients for reroute tick: {why}"),
        }

        tokio::select! {
            _ = tokio::time::sleep(config.reroute_tick) => {}
            _ = shutdown.changed() => break,
        }
    }

    info!("reroute watcher loop exiting");
}
