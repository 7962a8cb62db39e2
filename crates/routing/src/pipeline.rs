use chrono::{Timelike, Utc};
use database::RoutingDatabase;
use mapf::cbs::{CbsWrapper, LegGoal};
use model::route::{AstarRoute, ChosenRoute, SegmentType, TargetType};
use model::Polyline;

use crate::departure::{fetch_aligned_departure, fetch_top_favored_routes};
use crate::error::PlanError;
use crate::model_runtime::ModelRuntime;
use crate::scorer::{self, ScoredChoice, ScoringInputs};
use crate::selector::select_target;

/// Runs the combined-POI selection, candidate scoring, and live-departure
/// lookup end-to-end for one client, and upserts the resulting chosen route.
/// Used by both the planner supervisor (on its slow tick) and the reroute
/// watcher (when a deviation or GTFS shift fires).
pub async fn plan_for_client(
    db: &dyn RoutingDatabase,
    model: Option<&ModelRuntime>,
    client_id: &str,
) -> Result<Option<ChosenRoute>, PlanError> {
    let Some(latest) = db.fetch_latest_location(client_id).await? else {
        return Ok(None);
    };

    let Some(target) = select_target(db, client_id, latest.location).await? else {
        return Ok(None);
    };

    let astar_route = match db.fetch_latest_astar_route(client_id, &target.stop_id).await? {
        Some(route) => route,
        None => return Ok(Some(seed_fallback(db, client_id, latest.location, &target).await?)),
    };

    if target.target_type != TargetType::StopPoint {
        let chosen = direct_route(client_id, &astar_route);
        db.upsert_chosen_route(&chosen).await?;
        return Ok(Some(chosen));
    }

    let cbs = CbsWrapper::new(db);
    let goals = [LegGoal {
        destination: target.destination,
        stop_id: target.stop_id.clone(),
    }];
    let mapf_route = cbs.resolve(client_id, &goals).await?.into_iter().next().flatten();
    let departure = fetch_aligned_departure(db, client_id, &target.stop_id).await?;

    let (mapf_route, departure) = match (mapf_route, departure) {
        (Some(mapf_route), Some(departure)) => (mapf_route, departure),
        _ => {
            let chosen = direct_route(client_id, &astar_route);
            db.upsert_chosen_route(&chosen).await?;
            return Ok(Some(chosen));
        }
    };

    let usage_ratios = db.fetch_usage_ratios(client_id).await?;
    let favored_route_ids = fetch_top_favored_routes(db, client_id).await?;
    let switch_profile = db.fetch_switch_profile(client_id, &target.stop_id).await?;
    let now = Utc::now();

    let inputs = ScoringInputs {
        astar_distance_m: astar_route.distance_m,
        mapf_distance_m: mapf_route.path.length_m(),
        latest_speed_mps: latest.speed_or_zero(),
        now,
        usage_ratios,
        favored_route_ids: &favored_route_ids,
        departure: Some(&departure),
        switch_profile: switch_profile.as_ref(),
    };

    let choice = scorer::choose(
        model,
        astar_route.distance_m,
        mapf_route.path.length_m(),
        now.hour(),
        &inputs,
    );

    let chosen = match choice {
        ScoredChoice::Astar => direct_route(client_id, &astar_route),
        ScoredChoice::Multimodal => ChosenRoute {
            client_id: client_id.to_owned(),
            stop_id: target.stop_id.clone(),
            origin: astar_route.origin,
            destination: mapf_route.destination,
            path: mapf_route.path,
            segment_type: SegmentType::Multimodal,
            is_chosen: true,
            created_at: now,
        },
    };

    db.upsert_chosen_route(&chosen).await?;
    Ok(Some(chosen))
}

async fn seed_fallback(
    db: &dyn RoutingDatabase,
    client_id: &str,
    origin: model::Coordinate,
    target: &crate::selector::Target,
) -> Result<ChosenRoute, PlanError> {
    let fallback = db
        .seed_fallback_astar_route(
            client_id,
            &target.stop_id,
            target.target_type,
            origin,
            target.destination,
        )
        .await?;

    let chosen = ChosenRoute {
        client_id: client_id.to_owned(),
        stop_id: target.stop_id.clone(),
        origin: fallback.origin,
        destination: fallback.destination,
        path: Polyline::empty(),
        segment_type: SegmentType::Fallback,
        is_chosen: true,
        created_at: Utc::now(),
    };
    db.upsert_chosen_route(&chosen).await?;
    Ok(chosen)
}

fn direct_route(client_id: &str, astar_route: &AstarRoute) -> ChosenRoute {
    ChosenRoute {
        client_id: client_id.to_owned(),
        stop_id: model::route::DIRECT_STOP_ID.to_owned(),
        origin: astar_route.origin,
        destination: astar_route.destination,
        path: astar_route.path.clone(),
        segment_type: SegmentType::Direct,
        is_chosen: true,
        created_at: Utc::now(),
    }
}
