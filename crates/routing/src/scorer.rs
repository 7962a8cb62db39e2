use chrono::{DateTime, Utc};
use log::warn;
use model::departure::{DepartureCandidate, SwitchProfile};

use crate::error::ScoringError;
use crate::model_runtime::ModelRuntime;

const MODEL_WEIGHT: f64 = 1.0 - HISTORY_WEIGHT;
const HISTORY_WEIGHT: f64 = 0.15;
const FAVORED_ROUTE_BUMP: f64 = 0.05;
const BLENDED_TIE_THRESHOLD: f64 = 0.10;
const TIE_BREAK_MAX_DELAY_SECONDS: i32 = 60;
const TIE_BREAK_MAX_SWITCH_SECONDS: f64 = 120.0;
const HEURISTIC_DISTANCE_MARGIN_M: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoredChoice {
    Astar,
    Multimodal,
}

/// Candidate distances and context the scorer needs; geometry itself isn't
/// needed past this point.
pub struct ScoringInputs<'a> {
    pub astar_distance_m: f64,
    pub mapf_distance_m: f64,
    pub latest_speed_mps: f64,
    pub now: DateTime<Utc>,
    /// `(astar, mapf)` historical usage counts.
    pub usage_ratios: (f64, f64),
    pub favored_route_ids: &'a [String],
    pub departure: Option<&'a DepartureCandidate>,
    pub switch_profile: Option<&'a SwitchProfile>,
}

fn feature_vector(distance_m: f64, is_multimodal: bool, hour: u32, speed_mps: f64, usage_ratios: (f64, f64)) -> [f64; 6] {
    [
        (distance_m / 5000.0).min(1.0),
        if is_multimodal { 1.0 } else { 0.0 },
        hour as f64 / 23.0,
        (speed_mps / 6.0).min(1.0),
        usage_ratios.0,
        usage_ratios.1,
    ]
}

fn normalize(pair: (f64, f64)) -> (f64, f64) {
    let sum = pair.0 + pair.1;
    if sum <= f64::EPSILON {
        (0.5, 0.5)
    } else {
        (pair.0 / sum, pair.1 / sum)
    }
}

/// Shifts scores so the minimum is 0, then normalizes to probabilities.
/// Degenerates to uniform if both scores are equal (difference collapses to
/// (0, 0) before normalization).
fn shift_and_normalize(scores: (f64, f64)) -> (f64, f64) {
    let min = scores.0.min(scores.1);
    normalize((scores.0 - min, scores.1 - min))
}

/// Blends model and historical-usage scores into `(p_astar, p_mapf)` and
/// picks the winning candidate, applying the favored-route bump and the
/// near-tie multimodal tie-breaker described for the candidate scorer.
pub fn choose_with_model(
    model: &ModelRuntime,
    astar_distance_m: f64,
    mapf_distance_m: f64,
    hour: u32,
    inputs: &ScoringInputs,
) -> Result<ScoredChoice, ScoringError> {
    let astar_features = feature_vector(astar_distance_m, false, hour, inputs.latest_speed_mps, inputs.usage_ratios);
    let mapf_features = feature_vector(mapf_distance_m, true, hour, inputs.latest_speed_mps, inputs.usage_ratios);

    let raw_scores = model.infer(&astar_features, &mapf_features)?;
    let p_model = shift_and_normalize(raw_scores);
    let p_hist = normalize(inputs.usage_ratios);

    let mut blended = (
        MODEL_WEIGHT * p_model.0 + HISTORY_WEIGHT * p_hist.0,
        MODEL_WEIGHT * p_model.1 + HISTORY_WEIGHT * p_hist.1,
    );

    if let Some(departure) = inputs.departure {
        if inputs.favored_route_ids.iter().any(|id| id == &departure.route_id) {
            blended.1 += FAVORED_ROUTE_BUMP;
            blended = normalize(blended);
        }
    }

    let near_tie = (blended.1 - blended.0).abs() < BLENDED_TIE_THRESHOLD;
    let delay_ok = inputs
        .departure
        .map(|d| d.delay_seconds <= TIE_BREAK_MAX_DELAY_SECONDS)
        .unwrap_or(false);
    let switch_ok = inputs
        .switch_profile
        .map(|s| s.avg_switch_seconds <= TIE_BREAK_MAX_SWITCH_SECONDS)
        .unwrap_or(false);

    if near_tie && delay_ok && switch_ok {
        return Ok(ScoredChoice::Multimodal);
    }

    Ok(if blended.1 > blended.0 {
        ScoredChoice::Multimodal
    } else {
        ScoredChoice::Astar
    })
}

/// Used when the model is missing or scoring failed: A* wins iff it's not
/// meaningfully longer than the multimodal alternative, accounting for any
/// known delay.
pub fn choose_heuristic(astar_distance_m: f64, mapf_distance_m: f64, delay_seconds: i32) -> ScoredChoice {
    let delay_margin = delay_seconds.max(0) as f64;
    if astar_distance_m < mapf_distance_m + HEURISTIC_DISTANCE_MARGIN_M + delay_margin {
        ScoredChoice::Astar
    } else {
        ScoredChoice::Multimodal
    }
}

pub fn choose(
    model: Option<&ModelRuntime>,
    astar_distance_m: f64,
    mapf_distance_m: f64,
    hour: u32,
    inputs: &ScoringInputs,
) -> ScoredChoice {
    let delay_seconds = inputs.departure.map(|d| d.delay_seconds).unwrap_or(0);

    match model {
        Some(model) => match choose_with_model(model, astar_distance_m, mapf_distance_m, hour, inputs) {
            Ok(choice) => choice,
            Err(why) => {
                warn!("model scoring failed, falling back to heuristic: {why}");
                choose_heuristic(astar_distance_m, mapf_distance_m, delay_seconds)
            }
        },
        None => choose_heuristic(astar_distance_m, mapf_distance_m, delay_seconds),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heuristic_prefers_astar_when_close() {
        assert_eq!(choose_heuristic(500.0, 550.0, 0), ScoredChoice::Astar);
    }

    #[test]
    fn heuristic_prefers_multimodal_when_astar_much_longer() {
        assert_eq!(choose_heuristic(5000.0, 500.0, 0), ScoredChoice::Multimodal);
    }

    #[test]
    fn heuristic_accounts_for_delay_margin() {
        // astar 700 vs mapf 500: without delay margin astar wins (700 < 600 is
        // false actually)... check boundary directly instead.
        assert_eq!(choose_heuristic(600.0, 500.0, 0), ScoredChoice::Multimodal);
        assert_eq!(choose_heuristic(600.0, 500.0, 50), ScoredChoice::Astar);
    }

    #[test]
    fn shift_and_normalize_handles_equal_scores() {
        assert_eq!(shift_and_normalize((3.0, 3.0)), (0.5, 0.5));
    }

    #[test]
    fn normalize_handles_zero_sum() {
        assert_eq!(normalize((0.0, 0.0)), (0.5, 0.5));
    }
}
