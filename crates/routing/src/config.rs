use std::env;
use std::path::PathBuf;
use std::time::Duration;

fn env_duration_secs(name: &str, default_secs: u64) -> Duration {
    let secs = env::var(name)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default_secs);
    Duration::from_secs(secs)
}

fn env_path(name: &str, default: &str) -> PathBuf {
    env::var(name).map(PathBuf::from).unwrap_or_else(|_| PathBuf::from(default))
}

/// Tunables for the routing engine binary (C6 + C7), read from the
/// environment with the defaults given in the external interface spec.
#[derive(Debug, Clone)]
pub struct RoutingConfig {
    pub initial_wait: Duration,
    pub planner_sleep: Duration,
    pub reroute_tick: Duration,
    pub join_timeout: Duration,
    pub osm_cache_dir: PathBuf,
    pub model_artifact_dir: PathBuf,
}

impl RoutingConfig {
    pub fn from_env() -> Self {
        Self {
            initial_wait: env_duration_secs("ROUTING_INITIAL_WAIT_SECONDS", 24),
            planner_sleep: env_duration_secs("ROUTING_PLANNER_SLEEP_SECONDS", 300),
            reroute_tick: env_duration_secs("ROUTING_REROUTE_TICK_SECONDS", 5),
            join_timeout: env_duration_secs("ROUTING_THREAD_JOIN_TIMEOUT", 15),
            osm_cache_dir: env_path("OSM_CACHE_DIR", "/app/osm_cache"),
            model_artifact_dir: env_path("MODEL_ARTIFACT_DIR", "/app/models"),
        }
    }
}

/// Grace delay before the A* module's first cycle, so the database and OSM
/// cache have time to come up after a fresh deploy.
pub const ASTAR_GRACE_SECONDS: u64 = 60;
pub const ASTAR_TICK_SECONDS: u64 = 10;
pub const ASTAR_FAILURE_BACKOFF_SECONDS: u64 = 30;

pub const DEVIATION_STREAKS_REQUIRED: u32 = 2;
pub const DEVIATION_THRESHOLD_DIRECT_M: f64 = 35.0;
pub const DEVIATION_THRESHOLD_MULTIMODAL_M: f64 = 60.0;
pub const DEPARTURE_PASSED_GRACE_SECONDS: i64 = 45;
pub const DEPARTURE_DELAY_THRESHOLD_SECONDS: i32 = 180;
pub const MAX_BACKOFF_SECONDS: u64 = 60;
