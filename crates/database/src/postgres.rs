use std::env;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::warn;
use model::{
    departure::{DepartureCandidate, SwitchProfile},
    geodata::{ActiveClient, GeoPoint},
    poi::CombinedPoi,
    route::{AstarRoute, ChosenRoute, MapfRoute, RerouteEvent, TargetType, UnifiedRoute},
    transit::Stop,
    Coordinate,
};
use utility::id::Id;

use crate::{error::DbError, error::Result, queries, traits::RoutingDatabase};

const CONNECT_ATTEMPTS: u32 = 5;
const CONNECT_RETRY_DELAY: Duration = Duration::from_secs(5);

pub struct DatabaseConnectionInfo {
    pub username: String,
    pub password: String,
    pub hostname: String,
    pub port: u16,
    pub database: String,
}

impl DatabaseConnectionInfo {
    pub fn from_env() -> Result<Self> {
        let var = |name: &str| -> Result<String> {
            env::var(name)
                .map_err(|_| DbError::Fatal(format!("missing environment variable {name}")))
        };

        Ok(Self {
            username: var("POSTGRES_USER")?,
            password: var("POSTGRES_PASSWORD")?,
            hostname: var("POSTGRES_HOST")?,
            port: var("POSTGRES_PORT")?
                .parse()
                .map_err(|_| DbError::Fatal("POSTGRES_PORT is not a valid port".into()))?,
            database: var("POSTGRES_DB")?,
        })
    }

    fn postgres_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.hostname, self.port, self.database
        )
    }
}

#[derive(Clone)]
pub struct PgDatabase {
    pool: sqlx::PgPool,
}

impl PgDatabase {
    /// Connects with bounded linear backoff (5 attempts x 5s); surfaces
    /// `Fatal` once the budget is exhausted so the caller can exit and let
    /// the orchestrator restart the process.
    pub async fn connect(info: DatabaseConnectionInfo) -> Result<Self> {
        let url = info.postgres_url();
        let mut last_error = None;

        for attempt in 1..=CONNECT_ATTEMPTS {
            match sqlx::postgres::PgPool::connect(&url).await {
                Ok(pool) => return Ok(Self { pool }),
                Err(why) => {
                    warn!(
                        "database connection attempt {attempt}/{CONNECT_ATTEMPTS} failed: {why}"
                    );
                    last_error = Some(why);
                    if attempt < CONNECT_ATTEMPTS {
                        tokio::time::sleep(CONNECT_RETRY_DELAY).await;
                    }
                }
            }
        }

        Err(DbError::Fatal(format!(
            "could not connect to database after {CONNECT_ATTEMPTS} attempts: {}",
            last_error.map(|e| e.to_string()).unwrap_or_default()
        )))
    }
}

#[async_trait]
impl RoutingDatabase for PgDatabase {
    async fn fetch_active_clients(&self) -> Result<Vec<ActiveClient>> {
        queries::client::fetch_active_clients(&self.pool).await
    }

    async fn fetch_latest_location(&self, client_id: &str) -> Result<Option<GeoPoint>> {
        queries::client::fetch_latest_location(&self.pool, client_id).await
    }

    async fn fetch_best_combined_poi(
        &self,
        client_id: &str,
    ) -> Result<Option<CombinedPoi>> {
        queries::poi::fetch_best_combined_poi(&self.pool, client_id).await
    }

    async fn fetch_nearest_boardable_stop(
        &self,
        near: Coordinate,
    ) -> Result<Option<(Id<Stop>, Stop)>> {
        queries::stop::fetch_nearest_boardable_stop(&self.pool, near).await
    }

    async fn fetch_latest_astar_route(
        &self,
        client_id: &str,
        stop_id: &str,
    ) -> Result<Option<AstarRoute>> {
        queries::astar::fetch_latest_astar_route(&self.pool, client_id, stop_id).await
    }

    async fn seed_fallback_astar_route(
        &self,
        client_id: &str,
        stop_id: &str,
        target_type: TargetType,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<AstarRoute> {
        queries::astar::seed_fallback_astar_route(
            &self.pool,
            client_id,
            stop_id,
            target_type,
            origin,
            destination,
        )
        .await
    }

    async fn insert_astar_route(&self, route: &AstarRoute) -> Result<()> {
        queries::astar::insert_astar_route(&self.pool, route).await
    }

    async fn fetch_latest_mapf_route(
        &self,
        client_id: &str,
        stop_id: &str,
    ) -> Result<Option<MapfRoute>> {
        queries::mapf::fetch_latest_mapf_route(&self.pool, client_id, stop_id).await
    }

    async fn insert_mapf_route(&self, route: &MapfRoute) -> Result<()> {
        queries::mapf::insert_mapf_route(&self.pool, route).await
    }

    async fn fetch_departure_candidate(
        &self,
        client_id: &str,
        stop_id: &str,
    ) -> Result<Option<DepartureCandidate>> {
        queries::departure::fetch_departure_candidate(&self.pool, client_id, stop_id)
            .await
    }

    async fn fetch_switch_profile(
        &self,
        client_id: &str,
        stop_id: &str,
    ) -> Result<Option<SwitchProfile>> {
        queries::departure::fetch_switch_profile(&self.pool, client_id, stop_id).await
    }

    async fn fetch_top_favored_routes(
        &self,
        client_id: &str,
        limit: u32,
    ) -> Result<Vec<String>> {
        queries::departure::fetch_top_favored_routes(&self.pool, client_id, limit).await
    }

    async fn fetch_usage_ratios(&self, client_id: &str) -> Result<(f64, f64)> {
        queries::departure::fetch_usage_ratios(&self.pool, client_id).await
    }

    async fn fetch_current_chosen_route(
        &self,
        client_id: &str,
    ) -> Result<Option<ChosenRoute>> {
        queries::optimized_route::fetch_current_chosen_route(&self.pool, client_id).await
    }

    async fn upsert_chosen_route(&self, route: &ChosenRoute) -> Result<()> {
        queries::optimized_route::upsert_chosen_route(&self.pool, route).await
    }

    async fn insert_reroute_event(&self, event: &RerouteEvent) -> Result<()> {
        queries::reroute::insert_reroute_event(&self.pool, event).await
    }

    async fn fetch_fresh_unified_routes(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<UnifiedRoute>> {
        queries::unified::fetch_fresh_unified_routes(&self.pool, since).await
    }
}
