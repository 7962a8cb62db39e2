use async_trait::async_trait;
use chrono::{DateTime, Utc};
use model::{
    departure::{DepartureCandidate, SwitchProfile},
    geodata::{ActiveClient, GeoPoint},
    poi::CombinedPoi,
    route::{AstarRoute, ChosenRoute, MapfRoute, RerouteEvent, TargetType, UnifiedRoute},
    transit::Stop,
    Coordinate,
};
use utility::id::Id;

use crate::error::Result;

/// Everything the routing core reads from or writes to storage. One
/// concrete implementation ([`crate::postgres::PgDatabase`]) talks to
/// PostgreSQL/PostGIS; tests use an in-memory fake instead of standing up a
/// database.
#[async_trait]
pub trait RoutingDatabase: Send + Sync {
    async fn fetch_active_clients(&self) -> Result<Vec<ActiveClient>>;

    async fn fetch_latest_location(&self, client_id: &str) -> Result<Option<GeoPoint>>;

    async fn fetch_best_combined_poi(
        &self,
        client_id: &str,
    ) -> Result<Option<CombinedPoi>>;

    async fn fetch_nearest_boardable_stop(
        &self,
        near: Coordinate,
    ) -> Result<Option<(Id<Stop>, Stop)>>;

    async fn fetch_latest_astar_route(
        &self,
        client_id: &str,
        stop_id: &str,
    ) -> Result<Option<AstarRoute>>;

    async fn seed_fallback_astar_route(
        &self,
        client_id: &str,
        stop_id: &str,
        target_type: TargetType,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<AstarRoute>;

    async fn insert_astar_route(&self, route: &AstarRoute) -> Result<()>;

    async fn fetch_latest_mapf_route(
        &self,
        client_id: &str,
        stop_id: &str,
    ) -> Result<Option<MapfRoute>>;

    async fn insert_mapf_route(&self, route: &MapfRoute) -> Result<()>;

    async fn fetch_departure_candidate(
        &self,
        client_id: &str,
        stop_id: &str,
    ) -> Result<Option<DepartureCandidate>>;

    async fn fetch_switch_profile(
        &self,
        client_id: &str,
        stop_id: &str,
    ) -> Result<Option<SwitchProfile>>;

    async fn fetch_top_favored_routes(
        &self,
        client_id: &str,
        limit: u32,
    ) -> Result<Vec<String>>;

    /// Historical preference for (A* / multimodal) as a raw `(astar, mapf)`
    /// usage count pair; the scorer normalizes these into `p_hist`.
    async fn fetch_usage_ratios(&self, client_id: &str) -> Result<(f64, f64)>;

    async fn fetch_current_chosen_route(
        &self,
        client_id: &str,
    ) -> Result<Option<ChosenRoute>>;

    async fn upsert_chosen_route(&self, route: &ChosenRoute) -> Result<()>;

    async fn insert_reroute_event(&self, event: &RerouteEvent) -> Result<()>;

    async fn fetch_fresh_unified_routes(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<UnifiedRoute>>;
}
