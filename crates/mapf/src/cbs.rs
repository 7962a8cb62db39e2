use std::time::Duration;

use database::error::Result;
use database::RoutingDatabase;
use model::route::MapfRoute;
use model::Coordinate;

use crate::leg::plan_leg;

const DEFAULT_MAX_TIME: Duration = Duration::from_secs(10);

/// One leg a client needs resolved: walk to `stop_id`, arriving at
/// `destination`.
pub struct LegGoal {
    pub destination: Coordinate,
    pub stop_id: String,
}

/// Conflict-resolution wrapper in front of the leg planner, advertising a
/// multi-agent interface (a list of goals per client) that a future
/// multi-agent deconfliction pass would need. For a single client it always
/// resolves every goal to its precomputed path with no collision search —
/// carried forward unchanged as a stub.
pub struct CbsWrapper<'a> {
    db: &'a dyn RoutingDatabase,
    max_time: Duration,
}

impl<'a> CbsWrapper<'a> {
    pub fn new(db: &'a dyn RoutingDatabase) -> Self {
        Self { db, max_time: DEFAULT_MAX_TIME }
    }

    pub fn with_max_time(db: &'a dyn RoutingDatabase, max_time: Duration) -> Self {
        Self { db, max_time }
    }

    pub fn max_time(&self) -> Duration {
        self.max_time
    }

    /// Resolves every goal for one client. No collision search runs; each
    /// goal is planned independently via [`plan_leg`].
    pub async fn resolve(&self, client_id: &str, goals: &[LegGoal]) -> Result<Vec<Option<MapfRoute>>> {
        let mut legs = Vec::with_capacity(goals.len());
        for goal in goals {
            legs.push(plan_leg(self.db, client_id, goal.destination, &goal.stop_id).await?);
        }
        Ok(legs)
    }
}
