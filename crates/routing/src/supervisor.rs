use std::sync::Arc;
use std::time::Duration;

use actors::actor::Actor;
use actors::handler::{Handler, Message};
use log::{error, info, warn};

use crate::config::{RoutingConfig, MAX_BACKOFF_SECONDS};
use crate::model_runtime::ModelRuntime;
use crate::pipeline;
use crate::shutdown::{is_shutting_down, ShutdownReceiver};

/// One actor per client per tick. Wrapping the per-client planning call in
/// an actor means a panic inside the pipeline (e.g. a malformed row) is
/// caught and classified by the actor runtime instead of unwinding through
/// the whole supervisor tick.
struct PlanningWorker {
    db: Arc<dyn database::RoutingDatabase>,
    model: Arc<Option<ModelRuntime>>,
    client_id: String,
}

impl Actor for PlanningWorker {}

#[derive(Clone)]
struct RunCycle;

impl Message for RunCycle {
    type Response = Result<(), String>;
}

#[async_trait::async_trait]
impl Handler<RunCycle> for PlanningWorker {
    async fn handle(&mut self, _message: RunCycle) -> Result<(), String> {
        pipeline::plan_for_client(self.db.as_ref(), self.model.as_ref().as_ref(), &self.client_id)
            .await
            .map(|_| ())
            .map_err(|why| why.to_string())
    }
}

/// Runs one planning cycle: fetches active clients, spawns one
/// panic-isolated worker per client with a bounded join timeout, and lets
/// failures or timeouts for one client have no effect on the others.
async fn run_tick(
    db: &Arc<dyn database::RoutingDatabase>,
    model: &Arc<Option<ModelRuntime>>,
    join_timeout: Duration,
) -> Result<(), database::DbError> {
    let clients = db.fetch_active_clients().await?;
    if clients.is_empty() {
        info!("no active clients this tick");
        return Ok(());
    }

    for client in clients {
        let client_id = client.client_id.clone();
        let worker_db = db.clone();
        let worker_model = model.clone();
        let worker_client_id = client_id.clone();

        let actor_ref = actors::run(move || PlanningWorker {
            db: worker_db.clone(),
            model: worker_model.clone(),
            client_id: worker_client_id.clone(),
        });

        match tokio::time::timeout(join_timeout, actor_ref.ask(RunCycle)).await {
            Ok(Ok(Ok(()))) => {}
            Ok(Ok(Err(why))) => warn!("planning cycle failed for client {client_id}: {why}"),
            Ok(Err(why)) => warn!("actor communication error for client {client_id}: {why:?}"),
            Err(_) => warn!("planning cycle timed out for client {client_id} after {join_timeout:?}"),
        }
    }

    Ok(())
}

/// The planner supervisor loop (C6): sleeps `initial_wait`, then on every
/// `planner_sleep` tick plans every active client. Tick failures back off
/// exponentially up to `MAX_BACKOFF_SECONDS`, resetting on the next success.
pub async fn run_supervisor_loop(
    config: RoutingConfig,
    db: Arc<dyn database::RoutingDatabase>,
    model: Arc<Option<ModelRuntime>>,
    mut shutdown: ShutdownReceiver,
) {
    tokio::select! {
        _ = tokio::time::sleep(config.initial_wait) => {}
        _ = shutdown.changed() => return,
    }

    let mut backoff = config.planner_sleep;

    while !is_shutting_down(&shutdown) {
        match run_tick(&db, &model, config.join_timeout).await {
            Ok(()) => backoff = config.planner_sleep,
            Err(why) => {
                error!("planner tick failed: {why}");
                backoff = (backoff * 2).min(Duration::from_secs(MAX_BACKOFF_SECONDS));
            }
        }

        tokio::select! {
            _ = tokio::time::sleep(backoff) => {}
            _ = shutdown.changed() => break,
        }
    }

    info!("planner supervisor loop exiting");
}
