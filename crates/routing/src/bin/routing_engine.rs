use std::sync::Arc;

use database::{DatabaseConnectionInfo, PgDatabase};
use log::{info, warn};
use routing::config::RoutingConfig;
use routing::model_runtime::ModelRuntime;
use routing::shutdown::{shutdown_channel, wait_for_signal};
use routing::{reroute, supervisor};

#[tokio::main]
async fn main() {
    env_logger::init();

    let config = RoutingConfig::from_env();

    let database_connection_info =
        DatabaseConnectionInfo::from_env().expect("expected database connection info in env.");
    let database = PgDatabase::connect(database_connection_info)
        .await
        .expect("could not connect to database.");
    let db: Arc<dyn database::RoutingDatabase> = Arc::new(database);

    let model = match ModelRuntime::load(&config.model_artifact_dir) {
        Ok(model) => {
            info!("loaded candidate scorer model from {:?}", config.model_artifact_dir);
            Some(model)
        }
        Err(why) => {
            warn!("no usable model artifacts at {:?} ({why}); scorer will use the heuristic fallback", config.model_artifact_dir);
            None
        }
    };
    let model = Arc::new(model);

    let (shutdown_tx, shutdown_rx) = shutdown_channel();

    let supervisor_handle = tokio::spawn(supervisor::run_supervisor_loop(
        config.clone(),
        db.clone(),
        model.clone(),
        shutdown_rx.clone(),
    ));
    let reroute_handle = tokio::spawn(reroute::run_reroute_loop(config, db, model, shutdown_rx));

    wait_for_signal(shutdown_tx).await;

    let _ = tokio::join!(supervisor_handle, reroute_handle);
    info!("routing engine shut down cleanly");
}
