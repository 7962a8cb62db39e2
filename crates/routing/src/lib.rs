pub mod config;
pub mod departure;
pub mod error;
pub mod model_runtime;
pub mod pipeline;
pub mod reroute;
pub mod scorer;
pub mod selector;
pub mod shutdown;
pub mod supervisor;

pub use config::RoutingConfig;
pub use error::PlanError;
pub use model_runtime::ModelRuntime;
