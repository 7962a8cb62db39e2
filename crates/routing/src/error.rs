use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("failed to load model artifacts: {0}")]
    ModelLoad(String),

    #[error("model output shape did not match the expected (1, 2) or (1,) scalar")]
    ShapeMismatch,

    #[error("inference failed: {0}")]
    Inference(String),
}

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("database error: {0}")]
    Database(#[from] database::DbError),

    #[error("astar planner error: {0}")]
    Astar(String),
}
