use thiserror::Error;

#[derive(Debug, Error)]
pub enum AstarError {
    #[error("failed to fetch road graph: {0}")]
    GraphFetch(String),

    #[error("failed to read or write osm cache: {0}")]
    Cache(String),

    #[error("no graph node within snapping distance")]
    NoSnapTarget,
}
