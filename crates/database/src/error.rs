use std::fmt;

/// Every error that crosses the database/network boundary collapses into one
/// of these four kinds. Callers match on kind, never on error text.
#[derive(Debug)]
pub enum DbError {
    /// Connect/reconnect failures, timeouts — retry is expected to help.
    Transient(String),
    /// The query ran fine but found nothing; not an error condition for the
    /// caller, just an absence to log and skip.
    DataMissing,
    /// A row or geometry value could not be interpreted (bad WKT, wrong
    /// output shape, ...).
    Malformed(String),
    /// Unrecoverable: bad configuration, migrations failed. The process
    /// should exit and let the orchestrator restart it.
    Fatal(String),
}

impl fmt::Display for DbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DbError::Transient(msg) => write!(f, "transient database error: {msg}"),
            DbError::DataMissing => write!(f, "no matching data"),
            DbError::Malformed(msg) => write!(f, "malformed data: {msg}"),
            DbError::Fatal(msg) => write!(f, "fatal database error: {msg}"),
        }
    }
}

impl std::error::Error for DbError {}

pub fn convert_sqlx_error(why: sqlx::Error) -> DbError {
    match why {
        sqlx::Error::RowNotFound => DbError::DataMissing,
        sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
            DbError::Transient(why.to_string())
        }
        other => DbError::Malformed(other.to_string()),
    }
}

pub type Result<T> = core::result::Result<T, DbError>;
