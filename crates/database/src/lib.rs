pub mod error;
pub mod postgres;
pub mod queries;
pub mod rows;
pub mod traits;
pub mod wkt_codec;

pub use error::DbError;
pub use postgres::{DatabaseConnectionInfo, PgDatabase};
pub use traits::RoutingDatabase;
