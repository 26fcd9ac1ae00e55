//! Broker registry: provisioned service instances and bindings.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows
//! - `schema.rs`: SQL DDL for initializing the registry (SQLite)
//! - `sqlite.rs`: `BrokerStorage`, the query layer

pub mod models;
pub mod schema;
pub mod sqlite;

pub use models::{DbServiceBinding, DbServiceInstance};
pub use sqlite::BrokerStorage;

use crate::error::BrokerError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;

/// Open (creating if missing) the registry database and apply the schema.
pub async fn connect(database_url: &str) -> Result<BrokerStorage, BrokerError> {
    let connect_opts = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new().connect_with(connect_opts).await?;
    let storage = BrokerStorage::new(pool);
    storage.init_schema().await?;
    Ok(storage)
}
