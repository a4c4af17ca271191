//! Database module: models and schema for persistent storage.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows
//! - `schema.rs`: SQL DDL and seed data (SQLite)
//! - `sqlite.rs`: `CatalogStorage`, the only place that issues SQL

pub mod models;
pub mod schema;
pub mod sqlite;

pub use models::{Book, BookWithGenre, DbUser, Genre, NewBook, User};
pub use schema::{DEFAULT_GENRES, SQLITE_INIT};
pub use sqlite::{CatalogStorage, SqlitePool};

use crate::error::ShelfError;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use std::str::FromStr;
use tracing::info;

/// Open the pool, apply the schema and seed default genres.
pub async fn spawn(database_url: &str) -> Result<CatalogStorage, ShelfError> {
    let in_memory = database_url.contains(":memory:");
    let connect_opts = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(if in_memory {
            SqliteJournalMode::Memory
        } else {
            SqliteJournalMode::Wal
        });

    // every connection to `:memory:` is a separate database
    let pool_opts = if in_memory {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(5)
    };
    let pool = pool_opts.connect_with(connect_opts).await?;

    let storage = CatalogStorage::new(pool);
    storage.init_schema().await?;
    let seeded = storage.seed_default_genres().await?;
    if seeded > 0 {
        info!(count = seeded, "seeded default genres");
    }
    Ok(storage)
}
