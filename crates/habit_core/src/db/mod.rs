//! SQLite storage for items, achievements and quotes.
//!
//! # Responsibility
//! - Hand out connections that are configured and fully migrated.
//! - Provide the shared handle the HTTP layer locks per request.
//!
//! # Invariants
//! - `PRAGMA user_version` equals `migrations::latest_version()` on every
//!   connection returned from here.

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

use rusqlite::Connection;
use std::sync::{Arc, Mutex};

pub type DbResult<T> = Result<T, DbError>;

/// Connection shared between request handlers; lock only for synchronous work.
pub type SharedConnection = Arc<Mutex<Connection>>;

pub fn share(conn: Connection) -> SharedConnection {
    Arc::new(Mutex::new(conn))
}

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
    #[error("database schema version {db_version} is newer than supported {latest_supported}")]
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}
