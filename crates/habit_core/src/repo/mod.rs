//! Repository layer abstractions and SQLite implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Write paths validate model input before any SQL mutation.
//! - Repository APIs return semantic errors (`ItemNotFound`,
//!   `AchievementNotFound`) in addition to DB transport errors.

pub mod achievement_repo;
pub mod item_repo;
pub mod quote_repo;

use crate::db::DbError;
use crate::model::achievement::AchievementId;
use crate::model::item::ItemId;
use crate::model::ValidationError;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for persistence and query operations.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("Item with id {0} not found")]
    ItemNotFound(ItemId),
    #[error("Achievement with id {0} not found")]
    AchievementNotFound(AchievementId),
    #[error("invalid persisted data: {0}")]
    InvalidData(String),
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

pub(crate) fn int_to_bool(value: i64, column: &str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in {column}"
        ))),
    }
}
