//! Use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Translate storage failures into caller-facing error categories.
//!
//! # Invariants
//! - Services never bypass repository validation.
//! - The storage lock is never held across an `.await`.

pub mod achievement_service;
pub mod item_service;
pub mod quote_service;

use crate::model::achievement::AchievementId;
use crate::model::item::ItemId;
use crate::model::ValidationError;
use crate::quote::QuoteError;
use crate::repo::RepoError;
use chrono::NaiveDate;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Caller-facing error categories.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Item with id {0} not found")]
    ItemNotFound(ItemId),
    #[error("Achievement not found")]
    AchievementNotFound(AchievementId),
    #[error("指定された日付の記録は見つかりません")]
    NoRecordForDate(NaiveDate),
    #[error("failed to fetch a new quote: {0}")]
    Quote(#[from] QuoteError),
    #[error("storage lock poisoned")]
    StorageUnavailable,
    #[error(transparent)]
    Repo(RepoError),
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            RepoError::ItemNotFound(id) => Self::ItemNotFound(id),
            RepoError::AchievementNotFound(id) => Self::AchievementNotFound(id),
            other => Self::Repo(other),
        }
    }
}
