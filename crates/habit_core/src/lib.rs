//! Core domain logic for the daily habit tracker.
//! This crate is the single source of truth for business invariants.

pub mod board;
pub mod calendar;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod quote;
pub mod repo;
pub mod service;

pub use board::{History, QuoteReveal, Task, TaskBoard, BUILTIN_PERSISTENT_TITLES};
pub use calendar::{CalendarError, CalendarView, YearMonth};
pub use config::{ConfigError, HabitConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::achievement::{
    Achievement, AchievementId, AchievementItem, AchievementRecord, CalendarEntry, ItemStatus,
};
pub use model::item::{Item, ItemId, NewItem};
pub use model::quote::{NewQuote, Quote};
pub use model::ValidationError;
pub use quote::{QuoteError, QuotePipeline, QuoteSource, RawQuote, Translator};
pub use repo::achievement_repo::{AchievementRepository, SqliteAchievementRepository};
pub use repo::item_repo::{ItemListQuery, ItemRepository, SqliteItemRepository};
pub use repo::quote_repo::{QuoteRepository, SqliteQuoteRepository};
pub use repo::{RepoError, RepoResult};
pub use service::achievement_service::AchievementService;
pub use service::item_service::ItemService;
pub use service::quote_service::QuoteService;
pub use service::{ServiceError, ServiceResult};
