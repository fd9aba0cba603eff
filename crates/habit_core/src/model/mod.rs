//! Domain model for habit items, daily achievements and reward quotes.
//!
//! # Responsibility
//! - Define the records exchanged between storage, services and the HTTP surface.
//! - Own input validation shared by every write path.
//!
//! # Invariants
//! - Persisted ids are strictly positive; `0` marks a placeholder task that
//!   exists only on the client.
//! - One achievement exists per calendar date.

pub mod achievement;
pub mod item;
pub mod quote;

/// Validation failures for user-supplied model input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("title must not be empty")]
    EmptyTitle,
    #[error("quote field `{0}` must not be empty")]
    EmptyQuoteField(&'static str),
    #[error("item id must not be negative, got {0}")]
    NegativeItemId(i64),
}
