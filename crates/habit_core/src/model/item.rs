//! Habit item model.
//!
//! # Invariants
//! - `title` is trimmed and non-empty once validated.
//! - `persistent == true` marks a recurring ("every day") task; `false` a
//!   one-off ("today only") task.

use super::ValidationError;
use serde::{Deserialize, Serialize};

/// Database id of an item.
pub type ItemId = i64;

/// Stored habit item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub title: String,
    pub is_custom: bool,
    #[serde(default)]
    pub persistent: bool,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds.
    pub updated_at: i64,
}

/// Input for item creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewItem {
    pub title: String,
    #[serde(default = "default_is_custom")]
    pub is_custom: bool,
    #[serde(default)]
    pub persistent: bool,
}

fn default_is_custom() -> bool {
    true
}

impl NewItem {
    /// Builds a custom item input with the given persistence flag.
    pub fn new(title: impl Into<String>, persistent: bool) -> Self {
        Self {
            title: title.into(),
            is_custom: !persistent,
            persistent,
        }
    }

    /// Returns a copy with a trimmed title, rejecting blank titles.
    pub fn normalized(&self) -> Result<Self, ValidationError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        Ok(Self {
            title: title.to_string(),
            ..self.clone()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_trims_title() {
        let item = NewItem::new("  drink water ", true).normalized().unwrap();
        assert_eq!(item.title, "drink water");
        assert!(item.persistent);
        assert!(!item.is_custom);
    }

    #[test]
    fn normalized_rejects_blank_title() {
        let err = NewItem::new(" \t", false).normalized().unwrap_err();
        assert_eq!(err, ValidationError::EmptyTitle);
    }

    #[test]
    fn deserialize_applies_defaults() {
        let item: NewItem = serde_json::from_str(r#"{"title":"read"}"#).unwrap();
        assert!(item.is_custom);
        assert!(!item.persistent);
    }
}
