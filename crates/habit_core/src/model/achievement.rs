//! Daily achievement model.
//!
//! An achievement is the per-date snapshot of which items were completed,
//! together with the quotes revealed on that date.
//!
//! # Invariants
//! - `completed_count` equals the number of posted statuses that were `true`,
//!   placeholder entries included.
//! - `quote_chances` is only meaningful on the response of a record call.

use super::item::{Item, ItemId};
use super::quote::Quote;
use super::ValidationError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Database id of an achievement.
pub type AchievementId = i64;

/// Item id used by clients for tasks that do not exist in storage yet.
pub const PLACEHOLDER_ITEM_ID: ItemId = 0;

/// Completion status for one item inside a record request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStatus {
    pub item_id: ItemId,
    pub status: bool,
    #[serde(default)]
    pub persistent: bool,
}

impl ItemStatus {
    pub fn is_placeholder(&self) -> bool {
        self.item_id == PLACEHOLDER_ITEM_ID
    }
}

/// Request body for recording a day's completion snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementRecord {
    pub date: NaiveDate,
    pub items: Vec<ItemStatus>,
}

impl AchievementRecord {
    /// Rejects ids that can never reference a stored item.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.items.iter().find(|status| status.item_id < 0) {
            Some(status) => Err(ValidationError::NegativeItemId(status.item_id)),
            None => Ok(()),
        }
    }

    /// Number of entries marked done.
    pub fn completed_count(&self) -> u32 {
        self.items.iter().filter(|status| status.status).count() as u32
    }
}

/// Stored completion status joined with its item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementItem {
    pub id: i64,
    pub item_id: ItemId,
    pub status: bool,
    pub persistent: bool,
    pub item: Item,
}

/// Full achievement for one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: AchievementId,
    pub date: NaiveDate,
    pub completed_count: u32,
    #[serde(default)]
    pub items: Vec<AchievementItem>,
    #[serde(default)]
    pub quotes: Vec<Quote>,
    #[serde(default)]
    pub quote_chances: u32,
}

/// Month view projection: only the date and how much was done.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEntry {
    pub date: NaiveDate,
    pub completed_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(item_id: ItemId, status: bool) -> ItemStatus {
        ItemStatus {
            item_id,
            status,
            persistent: false,
        }
    }

    #[test]
    fn completed_count_includes_placeholders() {
        let record = AchievementRecord {
            date: NaiveDate::from_ymd_opt(2025, 9, 11).unwrap(),
            items: vec![status(0, true), status(4, true), status(5, false)],
        };
        assert_eq!(record.completed_count(), 2);
        assert!(record.items[0].is_placeholder());
    }

    #[test]
    fn validate_rejects_negative_ids() {
        let record = AchievementRecord {
            date: NaiveDate::from_ymd_opt(2025, 9, 11).unwrap(),
            items: vec![status(-1, true)],
        };
        assert_eq!(
            record.validate().unwrap_err(),
            ValidationError::NegativeItemId(-1)
        );
    }

    #[test]
    fn record_date_uses_iso_format() {
        let record: AchievementRecord =
            serde_json::from_str(r#"{"date":"2025-09-11","items":[{"item_id":3,"status":true}]}"#)
                .unwrap();
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2025, 9, 11).unwrap());
        assert!(!record.items[0].persistent);
    }
}
