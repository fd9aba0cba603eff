//! Client-side task board and quote reveal state.
//!
//! # Responsibility
//! - Merge server items with the built-in daily habits into one ordered board.
//! - Partition tasks into persistent and normal sections.
//! - Build the record payload and derive remaining quote chances.
//!
//! # Invariants
//! - Placeholder tasks (built-in habits missing on the server) carry negative
//!   ids and are never sent in a record.
//! - `partition` preserves board order within each section.

use crate::model::achievement::{Achievement, AchievementId, AchievementRecord, ItemStatus};
use crate::model::item::{Item, ItemId};
use crate::model::quote::Quote;
use chrono::NaiveDate;

/// Habits shown every day even before they exist on the server.
pub const BUILTIN_PERSISTENT_TITLES: [&str; 2] = ["水を飲む", "ストレッチ"];

/// One row on the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: ItemId,
    pub title: String,
    pub status: bool,
    pub persistent: bool,
}

impl Task {
    fn unchecked(id: ItemId, title: impl Into<String>, persistent: bool) -> Self {
        Self {
            id,
            title: title.into(),
            status: false,
            persistent,
        }
    }

    /// Whether the task exists in storage.
    pub fn is_stored(&self) -> bool {
        self.id > 0
    }
}

fn is_builtin_title(title: &str) -> bool {
    BUILTIN_PERSISTENT_TITLES.contains(&title)
}

/// Ordered list of today's tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskBoard {
    tasks: Vec<Task>,
}

impl TaskBoard {
    /// Builds the board from server items.
    ///
    /// Order: built-in habits found on the server, built-in placeholders,
    /// then every other item in server order.
    pub fn from_items(items: &[Item]) -> Self {
        let mut builtin = Vec::new();
        let mut placeholders = Vec::new();
        for (index, title) in BUILTIN_PERSISTENT_TITLES.iter().enumerate() {
            match items.iter().find(|item| item.title == *title) {
                Some(item) => builtin.push(Task::unchecked(item.id, item.title.as_str(), true)),
                None => placeholders.push(Task::unchecked(-(index as ItemId + 1), *title, true)),
            }
        }

        let others = items
            .iter()
            .filter(|item| !is_builtin_title(&item.title))
            .map(|item| Task::unchecked(item.id, item.title.as_str(), item.persistent));

        Self {
            tasks: builtin.into_iter().chain(placeholders).chain(others).collect(),
        }
    }

    /// Offline board used when the item list cannot be loaded.
    pub fn fallback() -> Self {
        Self {
            tasks: vec![
                Task::unchecked(101, "水を飲む", true),
                Task::unchecked(102, "ストレッチ", true),
                Task::unchecked(1, "早起きする", false),
                Task::unchecked(2, "運動する", false),
                Task::unchecked(3, "日記を書く", false),
            ],
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Splits tasks into `(persistent, normal)` in one pass.
    pub fn partition(&self) -> (Vec<&Task>, Vec<&Task>) {
        self.tasks.iter().partition(|task| task.persistent)
    }

    /// Flips the status of task `id`; returns `false` when no such task exists.
    pub fn toggle(&mut self, id: ItemId) -> bool {
        match self.tasks.iter_mut().find(|task| task.id == id) {
            Some(task) => {
                task.status = !task.status;
                true
            }
            None => false,
        }
    }

    /// Marks the given ids done; returns ids that matched no task.
    pub fn check_all(&mut self, ids: &[ItemId]) -> Vec<ItemId> {
        let mut unknown = Vec::new();
        for &id in ids {
            match self.tasks.iter_mut().find(|task| task.id == id) {
                Some(task) => task.status = true,
                None => unknown.push(id),
            }
        }
        unknown
    }

    /// Appends a newly created item as an unchecked task.
    pub fn push(&mut self, item: &Item) {
        self.tasks
            .push(Task::unchecked(item.id, item.title.as_str(), item.persistent));
    }

    /// Record payload for `date`, stored tasks only.
    pub fn record_for(&self, date: NaiveDate) -> AchievementRecord {
        AchievementRecord {
            date,
            items: self
                .tasks
                .iter()
                .filter(|task| task.is_stored())
                .map(|task| ItemStatus {
                    item_id: task.id,
                    status: task.status,
                    persistent: is_builtin_title(&task.title),
                })
                .collect(),
        }
    }

    /// Stored tasks currently checked.
    pub fn checked_count(&self) -> u32 {
        self.tasks
            .iter()
            .filter(|task| task.is_stored() && task.status)
            .count() as u32
    }

    /// Chances left after the quotes already revealed for `achievement`.
    pub fn remaining_chances(&self, achievement: &Achievement) -> u32 {
        self.checked_count()
            .saturating_sub(achievement.quotes.len() as u32)
    }
}

/// Quote reveal controls state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuoteReveal {
    achievement_id: Option<AchievementId>,
    chances: u32,
    revealed: Vec<Quote>,
}

impl QuoteReveal {
    /// State after a successful record call.
    pub fn after_record(achievement: &Achievement, chances: u32) -> Self {
        Self {
            achievement_id: Some(achievement.id),
            chances,
            revealed: achievement.quotes.clone(),
        }
    }

    pub fn achievement_id(&self) -> Option<AchievementId> {
        self.achievement_id
    }

    pub fn chances(&self) -> u32 {
        self.chances
    }

    pub fn can_reveal(&self) -> bool {
        self.achievement_id.is_some() && self.chances > 0
    }

    /// Registers a revealed quote; ignored when no chance is left.
    pub fn accept(&mut self, quote: Quote) -> bool {
        if !self.can_reveal() {
            return false;
        }
        self.revealed.push(quote);
        self.chances -= 1;
        true
    }

    /// The quote to display: the most recently revealed one.
    pub fn current(&self) -> Option<&Quote> {
        self.revealed.last()
    }

    pub fn revealed(&self) -> &[Quote] {
        &self.revealed
    }
}

/// One past day as shown below the calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct History {
    pub date: NaiveDate,
    pub tasks: Vec<String>,
    pub quotes: Vec<Quote>,
}

impl History {
    pub fn from_achievement(achievement: &Achievement) -> Self {
        let tasks = achievement
            .items
            .iter()
            .filter(|entry| entry.status)
            .map(|entry| {
                if entry.item.title.is_empty() {
                    format!("タスクID:{}", entry.item_id)
                } else {
                    entry.item.title.clone()
                }
            })
            .collect();
        Self {
            date: achievement.date,
            tasks,
            quotes: achievement.quotes.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::achievement::AchievementItem;

    fn item(id: ItemId, title: &str, persistent: bool) -> Item {
        Item {
            id,
            title: title.to_string(),
            is_custom: !persistent,
            persistent,
            created_at: 0,
            updated_at: 0,
        }
    }

    fn quote(id: i64) -> Quote {
        Quote {
            id,
            quote_en: format!("en {id}"),
            quote_ja: format!("ja {id}"),
            author: "anon".to_string(),
        }
    }

    fn achievement(quotes: Vec<Quote>) -> Achievement {
        Achievement {
            id: 7,
            date: NaiveDate::from_ymd_opt(2025, 9, 11).unwrap(),
            completed_count: 2,
            items: Vec::new(),
            quotes,
            quote_chances: 2,
        }
    }

    #[test]
    fn from_items_orders_builtins_then_placeholders_then_others() {
        let items = vec![
            item(1, "読書", false),
            item(2, "ストレッチ", false),
            item(3, "散歩", true),
        ];
        let tasks = TaskBoard::from_items(&items);
        let ids: Vec<ItemId> = tasks.tasks().iter().map(|task| task.id).collect();
        assert_eq!(ids, vec![2, -1, 1, 3]);
        assert_eq!(tasks.tasks()[1].title, "水を飲む");
        assert!(tasks.tasks()[0].persistent);
        assert!(tasks.tasks()[1].persistent);
        assert!(tasks.tasks().iter().all(|task| !task.status));
    }

    #[test]
    fn partition_preserves_order() {
        let board = TaskBoard::fallback();
        let (persistent, normal) = board.partition();
        let persistent: Vec<ItemId> = persistent.iter().map(|t| t.id).collect();
        let normal: Vec<ItemId> = normal.iter().map(|t| t.id).collect();
        assert_eq!(persistent, vec![101, 102]);
        assert_eq!(normal, vec![1, 2, 3]);
    }

    #[test]
    fn toggle_flips_known_task_only() {
        let mut board = TaskBoard::fallback();
        assert!(board.toggle(2));
        assert!(board.tasks()[3].status);
        assert!(board.toggle(2));
        assert!(!board.tasks()[3].status);
        assert!(!board.toggle(999));
    }

    #[test]
    fn pushed_items_land_last_and_unchecked() {
        let mut board = TaskBoard::from_items(&[item(5, "水を飲む", true), item(6, "英語", false)]);
        board.check_all(&[6]);

        board.push(&item(7, "筋トレ", true));
        board.push(&item(8, "片付け", false));

        let last = &board.tasks()[board.tasks().len() - 1];
        assert_eq!((last.id, last.status), (8, false));
        assert!(!board.tasks()[board.tasks().len() - 2].status);

        let (persistent, normal) = board.partition();
        let persistent: Vec<ItemId> = persistent.iter().map(|t| t.id).collect();
        let normal: Vec<ItemId> = normal.iter().map(|t| t.id).collect();
        assert_eq!(persistent, vec![5, -2, 7]);
        assert_eq!(normal, vec![6, 8]);
    }

    #[test]
    fn record_skips_placeholders_and_flags_builtins() {
        let mut board = TaskBoard::from_items(&[item(5, "水を飲む", true), item(6, "英語", false)]);
        assert_eq!(board.check_all(&[5, 6, -2, 42]), vec![42]);

        let record = board.record_for(NaiveDate::from_ymd_opt(2025, 9, 11).unwrap());
        let ids: Vec<ItemId> = record.items.iter().map(|s| s.item_id).collect();
        assert_eq!(ids, vec![5, 6]);
        assert!(record.items[0].persistent);
        assert!(!record.items[1].persistent);
        assert_eq!(board.checked_count(), 2);
    }

    #[test]
    fn remaining_chances_subtracts_revealed_quotes() {
        let mut board = TaskBoard::fallback();
        board.check_all(&[1, 2, 3]);
        assert_eq!(board.remaining_chances(&achievement(vec![quote(1)])), 2);
        assert_eq!(
            board.remaining_chances(&achievement(vec![quote(1), quote(2), quote(3), quote(4)])),
            0
        );
    }

    #[test]
    fn reveal_consumes_chances_and_shows_latest() {
        let mut reveal = QuoteReveal::after_record(&achievement(vec![quote(1)]), 1);
        assert!(reveal.can_reveal());
        assert_eq!(reveal.current().map(|q| q.id), Some(1));

        assert!(reveal.accept(quote(2)));
        assert_eq!(reveal.chances(), 0);
        assert_eq!(reveal.current().map(|q| q.id), Some(2));
        assert!(!reveal.accept(quote(3)));
        assert_eq!(reveal.revealed().len(), 2);
    }

    #[test]
    fn default_reveal_is_disabled() {
        let reveal = QuoteReveal::default();
        assert!(!reveal.can_reveal());
        assert!(reveal.current().is_none());
    }

    #[test]
    fn history_lists_completed_titles() {
        let mut day = achievement(vec![quote(1)]);
        day.items = vec![
            AchievementItem {
                id: 1,
                item_id: 5,
                status: true,
                persistent: true,
                item: item(5, "水を飲む", true),
            },
            AchievementItem {
                id: 2,
                item_id: 6,
                status: false,
                persistent: false,
                item: item(6, "英語", false),
            },
            AchievementItem {
                id: 3,
                item_id: 8,
                status: true,
                persistent: false,
                item: item(8, "", false),
            },
        ];
        let history = History::from_achievement(&day);
        assert_eq!(history.tasks, vec!["水を飲む", "タスクID:8"]);
        assert_eq!(history.quotes.len(), 1);
    }
}
