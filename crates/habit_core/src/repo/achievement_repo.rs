//! Achievement repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Upsert the per-date completion snapshot atomically.
//! - Load full achievements (statuses joined with items, plus quotes).
//! - Project a month of achievements for the calendar view.
//!
//! # Invariants
//! - `upsert_achievement` replaces the whole status set for the date in a
//!   single transaction; any unknown item id rolls everything back.
//! - Placeholder statuses (`item_id == 0`) are counted but never stored.
//! - Dates are stored as ISO `YYYY-MM-DD` text so range scans sort correctly.

use super::item_repo::read_item_columns;
use super::quote_repo::load_quotes;
use super::{bool_to_int, int_to_bool, RepoError, RepoResult};
use crate::calendar::YearMonth;
use crate::model::achievement::{
    Achievement, AchievementId, AchievementItem, AchievementRecord, CalendarEntry,
};
use chrono::NaiveDate;
use log::{debug, info};
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Repository interface for daily achievements.
pub trait AchievementRepository {
    fn get_achievement(&self, id: AchievementId) -> RepoResult<Option<Achievement>>;
    fn get_achievement_by_date(&self, date: NaiveDate) -> RepoResult<Option<Achievement>>;
    fn upsert_achievement(&mut self, record: &AchievementRecord) -> RepoResult<Achievement>;
    fn list_month(&self, month: YearMonth) -> RepoResult<Vec<CalendarEntry>>;
}

/// SQLite-backed achievement repository.
pub struct SqliteAchievementRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteAchievementRepository<'conn> {
    pub fn new(conn: &'conn mut Connection) -> Self {
        Self { conn }
    }
}

impl AchievementRepository for SqliteAchievementRepository<'_> {
    fn get_achievement(&self, id: AchievementId) -> RepoResult<Option<Achievement>> {
        let header = self
            .conn
            .query_row(
                "SELECT id, date, completed_count FROM achievements WHERE id = ?1;",
                [id],
                read_header,
            )
            .optional()?;
        header.map(|h| load_full(self.conn, h)).transpose()
    }

    fn get_achievement_by_date(&self, date: NaiveDate) -> RepoResult<Option<Achievement>> {
        let header = self
            .conn
            .query_row(
                "SELECT id, date, completed_count FROM achievements WHERE date = ?1;",
                [date_to_db(date)],
                read_header,
            )
            .optional()?;
        header.map(|h| load_full(self.conn, h)).transpose()
    }

    fn upsert_achievement(&mut self, record: &AchievementRecord) -> RepoResult<Achievement> {
        record.validate()?;
        let date_text = date_to_db(record.date);

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        tx.execute(
            "INSERT OR IGNORE INTO achievements (date) VALUES (?1);",
            [date_text.as_str()],
        )?;
        let achievement_id: AchievementId = tx.query_row(
            "SELECT id FROM achievements WHERE date = ?1;",
            [date_text.as_str()],
            |row| row.get(0),
        )?;

        tx.execute(
            "DELETE FROM achievement_items WHERE achievement_id = ?1;",
            [achievement_id],
        )?;

        for status in &record.items {
            if status.is_placeholder() {
                debug!(
                    "event=achievement_upsert module=repo status=skip reason=placeholder date={date_text}"
                );
                continue;
            }
            if !item_exists_in_tx(&tx, status.item_id)? {
                // Dropping `tx` without commit rolls back every statement above.
                return Err(RepoError::ItemNotFound(status.item_id));
            }
            tx.execute(
                "INSERT INTO achievement_items (achievement_id, item_id, status, persistent)
                 VALUES (?1, ?2, ?3, ?4);",
                params![
                    achievement_id,
                    status.item_id,
                    bool_to_int(status.status),
                    bool_to_int(status.persistent),
                ],
            )?;
        }

        let completed_count = record.completed_count();
        tx.execute(
            "UPDATE achievements
             SET
                completed_count = ?2,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![achievement_id, completed_count],
        )?;
        tx.commit()?;

        info!(
            "event=achievement_upsert module=repo status=ok date={date_text} completed_count={completed_count} entries={}",
            record.items.len()
        );

        self.get_achievement(achievement_id)?.ok_or_else(|| {
            RepoError::InvalidData(format!(
                "achievement {achievement_id} missing after upsert"
            ))
        })
    }

    fn list_month(&self, month: YearMonth) -> RepoResult<Vec<CalendarEntry>> {
        let start = date_to_db(month.first_day());
        let end = date_to_db(month.next().first_day());
        let mut stmt = self.conn.prepare(
            "SELECT date, completed_count
             FROM achievements
             WHERE date >= ?1 AND date < ?2
             ORDER BY date ASC;",
        )?;
        let mut rows = stmt.query(params![start, end])?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            let date_text: String = row.get("date")?;
            entries.push(CalendarEntry {
                date: parse_date(&date_text)?,
                completed_count: row.get("completed_count")?,
            });
        }
        Ok(entries)
    }
}

struct AchievementHeader {
    id: AchievementId,
    date: String,
    completed_count: u32,
}

fn read_header(row: &rusqlite::Row<'_>) -> rusqlite::Result<AchievementHeader> {
    Ok(AchievementHeader {
        id: row.get("id")?,
        date: row.get("date")?,
        completed_count: row.get("completed_count")?,
    })
}

fn load_full(conn: &Connection, header: AchievementHeader) -> RepoResult<Achievement> {
    Ok(Achievement {
        id: header.id,
        date: parse_date(&header.date)?,
        completed_count: header.completed_count,
        items: load_items(conn, header.id)?,
        quotes: load_quotes(conn, header.id)?,
        quote_chances: 0,
    })
}

fn load_items(conn: &Connection, achievement_id: AchievementId) -> RepoResult<Vec<AchievementItem>> {
    let mut stmt = conn.prepare(
        "SELECT
            ai.id AS link_id,
            ai.status AS link_status,
            ai.persistent AS link_persistent,
            i.id,
            i.title,
            i.is_custom,
            i.persistent,
            i.created_at,
            i.updated_at
         FROM achievement_items ai
         INNER JOIN items i ON i.id = ai.item_id
         WHERE ai.achievement_id = ?1
         ORDER BY ai.id ASC;",
    )?;
    let mut rows = stmt.query([achievement_id])?;
    let mut items = Vec::new();
    while let Some(row) = rows.next()? {
        let item = read_item_columns(row)?.into_item()?;
        items.push(AchievementItem {
            id: row.get("link_id")?,
            item_id: item.id,
            status: int_to_bool(row.get("link_status")?, "achievement_items.status")?,
            persistent: int_to_bool(row.get("link_persistent")?, "achievement_items.persistent")?,
            item,
        });
    }
    Ok(items)
}

fn item_exists_in_tx(tx: &Transaction<'_>, item_id: i64) -> RepoResult<bool> {
    let exists: i64 = tx.query_row(
        "SELECT EXISTS(SELECT 1 FROM items WHERE id = ?1);",
        [item_id],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

pub(crate) fn date_to_db(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn parse_date(value: &str) -> RepoResult<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| {
        RepoError::InvalidData(format!("invalid date `{value}` in achievements.date"))
    })
}
