//! Quote repository contract and SQLite implementation.
//!
//! # Invariants
//! - Every quote belongs to an existing achievement.
//! - Quotes of one achievement are returned in reveal order.

use super::{RepoError, RepoResult};
use crate::model::achievement::AchievementId;
use crate::model::quote::{NewQuote, Quote};
use rusqlite::{params, Connection};

/// Repository interface for reward quotes.
pub trait QuoteRepository {
    fn create_quote(&self, achievement_id: AchievementId, quote: &NewQuote) -> RepoResult<Quote>;
    fn list_quotes(&self, achievement_id: AchievementId) -> RepoResult<Vec<Quote>>;
    fn achievement_exists(&self, achievement_id: AchievementId) -> RepoResult<bool>;
}

/// SQLite-backed quote repository.
pub struct SqliteQuoteRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteQuoteRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl QuoteRepository for SqliteQuoteRepository<'_> {
    fn create_quote(&self, achievement_id: AchievementId, quote: &NewQuote) -> RepoResult<Quote> {
        quote.validate()?;
        if !self.achievement_exists(achievement_id)? {
            return Err(RepoError::AchievementNotFound(achievement_id));
        }

        self.conn.execute(
            "INSERT INTO quotes (achievement_id, quote_en, quote_ja, author)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                achievement_id,
                quote.quote_en.as_str(),
                quote.quote_ja.as_str(),
                quote.author.as_str(),
            ],
        )?;

        Ok(Quote {
            id: self.conn.last_insert_rowid(),
            quote_en: quote.quote_en.clone(),
            quote_ja: quote.quote_ja.clone(),
            author: quote.author.clone(),
        })
    }

    fn list_quotes(&self, achievement_id: AchievementId) -> RepoResult<Vec<Quote>> {
        load_quotes(self.conn, achievement_id)
    }

    fn achievement_exists(&self, achievement_id: AchievementId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM achievements WHERE id = ?1);",
            [achievement_id],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }
}

pub(crate) fn load_quotes(conn: &Connection, achievement_id: AchievementId) -> RepoResult<Vec<Quote>> {
    let mut stmt = conn.prepare(
        "SELECT id, quote_en, quote_ja, author
         FROM quotes
         WHERE achievement_id = ?1
         ORDER BY id ASC;",
    )?;
    let mut rows = stmt.query([achievement_id])?;
    let mut quotes = Vec::new();
    while let Some(row) = rows.next()? {
        quotes.push(Quote {
            id: row.get("id")?,
            quote_en: row.get("quote_en")?,
            quote_ja: row.get("quote_ja")?,
            author: row.get("author")?,
        });
    }
    Ok(quotes)
}
