//! Item repository contract and SQLite implementation.
//!
//! # Invariants
//! - Items are listed in insertion order (`id ASC`).
//! - Titles are stored already trimmed.

use super::{bool_to_int, int_to_bool, RepoResult};
use crate::model::item::{Item, ItemId, NewItem};
use rusqlite::{params, Connection, OptionalExtension, Row};

pub const ITEMS_DEFAULT_LIMIT: u32 = 100;

const ITEM_SELECT_SQL: &str = "SELECT
    id,
    title,
    is_custom,
    persistent,
    created_at,
    updated_at
FROM items";

/// Pagination options for item listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemListQuery {
    pub skip: u32,
    pub limit: u32,
}

impl Default for ItemListQuery {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: ITEMS_DEFAULT_LIMIT,
        }
    }
}

/// Repository interface for habit items.
pub trait ItemRepository {
    fn create_item(&self, item: &NewItem) -> RepoResult<Item>;
    fn get_item(&self, id: ItemId) -> RepoResult<Option<Item>>;
    fn list_items(&self, query: &ItemListQuery) -> RepoResult<Vec<Item>>;
}

/// SQLite-backed item repository.
pub struct SqliteItemRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteItemRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ItemRepository for SqliteItemRepository<'_> {
    fn create_item(&self, item: &NewItem) -> RepoResult<Item> {
        let item = item.normalized()?;

        self.conn.execute(
            "INSERT INTO items (title, is_custom, persistent) VALUES (?1, ?2, ?3);",
            params![
                item.title.as_str(),
                bool_to_int(item.is_custom),
                bool_to_int(item.persistent),
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        self.get_item(id)?.ok_or_else(|| {
            super::RepoError::InvalidData(format!("item {id} missing after insert"))
        })
    }

    fn get_item(&self, id: ItemId) -> RepoResult<Option<Item>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ITEM_SELECT_SQL} WHERE id = ?1;"))?;
        let raw = stmt.query_row([id], read_item_columns).optional()?;
        raw.map(RawItem::into_item).transpose()
    }

    fn list_items(&self, query: &ItemListQuery) -> RepoResult<Vec<Item>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ITEM_SELECT_SQL} ORDER BY id ASC LIMIT ?1 OFFSET ?2;"
        ))?;
        let mut rows = stmt.query(params![i64::from(query.limit), i64::from(query.skip)])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(read_item_columns(row)?.into_item()?);
        }
        Ok(items)
    }
}

/// Item columns as stored, before boolean decoding.
pub(crate) struct RawItem {
    id: i64,
    title: String,
    is_custom: i64,
    persistent: i64,
    created_at: i64,
    updated_at: i64,
}

impl RawItem {
    pub(crate) fn into_item(self) -> RepoResult<Item> {
        Ok(Item {
            id: self.id,
            title: self.title,
            is_custom: int_to_bool(self.is_custom, "items.is_custom")?,
            persistent: int_to_bool(self.persistent, "items.persistent")?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Reads item columns by name; callers may alias a joined row the same way.
pub(crate) fn read_item_columns(row: &Row<'_>) -> rusqlite::Result<RawItem> {
    Ok(RawItem {
        id: row.get("id")?,
        title: row.get("title")?,
        is_custom: row.get("is_custom")?,
        persistent: row.get("persistent")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
