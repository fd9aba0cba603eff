//! Item use-case service.

use super::ServiceResult;
use crate::model::item::{Item, NewItem};
use crate::repo::item_repo::{ItemListQuery, ItemRepository};
use log::info;

/// Use-case wrapper for habit items.
pub struct ItemService<R: ItemRepository> {
    repo: R,
}

impl<R: ItemRepository> ItemService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates one item after trimming and validating its title.
    pub fn create_item(&self, item: &NewItem) -> ServiceResult<Item> {
        let created = self.repo.create_item(item)?;
        info!(
            "event=item_create module=service status=ok item_id={} persistent={}",
            created.id, created.persistent
        );
        Ok(created)
    }

    pub fn list_items(&self, query: &ItemListQuery) -> ServiceResult<Vec<Item>> {
        Ok(self.repo.list_items(query)?)
    }
}
