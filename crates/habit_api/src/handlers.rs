//! Endpoint handlers.

use crate::error::ApiError;
use crate::AppState;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::NaiveDate;
use habit_core::repo::item_repo::ITEMS_DEFAULT_LIMIT;
use habit_core::{
    Achievement, AchievementId, AchievementRecord, AchievementService, CalendarEntry, Item,
    ItemListQuery, ItemService, NewItem, NewQuote, Quote, ServiceError,
    SqliteAchievementRepository, SqliteItemRepository, YearMonth,
};
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::MutexGuard;

const GREETING: &str = "じぶん記録アプリAPIへ";

type ApiResult<T> = Result<Json<T>, ApiError>;

fn lock(state: &AppState) -> Result<MutexGuard<'_, Connection>, ApiError> {
    state
        .conn
        .lock()
        .map_err(|_| ApiError::from(ServiceError::StorageUnavailable))
}

pub(crate) async fn root() -> Json<Value> {
    Json(json!({ "message": GREETING }))
}

#[derive(Debug, Deserialize)]
pub(crate) struct ItemListParams {
    #[serde(default)]
    skip: u32,
    #[serde(default = "default_limit")]
    limit: u32,
}

fn default_limit() -> u32 {
    ITEMS_DEFAULT_LIMIT
}

pub(crate) async fn list_items(
    State(state): State<AppState>,
    params: Result<Query<ItemListParams>, QueryRejection>,
) -> ApiResult<Vec<Item>> {
    let Query(params) = params?;
    let conn = lock(&state)?;
    let items = ItemService::new(SqliteItemRepository::new(&conn)).list_items(&ItemListQuery {
        skip: params.skip,
        limit: params.limit,
    })?;
    Ok(Json(items))
}

pub(crate) async fn create_item(
    State(state): State<AppState>,
    body: Result<Json<NewItem>, JsonRejection>,
) -> ApiResult<Item> {
    let Json(item) = body?;
    let conn = lock(&state)?;
    let created = ItemService::new(SqliteItemRepository::new(&conn)).create_item(&item)?;
    Ok(Json(created))
}

pub(crate) async fn get_achievement(
    State(state): State<AppState>,
    date: Result<Path<NaiveDate>, PathRejection>,
) -> ApiResult<Achievement> {
    let Path(date) = date?;
    let mut conn = lock(&state)?;
    let achievement =
        AchievementService::new(SqliteAchievementRepository::new(&mut conn)).get_by_date(date)?;
    Ok(Json(achievement))
}

#[derive(Debug, Deserialize)]
pub(crate) struct MonthParams {
    month: String,
}

pub(crate) async fn list_month(
    State(state): State<AppState>,
    params: Result<Query<MonthParams>, QueryRejection>,
) -> ApiResult<Vec<CalendarEntry>> {
    let Query(params) = params?;
    let month: YearMonth = params.month.parse()?;
    let mut conn = lock(&state)?;
    let entries =
        AchievementService::new(SqliteAchievementRepository::new(&mut conn)).month(month)?;
    Ok(Json(entries))
}

pub(crate) async fn record_achievement(
    State(state): State<AppState>,
    body: Result<Json<AchievementRecord>, JsonRejection>,
) -> ApiResult<Achievement> {
    let Json(record) = body?;
    let mut conn = lock(&state)?;
    let achievement =
        AchievementService::new(SqliteAchievementRepository::new(&mut conn)).record(&record)?;
    Ok(Json(achievement))
}

#[derive(Debug, Deserialize)]
pub(crate) struct RevealParams {
    achievement_id: AchievementId,
}

pub(crate) async fn reveal_quote(
    State(state): State<AppState>,
    params: Result<Query<RevealParams>, QueryRejection>,
) -> ApiResult<Quote> {
    let Query(params) = params?;
    let quote = state.quotes.reveal(params.achievement_id).await?;
    Ok(Json(quote))
}

pub(crate) async fn attach_quote(
    State(state): State<AppState>,
    id: Result<Path<AchievementId>, PathRejection>,
    body: Result<Json<NewQuote>, JsonRejection>,
) -> ApiResult<Quote> {
    let Path(id) = id?;
    let Json(quote) = body?;
    Ok(Json(state.quotes.attach(id, &quote)?))
}
