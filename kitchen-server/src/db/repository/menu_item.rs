//! Menu Item Repository
//!
//! Batch sizes, cook times and recommended batches are stored as JSON text.
//! Mutations take a connection so the caller can pair them with a
//! menu version bump in one transaction.

use std::collections::BTreeMap;

use super::{RepoError, RepoResult};
use shared::models::{
    DEFAULT_HOLD_TIME_SECONDS, ItemColor, MenuItem, MenuItemCreate, MenuItemUpdate, Station,
};
use sqlx::{Executor, Sqlite, SqliteConnection, SqlitePool};

const COLUMNS: &str = "id, code, title, station, batch_sizes, cook_times, enabled, recommended_batch, color, image_url, hold_time, ingredients, allergens, nutrition, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct MenuItemRow {
    id: i64,
    code: String,
    title: String,
    station: Station,
    batch_sizes: String,
    cook_times: String,
    enabled: bool,
    recommended_batch: String,
    color: Option<String>,
    image_url: Option<String>,
    hold_time: i64,
    ingredients: Option<String>,
    allergens: Option<String>,
    nutrition: Option<String>,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<MenuItemRow> for MenuItem {
    type Error = RepoError;

    fn try_from(row: MenuItemRow) -> Result<Self, Self::Error> {
        let color = row
            .color
            .map(|c| serde_json::from_value::<ItemColor>(serde_json::Value::String(c)))
            .transpose()?;
        Ok(MenuItem {
            id: row.id,
            code: row.code,
            title: row.title,
            station: row.station,
            batch_sizes: serde_json::from_str(&row.batch_sizes)?,
            cook_times: serde_json::from_str(&row.cook_times)?,
            enabled: row.enabled,
            recommended_batch: serde_json::from_str(&row.recommended_batch)?,
            color,
            image_url: row.image_url,
            hold_time: row.hold_time,
            ingredients: row.ingredients,
            allergens: row.allergens,
            nutrition: row.nutrition,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn into_items(rows: Vec<MenuItemRow>) -> RepoResult<Vec<MenuItem>> {
    rows.into_iter().map(MenuItem::try_from).collect()
}

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<MenuItem>> {
    let sql = format!("SELECT {COLUMNS} FROM menu_item ORDER BY code");
    let rows = sqlx::query_as::<_, MenuItemRow>(&sql)
        .fetch_all(pool)
        .await?;
    into_items(rows)
}

pub async fn find_enabled(pool: &SqlitePool) -> RepoResult<Vec<MenuItem>> {
    let sql = format!("SELECT {COLUMNS} FROM menu_item WHERE enabled = 1 ORDER BY code");
    let rows = sqlx::query_as::<_, MenuItemRow>(&sql)
        .fetch_all(pool)
        .await?;
    into_items(rows)
}

pub async fn find_by_id<'e, E>(executor: E, id: i64) -> RepoResult<Option<MenuItem>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("SELECT {COLUMNS} FROM menu_item WHERE id = ?");
    let row = sqlx::query_as::<_, MenuItemRow>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await?;
    row.map(MenuItem::try_from).transpose()
}

pub async fn find_by_code(pool: &SqlitePool, code: &str) -> RepoResult<Option<MenuItem>> {
    let sql = format!("SELECT {COLUMNS} FROM menu_item WHERE code = ? LIMIT 1");
    let row = sqlx::query_as::<_, MenuItemRow>(&sql)
        .bind(code)
        .fetch_optional(pool)
        .await?;
    row.map(MenuItem::try_from).transpose()
}

pub async fn count(pool: &SqlitePool) -> RepoResult<i64> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM menu_item")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

pub async fn create(conn: &mut SqliteConnection, data: MenuItemCreate, now: i64) -> RepoResult<MenuItem> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO menu_item (code, title, station, batch_sizes, cook_times, enabled, recommended_batch, color, image_url, hold_time, ingredients, allergens, nutrition, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(&data.code)
    .bind(&data.title)
    .bind(data.station)
    .bind(serde_json::to_string(&data.batch_sizes)?)
    .bind(serde_json::to_string(&data.cook_times)?)
    .bind(data.enabled.unwrap_or(true))
    .bind(serde_json::to_string(&data.recommended_batch.unwrap_or_default())?)
    .bind(data.color.map(|c| c.as_str()))
    .bind(&data.image_url)
    .bind(data.hold_time.unwrap_or(DEFAULT_HOLD_TIME_SECONDS))
    .bind(&data.ingredients)
    .bind(&data.allergens)
    .bind(&data.nutrition)
    .bind(now)
    .bind(now)
    .fetch_one(&mut *conn)
    .await?;

    find_by_id(&mut *conn, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create menu item".into()))
}

/// Partial update: absent fields keep their stored value, `null` clears
/// the optional ones
pub async fn update(
    conn: &mut SqliteConnection,
    id: i64,
    data: MenuItemUpdate,
    now: i64,
) -> RepoResult<MenuItem> {
    let existing = find_by_id(&mut *conn, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Menu item {id} not found")))?;

    let batch_sizes: Vec<String> = data.batch_sizes.unwrap_or(existing.batch_sizes);
    let cook_times: BTreeMap<String, i64> = data.cook_times.unwrap_or(existing.cook_times);
    let recommended_batch = data.recommended_batch.unwrap_or(existing.recommended_batch);
    let color = data.color.apply(existing.color);

    sqlx::query(
        "UPDATE menu_item SET code = ?, title = ?, station = ?, batch_sizes = ?, cook_times = ?, enabled = ?, recommended_batch = ?, color = ?, image_url = ?, hold_time = ?, ingredients = ?, allergens = ?, nutrition = ?, updated_at = ? WHERE id = ?",
    )
    .bind(data.code.unwrap_or(existing.code))
    .bind(data.title.unwrap_or(existing.title))
    .bind(data.station.unwrap_or(existing.station))
    .bind(serde_json::to_string(&batch_sizes)?)
    .bind(serde_json::to_string(&cook_times)?)
    .bind(data.enabled.unwrap_or(existing.enabled))
    .bind(serde_json::to_string(&recommended_batch)?)
    .bind(color.map(|c| c.as_str()))
    .bind(data.image_url.apply(existing.image_url))
    .bind(data.hold_time.unwrap_or(existing.hold_time))
    .bind(data.ingredients.apply(existing.ingredients))
    .bind(data.allergens.apply(existing.allergens))
    .bind(data.nutrition.apply(existing.nutrition))
    .bind(now)
    .bind(id)
    .execute(&mut *conn)
    .await?;

    find_by_id(&mut *conn, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Menu item {id} not found")))
}

/// Delete a menu item; fails with `Conflict` while tickets still reference it
pub async fn delete(conn: &mut SqliteConnection, id: i64) -> RepoResult<()> {
    let referenced = sqlx::query_scalar::<_, i64>("SELECT 1 FROM ticket WHERE menu_item_id = ? LIMIT 1")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .is_some();
    if referenced {
        return Err(RepoError::Conflict(format!(
            "Menu item {id} is still referenced by tickets"
        )));
    }

    let rows = sqlx::query("DELETE FROM menu_item WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Menu item {id} not found")));
    }
    Ok(())
}
