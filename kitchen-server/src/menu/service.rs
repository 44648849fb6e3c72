//! Menu management
//!
//! Each mutation and its menu version bump commit in one transaction;
//! `menu_updated` goes out only after the commit.

use std::collections::BTreeMap;

use shared::daypart::Daypart;
use shared::models::{MenuItem, MenuItemCreate, MenuItemUpdate, MenuListResponse};
use shared::realtime::{MenuUpdated, ServerMessage};
use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::db::repository::{menu_item, menu_version};
use crate::realtime::RealtimeHub;
use crate::utils::time::SharedClock;
use crate::utils::validation::{
    MAX_CODE_LEN, MAX_NOTE_LEN, MAX_TITLE_LEN, MAX_URL_LEN, validate_batch_sizes,
    validate_cook_times, validate_duration, validate_optional_text, validate_required_text,
};
use crate::utils::{AppError, AppResult};

#[derive(Clone, Debug)]
pub struct MenuService {
    pool: SqlitePool,
    clock: SharedClock,
    hub: RealtimeHub,
}

impl MenuService {
    pub fn new(pool: SqlitePool, clock: SharedClock, hub: RealtimeHub) -> Self {
        Self { pool, clock, hub }
    }

    pub async fn list(&self) -> AppResult<MenuListResponse> {
        let items = menu_item::find_all(&self.pool).await?;
        let menu_version = menu_version::current(&self.pool).await?;
        Ok(MenuListResponse {
            items,
            menu_version,
        })
    }

    pub async fn list_enabled(&self) -> AppResult<Vec<MenuItem>> {
        Ok(menu_item::find_enabled(&self.pool).await?)
    }

    pub async fn find_by_code(&self, code: &str) -> AppResult<MenuItem> {
        menu_item::find_by_code(&self.pool, code)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Menu item {code} not found")))
    }

    pub async fn current_version(&self) -> AppResult<i64> {
        Ok(menu_version::current(&self.pool).await?)
    }

    pub async fn create(&self, data: MenuItemCreate) -> AppResult<MenuItem> {
        validate_required_text(&data.code, "code", MAX_CODE_LEN)?;
        validate_required_text(&data.title, "title", MAX_TITLE_LEN)?;
        validate_batch_sizes(&data.batch_sizes)?;
        validate_cook_times(&data.cook_times)?;
        if let Some(recommended) = &data.recommended_batch {
            validate_recommended_batch(recommended)?;
        }
        if let Some(hold_time) = data.hold_time {
            validate_duration(hold_time, "holdTime")?;
        }
        validate_extras(
            data.image_url.as_deref(),
            data.ingredients.as_deref(),
            data.allergens.as_deref(),
            data.nutrition.as_deref(),
        )?;

        let now = self.clock.now_millis();
        let mut tx = begin_write(&self.pool).await?;
        let item = menu_item::create(&mut tx, data, now).await?;
        let version = menu_version::bump(&mut tx).await?;
        tx.commit().await.map_err(map_tx_err)?;

        tracing::info!(menu_item_id = item.id, code = %item.code, menu_version = version, "Menu item created");
        self.announce(version);
        Ok(item)
    }

    pub async fn update(&self, id: i64, data: MenuItemUpdate) -> AppResult<MenuItem> {
        if let Some(code) = &data.code {
            validate_required_text(code, "code", MAX_CODE_LEN)?;
        }
        if let Some(title) = &data.title {
            validate_required_text(title, "title", MAX_TITLE_LEN)?;
        }
        if let Some(batch_sizes) = &data.batch_sizes {
            validate_batch_sizes(batch_sizes)?;
        }
        if let Some(cook_times) = &data.cook_times {
            validate_cook_times(cook_times)?;
        }
        if let Some(recommended) = &data.recommended_batch {
            validate_recommended_batch(recommended)?;
        }
        if let Some(hold_time) = data.hold_time {
            validate_duration(hold_time, "holdTime")?;
        }
        validate_extras(
            data.image_url.as_set().map(String::as_str),
            data.ingredients.as_set().map(String::as_str),
            data.allergens.as_set().map(String::as_str),
            data.nutrition.as_set().map(String::as_str),
        )?;

        let now = self.clock.now_millis();
        let mut tx = begin_write(&self.pool).await?;
        let item = menu_item::update(&mut tx, id, data, now).await?;
        let version = menu_version::bump(&mut tx).await?;
        tx.commit().await.map_err(map_tx_err)?;

        tracing::info!(menu_item_id = id, menu_version = version, "Menu item updated");
        self.announce(version);
        Ok(item)
    }

    /// Fails with Conflict while tickets still reference the item
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let mut tx = begin_write(&self.pool).await?;
        menu_item::delete(&mut tx, id).await?;
        let version = menu_version::bump(&mut tx).await?;
        tx.commit().await.map_err(map_tx_err)?;

        tracing::info!(menu_item_id = id, menu_version = version, "Menu item deleted");
        self.announce(version);
        Ok(())
    }

    fn announce(&self, version: i64) {
        self.hub
            .broadcast_to_all(ServerMessage::MenuUpdated(MenuUpdated { version }));
    }
}

/// `BEGIN IMMEDIATE`: the write lock is taken up front and waits on `busy_timeout`
async fn begin_write(pool: &SqlitePool) -> AppResult<Transaction<'static, Sqlite>> {
    pool.begin_with("BEGIN IMMEDIATE").await.map_err(map_tx_err)
}

fn map_tx_err(e: sqlx::Error) -> AppError {
    AppError::database(format!("Menu transaction failed: {e}"))
}

/// Keys must be daypart ids
fn validate_recommended_batch(recommended: &BTreeMap<String, String>) -> AppResult<()> {
    for key in recommended.keys() {
        if !Daypart::ALL.iter().any(|d| d.as_str() == key) {
            return Err(AppError::validation(format!("Unknown daypart in recommendedBatch: {key}")));
        }
    }
    Ok(())
}

fn validate_extras(
    image_url: Option<&str>,
    ingredients: Option<&str>,
    allergens: Option<&str>,
    nutrition: Option<&str>,
) -> AppResult<()> {
    validate_optional_text(image_url, "imageUrl", MAX_URL_LEN)?;
    validate_optional_text(ingredients, "ingredients", MAX_NOTE_LEN)?;
    validate_optional_text(allergens, "allergens", MAX_NOTE_LEN)?;
    validate_optional_text(nutrition, "nutrition", MAX_NOTE_LEN)?;
    Ok(())
}
