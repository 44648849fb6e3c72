//! Menu Item Model

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{Patch, Station};
use crate::daypart::Daypart;

/// Cook time used when a batch label has no entry in `cook_times`
pub const DEFAULT_COOK_TIME_SECONDS: i64 = 420;

/// Default quality-hold window after cooking completes
pub const DEFAULT_HOLD_TIME_SECONDS: i64 = 600;

/// Display color tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemColor {
    Blue,
    Red,
    Green,
    Orange,
}

impl ItemColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemColor::Blue => "blue",
            ItemColor::Red => "red",
            ItemColor::Green => "green",
            ItemColor::Orange => "orange",
        }
    }
}

/// Cookable menu item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: i64,
    /// Short unique code, e.g. "C1"
    pub code: String,
    pub title: String,
    pub station: Station,
    /// Ordered batch labels, e.g. ["1", "2", "3"]
    pub batch_sizes: Vec<String>,
    /// Batch label → cook time (seconds)
    pub cook_times: BTreeMap<String, i64>,
    pub enabled: bool,
    /// Daypart id → batch label
    #[serde(default)]
    pub recommended_batch: BTreeMap<String, String>,
    pub color: Option<ItemColor>,
    pub image_url: Option<String>,
    /// Seconds food may wait after cooking before it is discarded
    pub hold_time: i64,
    pub ingredients: Option<String>,
    pub allergens: Option<String>,
    pub nutrition: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl MenuItem {
    /// Cook time for a batch label, falling back to
    /// [`DEFAULT_COOK_TIME_SECONDS`] when the table has no entry.
    pub fn cook_time_for(&self, batch_size: &str) -> i64 {
        self.cook_times
            .get(batch_size)
            .copied()
            .unwrap_or(DEFAULT_COOK_TIME_SECONDS)
    }

    /// Human-readable title frozen onto tickets: "Title (CODE)"
    pub fn title_snapshot(&self) -> String {
        format!("{} ({})", self.title, self.code)
    }

    pub fn recommended_batch_for(&self, daypart: Daypart) -> Option<&str> {
        self.recommended_batch
            .get(daypart.as_str())
            .map(String::as_str)
    }
}

/// Create menu item payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemCreate {
    pub code: String,
    pub title: String,
    pub station: Station,
    pub batch_sizes: Vec<String>,
    pub cook_times: BTreeMap<String, i64>,
    pub enabled: Option<bool>,
    pub recommended_batch: Option<BTreeMap<String, String>>,
    pub color: Option<ItemColor>,
    pub image_url: Option<String>,
    pub hold_time: Option<i64>,
    pub ingredients: Option<String>,
    pub allergens: Option<String>,
    pub nutrition: Option<String>,
}

/// Update menu item payload (partial)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemUpdate {
    pub code: Option<String>,
    pub title: Option<String>,
    pub station: Option<Station>,
    pub batch_sizes: Option<Vec<String>>,
    pub cook_times: Option<BTreeMap<String, i64>>,
    pub enabled: Option<bool>,
    pub recommended_batch: Option<BTreeMap<String, String>>,
    /// `null` clears the tag
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub color: Patch<ItemColor>,
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub image_url: Patch<String>,
    pub hold_time: Option<i64>,
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub ingredients: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub allergens: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub nutrition: Patch<String>,
}

/// GET /api/menu response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuListResponse {
    pub items: Vec<MenuItem>,
    pub menu_version: i64,
}
