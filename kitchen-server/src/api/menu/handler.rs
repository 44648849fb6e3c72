//! Menu API Handlers
//!
//! Every successful mutation bumps the menu version and pushes
//! `menu_updated` to all connections.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::core::ServerState;
use crate::utils::AppResult;
use shared::models::{MenuItem, MenuItemCreate, MenuItemUpdate, MenuListResponse};

/// GET /api/menu - 菜单 + 当前版本号
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<MenuListResponse>> {
    Ok(Json(state.menu.list().await?))
}

/// POST /api/menu - 新建菜品
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<MenuItemCreate>,
) -> AppResult<(StatusCode, Json<MenuItem>)> {
    let item = state.menu.create(payload).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// PATCH /api/menu/:id - 部分更新
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<MenuItemUpdate>,
) -> AppResult<Json<MenuItem>> {
    Ok(Json(state.menu.update(id, payload).await?))
}

/// DELETE /api/menu/:id
pub async fn delete(State(state): State<ServerState>, Path(id): Path<i64>) -> AppResult<StatusCode> {
    state.menu.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
