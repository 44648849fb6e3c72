//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`menu`] - 菜单管理接口
//! - [`tickets`] - 工单生命周期接口
//! - [`ws`] - 显示端 WebSocket

pub mod health;
pub mod menu;
pub mod tickets;
pub mod ws;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::core::ServerState;

// Re-export common types for handlers
pub use crate::utils::{AppError, AppResult};

/// Build the Axum router (without state)
pub fn build_app() -> Router<ServerState> {
    Router::<ServerState>::new()
        .merge(health::router())
        .merge(menu::router())
        .merge(tickets::router())
        .merge(ws::router())
}

/// 完整应用：路由 + 状态 + Tower HTTP 中间件
pub fn build_service(state: ServerState) -> Router {
    build_app()
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
