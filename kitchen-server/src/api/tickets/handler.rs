//! Ticket API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;

use crate::core::ServerState;
use crate::utils::AppResult;
use shared::models::{Ticket, TicketCreate, TicketPriorityUpdate};

#[derive(Debug, Deserialize)]
pub struct StationQuery {
    pub station: Option<String>,
}

/// GET /api/tickets?station= - 工位全部工单 (最新在前)
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<StationQuery>,
) -> AppResult<Json<Vec<Ticket>>> {
    let tickets = state.tickets.list_by_station(query.station.as_deref()).await?;
    Ok(Json(tickets))
}

/// POST /api/tickets - 创建工单
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<TicketCreate>,
) -> AppResult<(StatusCode, Json<Ticket>)> {
    let ticket = state.tickets.create(payload).await?;
    Ok((StatusCode::CREATED, Json(ticket)))
}

/// POST /api/tickets/:id/start
pub async fn start(State(state): State<ServerState>, Path(id): Path<i64>) -> AppResult<Json<Ticket>> {
    Ok(Json(state.tickets.start(id).await?))
}

/// POST /api/tickets/:id/complete
pub async fn complete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Ticket>> {
    Ok(Json(state.tickets.complete(id).await?))
}

/// POST /api/tickets/:id/reset
pub async fn reset(State(state): State<ServerState>, Path(id): Path<i64>) -> AppResult<Json<Ticket>> {
    Ok(Json(state.tickets.reset(id).await?))
}

/// POST /api/tickets/:id/extend
pub async fn extend(State(state): State<ServerState>, Path(id): Path<i64>) -> AppResult<Json<Ticket>> {
    Ok(Json(state.tickets.extend(id).await?))
}

/// PATCH /api/tickets/:id/priority
pub async fn set_priority(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<TicketPriorityUpdate>,
) -> AppResult<Json<Ticket>> {
    Ok(Json(state.tickets.set_priority(id, payload.priority).await?))
}

/// DELETE /api/tickets/:id - 取消未完成工单
pub async fn cancel(State(state): State<ServerState>, Path(id): Path<i64>) -> AppResult<StatusCode> {
    state.tickets.cancel(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
