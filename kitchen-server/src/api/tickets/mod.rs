//! Ticket API 模块

mod handler;

use axum::{
    Router,
    routing::{delete, get, patch, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/tickets", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/{id}", delete(handler::cancel))
        .route("/{id}/start", post(handler::start))
        .route("/{id}/complete", post(handler::complete))
        .route("/{id}/reset", post(handler::reset))
        .route("/{id}/extend", post(handler::extend))
        .route("/{id}/priority", patch(handler::set_priority))
}
