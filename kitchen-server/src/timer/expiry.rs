//! Ticket-backed timer expiry
//!
//! Re-reads the ticket when a deadline fires and tells its station room
//! only if that exact arming is still current.

use async_trait::async_trait;
use shared::models::{TicketState, TimerEnded};
use shared::realtime::ServerMessage;
use sqlx::SqlitePool;

use super::TimerExpiry;
use crate::db::repository::ticket;
use crate::realtime::RealtimeHub;

pub struct TicketTimerExpiry {
    pool: SqlitePool,
    hub: RealtimeHub,
}

impl TicketTimerExpiry {
    pub fn new(pool: SqlitePool, hub: RealtimeHub) -> Self {
        Self { pool, hub }
    }
}

#[async_trait]
impl TimerExpiry for TicketTimerExpiry {
    async fn on_expiry(&self, ticket_id: i64, deadline_ms: i64) {
        let current = match ticket::find_by_id(&self.pool, ticket_id).await {
            Ok(current) => current,
            Err(e) => {
                tracing::warn!(ticket_id, error = %e, "Failed to load ticket for expired timer");
                return;
            }
        };

        match current {
            Some(t) if t.state == TicketState::Started && t.deadline_ms() == Some(deadline_ms) => {
                tracing::info!(ticket_id, station = %t.station, "Cook timer ended");
                self.hub.broadcast_to_station(
                    t.station,
                    ServerMessage::TimerEnded(TimerEnded { ticket_id }),
                );
            }
            // completed, cancelled or re-armed since this arming
            _ => tracing::debug!(ticket_id, deadline_ms, "Stale timer fire ignored"),
        }
    }
}
