//! Ticket Lifecycle Engine
//!
//! ```text
//! created --start--> started --complete--> completed
//!                    started --reset/extend--> started   (timer re-armed)
//! created | started --cancel--> (row deleted)
//! ```
//!
//! Every transition is persisted first; the timer is armed/cancelled and
//! the event broadcast only after the write succeeded.

use shared::models::{Station, Ticket, TicketCreate, TicketState, TimerStarted};
use shared::realtime::ServerMessage;
use sqlx::SqlitePool;

use super::admission::{EXTEND_SECONDS, station_capacity};
use crate::db::repository::{RepoError, menu_item, ticket};
use crate::db::repository::ticket::NewTicket;
use crate::realtime::RealtimeHub;
use crate::timer::TimerScheduler;
use crate::utils::time::SharedClock;
use crate::utils::validation::{MAX_BATCH_LABEL_LEN, validate_required_text};
use crate::utils::{AppError, AppResult};

/// Retries when a concurrent create wins the same sequence number
const SEQ_INSERT_ATTEMPTS: usize = 3;

#[derive(Clone, Debug)]
pub struct TicketService {
    pool: SqlitePool,
    clock: SharedClock,
    timers: TimerScheduler,
    hub: RealtimeHub,
}

impl TicketService {
    pub fn new(pool: SqlitePool, clock: SharedClock, timers: TimerScheduler, hub: RealtimeHub) -> Self {
        Self {
            pool,
            clock,
            timers,
            hub,
        }
    }

    pub fn timers(&self) -> &TimerScheduler {
        &self.timers
    }

    /// Create a `created` ticket with the next sequence number of its station day
    pub async fn create(&self, data: TicketCreate) -> AppResult<Ticket> {
        validate_required_text(&data.batch_size, "batchSize", MAX_BATCH_LABEL_LEN)?;

        let item = menu_item::find_by_id(&self.pool, data.menu_item_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Menu item {} not found", data.menu_item_id)))?;
        if !item.enabled {
            return Err(AppError::validation(format!("Menu item {} is disabled", item.code)));
        }

        let new_ticket = NewTicket {
            menu_item_id: item.id,
            station: item.station,
            station_day: self.clock.today(),
            source: data.source,
            created_at: self.clock.now_millis(),
            item_title_snapshot: item.title_snapshot(),
            batch_size_snapshot: data.batch_size.clone(),
            duration_snapshot: item.cook_time_for(&data.batch_size),
        };

        let mut attempt = 1;
        let created = loop {
            match ticket::insert_next_in_station(&self.pool, &new_ticket).await {
                Ok(created) => break created,
                Err(RepoError::Duplicate(msg)) if attempt < SEQ_INSERT_ATTEMPTS => {
                    tracing::warn!(station = %new_ticket.station, attempt, reason = %msg, "Station sequence collision, retrying");
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        };

        tracing::info!(
            ticket_id = created.id,
            station = %created.station,
            source = %created.source,
            station_seq = created.station_seq,
            "Ticket created"
        );
        self.hub
            .broadcast_to_ticket_rooms(&created, ServerMessage::TicketCreated(created.clone()));
        Ok(created)
    }

    /// All tickets of a station, most recent first
    pub async fn list_by_station(&self, station: Option<&str>) -> AppResult<Vec<Ticket>> {
        let station = station
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::validation("station query required"))?;
        let station: Station = station.parse().map_err(AppError::validation)?;
        Ok(ticket::list_by_station(&self.pool, station).await?)
    }

    pub async fn start(&self, id: i64) -> AppResult<Ticket> {
        let current = self.find(id).await?;
        if current.state != TicketState::Created {
            return Err(AppError::conflict("Ticket already started or completed"));
        }

        let capacity = station_capacity(current.station);
        let now = self.clock.now_millis();
        let Some(started) = ticket::try_start(&self.pool, id, capacity, now).await? else {
            // Lost a race, or the station is full; find out which
            let latest = self.find(id).await?;
            if latest.state != TicketState::Created {
                return Err(AppError::conflict("Ticket already started or completed"));
            }
            tracing::info!(ticket_id = id, station = %latest.station, capacity, "Start rejected, station at capacity");
            return Err(AppError::conflict(format!(
                "Max {capacity} timer(s) for {}",
                latest.station
            )));
        };

        tracing::info!(ticket_id = id, station = %started.station, "Ticket started");
        self.arm_and_announce(&started);
        Ok(started)
    }

    pub async fn complete(&self, id: i64) -> AppResult<Ticket> {
        let now = self.clock.now_millis();
        let Some(completed) = ticket::complete(&self.pool, id, now).await? else {
            self.find(id).await?;
            return Err(AppError::conflict("Ticket already completed"));
        };

        self.timers.cancel(id);
        tracing::info!(ticket_id = id, station = %completed.station, "Ticket completed");
        self.hub.broadcast_to_ticket_rooms(
            &completed,
            ServerMessage::TicketCompleted(completed.clone()),
        );
        Ok(completed)
    }

    /// Re-arm from zero with the original cook time
    pub async fn reset(&self, id: i64) -> AppResult<Ticket> {
        let now = self.clock.now_millis();
        let Some(reset) = ticket::restart_timer(&self.pool, id, now).await? else {
            self.find(id).await?;
            return Err(AppError::conflict("Ticket is not started"));
        };

        tracing::info!(ticket_id = id, "Ticket timer reset");
        self.arm_and_announce(&reset);
        Ok(reset)
    }

    /// Add [`EXTEND_SECONDS`] without moving `started_at`
    pub async fn extend(&self, id: i64) -> AppResult<Ticket> {
        let now = self.clock.now_millis();
        let Some(extended) = ticket::extend_timer(&self.pool, id, EXTEND_SECONDS, now).await? else {
            self.find(id).await?;
            return Err(AppError::conflict("Ticket is not started"));
        };

        tracing::info!(ticket_id = id, duration_seconds = ?extended.duration_seconds, "Ticket timer extended");
        self.arm_and_announce(&extended);
        Ok(extended)
    }

    /// Delete a ticket that is not completed
    pub async fn cancel(&self, id: i64) -> AppResult<()> {
        let Some(removed) = ticket::delete_unless_completed(&self.pool, id).await? else {
            self.find(id).await?;
            return Err(AppError::conflict("Cannot cancel completed ticket"));
        };

        self.timers.cancel(id);
        tracing::info!(ticket_id = id, station = %removed.station, "Ticket cancelled");
        self.hub
            .broadcast_to_ticket_rooms(&removed, ServerMessage::TicketCancelled(removed.clone()));
        Ok(())
    }

    /// Display emphasis only; no scheduling effect
    pub async fn set_priority(&self, id: i64, priority: bool) -> AppResult<Ticket> {
        let now = self.clock.now_millis();
        let updated = ticket::set_priority(&self.pool, id, priority, now)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Ticket {id} not found")))?;

        self.hub
            .broadcast_to_ticket_rooms(&updated, ServerMessage::TicketUpdated(updated.clone()));
        Ok(updated)
    }

    async fn find(&self, id: i64) -> AppResult<Ticket> {
        ticket::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Ticket {id} not found")))
    }

    fn arm_and_announce(&self, t: &Ticket) {
        let (Some(started_at), Some(duration_seconds)) = (t.started_at, t.duration_seconds) else {
            tracing::error!(ticket_id = t.id, "Started ticket without timer fields");
            return;
        };
        self.timers.schedule(t.id, started_at, duration_seconds * 1000);
        self.hub.broadcast_to_ticket_rooms(
            t,
            ServerMessage::TimerStarted(TimerStarted {
                ticket_id: t.id,
                started_at,
                duration_seconds,
            }),
        );
    }
}
