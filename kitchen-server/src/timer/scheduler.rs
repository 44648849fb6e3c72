//! 计时调度器
//!
//! One pending task per ticket, keyed by ticket id. Arming a ticket that is
//! already armed aborts the previous task first, so each arming fires at
//! most once and only the latest arming can fire.
//!
//! The deadline is wall-clock (`started_at + duration`), converted to a tokio
//! sleep at arming time. A deadline already in the past fires right away,
//! which is how tickets that expired while the process was down get their
//! `timer_ended` after a restart.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use sqlx::SqlitePool;
use tokio::task::AbortHandle;

use crate::db::repository::{RepoResult, ticket};
use crate::utils::time::SharedClock;

/// Called when an armed deadline is reached
///
/// `deadline_ms` identifies the arming. Implementations must re-read the
/// ticket: it may have been completed, cancelled or re-armed meanwhile.
#[async_trait]
pub trait TimerExpiry: Send + Sync + 'static {
    async fn on_expiry(&self, ticket_id: i64, deadline_ms: i64);
}

struct PendingTimer {
    generation: u64,
    deadline_ms: i64,
    handle: AbortHandle,
}

/// 计时调度器
///
/// Cheap to clone; all clones share one registry.
#[derive(Clone)]
pub struct TimerScheduler {
    clock: SharedClock,
    expiry: Arc<dyn TimerExpiry>,
    pending: Arc<DashMap<i64, PendingTimer>>,
    generation: Arc<AtomicU64>,
}

impl std::fmt::Debug for TimerScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerScheduler")
            .field("pending", &self.pending.len())
            .finish()
    }
}

impl TimerScheduler {
    pub fn new(clock: SharedClock, expiry: Arc<dyn TimerExpiry>) -> Self {
        Self {
            clock,
            expiry,
            pending: Arc::new(DashMap::new()),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Arm (or re-arm) the timer of `ticket_id` for `started_at_ms + duration_ms`.
    pub fn schedule(&self, ticket_id: i64, started_at_ms: i64, duration_ms: i64) {
        let deadline_ms = started_at_ms + duration_ms;
        let remaining_ms = deadline_ms - self.clock.now_millis();
        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;

        // The entry guard is held while spawning, so the task cannot clear
        // its own registration before it exists.
        let entry = self.pending.entry(ticket_id);

        let pending = self.pending.clone();
        let expiry = self.expiry.clone();
        let task = tokio::spawn(async move {
            if remaining_ms > 0 {
                tokio::time::sleep(Duration::from_millis(remaining_ms as u64)).await;
            }
            pending.remove_if(&ticket_id, |_, timer| timer.generation == generation);
            tracing::debug!(ticket_id, deadline_ms, "Timer fired");
            expiry.on_expiry(ticket_id, deadline_ms).await;
        });

        let timer = PendingTimer {
            generation,
            deadline_ms,
            handle: task.abort_handle(),
        };
        match entry {
            Entry::Occupied(mut occupied) => {
                occupied.get().handle.abort();
                occupied.insert(timer);
            }
            Entry::Vacant(vacant) => {
                vacant.insert(timer);
            }
        }

        tracing::debug!(ticket_id, deadline_ms, remaining_ms, "Timer armed");
    }

    /// Drop any pending timer of `ticket_id`.
    pub fn cancel(&self, ticket_id: i64) {
        if let Some((_, timer)) = self.pending.remove(&ticket_id) {
            timer.handle.abort();
            tracing::debug!(ticket_id, "Timer cancelled");
        }
    }

    pub fn is_pending(&self, ticket_id: i64) -> bool {
        self.pending.contains_key(&ticket_id)
    }

    pub fn deadline_of(&self, ticket_id: i64) -> Option<i64> {
        self.pending.get(&ticket_id).map(|timer| timer.deadline_ms)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Re-arm every started ticket from its persisted `started_at` and duration.
    pub async fn reschedule_on_boot(&self, pool: &SqlitePool) -> RepoResult<usize> {
        let started = ticket::find_started(pool).await?;
        let mut armed = 0;
        for t in &started {
            let Some(started_at) = t.started_at else {
                tracing::warn!(ticket_id = t.id, "Started ticket has no started_at, skipping");
                continue;
            };
            let duration = t.duration_seconds.unwrap_or(t.duration_snapshot);
            self.schedule(t.id, started_at, duration * 1000);
            armed += 1;
        }
        tracing::info!(armed, "Rescheduled timers for started tickets");
        Ok(armed)
    }

    /// Abort every pending timer
    pub fn shutdown(&self) {
        let count = self.pending.len();
        self.pending.retain(|_, timer| {
            timer.handle.abort();
            false
        });
        tracing::info!(count, "Timer scheduler stopped");
    }
}
