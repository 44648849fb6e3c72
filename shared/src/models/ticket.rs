//! Ticket Model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Source, Station};
use crate::timing;

/// Ticket state
///
/// `Canceled` is part of the vocabulary but never persisted: cancelling a
/// ticket deletes its row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum TicketState {
    Created,
    Started,
    Completed,
    Canceled,
}

impl TicketState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketState::Created => "created",
            TicketState::Started => "started",
            TicketState::Completed => "completed",
            TicketState::Canceled => "canceled",
        }
    }
}

/// Cook ticket: "cook this batch of this item" at one station
///
/// The four `*_snapshot` fields and `menu_version_at_call` are captured at
/// creation and never change, whatever happens to the menu item later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: i64,
    pub menu_item_id: i64,
    pub station: Station,
    /// 1-based, gap-free per (station, station_day)
    pub station_seq: i64,
    /// Server-local calendar date at creation
    pub station_day: NaiveDate,
    pub state: TicketState,
    pub source: Source,
    pub created_at: i64,
    /// Set on start, re-set on reset
    pub started_at: Option<i64>,
    /// Live countdown length; grows with extend, restored by reset
    pub duration_seconds: Option<i64>,
    pub menu_version_at_call: i64,
    /// "Title (CODE)"
    pub item_title_snapshot: String,
    pub batch_size_snapshot: String,
    /// Cook time looked up at creation
    pub duration_snapshot: i64,
    #[serde(default)]
    pub priority: bool,
    pub updated_at: i64,
}

impl Ticket {
    /// Wall-clock instant the countdown reaches zero, if the timer is armed.
    pub fn deadline_ms(&self) -> Option<i64> {
        let started_at = self.started_at?;
        let duration = self.duration_seconds.unwrap_or(self.duration_snapshot);
        Some(started_at + duration * 1000)
    }

    /// Milliseconds left on the countdown at `now_ms` (negative once elapsed).
    pub fn remaining_ms(&self, now_ms: i64) -> Option<i64> {
        let started_at = self.started_at?;
        let duration = self.duration_seconds.unwrap_or(self.duration_snapshot);
        Some(timing::remaining_ms(started_at, duration, now_ms))
    }

    /// Started and the countdown has not reached zero yet.
    pub fn is_cooking(&self, now_ms: i64) -> bool {
        self.state == TicketState::Started
            && self
                .remaining_ms(now_ms)
                .is_some_and(|remaining| remaining > 0)
    }
}

/// Create ticket payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketCreate {
    pub menu_item_id: i64,
    pub batch_size: String,
    pub source: Source,
}

/// Toggle ticket priority payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketPriorityUpdate {
    pub priority: bool,
}

/// Timer armed/re-armed notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerStarted {
    pub ticket_id: i64,
    pub started_at: i64,
    pub duration_seconds: i64,
}

/// Countdown reached zero
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerEnded {
    pub ticket_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started_ticket(started_at: i64, duration_seconds: i64) -> Ticket {
        Ticket {
            id: 1,
            menu_item_id: 7,
            station: Station::Fryer,
            station_seq: 1,
            station_day: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            state: TicketState::Started,
            source: Source::Foh,
            created_at: 0,
            started_at: Some(started_at),
            duration_seconds: Some(duration_seconds),
            menu_version_at_call: 1,
            item_title_snapshot: "Orange Chicken (C1)".into(),
            batch_size_snapshot: "2".into(),
            duration_snapshot: 480,
            priority: false,
            updated_at: 0,
        }
    }

    #[test]
    fn cooking_stops_exactly_at_deadline() {
        let ticket = started_ticket(1000, 480);
        assert_eq!(ticket.deadline_ms(), Some(481_000));
        assert!(ticket.is_cooking(1000 + 480_000 - 1));
        assert_eq!(ticket.remaining_ms(1000 + 480_000), Some(0));
        assert!(!ticket.is_cooking(1000 + 480_000));
    }

    #[test]
    fn created_ticket_has_no_countdown() {
        let mut ticket = started_ticket(1000, 480);
        ticket.state = TicketState::Created;
        ticket.started_at = None;
        assert_eq!(ticket.remaining_ms(5000), None);
        assert!(!ticket.is_cooking(5000));
    }

    #[test]
    fn serializes_camel_case_with_iso_day() {
        let value = serde_json::to_value(started_ticket(1000, 490)).unwrap();
        assert_eq!(value["stationSeq"], 1);
        assert_eq!(value["stationDay"], "2026-03-01");
        assert_eq!(value["state"], "started");
        assert_eq!(value["source"], "foh");
        assert_eq!(value["durationSeconds"], 490);
        assert_eq!(value["durationSnapshot"], 480);
    }
}
