//! Snapshot composition for a freshly joined connection
//!
//! Station rooms see open tickets of their stations. Source rooms see open
//! tickets of their sources (merged in, source rows win on the same id) plus
//! the most recently completed tickets as a separate history list. Station
//! rooms never receive completed history.

use std::collections::HashMap;

use shared::models::{Room, Source, Station, Ticket};
use shared::realtime::Snapshot;
use sqlx::SqlitePool;

use crate::db::repository::{RepoResult, menu_version, ticket};

/// Completed tickets included for source rooms
pub const COMPLETED_HISTORY_LIMIT: i64 = 20;

/// Split rooms by kind
pub fn partition_rooms(rooms: &[Room]) -> (Vec<Station>, Vec<Source>) {
    let mut stations = Vec::new();
    let mut sources = Vec::new();
    for room in rooms {
        match room {
            Room::Station(station) => stations.push(*station),
            Room::Source(source) => sources.push(*source),
        }
    }
    (stations, sources)
}

/// Merge station and source results, deduplicated by id with the source row
/// taking precedence, ordered most recent first.
pub fn merge_open_tickets(station_tickets: Vec<Ticket>, source_tickets: Vec<Ticket>) -> Vec<Ticket> {
    let mut by_id: HashMap<i64, Ticket> = HashMap::with_capacity(station_tickets.len() + source_tickets.len());
    for ticket in station_tickets.into_iter().chain(source_tickets) {
        by_id.insert(ticket.id, ticket);
    }
    let mut merged: Vec<Ticket> = by_id.into_values().collect();
    merged.sort_by(|a, b| {
        b.station_day
            .cmp(&a.station_day)
            .then(b.station_seq.cmp(&a.station_seq))
            .then(b.id.cmp(&a.id))
    });
    merged
}

pub async fn build_snapshot(pool: &SqlitePool, rooms: &[Room], now_ms: i64) -> RepoResult<Snapshot> {
    let (stations, sources) = partition_rooms(rooms);

    let station_tickets = ticket::list_open_by_stations(pool, &stations).await?;
    let source_tickets = ticket::list_open_by_sources(pool, &sources).await?;
    let completed_tickets =
        ticket::list_recent_completed_by_sources(pool, &sources, COMPLETED_HISTORY_LIMIT).await?;
    let menu_version = menu_version::current(pool).await?;

    Ok(Snapshot {
        rooms: rooms.to_vec(),
        tickets: merge_open_tickets(station_tickets, source_tickets),
        completed_tickets,
        menu_version,
        server_now_ms: now_ms,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use shared::models::TicketState;

    fn ticket(id: i64, station_seq: i64, priority: bool) -> Ticket {
        Ticket {
            id,
            menu_item_id: 1,
            station: Station::Fryer,
            station_seq,
            station_day: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            state: TicketState::Created,
            source: Source::Foh,
            created_at: 0,
            started_at: None,
            duration_seconds: None,
            menu_version_at_call: 1,
            item_title_snapshot: "Orange Chicken (C1)".into(),
            batch_size_snapshot: "1".into(),
            duration_snapshot: 480,
            priority,
            updated_at: 0,
        }
    }

    #[test]
    fn partition_splits_by_kind() {
        let rooms = Room::parse_all(&["fryer", "foh", "grill"]);
        let (stations, sources) = partition_rooms(&rooms);
        assert_eq!(stations, vec![Station::Fryer, Station::Grill]);
        assert_eq!(sources, vec![Source::Foh]);
    }

    #[test]
    fn merge_dedups_with_source_precedence() {
        let merged = merge_open_tickets(
            vec![ticket(1, 1, false), ticket(2, 2, false)],
            vec![ticket(2, 2, true), ticket(3, 3, false)],
        );
        let ids: Vec<i64> = merged.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
        assert!(merged[1].priority, "source row should win on id conflict");
    }
}
