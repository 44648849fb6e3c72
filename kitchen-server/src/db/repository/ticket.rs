//! Ticket Repository
//!
//! Every state transition is one conditional statement: the `WHERE` clause
//! carries the precondition and `RETURNING` hands back the new row, so a
//! `None` result means the precondition did not hold at write time.

use chrono::NaiveDate;
use shared::models::{Source, Station, Ticket};
use sqlx::{Executor, Sqlite, SqlitePool};

use super::RepoResult;

const COLUMNS: &str = "id, menu_item_id, station, station_seq, station_day, state, source, created_at, started_at, duration_seconds, menu_version_at_call, item_title_snapshot, batch_size_snapshot, duration_snapshot, priority, updated_at";

/// Fields of a ticket fixed by the lifecycle engine at creation
#[derive(Debug, Clone)]
pub struct NewTicket {
    pub menu_item_id: i64,
    pub station: Station,
    pub station_day: NaiveDate,
    pub source: Source,
    pub created_at: i64,
    pub item_title_snapshot: String,
    pub batch_size_snapshot: String,
    pub duration_snapshot: i64,
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

/// Insert a `created` ticket with the next sequence number of its station day.
///
/// The MAX lookup, the menu version read and the insert are one statement,
/// executed under SQLite's write lock. The unique index on
/// `(station, station_day, station_seq)` rejects any duplicate that slips
/// through as `RepoError::Duplicate`.
pub async fn insert_next_in_station(pool: &SqlitePool, data: &NewTicket) -> RepoResult<Ticket> {
    let sql = format!(
        "INSERT INTO ticket (menu_item_id, station, station_seq, station_day, state, source, created_at, started_at, duration_seconds, menu_version_at_call, item_title_snapshot, batch_size_snapshot, duration_snapshot, priority, updated_at) \
         SELECT ?1, ?2, COALESCE(MAX(station_seq), 0) + 1, ?3, 'created', ?4, ?5, NULL, NULL, \
                (SELECT version FROM menu_version WHERE id = 1), ?6, ?7, ?8, 0, ?5 \
         FROM ticket WHERE station = ?2 AND station_day = ?3 \
         RETURNING {COLUMNS}"
    );
    let ticket = sqlx::query_as::<_, Ticket>(&sql)
        .bind(data.menu_item_id)
        .bind(data.station)
        .bind(data.station_day)
        .bind(data.source)
        .bind(data.created_at)
        .bind(&data.item_title_snapshot)
        .bind(&data.batch_size_snapshot)
        .bind(data.duration_snapshot)
        .fetch_one(pool)
        .await?;
    Ok(ticket)
}

pub async fn find_by_id<'e, E>(executor: E, id: i64) -> RepoResult<Option<Ticket>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("SELECT {COLUMNS} FROM ticket WHERE id = ?");
    let ticket = sqlx::query_as::<_, Ticket>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(ticket)
}

/// All tickets of a station, most recent first
pub async fn list_by_station(pool: &SqlitePool, station: Station) -> RepoResult<Vec<Ticket>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM ticket WHERE station = ? ORDER BY station_day DESC, station_seq DESC"
    );
    let tickets = sqlx::query_as::<_, Ticket>(&sql)
        .bind(station)
        .fetch_all(pool)
        .await?;
    Ok(tickets)
}

/// Non-completed tickets at any of the given stations, most recent first
pub async fn list_open_by_stations(
    pool: &SqlitePool,
    stations: &[Station],
) -> RepoResult<Vec<Ticket>> {
    if stations.is_empty() {
        return Ok(Vec::new());
    }
    let sql = format!(
        "SELECT {COLUMNS} FROM ticket WHERE station IN ({}) AND state != 'completed' \
         ORDER BY station_day DESC, station_seq DESC",
        placeholders(stations.len())
    );
    let mut query = sqlx::query_as::<_, Ticket>(&sql);
    for station in stations {
        query = query.bind(*station);
    }
    Ok(query.fetch_all(pool).await?)
}

/// Non-completed tickets from any of the given sources, most recent first
pub async fn list_open_by_sources(pool: &SqlitePool, sources: &[Source]) -> RepoResult<Vec<Ticket>> {
    if sources.is_empty() {
        return Ok(Vec::new());
    }
    let sql = format!(
        "SELECT {COLUMNS} FROM ticket WHERE source IN ({}) AND state != 'completed' \
         ORDER BY station_day DESC, station_seq DESC",
        placeholders(sources.len())
    );
    let mut query = sqlx::query_as::<_, Ticket>(&sql);
    for source in sources {
        query = query.bind(*source);
    }
    Ok(query.fetch_all(pool).await?)
}

/// Up to `limit` most recently updated completed tickets from the given sources
pub async fn list_recent_completed_by_sources(
    pool: &SqlitePool,
    sources: &[Source],
    limit: i64,
) -> RepoResult<Vec<Ticket>> {
    if sources.is_empty() {
        return Ok(Vec::new());
    }
    let sql = format!(
        "SELECT {COLUMNS} FROM ticket WHERE source IN ({}) AND state = 'completed' \
         ORDER BY updated_at DESC, id DESC LIMIT ?",
        placeholders(sources.len())
    );
    let mut query = sqlx::query_as::<_, Ticket>(&sql);
    for source in sources {
        query = query.bind(*source);
    }
    Ok(query.bind(limit).fetch_all(pool).await?)
}

/// Every ticket whose timer is armed
pub async fn find_started(pool: &SqlitePool) -> RepoResult<Vec<Ticket>> {
    let sql = format!("SELECT {COLUMNS} FROM ticket WHERE state = 'started' ORDER BY id");
    let tickets = sqlx::query_as::<_, Ticket>(&sql).fetch_all(pool).await?;
    Ok(tickets)
}

pub async fn count_started(pool: &SqlitePool, station: Station) -> RepoResult<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM ticket WHERE station = ? AND state = 'started'",
    )
    .bind(station)
    .fetch_one(pool)
    .await?;
    Ok(count)
}

/// `created` → `started`, admitted only while the station has fewer than
/// `capacity` started tickets. State check, capacity count and write are
/// one statement.
pub async fn try_start(
    pool: &SqlitePool,
    id: i64,
    capacity: i64,
    now: i64,
) -> RepoResult<Option<Ticket>> {
    let sql = format!(
        "UPDATE ticket SET state = 'started', started_at = ?1, duration_seconds = duration_snapshot, updated_at = ?1 \
         WHERE id = ?2 AND state = 'created' \
           AND (SELECT COUNT(*) FROM ticket AS active WHERE active.station = ticket.station AND active.state = 'started') < ?3 \
         RETURNING {COLUMNS}"
    );
    let ticket = sqlx::query_as::<_, Ticket>(&sql)
        .bind(now)
        .bind(id)
        .bind(capacity)
        .fetch_optional(pool)
        .await?;
    Ok(ticket)
}

/// Re-arm from zero: `started_at = now`, duration back to the snapshot
pub async fn restart_timer(pool: &SqlitePool, id: i64, now: i64) -> RepoResult<Option<Ticket>> {
    let sql = format!(
        "UPDATE ticket SET started_at = ?1, duration_seconds = duration_snapshot, updated_at = ?1 \
         WHERE id = ?2 AND state = 'started' RETURNING {COLUMNS}"
    );
    let ticket = sqlx::query_as::<_, Ticket>(&sql)
        .bind(now)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(ticket)
}

/// Add `seconds` to the live duration, keeping `started_at`
pub async fn extend_timer(
    pool: &SqlitePool,
    id: i64,
    seconds: i64,
    now: i64,
) -> RepoResult<Option<Ticket>> {
    let sql = format!(
        "UPDATE ticket SET duration_seconds = COALESCE(duration_seconds, duration_snapshot) + ?1, updated_at = ?2 \
         WHERE id = ?3 AND state = 'started' RETURNING {COLUMNS}"
    );
    let ticket = sqlx::query_as::<_, Ticket>(&sql)
        .bind(seconds)
        .bind(now)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(ticket)
}

pub async fn complete(pool: &SqlitePool, id: i64, now: i64) -> RepoResult<Option<Ticket>> {
    let sql = format!(
        "UPDATE ticket SET state = 'completed', updated_at = ?1 \
         WHERE id = ?2 AND state != 'completed' RETURNING {COLUMNS}"
    );
    let ticket = sqlx::query_as::<_, Ticket>(&sql)
        .bind(now)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(ticket)
}

/// Delete a ticket that is not completed, returning its last stored fields
pub async fn delete_unless_completed(pool: &SqlitePool, id: i64) -> RepoResult<Option<Ticket>> {
    let sql = format!("DELETE FROM ticket WHERE id = ? AND state != 'completed' RETURNING {COLUMNS}");
    let ticket = sqlx::query_as::<_, Ticket>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(ticket)
}

pub async fn set_priority(
    pool: &SqlitePool,
    id: i64,
    priority: bool,
    now: i64,
) -> RepoResult<Option<Ticket>> {
    let sql = format!(
        "UPDATE ticket SET priority = ?1, updated_at = ?2 WHERE id = ?3 RETURNING {COLUMNS}"
    );
    let ticket = sqlx::query_as::<_, Ticket>(&sql)
        .bind(priority)
        .bind(now)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(ticket)
}
