#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use kitchen_server::db::DbService;
use kitchen_server::realtime::Subscription;
use kitchen_server::utils::ManualClock;
use kitchen_server::{Config, ServerState};
use shared::models::{MenuItem, MenuItemCreate, Source, Station, Ticket, TicketCreate};
use shared::realtime::ServerMessage;
use tempfile::TempDir;

/// Server state over a temporary database with a hand-driven clock
pub struct TestEnv {
    pub state: ServerState,
    pub clock: Arc<ManualClock>,
    _dir: TempDir,
}

pub async fn setup() -> TestEnv {
    setup_at(1_000).await
}

pub async fn setup_at(now_ms: i64) -> TestEnv {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("kitchen.db");
    let db_path = db_path.to_string_lossy().to_string();

    let mut config = Config::with_database(db_path.clone());
    config.seed_menu = false;
    config.broadcast_capacity = 256;

    let db = DbService::new(&db_path).await.unwrap();
    let clock = Arc::new(ManualClock::new(now_ms));
    let state = ServerState::with_clock(config, db, clock.clone()).await.unwrap();
    state.hub.mark_ready();

    TestEnv {
        state,
        clock,
        _dir: dir,
    }
}

pub fn item_create(code: &str, station: Station, cook_times: &[(&str, i64)]) -> MenuItemCreate {
    MenuItemCreate {
        code: code.to_string(),
        title: format!("Item {code}"),
        station,
        batch_sizes: cook_times.iter().map(|(b, _)| b.to_string()).collect(),
        cook_times: cook_times
            .iter()
            .map(|(b, secs)| (b.to_string(), *secs))
            .collect::<BTreeMap<_, _>>(),
        enabled: Some(true),
        recommended_batch: None,
        color: None,
        image_url: None,
        hold_time: None,
        ingredients: None,
        allergens: None,
        nutrition: None,
    }
}

pub async fn add_item(env: &TestEnv, code: &str, station: Station, cook_times: &[(&str, i64)]) -> MenuItem {
    env.state
        .menu
        .create(item_create(code, station, cook_times))
        .await
        .unwrap()
}

pub async fn create_ticket(env: &TestEnv, item: &MenuItem, batch_size: &str, source: Source) -> Ticket {
    env.state
        .tickets
        .create(TicketCreate {
            menu_item_id: item.id,
            batch_size: batch_size.to_string(),
            source,
        })
        .await
        .unwrap()
}

/// Connection joined to `rooms`
pub fn subscribe(env: &TestEnv, rooms: &[&str]) -> Subscription {
    let sub = env.state.hub.connect();
    env.state.hub.join(sub.id(), rooms);
    sub
}

pub async fn next_message(sub: &mut Subscription) -> ServerMessage {
    let msg = tokio::time::timeout(Duration::from_secs(5), sub.recv())
        .await
        .expect("timed out waiting for a broadcast")
        .expect("hub closed");
    (*msg).clone()
}

/// Nothing left to receive right now
pub fn assert_quiet(sub: &mut Subscription) {
    if let Ok(msg) = sub.try_recv() {
        panic!("unexpected broadcast: {}", msg.event_name());
    }
}
