mod common;

use common::*;
use kitchen_server::AppError;
use kitchen_server::db::repository::ticket;
use shared::models::{Source, Station, TicketCreate, TicketState, TimerEnded, TimerStarted};
use shared::realtime::ServerMessage;

#[tokio::test]
async fn create_start_extend_flow() {
    let env = setup().await;
    let item = add_item(&env, "C1", Station::Fryer, &[("1", 420), ("2", 480)]).await;
    let mut station = subscribe(&env, &["fryer"]);

    // create with a known batch size
    let created = create_ticket(&env, &item, "2", Source::Foh).await;
    assert_eq!(created.state, TicketState::Created);
    assert_eq!(created.duration_snapshot, 480);
    assert_eq!(created.station_seq, 1);
    assert_eq!(created.item_title_snapshot, "Item C1 (C1)");
    assert_eq!(created.started_at, None);
    assert_eq!(next_message(&mut station).await, ServerMessage::TicketCreated(created.clone()));

    // start at t=1000
    let started = env.state.tickets.start(created.id).await.unwrap();
    assert_eq!(started.state, TicketState::Started);
    assert_eq!(started.started_at, Some(1_000));
    assert_eq!(started.duration_seconds, Some(480));
    assert_eq!(
        next_message(&mut station).await,
        ServerMessage::TimerStarted(TimerStarted {
            ticket_id: created.id,
            started_at: 1_000,
            duration_seconds: 480,
        })
    );
    assert_eq!(env.state.timers.deadline_of(created.id), Some(481_000));

    // countdown boundary
    assert!(started.is_cooking(480_999));
    assert_eq!(started.remaining_ms(481_000), Some(0));
    assert!(!started.is_cooking(481_000));

    // extend keeps startedAt
    env.clock.set(30_000);
    let extended = env.state.tickets.extend(created.id).await.unwrap();
    assert_eq!(extended.started_at, Some(1_000));
    assert_eq!(extended.duration_seconds, Some(490));
    assert_eq!(
        next_message(&mut station).await,
        ServerMessage::TimerStarted(TimerStarted {
            ticket_id: created.id,
            started_at: 1_000,
            duration_seconds: 490,
        })
    );
    assert_eq!(env.state.timers.deadline_of(created.id), Some(491_000));
    assert_eq!(env.state.timers.pending_count(), 1);
}

#[tokio::test]
async fn unknown_batch_size_uses_default_cook_time() {
    let env = setup().await;
    let item = add_item(&env, "M1", Station::Sides, &[("1", 300)]).await;

    let created = create_ticket(&env, &item, "9", Source::DriveThru).await;
    assert_eq!(created.duration_snapshot, 420);
    assert_eq!(created.batch_size_snapshot, "9");
}

#[tokio::test]
async fn timer_fires_at_deadline_to_station_room() {
    let env = setup().await;
    let item = add_item(&env, "C1", Station::Fryer, &[("2", 480)]).await;
    let created = create_ticket(&env, &item, "2", Source::Foh).await;
    env.state.tickets.start(created.id).await.unwrap();

    let mut station = subscribe(&env, &["fryer"]);
    let mut source = subscribe(&env, &["foh"]);

    // re-arm exactly at the deadline: remaining is 0, so it fires now
    env.clock.set(481_000);
    env.state.timers.schedule(created.id, 1_000, 480_000);

    assert_eq!(
        next_message(&mut station).await,
        ServerMessage::TimerEnded(TimerEnded { ticket_id: created.id })
    );
    assert_quiet(&mut source);

    // the row is untouched by the fire
    let current = ticket::find_by_id(env.state.pool(), created.id).await.unwrap().unwrap();
    assert_eq!(current.state, TicketState::Started);
}

#[tokio::test]
async fn capacity_limit_rejects_without_mutation_or_broadcast() {
    let env = setup().await;
    let item = add_item(&env, "B1", Station::Stirfry, &[("1", 45)]).await;

    let a = create_ticket(&env, &item, "1", Source::Foh).await;
    let b = create_ticket(&env, &item, "1", Source::Foh).await;
    let c = create_ticket(&env, &item, "1", Source::DriveThru).await;
    env.state.tickets.start(a.id).await.unwrap();
    env.state.tickets.start(b.id).await.unwrap();

    let mut station = subscribe(&env, &["stirfry"]);
    let mut source = subscribe(&env, &["drive_thru"]);

    let err = env.state.tickets.start(c.id).await.unwrap_err();
    match err {
        AppError::Conflict(msg) => assert_eq!(msg, "Max 2 timer(s) for stirfry"),
        other => panic!("expected conflict, got {other:?}"),
    }

    let unchanged = ticket::find_by_id(env.state.pool(), c.id).await.unwrap().unwrap();
    assert_eq!(unchanged, c);
    assert!(!env.state.timers.is_pending(c.id));
    assert_quiet(&mut station);
    assert_quiet(&mut source);
    assert_eq!(ticket::count_started(env.state.pool(), Station::Stirfry).await.unwrap(), 2);

    // a slot frees up after completion
    env.state.tickets.complete(a.id).await.unwrap();
    let started = env.state.tickets.start(c.id).await.unwrap();
    assert_eq!(started.state, TicketState::Started);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn racing_starts_never_exceed_station_capacity() {
    let env = setup().await;
    let item = add_item(&env, "B1", Station::Stirfry, &[("1", 45)]).await;

    let mut ids = Vec::new();
    for _ in 0..12 {
        ids.push(create_ticket(&env, &item, "1", Source::Foh).await.id);
    }

    let handles: Vec<_> = ids
        .iter()
        .map(|&id| {
            let tickets = env.state.tickets.clone();
            tokio::spawn(async move { tickets.start(id).await })
        })
        .collect();

    let mut started = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(t) => {
                assert_eq!(t.state, TicketState::Started);
                started += 1;
            }
            Err(AppError::Conflict(msg)) => assert_eq!(msg, "Max 2 timer(s) for stirfry"),
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    assert_eq!(started, 2);
    assert_eq!(ticket::count_started(env.state.pool(), Station::Stirfry).await.unwrap(), 2);
    assert_eq!(env.state.timers.pending_count(), 2);
}

#[tokio::test]
async fn fryer_is_effectively_unlimited() {
    let env = setup().await;
    let item = add_item(&env, "E1", Station::Fryer, &[("1", 300)]).await;

    for _ in 0..5 {
        let t = create_ticket(&env, &item, "1", Source::Foh).await;
        env.state.tickets.start(t.id).await.unwrap();
    }
    assert_eq!(ticket::count_started(env.state.pool(), Station::Fryer).await.unwrap(), 5);
}

#[tokio::test]
async fn illegal_transitions_are_conflicts() {
    let env = setup().await;
    let item = add_item(&env, "R1", Station::Sides, &[("1", 420)]).await;
    let t = create_ticket(&env, &item, "1", Source::Foh).await;

    // reset / extend need a started ticket
    assert!(matches!(env.state.tickets.reset(t.id).await, Err(AppError::Conflict(_))));
    assert!(matches!(env.state.tickets.extend(t.id).await, Err(AppError::Conflict(_))));

    env.state.tickets.start(t.id).await.unwrap();
    assert!(matches!(env.state.tickets.start(t.id).await, Err(AppError::Conflict(_))));

    env.state.tickets.complete(t.id).await.unwrap();
    assert!(!env.state.timers.is_pending(t.id));
    assert!(matches!(env.state.tickets.complete(t.id).await, Err(AppError::Conflict(_))));
    assert!(matches!(env.state.tickets.start(t.id).await, Err(AppError::Conflict(_))));
    assert!(matches!(env.state.tickets.reset(t.id).await, Err(AppError::Conflict(_))));
    match env.state.tickets.cancel(t.id).await {
        Err(AppError::Conflict(msg)) => assert_eq!(msg, "Cannot cancel completed ticket"),
        other => panic!("expected conflict, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_ticket_is_not_found() {
    let env = setup().await;
    assert!(matches!(env.state.tickets.start(999).await, Err(AppError::NotFound(_))));
    assert!(matches!(env.state.tickets.complete(999).await, Err(AppError::NotFound(_))));
    assert!(matches!(env.state.tickets.reset(999).await, Err(AppError::NotFound(_))));
    assert!(matches!(env.state.tickets.extend(999).await, Err(AppError::NotFound(_))));
    assert!(matches!(env.state.tickets.cancel(999).await, Err(AppError::NotFound(_))));
    assert!(matches!(
        env.state.tickets.set_priority(999, true).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn reset_restores_original_duration_from_now() {
    let env = setup().await;
    let item = add_item(&env, "C4", Station::Grill, &[("1", 420)]).await;
    let t = create_ticket(&env, &item, "1", Source::Foh).await;
    env.state.tickets.start(t.id).await.unwrap();
    env.state.tickets.extend(t.id).await.unwrap();
    env.state.tickets.extend(t.id).await.unwrap();

    let mut station = subscribe(&env, &["grill"]);
    env.clock.set(100_000);
    let reset = env.state.tickets.reset(t.id).await.unwrap();

    assert_eq!(reset.started_at, Some(100_000));
    assert_eq!(reset.duration_seconds, Some(420));
    assert_eq!(
        next_message(&mut station).await,
        ServerMessage::TimerStarted(TimerStarted {
            ticket_id: t.id,
            started_at: 100_000,
            duration_seconds: 420,
        })
    );
    assert_eq!(env.state.timers.deadline_of(t.id), Some(520_000));
}

#[tokio::test]
async fn cancel_created_ticket_deletes_row_and_notifies_both_rooms_once() {
    let env = setup().await;
    let item = add_item(&env, "V1", Station::Stirfry, &[("1", 180)]).await;
    let t = create_ticket(&env, &item, "1", Source::DriveThru).await;

    let mut station = subscribe(&env, &["stirfry"]);
    let mut source = subscribe(&env, &["drive_thru"]);
    // one connection in both rooms still gets a single copy
    let mut both = subscribe(&env, &["stirfry", "drive_thru"]);

    env.state.tickets.cancel(t.id).await.unwrap();

    assert!(ticket::find_by_id(env.state.pool(), t.id).await.unwrap().is_none());
    assert_eq!(next_message(&mut station).await, ServerMessage::TicketCancelled(t.clone()));
    assert_eq!(next_message(&mut source).await, ServerMessage::TicketCancelled(t.clone()));
    assert_eq!(next_message(&mut both).await, ServerMessage::TicketCancelled(t.clone()));
    assert_quiet(&mut station);
    assert_quiet(&mut source);
    assert_quiet(&mut both);
}

#[tokio::test]
async fn cancel_started_ticket_drops_its_timer() {
    let env = setup().await;
    let item = add_item(&env, "C2", Station::Stirfry, &[("1", 75)]).await;
    let t = create_ticket(&env, &item, "1", Source::Foh).await;
    env.state.tickets.start(t.id).await.unwrap();
    assert!(env.state.timers.is_pending(t.id));

    env.state.tickets.cancel(t.id).await.unwrap();
    assert!(!env.state.timers.is_pending(t.id));
}

#[tokio::test]
async fn disabled_or_missing_item_is_rejected() {
    let env = setup().await;
    let mut create = item_create("F4", Station::Fryer, &[("1", 180)]);
    create.enabled = Some(false);
    let item = env.state.menu.create(create).await.unwrap();

    let err = env
        .state
        .tickets
        .create(TicketCreate {
            menu_item_id: item.id,
            batch_size: "1".into(),
            source: Source::Foh,
        })
        .await
        .unwrap_err();
    match err {
        AppError::Validation(msg) => assert!(msg.contains("disabled"), "{msg}"),
        other => panic!("expected validation error, got {other:?}"),
    }

    let err = env
        .state
        .tickets
        .create(TicketCreate {
            menu_item_id: 4242,
            batch_size: "1".into(),
            source: Source::Foh,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn list_by_station_requires_station_and_orders_newest_first() {
    let env = setup().await;
    let fryer = add_item(&env, "E2", Station::Fryer, &[("1", 420)]).await;
    let sides = add_item(&env, "R2", Station::Sides, &[("1", 420)]).await;
    for _ in 0..3 {
        create_ticket(&env, &fryer, "1", Source::Foh).await;
    }
    create_ticket(&env, &sides, "1", Source::Foh).await;

    assert!(matches!(
        env.state.tickets.list_by_station(None).await,
        Err(AppError::Validation(_))
    ));
    assert!(matches!(
        env.state.tickets.list_by_station(Some("  ")).await,
        Err(AppError::Validation(_))
    ));
    assert!(matches!(
        env.state.tickets.list_by_station(Some("patio")).await,
        Err(AppError::Validation(_))
    ));

    let listed = env.state.tickets.list_by_station(Some("fryer")).await.unwrap();
    let seqs: Vec<i64> = listed.iter().map(|t| t.station_seq).collect();
    assert_eq!(seqs, vec![3, 2, 1]);
    assert!(listed.iter().all(|t| t.station == Station::Fryer));
}

#[tokio::test]
async fn priority_toggle_broadcasts_full_ticket() {
    let env = setup().await;
    let item = add_item(&env, "CB1", Station::Stirfry, &[("1", 45)]).await;
    let t = create_ticket(&env, &item, "1", Source::Foh).await;
    let mut source = subscribe(&env, &["foh"]);

    let updated = env.state.tickets.set_priority(t.id, true).await.unwrap();
    assert!(updated.priority);
    assert_eq!(updated.state, TicketState::Created);
    assert_eq!(next_message(&mut source).await, ServerMessage::TicketUpdated(updated));
}

#[tokio::test]
async fn completion_is_broadcast_to_station_and_source() {
    let env = setup().await;
    let item = add_item(&env, "CB3", Station::Fryer, &[("1", 150)]).await;
    let t = create_ticket(&env, &item, "1", Source::DriveThru).await;
    env.state.tickets.start(t.id).await.unwrap();

    let mut station = subscribe(&env, &["fryer"]);
    let mut source = subscribe(&env, &["drive_thru"]);
    let mut other = subscribe(&env, &["grill", "foh"]);

    env.clock.set(200_000);
    let completed = env.state.tickets.complete(t.id).await.unwrap();
    assert_eq!(completed.state, TicketState::Completed);

    assert_eq!(next_message(&mut station).await, ServerMessage::TicketCompleted(completed.clone()));
    assert_eq!(next_message(&mut source).await, ServerMessage::TicketCompleted(completed));
    assert_quiet(&mut other);
}
