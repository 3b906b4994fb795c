use repairtimer::TimerLifecycleManager;
use repairtimer::errors::{AppError, ErrorKind};
use repairtimer::local::{MemoryTimerStorage, TimerChannel, TimerEvent, TimerStorage};
use repairtimer::models::{ConflictKind, TimerStatus};
use repairtimer::store::{SqliteTicketStore, TicketTimeStore};
use repairtimer::utils::time::{ManualClock, seconds_to_minutes};

mod common;
use common::{seeded_store, setup_test_db, t0};

type Timer = TimerLifecycleManager<SqliteTicketStore, MemoryTimerStorage, ManualClock>;

fn timer_for(name: &str, operator: &str) -> (Timer, ManualClock, String) {
    let db = setup_test_db(name);
    let clock = ManualClock::new(t0());
    let timer = TimerLifecycleManager::new(
        seeded_store(&db),
        MemoryTimerStorage::new(),
        clock.clone(),
        operator,
    );
    (timer, clock, db)
}

/// Second actor on the same database, with its own local storage.
fn other_device(db: &str, operator: &str, clock: &ManualClock) -> Timer {
    TimerLifecycleManager::new(
        SqliteTicketStore::open(db).expect("open store"),
        MemoryTimerStorage::new(),
        clock.clone(),
        operator,
    )
}

#[test]
fn test_start_sets_flag_and_blocks_other_ticket() {
    let (timer, _clock, _db) = timer_for("tl_scenario_a", "tech");

    let session = timer.start("T1", None, None).expect("start T1");
    assert!(session.is_running);
    assert_eq!(session.ticket_number.as_deref(), Some("101"));
    assert_eq!(session.customer_name.as_deref(), Some("Customer 1"));
    assert!(timer.store().get_timer_flag("T1").unwrap().timer_is_running);

    let err = timer.start("T2", None, None).unwrap_err();
    match err {
        AppError::AlreadyRunningElsewhere { active, requested } => {
            assert_eq!(active, "T1");
            assert_eq!(requested, "T2");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!timer.store().get_timer_flag("T2").unwrap().timer_is_running);
}

#[test]
fn test_single_timer_across_many_starts() {
    let (timer, clock, _db) = timer_for("tl_single_timer", "tech");

    for ticket in ["T1", "T2", "T3", "T1", "T2", "T4"] {
        let _ = timer.start(ticket, None, None);
        clock.advance_secs(5);

        let local = timer.refresh().unwrap().expect("one session");
        assert_eq!(local.ticket_id, "T1");
    }

    for ticket in ["T2", "T3", "T4"] {
        assert!(!timer.store().get_timer_flag(ticket).unwrap().timer_is_running);
    }
}

#[test]
fn test_stop_after_65_seconds_logs_one_minute() {
    let (timer, clock, _db) = timer_for("tl_scenario_b", "tech");

    timer.start("T1", None, None).unwrap();
    clock.advance_secs(65);

    let entry = timer.stop("Replaced screen").expect("stop");
    assert_eq!(entry.duration_minutes, 1);
    assert_eq!(entry.description, "Replaced screen");
    assert_eq!(entry.created_by, "tech");
    assert_eq!(entry.ticket_id, "T1");

    let flag = timer.store().get_timer_flag("T1").unwrap();
    assert!(!flag.timer_is_running);
    assert_eq!(flag.timer_started_at, None);
    assert_eq!(flag.total_minutes_accumulated, 1);

    assert!(timer.refresh().unwrap().is_none());
    assert_eq!(timer.status(None).unwrap(), TimerStatus::Idle);
}

#[test]
fn test_immediate_stop_logs_zero_minutes() {
    let (timer, _clock, _db) = timer_for("tl_round_trip", "tech");

    timer.start("T1", None, None).unwrap();
    let entry = timer.stop("x").unwrap();

    assert_eq!(entry.duration_minutes, 0);
    assert!(!timer.store().get_timer_flag("T1").unwrap().timer_is_running);
    assert_eq!(timer.store().time_entries("T1").unwrap().len(), 1);
}

#[test]
fn test_minutes_round_half_up() {
    assert_eq!(seconds_to_minutes(0), 0);
    assert_eq!(seconds_to_minutes(29), 0);
    assert_eq!(seconds_to_minutes(30), 1);
    assert_eq!(seconds_to_minutes(89), 1);
    assert_eq!(seconds_to_minutes(90), 2);
    assert_eq!(seconds_to_minutes(3600), 60);
}

#[test]
fn test_stop_without_notes_is_rejected() {
    let (timer, clock, _db) = timer_for("tl_scenario_c", "tech");

    timer.start("T1", None, None).unwrap();
    clock.advance_secs(40);
    let before = timer.refresh().unwrap();

    for notes in ["", "   ", "\n\t"] {
        let err = timer.stop(notes).unwrap_err();
        assert!(matches!(err, AppError::MissingWorkNotes));
        assert_eq!(err.kind(), ErrorKind::Business);
    }

    assert_eq!(timer.refresh().unwrap(), before);
    assert!(timer.store().get_timer_flag("T1").unwrap().timer_is_running);
    assert!(timer.store().time_entries("T1").unwrap().is_empty());

    timer.pause().unwrap();
    assert!(matches!(
        timer.stop("").unwrap_err(),
        AppError::MissingWorkNotes
    ));
    assert!(matches!(timer.status(None).unwrap(), TimerStatus::Paused(_)));
}

#[test]
fn test_stop_and_pause_when_idle() {
    let (timer, _clock, _db) = timer_for("tl_idle_ops", "tech");

    assert!(matches!(timer.stop("notes").unwrap_err(), AppError::NoActiveTimer));
    assert!(matches!(timer.pause().unwrap_err(), AppError::NoActiveTimer));
    assert!(matches!(timer.resume().unwrap_err(), AppError::NoActiveTimer));
}

#[test]
fn test_pause_and_resume_accumulate() {
    let (timer, clock, _db) = timer_for("tl_pause_resume", "tech");

    timer.start("T1", None, None).unwrap();
    let flag_before = timer.store().get_timer_flag("T1").unwrap();

    clock.advance_secs(120);
    let paused = timer.pause().unwrap();
    assert!(!paused.is_running);
    assert_eq!(paused.accumulated_seconds, 120);

    // local only: the server flag is untouched
    assert_eq!(timer.store().get_timer_flag("T1").unwrap(), flag_before);

    clock.advance_secs(600);
    assert_eq!(timer.elapsed_seconds().unwrap(), 120);
    match timer.status(None).unwrap() {
        TimerStatus::Paused(snap) => assert_eq!(snap.elapsed_seconds, 120),
        other => panic!("expected paused, got {other:?}"),
    }

    // start on the same ticket resumes
    let resumed = timer.start("T1", None, None).unwrap();
    assert!(resumed.is_running);
    assert_eq!(resumed.accumulated_seconds, 120);
    assert_eq!(resumed.session_id, paused.session_id);

    clock.advance_secs(60);
    timer.pause().unwrap();
    clock.advance_secs(30);
    timer.resume().unwrap();
    clock.advance_secs(15);

    assert_eq!(timer.elapsed_seconds().unwrap(), 195);
    let entry = timer.stop("Board reflow").unwrap();
    assert_eq!(entry.duration_minutes, 3);
}

#[test]
fn test_start_on_running_ticket_is_noop() {
    let (timer, clock, _db) = timer_for("tl_start_twice", "tech");

    let first = timer.start("T1", None, None).unwrap();
    clock.advance_secs(10);
    let second = timer.start("T1", None, None).unwrap();

    assert_eq!(first, second);
    assert_eq!(timer.elapsed_seconds().unwrap(), 10);
}

#[test]
fn test_elapsed_is_monotonic_while_running() {
    let (timer, clock, _db) = timer_for("tl_monotonic", "tech");

    timer.start("T1", None, None).unwrap();
    let mut last = timer.elapsed_seconds().unwrap();
    for _ in 0..20 {
        clock.advance_secs(1);
        let now = timer.elapsed_seconds().unwrap();
        assert!(now > last);
        last = now;
    }

    // clock stepping back never yields less than the frozen part
    timer.pause().unwrap();
    timer.resume().unwrap();
    clock.advance_secs(-300);
    assert_eq!(timer.elapsed_seconds().unwrap(), 20);
}

#[test]
fn test_server_flag_blocks_fresh_start() {
    let (timer, _clock, db) = timer_for("tl_server_active", "tech");
    let admin = other_device(&db, "admin", &ManualClock::new(t0()));

    admin.store().set_timer_flag("T3", true, Some(t0())).unwrap();

    let err = timer.start("T3", None, None).unwrap_err();
    assert!(matches!(err, AppError::ServerTimerActive(ref t) if t == "T3"));
    assert!(!err.is_retryable());
    assert!(timer.refresh().unwrap().is_none());

    assert!(matches!(
        timer.start_override("T3", None, None).unwrap_err(),
        AppError::Unauthorized(_)
    ));

    let session = admin.start_override("T3", None, None).unwrap();
    assert_eq!(session.ticket_id, "T3");
}

#[test]
fn test_server_only_conflict_and_recovery() {
    let (timer, clock, db) = timer_for("tl_scenario_d", "tech");
    let phone = other_device(&db, "tech", &clock);

    phone.start("T5", None, None).unwrap();
    clock.advance_secs(300);

    match timer.status(Some("T5")).unwrap() {
        TimerStatus::Conflicted(c) => {
            assert_eq!(c.ticket_id, "T5");
            assert_eq!(c.authoritative_side(), "server");
            assert_eq!(
                c.kind,
                ConflictKind::ServerOnly {
                    started_at: Some(t0()),
                    local_ticket: None,
                }
            );
            assert!(c.remediation().contains(&"recover T5".to_string()));
        }
        other => panic!("expected conflict, got {other:?}"),
    }

    let session = timer.recover_timer("T5").unwrap();
    assert!(session.is_running);
    assert_eq!(session.ticket_id, "T5");
    assert_eq!(session.started_at_wall_clock, t0());
    assert_eq!(session.ticket_number.as_deref(), Some("105"));

    match timer.status(Some("T5")).unwrap() {
        TimerStatus::Running(snap) => assert_eq!(snap.elapsed_seconds, 300),
        other => panic!("expected running, got {other:?}"),
    }
}

#[test]
fn test_recover_twice_is_identical() {
    let (timer, clock, db) = timer_for("tl_recover_idem", "tech");
    other_device(&db, "tech", &clock)
        .start("T2", None, None)
        .unwrap();

    let first = timer.recover_timer("T2").unwrap();
    let second = timer.recover_timer("T2").unwrap();
    assert_eq!(first, second);

    // a flag without a start time is recovered consistently too
    timer.store().set_timer_flag("T4", true, None).unwrap();
    timer.clear_local().unwrap();
    let a = timer.recover_timer("T4").unwrap();
    clock.advance_secs(90);
    let b = timer.recover_timer("T4").unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_recover_needs_a_server_timer() {
    let (timer, _clock, _db) = timer_for("tl_recover_none", "tech");

    let err = timer.recover_timer("T1").unwrap_err();
    assert!(matches!(err, AppError::NothingToRecover(ref t) if t == "T1"));

    timer.start("T1", None, None).unwrap();
    timer.store().set_timer_flag("T2", true, Some(t0())).unwrap();
    assert!(matches!(
        timer.recover_timer("T2").unwrap_err(),
        AppError::AlreadyRunningElsewhere { .. }
    ));
    assert_eq!(timer.refresh().unwrap().unwrap().ticket_id, "T1");
}

#[test]
fn test_clear_server_flag_requires_privilege() {
    let (timer, clock, db) = timer_for("tl_scenario_e", "tech");
    timer.start("T1", None, None).unwrap();
    let flag_before = timer.store().get_timer_flag("T1").unwrap();

    let err = timer.clear_server_flag("T1").unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(ref u) if u == "tech"));
    assert_eq!(timer.store().get_timer_flag("T1").unwrap(), flag_before);

    let admin = other_device(&db, "admin", &clock);
    admin.clear_server_flag("T1").unwrap();
    assert!(!admin.store().get_timer_flag("T1").unwrap().timer_is_running);
    assert!(admin.store().time_entries("T1").unwrap().is_empty());
}

#[test]
fn test_local_only_conflict_after_forced_clear() {
    let (timer, clock, db) = timer_for("tl_local_only", "tech");
    timer.start("T1", None, None).unwrap();

    other_device(&db, "admin", &clock)
        .clear_server_flag("T1")
        .unwrap();

    match timer.status(None).unwrap() {
        TimerStatus::Conflicted(c) => {
            assert_eq!(c.authoritative_side(), "local");
            assert!(matches!(c.kind, ConflictKind::LocalOnly { ref session } if session.ticket_id == "T1"));
            assert_eq!(c.remediation(), vec!["clear-local".to_string()]);
        }
        other => panic!("expected conflict, got {other:?}"),
    }

    timer.clear_local().unwrap();
    assert_eq!(timer.status(None).unwrap(), TimerStatus::Idle);
}

#[test]
fn test_status_on_other_ticket() {
    let (timer, clock, _db) = timer_for("tl_status_other", "tech");
    timer.start("T1", None, None).unwrap();
    clock.advance_secs(12);

    // unflagged ticket: report the local timer
    match timer.status(Some("T2")).unwrap() {
        TimerStatus::Running(snap) => {
            assert_eq!(snap.session.ticket_id, "T1");
            assert_eq!(snap.elapsed_seconds, 12);
        }
        other => panic!("expected running, got {other:?}"),
    }

    timer.store().set_timer_flag("T2", true, Some(t0())).unwrap();
    assert!(timer.status(Some("T2")).unwrap().is_conflicted());

    assert!(matches!(
        timer.status(Some("NOPE")).unwrap_err(),
        AppError::TicketNotFound(_)
    ));
}

#[test]
fn test_clear_local_is_idempotent() {
    let (timer, _clock, _db) = timer_for("tl_clear_local", "tech");

    timer.clear_local().unwrap();
    timer.start("T1", None, None).unwrap();
    timer.clear_local().unwrap();
    timer.clear_local().unwrap();

    assert!(timer.refresh().unwrap().is_none());
    // the server flag is left as it was
    assert!(timer.store().get_timer_flag("T1").unwrap().timer_is_running);
}

#[test]
fn test_events_are_published_in_order() {
    let (timer, clock, _db) = timer_for("tl_events", "tech");
    let rx = timer.subscribe();

    timer.start("T1", None, None).unwrap();
    clock.advance_secs(30);
    timer.pause().unwrap();
    timer.resume().unwrap();
    let entry = timer.stop("Cleaned contacts").unwrap();
    timer.clear_local().unwrap();

    let events: Vec<TimerEvent> = rx.try_iter().collect();
    assert_eq!(events.len(), 4);
    assert!(events.iter().all(|e| e.ticket_id() == "T1"));
    assert!(matches!(events[0], TimerEvent::Started(_)));
    assert!(matches!(events[1], TimerEvent::Paused(_)));
    assert!(matches!(events[2], TimerEvent::Resumed(_)));
    assert_eq!(
        events[3],
        TimerEvent::Stopped {
            ticket_id: "T1".to_string(),
            entry_id: entry.id
        }
    );
}

#[test]
fn test_tabs_share_storage_and_channel() {
    let db = setup_test_db("tl_tabs");
    let clock = ManualClock::new(t0());
    let storage = MemoryTimerStorage::new();
    let channel = TimerChannel::new();

    let tab_a = TimerLifecycleManager::new(seeded_store(&db), storage.clone(), clock.clone(), "tech")
        .with_channel(channel.clone());
    let tab_b = TimerLifecycleManager::new(
        SqliteTicketStore::open(&db).unwrap(),
        storage.clone(),
        clock.clone(),
        "tech",
    )
    .with_channel(channel.clone());

    let seen_by_a = tab_a.subscribe();
    assert_eq!(channel.subscriber_count(), 1);

    tab_a.start("T1", None, None).unwrap();
    clock.advance_secs(45);
    assert!(matches!(tab_b.status(None).unwrap(), TimerStatus::Running(ref s) if s.elapsed_seconds == 45));

    // the other tab cannot start a second timer
    assert!(tab_b.start("T2", None, None).is_err());

    tab_b.clear_local().unwrap();
    assert!(tab_a.refresh().unwrap().is_none());
    assert!(storage.load().unwrap().is_none());

    let events: Vec<TimerEvent> = seen_by_a.try_iter().collect();
    assert_eq!(
        events.last(),
        Some(&TimerEvent::Cleared {
            ticket_id: "T1".to_string()
        })
    );

    // dropped receivers are pruned on the next publish
    drop(seen_by_a);
    tab_a.start("T2", None, None).unwrap();
    assert_eq!(channel.subscriber_count(), 0);
}

#[test]
fn test_stale_stop_leaves_flag_of_new_owner() {
    let (bench, clock, db) = timer_for("tl_stale_stop", "tech");
    bench.start("T1", None, None).unwrap();
    clock.advance_secs(600);

    let admin = other_device(&db, "admin", &clock);
    admin.clear_server_flag("T1").unwrap();
    clock.advance_secs(60);

    let laptop = other_device(&db, "tech", &clock);
    let fresh = laptop.start("T1", None, None).unwrap();
    clock.advance_secs(60);

    // the bench still bills its own time
    let entry = bench.stop("Reflowed charger IC").unwrap();
    assert_eq!(entry.duration_minutes, 12);
    assert!(bench.refresh().unwrap().is_none());

    let flag = laptop.store().get_timer_flag("T1").unwrap();
    assert!(flag.timer_is_running);
    assert_eq!(flag.timer_started_at, fresh.flagged_at);
    match laptop.status(None).unwrap() {
        TimerStatus::Running(snap) => assert_eq!(snap.elapsed_seconds, 60),
        other => panic!("expected running, got {other:?}"),
    }

    clock.advance_secs(60);
    laptop.stop("Tested charging").unwrap();
    let flag = laptop.store().get_timer_flag("T1").unwrap();
    assert!(!flag.timer_is_running);
    assert_eq!(flag.total_minutes_accumulated, 14);
}

#[test]
fn test_recover_keeps_paused_local_session() {
    let (timer, clock, _db) = timer_for("tl_recover_paused", "tech");
    timer.start("T1", None, None).unwrap();
    clock.advance_secs(300);
    let paused = timer.pause().unwrap();
    clock.advance_secs(3600);

    let session = timer.recover_timer("T1").unwrap();
    assert_eq!(session, paused);
    assert!(!session.is_running);
    assert_eq!(session.accumulated_seconds, 300);
    assert_eq!(timer.elapsed_seconds().unwrap(), 300);
    assert_eq!(timer.refresh().unwrap(), Some(paused));
}

#[test]
fn test_server_only_conflict_while_timing_another_ticket() {
    let (timer, clock, db) = timer_for("tl_server_only_busy", "tech");
    timer.start("T1", None, None).unwrap();
    other_device(&db, "tech", &clock)
        .start("T5", None, None)
        .unwrap();

    match timer.status(Some("T5")).unwrap() {
        TimerStatus::Conflicted(c) => {
            assert!(matches!(
                c.kind,
                ConflictKind::ServerOnly { local_ticket: Some(ref t), .. } if t == "T1"
            ));
            assert_eq!(
                c.remediation(),
                vec![
                    "stop".to_string(),
                    "clear-local".to_string(),
                    "recover T5".to_string(),
                ]
            );
        }
        other => panic!("expected conflict, got {other:?}"),
    }

    // following the suggested order works
    assert!(timer.recover_timer("T5").is_err());
    timer.stop("Checked battery health").unwrap();
    assert_eq!(timer.recover_timer("T5").unwrap().ticket_id, "T5");
}
