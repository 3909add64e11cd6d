//! Integration tests for restart recovery.
//!
//! Each test persists state through one tracker, drops it, and reopens a
//! new tracker over the same database file at a later wall-clock time.

use pomolog_core::storage::{Store, SESSION_LOG_KEY, TIMER_STATE_KEY};
use pomolog_core::{Clock, Database, Event, ManualClock, TimerPhase, TimerState, Tracker};
use proptest::prelude::*;

const T0: i64 = 1_773_500_000_000;

fn reopen(db: &Database, clock: &ManualClock) -> (TimerPhase, Option<Event>, u64) {
    let (tracker, event) = Tracker::open(db, clock, TimerState::with_input(25, 0));
    (tracker.phase(), event, tracker.remaining_seconds())
}

#[test]
fn hour_long_gap_yields_one_planned_length_session() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pomolog.db");
    let clock = ManualClock::new(T0);
    {
        let db = Database::open_at(&path).unwrap();
        let mut state = TimerState::with_input(5, 0);
        state.is_running = true;
        state.run_started_at = Some(T0 - 3_600_000);
        db.set(TIMER_STATE_KEY, &serde_json::to_string(&state).unwrap())
            .unwrap();
    }

    let db = Database::open_at(&path).unwrap();
    let (mut tracker, event) = Tracker::open(&db, &clock, TimerState::with_input(25, 0));
    let Some(Event::SessionCompleted { pending }) = event else {
        panic!("expected SessionCompleted");
    };
    assert_eq!(pending.duration_seconds, 300);
    assert_eq!(pending.ended_at, T0 - 3_600_000 + 300_000);
    assert_eq!(tracker.phase(), TimerPhase::AwaitingAnnotation);

    // The expiry was persisted: a second restart does not replay it.
    drop(tracker);
    let (tracker2, event2) = Tracker::open(&db, &clock, TimerState::with_input(25, 0));
    assert!(event2.is_none());
    assert_eq!(tracker2.pending().map(|p| p.id.as_str()), Some(pending.id.as_str()));

    tracker = tracker2;
    tracker.resolve_annotation(true, "away", "");
    assert_eq!(tracker.sessions()[0].duration_seconds, 300);
}

#[test]
fn running_timer_resumes_after_restart() {
    let db = Database::open_memory().unwrap();
    let clock = ManualClock::new(T0);
    {
        let (mut tracker, _) = Tracker::open(&db, &clock, TimerState::with_input(10, 0));
        tracker.start();
    }
    clock.advance_secs(240);
    let (phase, event, remaining) = reopen(&db, &clock);
    assert_eq!(phase, TimerPhase::Running);
    assert!(event.is_none());
    assert_eq!(remaining, 360);
}

#[test]
fn stopped_timer_ignores_the_gap() {
    let db = Database::open_memory().unwrap();
    let clock = ManualClock::new(T0);
    {
        let (mut tracker, _) = Tracker::open(&db, &clock, TimerState::with_input(10, 0));
        tracker.start();
        clock.advance_secs(60);
        tracker.stop();
    }
    clock.advance_secs(86_400);
    let (phase, event, remaining) = reopen(&db, &clock);
    assert_eq!(phase, TimerPhase::Idle);
    assert!(event.is_none());
    assert_eq!(remaining, 540);
}

#[test]
fn closed_exactly_at_terminal_tick() {
    let db = Database::open_memory().unwrap();
    let clock = ManualClock::new(T0);
    {
        let (mut tracker, _) = Tracker::open(&db, &clock, TimerState::with_input(0, 30));
        tracker.start();
        clock.advance_secs(29);
        tracker.tick();
    }
    clock.advance_secs(1);
    let (phase, event, _) = reopen(&db, &clock);
    assert_eq!(phase, TimerPhase::AwaitingAnnotation);
    let Some(Event::SessionCompleted { pending }) = event else {
        panic!("expected SessionCompleted");
    };
    assert_eq!(pending.duration_seconds, 30);
}

#[test]
fn corrupt_records_fall_back_to_defaults() {
    let db = Database::open_memory().unwrap();
    db.set(TIMER_STATE_KEY, "garbage").unwrap();
    db.set(SESSION_LOG_KEY, "{\"oops\":").unwrap();
    let clock = ManualClock::new(T0);
    let (tracker, event) = Tracker::open(&db, &clock, TimerState::with_input(25, 0));
    assert!(event.is_none());
    assert_eq!(tracker.phase(), TimerPhase::Idle);
    assert_eq!(tracker.remaining_seconds(), 1500);
    assert!(tracker.log().is_empty());
}

#[test]
fn legacy_blob_with_bad_fields_still_loads() {
    let db = Database::open_memory().unwrap();
    db.set(
        TIMER_STATE_KEY,
        r#"{"plannedSeconds":"x","remainingSeconds":42,"isRunning":true,"inputMinutes":1,"inputSeconds":99}"#,
    )
    .unwrap();
    db.set(
        SESSION_LOG_KEY,
        r#"[{"id":"1","startedAt":0,"endedAt":60000,"durationSeconds":60,"note":"kept","tags":["a","",""]},{"id":"1","note":"dupe"},{"broken":true}]"#,
    )
    .unwrap();
    let clock = ManualClock::new(T0);
    let (tracker, event) = Tracker::open(&db, &clock, TimerState::with_input(25, 0));
    assert!(event.is_none());
    // running without a start time cannot be trusted
    assert_eq!(tracker.phase(), TimerPhase::Idle);
    assert_eq!(tracker.remaining_seconds(), 42);
    assert_eq!(tracker.timer().state().input_seconds, 59);
    assert_eq!(tracker.log().len(), 1);
    assert_eq!(tracker.sessions()[0].note, "kept");
    assert_eq!(tracker.sessions()[0].tags, vec!["a"]);
}

proptest! {
    #[test]
    fn expires_once_after_planned_ticks(planned in 0u64..400) {
        let db = Database::open_memory().unwrap();
        let clock = ManualClock::new(T0);
        let (mut tracker, _) = Tracker::open(&db, &clock, TimerState::with_input(0, 0));
        tracker.apply_configured_duration(planned / 60, planned % 60);
        tracker.start();

        let mut completions = Vec::new();
        let ticks = planned.max(1);
        for k in 1..=ticks {
            if planned > 0 {
                clock.advance_secs(1);
            }
            if let Some(event) = tracker.tick() {
                completions.push((k, event));
            }
        }
        prop_assert_eq!(completions.len(), 1);
        let (k, event) = &completions[0];
        prop_assert_eq!(*k, ticks);
        match event {
            Event::SessionCompleted { pending } => {
                prop_assert_eq!(pending.duration_seconds, planned);
            }
            other => prop_assert!(false, "unexpected event {:?}", other),
        }
        prop_assert_eq!(tracker.phase(), TimerPhase::AwaitingAnnotation);
    }

    #[test]
    fn rehydration_gap_recomputes_remaining(planned in 1u64..7_200, gap in 0u64..20_000) {
        let db = Database::open_memory().unwrap();
        let clock = ManualClock::new(T0);
        {
            let (mut tracker, _) = Tracker::open(&db, &clock, TimerState::with_input(planned / 60, planned % 60));
            tracker.start();
        }
        clock.advance_secs(gap as i64);
        let (tracker, event) = Tracker::open(&db, &clock, TimerState::default());
        if gap < planned {
            prop_assert!(event.is_none());
            prop_assert!(tracker.is_running());
            prop_assert_eq!(tracker.timer().state().remaining_seconds, planned - gap);
        } else {
            let Some(Event::SessionCompleted { pending }) = event else {
                return Err(TestCaseError::fail("expected SessionCompleted"));
            };
            prop_assert_eq!(pending.duration_seconds, planned);
            prop_assert_eq!(pending.ended_at, T0 + planned as i64 * 1000);
            prop_assert_eq!(tracker.phase(), TimerPhase::AwaitingAnnotation);
        }
    }

    #[test]
    fn jittered_ticks_never_overshoot(planned in 1u64..300, steps in proptest::collection::vec(0i64..5_000, 1..200)) {
        let db = Database::open_memory().unwrap();
        let clock = ManualClock::new(T0);
        let (mut tracker, _) = Tracker::open(&db, &clock, TimerState::with_input(0, 0));
        tracker.apply_configured_duration(planned / 60, planned % 60);

        let mut completed = 0;
        for step in steps {
            clock.advance_ms(step);
            let elapsed = ((clock.now_ms() - T0) / 1000) as u64;
            match tracker.tick() {
                Some(Event::SessionCompleted { pending }) => {
                    completed += 1;
                    prop_assert!(elapsed >= planned);
                    prop_assert_eq!(pending.duration_seconds, planned);
                }
                Some(other) => prop_assert!(false, "unexpected event {:?}", other),
                None if completed == 0 => {
                    prop_assert!(elapsed < planned);
                    prop_assert_eq!(tracker.timer().state().remaining_seconds, planned - elapsed);
                }
                None => {}
            }
        }
        prop_assert!(completed <= 1);
    }
}
