//! End-to-end tests for the adaptive session loop, driven through the
//! SQLite-backed state store the CLI uses.

use std::rc::Rc;

use flowdoro_core::storage::Database;
use flowdoro_core::{
    BreakType, Event, FlowRating, FlowTimer, NullNotifier, NullSignalHook, SessionType,
    TimerSettings, TimerStatus,
};

fn open_db(dir: &tempfile::TempDir) -> Rc<Database> {
    Rc::new(Database::open_at(&dir.path().join("flowdoro.db")).unwrap())
}

fn timer_on(db: Rc<Database>) -> FlowTimer {
    FlowTimer::new(
        TimerSettings::default(),
        Box::new(db),
        Box::new(NullNotifier),
        Box::new(NullSignalHook),
    )
}

/// Run the armed session to completion, returning the new clock value.
fn run_session(timer: &mut FlowTimer, start_ms: u64) -> u64 {
    timer.start_at(start_ms);
    let end_ms = start_ms + timer.engine().session_duration_secs() * 1000;
    let events = timer.tick_at(end_ms);
    assert!(events
        .iter()
        .any(|e| matches!(e, Event::SessionCompleted { .. })));
    end_ms
}

#[test]
fn full_cycle_work_rating_break_work() {
    let dir = tempfile::tempdir().unwrap();
    let mut timer = timer_on(open_db(&dir));

    // Work session completes and waits for a rating.
    let now = run_session(&mut timer, 0);
    assert!(timer.pending_rating());
    assert_eq!(timer.engine().status(), TimerStatus::Stopped);

    // A focused session earns a suggested 2-minute break.
    let events = timer.record_rating(FlowRating::Focused);
    assert!(events.iter().any(|e| matches!(
        e,
        Event::BreakDecided {
            break_type: BreakType::Suggested,
            duration_secs: 120,
            ..
        }
    )));
    assert_eq!(timer.engine().session_type(), SessionType::ShortBreak);

    // Break completes; the next work session uses the adjusted duration.
    run_session(&mut timer, now);
    assert_eq!(timer.engine().session_type(), SessionType::Work);
    // 1500 >= 1500: focused increment 300 * 0.25 = 75.
    assert_eq!(timer.engine().session_duration_secs(), 1575);
    assert_eq!(timer.sequencer().completed_sessions(), 1);
}

#[test]
fn flow_is_protected_until_the_streak_ceiling() {
    let dir = tempfile::tempdir().unwrap();
    let mut timer = timer_on(open_db(&dir));
    let mut now = 0;

    // Three Flow sessions in a row stay on work (optional breaks only).
    for expected_streak in 1..=3u32 {
        now = run_session(&mut timer, now);
        let events = timer.record_rating(FlowRating::Flow);
        assert_eq!(timer.flow().streak(), expected_streak);
        assert!(events.iter().any(|e| matches!(
            e,
            Event::BreakDecided {
                break_type: BreakType::Optional,
                ..
            }
        )));
        assert_eq!(timer.engine().session_type(), SessionType::Work);
    }

    // The fourth consecutive Flow hits the ceiling: break becomes required.
    now = run_session(&mut timer, now);
    let events = timer.record_rating(FlowRating::Flow);
    assert_eq!(timer.flow().streak(), 4);
    assert!(events.iter().any(|e| matches!(
        e,
        Event::BreakDecided {
            break_type: BreakType::Required,
            duration_secs: 120,
            ..
        }
    )));
    assert!(timer.engine().session_type().is_break());
    let _ = now;
}

#[test]
fn long_break_lands_on_the_cadence() {
    let dir = tempfile::tempdir().unwrap();
    let mut timer = timer_on(open_db(&dir));
    let mut now = 0;

    for completed in 1..=4u32 {
        now = run_session(&mut timer, now);
        timer.record_rating(FlowRating::Ok);
        now = run_session(&mut timer, now); // the suggested break
        assert_eq!(timer.sequencer().completed_sessions(), completed);
    }
    assert!(timer.sequencer().long_break_due());

    now = run_session(&mut timer, now);
    timer.record_rating(FlowRating::Ok);
    assert_eq!(timer.engine().session_type(), SessionType::LongBreak);
    let _ = now;
}

#[test]
fn timer_state_roundtrips_through_the_database() {
    let dir = tempfile::tempdir().unwrap();
    let db = open_db(&dir);

    let engine_before = {
        let mut timer = timer_on(db.clone());
        timer.start_at(0);
        timer.tick_at(12_000);
        timer.pause_at(13_500);
        timer.engine().clone()
    };

    // A fresh controller over the same database resumes identically.
    let restored = timer_on(db);
    assert_eq!(restored.engine(), &engine_before);
    assert_eq!(restored.engine().status(), TimerStatus::Paused);
}

#[test]
fn adaptive_duration_survives_restart_but_config_bounds_win() {
    let dir = tempfile::tempdir().unwrap();
    let db = open_db(&dir);

    {
        let mut timer = timer_on(db.clone());
        let now = run_session(&mut timer, 0);
        timer.record_rating(FlowRating::Flow);
        assert_eq!(timer.preferences().work_duration_secs, 1987);
        let _ = now;
    }

    // Same config: the adjusted duration is restored.
    let timer = timer_on(db.clone());
    assert_eq!(timer.preferences().work_duration_secs, 1987);

    // Narrower configured bounds clamp the persisted value.
    let mut settings = TimerSettings::default();
    settings.prefs.maximum_secs = 1800;
    let timer = FlowTimer::new(
        settings,
        Box::new(db),
        Box::new(NullNotifier),
        Box::new(NullSignalHook),
    );
    assert_eq!(timer.preferences().work_duration_secs, 1800);
}
