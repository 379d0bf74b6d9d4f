//! Timer engine implementation.
//!
//! The timer engine is a wall-clock-based state machine. It does not use
//! internal threads - the caller is responsible for calling `tick()` on a
//! coarse cadence (~100ms) and may deliver ticks late or with jitter;
//! elapsed time is computed from the wall clock, carrying the sub-second
//! remainder forward so no time is lost or double-counted.
//!
//! ## State Transitions
//!
//! ```text
//! Stopped -> Running -> Paused -> Running -> Stopped
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(SessionType::Work, 25 * 60);
//! engine.start();
//! // In a loop:
//! engine.tick(); // Returns Some(Event::SessionCompleted) when done
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::sequencer::SessionType;
use crate::events::Event;

/// Hard floor for a session duration, in seconds.
pub const MIN_SESSION_SECS: u64 = 2 * 60;
/// Hard ceiling for a session duration, in seconds.
pub const MAX_SESSION_SECS: u64 = 50 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerStatus {
    Stopped,
    Running,
    Paused,
}

/// Core countdown engine.
///
/// Operates on wall-clock deltas -- no internal thread. All transitions
/// take an explicit `now` in epoch milliseconds so hosts and tests control
/// the clock; the argument-less wrappers use the system clock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerEngine {
    status: TimerStatus,
    session_type: SessionType,
    /// Remaining time in whole seconds for the current session.
    remaining_secs: u64,
    /// Full duration of the current session, in seconds.
    session_duration_secs: u64,
    /// Timestamp (ms since epoch) used to compute elapsed time between
    /// ticks. Advanced by whole seconds only; the sub-second remainder
    /// stays in the anchor.
    #[serde(default)]
    last_tick_epoch_ms: Option<u64>,
}

impl TimerEngine {
    /// Create a stopped engine armed with the given session.
    ///
    /// The duration is clamped to `[MIN_SESSION_SECS, MAX_SESSION_SECS]`.
    pub fn new(session_type: SessionType, duration_secs: u64) -> Self {
        let duration = duration_secs.clamp(MIN_SESSION_SECS, MAX_SESSION_SECS);
        Self {
            status: TimerStatus::Stopped,
            session_type,
            remaining_secs: duration,
            session_duration_secs: duration,
            last_tick_epoch_ms: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn status(&self) -> TimerStatus {
        self.status
    }

    pub fn session_type(&self) -> SessionType {
        self.session_type
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn session_duration_secs(&self) -> u64 {
        self.session_duration_secs
    }

    /// Remaining time as `mm:ss`.
    pub fn display(&self) -> String {
        format!(
            "{:02}:{:02}",
            self.remaining_secs / 60,
            self.remaining_secs % 60
        )
    }

    /// 0.0 .. 100.0 share of the session still remaining.
    pub fn progress_pct(&self) -> f64 {
        if self.session_duration_secs == 0 {
            return 0.0;
        }
        let pct = self.remaining_secs as f64 / self.session_duration_secs as f64 * 100.0;
        pct.clamp(0.0, 100.0)
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            status: self.status,
            session_type: self.session_type,
            remaining_secs: self.remaining_secs,
            total_secs: self.session_duration_secs,
            display: self.display(),
            progress_pct: self.progress_pct(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Option<Event> {
        self.start_at(now_ms())
    }

    /// Stopped|Paused -> Running. A fully elapsed session is re-armed to
    /// its full duration first.
    pub fn start_at(&mut self, now_epoch_ms: u64) -> Option<Event> {
        match self.status {
            TimerStatus::Stopped | TimerStatus::Paused => {
                if self.remaining_secs == 0 {
                    self.remaining_secs = self.session_duration_secs;
                }
                self.status = TimerStatus::Running;
                self.last_tick_epoch_ms = Some(now_epoch_ms);
                Some(Event::TimerStarted {
                    session_type: self.session_type,
                    duration_secs: self.session_duration_secs,
                    at: Utc::now(),
                })
            }
            TimerStatus::Running => None, // Already running.
        }
    }

    pub fn pause(&mut self) -> Option<Event> {
        self.pause_at(now_ms())
    }

    /// Running -> Paused only. Flushes elapsed whole seconds, then freezes
    /// the anchor.
    pub fn pause_at(&mut self, now_epoch_ms: u64) -> Option<Event> {
        if self.status != TimerStatus::Running {
            return None;
        }
        self.flush_elapsed(now_epoch_ms);
        self.status = TimerStatus::Paused;
        self.last_tick_epoch_ms = None;
        Some(Event::TimerPaused {
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }

    pub fn resume(&mut self) -> Option<Event> {
        self.resume_at(now_ms())
    }

    /// Paused -> Running only.
    pub fn resume_at(&mut self, now_epoch_ms: u64) -> Option<Event> {
        if self.status != TimerStatus::Paused {
            return None;
        }
        self.status = TimerStatus::Running;
        self.last_tick_epoch_ms = Some(now_epoch_ms);
        Some(Event::TimerResumed {
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }

    /// Any state -> Stopped. Resets the countdown to the full duration of
    /// the current session type and clears the tick anchor, so a tick
    /// scheduled before the stop lands as a no-op. Idempotent.
    pub fn stop(&mut self) -> Option<Event> {
        self.status = TimerStatus::Stopped;
        self.remaining_secs = self.session_duration_secs;
        self.last_tick_epoch_ms = None;
        Some(Event::TimerStopped {
            session_type: self.session_type,
            at: Utc::now(),
        })
    }

    pub fn tick(&mut self) -> Option<Event> {
        self.tick_at(now_ms())
    }

    /// Call periodically while running. Decrements by the whole seconds
    /// elapsed since the anchor; returns `Some(Event::SessionCompleted)`
    /// exactly once when the countdown reaches zero.
    pub fn tick_at(&mut self, now_epoch_ms: u64) -> Option<Event> {
        if self.status != TimerStatus::Running {
            return None;
        }
        self.flush_elapsed(now_epoch_ms);
        if self.remaining_secs == 0 {
            self.status = TimerStatus::Stopped;
            self.last_tick_epoch_ms = None;
            return Some(Event::SessionCompleted {
                session_type: self.session_type,
                duration_secs: self.session_duration_secs,
                at: Utc::now(),
            });
        }
        None
    }

    /// Re-arm for the next session: stopped, full countdown, new type.
    pub fn arm(&mut self, session_type: SessionType, duration_secs: u64) {
        let duration = duration_secs.clamp(MIN_SESSION_SECS, MAX_SESSION_SECS);
        self.session_type = session_type;
        self.session_duration_secs = duration;
        self.remaining_secs = duration;
        self.status = TimerStatus::Stopped;
        self.last_tick_epoch_ms = None;
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn flush_elapsed(&mut self, now_epoch_ms: u64) {
        if let Some(last) = self.last_tick_epoch_ms {
            let delta_ms = now_epoch_ms.saturating_sub(last);
            let whole_secs = delta_ms / 1000;
            if whole_secs == 0 {
                return;
            }
            self.remaining_secs = self.remaining_secs.saturating_sub(whole_secs);
            // Keep the sub-second remainder in the anchor.
            self.last_tick_epoch_ms = Some(now_epoch_ms - delta_ms % 1000);
        }
    }
}

fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn work_engine() -> TimerEngine {
        TimerEngine::new(SessionType::Work, 300)
    }

    #[test]
    fn start_pause_resume() {
        let mut engine = work_engine();
        assert_eq!(engine.status(), TimerStatus::Stopped);

        assert!(engine.start_at(0).is_some());
        assert_eq!(engine.status(), TimerStatus::Running);

        assert!(engine.start_at(100).is_none()); // already running

        assert!(engine.pause_at(1_000).is_some());
        assert_eq!(engine.status(), TimerStatus::Paused);

        assert!(engine.pause_at(1_500).is_none()); // pause only from running

        assert!(engine.resume_at(2_000).is_some());
        assert_eq!(engine.status(), TimerStatus::Running);
    }

    #[test]
    fn resume_only_from_paused() {
        let mut engine = work_engine();
        assert!(engine.resume_at(0).is_none());
        engine.start_at(0);
        assert!(engine.resume_at(100).is_none());
    }

    #[test]
    fn tick_decrements_by_whole_seconds() {
        let mut engine = work_engine();
        engine.start_at(0);
        assert!(engine.tick_at(1_000).is_none());
        assert_eq!(engine.remaining_secs(), 299);
    }

    #[test]
    fn sub_second_remainder_is_carried() {
        let mut engine = work_engine();
        engine.start_at(0);

        // 600ms: under a second, nothing consumed.
        engine.tick_at(600);
        assert_eq!(engine.remaining_secs(), 300);

        // 1200ms total: one whole second, 200ms kept in the anchor.
        engine.tick_at(1_200);
        assert_eq!(engine.remaining_secs(), 299);

        // 2000ms total: the carried 200ms makes this a full second again.
        engine.tick_at(2_000);
        assert_eq!(engine.remaining_secs(), 298);
    }

    #[test]
    fn late_tick_clamps_and_completes_once() {
        let mut engine = work_engine();
        engine.start_at(0);
        engine.tick_at(299_000);
        assert_eq!(engine.remaining_secs(), 1);

        // Tick delivered 2500ms late: floor(2500/1000) = 2 elapsed seconds,
        // remaining floors at 0 and completion fires exactly once.
        let event = engine.tick_at(301_500);
        assert!(matches!(
            event,
            Some(Event::SessionCompleted {
                session_type: SessionType::Work,
                ..
            })
        ));
        assert_eq!(engine.remaining_secs(), 0);
        assert_eq!(engine.status(), TimerStatus::Stopped);

        assert!(engine.tick_at(302_000).is_none());
    }

    #[test]
    fn remaining_is_monotonic_under_jitter() {
        let mut engine = work_engine();
        engine.start_at(0);
        let mut previous = engine.remaining_secs();
        for now in [80, 950, 1_010, 2_700, 2_750, 5_400, 9_999] {
            engine.tick_at(now);
            assert!(engine.remaining_secs() <= previous);
            previous = engine.remaining_secs();
        }
    }

    #[test]
    fn stop_resets_remaining_and_is_idempotent() {
        let mut engine = work_engine();
        engine.start_at(0);
        engine.tick_at(5_000);
        assert_eq!(engine.remaining_secs(), 295);

        assert!(engine.stop().is_some());
        let after_first = engine.clone();

        assert!(engine.stop().is_some());
        assert_eq!(engine, after_first);
        assert_eq!(engine.remaining_secs(), 300);
        assert_eq!(engine.status(), TimerStatus::Stopped);
    }

    #[test]
    fn stale_tick_after_stop_is_a_noop() {
        let mut engine = work_engine();
        engine.start_at(0);
        engine.stop();
        let stopped = engine.clone();
        assert!(engine.tick_at(60_000).is_none());
        assert_eq!(engine, stopped);
    }

    #[test]
    fn start_after_completion_rearms_full_duration() {
        let mut engine = work_engine();
        engine.start_at(0);
        engine.tick_at(300_000);
        assert_eq!(engine.remaining_secs(), 0);

        engine.start_at(300_000);
        assert_eq!(engine.remaining_secs(), 300);
        assert_eq!(engine.status(), TimerStatus::Running);
    }

    #[test]
    fn arm_clamps_duration_and_switches_type() {
        let mut engine = work_engine();
        engine.arm(SessionType::ShortBreak, 30);
        assert_eq!(engine.session_type(), SessionType::ShortBreak);
        assert_eq!(engine.session_duration_secs(), MIN_SESSION_SECS);

        engine.arm(SessionType::Work, 10_000);
        assert_eq!(engine.session_duration_secs(), MAX_SESSION_SECS);
    }

    #[test]
    fn snapshot_reports_display_and_progress() {
        let mut engine = work_engine();
        engine.start_at(0);
        engine.tick_at(60_000);
        match engine.snapshot() {
            Event::StateSnapshot {
                remaining_secs,
                display,
                progress_pct,
                ..
            } => {
                assert_eq!(remaining_secs, 240);
                assert_eq!(display, "04:00");
                assert!((progress_pct - 80.0).abs() < f64::EPSILON);
            }
            _ => panic!("Expected StateSnapshot"),
        }
    }

    #[test]
    fn serde_roundtrip_preserves_state() {
        let mut engine = work_engine();
        engine.start_at(0);
        engine.tick_at(12_345);
        engine.pause_at(13_000);

        let json = serde_json::to_string(&engine).unwrap();
        let restored: TimerEngine = serde_json::from_str(&json).unwrap();
        assert_eq!(engine, restored);
    }
}
