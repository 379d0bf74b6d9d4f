//! Session orchestration.
//!
//! [`FlowTimer`] wires the engine, flow tracker, sequencer and policies
//! together behind the public operation surface. All collaborators are
//! injected; every public operation returns the typed events it produced,
//! notifies the host collaborators fire-and-forget, and snapshots state to
//! the store before returning. None of the operations can fail -- broken
//! collaborators are logged and the timer keeps going.

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::events::Event;
use crate::flow::{FlowRating, FlowTracker};
use crate::hooks::{Notifier, SignalHook};
use crate::policy::{BreakPolicy, BreakType, DurationPolicy};
use crate::storage::StateStore;
use crate::timer::{SessionSequencer, SessionType, TimerEngine};

const KEY_TIMER: &str = "timer_engine";
const KEY_FLOW: &str = "flow_tracker";
const KEY_SESSION: &str = "session_sequencer";
const KEY_PREFS: &str = "preferences";

/// User duration preferences, in seconds. `work_duration_secs` is the
/// adaptive slot the duration policy writes back to after every rating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationPreferences {
    pub work_duration_secs: u64,
    pub short_break_secs: u64,
    pub long_break_secs: u64,
    pub minimum_secs: u64,
    pub maximum_secs: u64,
}

impl Default for DurationPreferences {
    fn default() -> Self {
        Self {
            work_duration_secs: 25 * 60,
            short_break_secs: 5 * 60,
            long_break_secs: 15 * 60,
            minimum_secs: 2 * 60,
            maximum_secs: 50 * 60,
        }
    }
}

/// Everything the controller needs from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerSettings {
    pub prefs: DurationPreferences,
    pub sessions_before_long_break: u32,
    pub daily_flow_goal: u32,
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            prefs: DurationPreferences::default(),
            sessions_before_long_break: 4,
            daily_flow_goal: 3,
        }
    }
}

/// The adaptive timer: one engine, one tracker, one sequencer.
pub struct FlowTimer {
    engine: TimerEngine,
    flow: FlowTracker,
    sequencer: SessionSequencer,
    prefs: DurationPreferences,
    store: Box<dyn StateStore>,
    notifier: Box<dyn Notifier>,
    signals: Box<dyn SignalHook>,
    config_error: bool,
}

impl FlowTimer {
    /// Build a timer from settings, restoring any snapshot the store holds.
    ///
    /// Configuration wins for bounds, break lengths, cadence and goal; the
    /// persisted adaptive work duration survives restarts (clamped to the
    /// configured bounds). Absent or corrupt snapshots fall back to
    /// defaults.
    pub fn new(
        settings: TimerSettings,
        store: Box<dyn StateStore>,
        notifier: Box<dyn Notifier>,
        signals: Box<dyn SignalHook>,
    ) -> Self {
        let mut prefs = settings.prefs.clone();
        if let Some(saved) = restore::<DurationPreferences>(store.as_ref(), KEY_PREFS) {
            prefs.work_duration_secs = saved
                .work_duration_secs
                .clamp(prefs.minimum_secs, prefs.maximum_secs);
        }

        let engine = restore::<TimerEngine>(store.as_ref(), KEY_TIMER)
            .unwrap_or_else(|| TimerEngine::new(SessionType::Work, prefs.work_duration_secs));

        let mut flow = restore::<FlowTracker>(store.as_ref(), KEY_FLOW).unwrap_or_default();
        flow.set_daily_goal(settings.daily_flow_goal);

        let mut sequencer =
            restore::<SessionSequencer>(store.as_ref(), KEY_SESSION).unwrap_or_default();
        sequencer.set_sessions_before_long_break(settings.sessions_before_long_break);

        Self {
            engine,
            flow,
            sequencer,
            prefs,
            store,
            notifier,
            signals,
            config_error: false,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn engine(&self) -> &TimerEngine {
        &self.engine
    }

    pub fn flow(&self) -> &FlowTracker {
        &self.flow
    }

    pub fn sequencer(&self) -> &SessionSequencer {
        &self.sequencer
    }

    pub fn preferences(&self) -> &DurationPreferences {
        &self.prefs
    }

    pub fn pending_rating(&self) -> bool {
        self.sequencer.pending_rating()
    }

    pub fn snapshot(&self) -> Event {
        self.engine.snapshot()
    }

    /// Whether configuration failed to load and defaults are in effect.
    pub fn config_error(&self) -> bool {
        self.config_error
    }

    pub fn set_config_error(&mut self, failed: bool) {
        self.config_error = failed;
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Option<Event> {
        self.start_at(now_ms())
    }

    pub fn start_at(&mut self, now_epoch_ms: u64) -> Option<Event> {
        let event = self.engine.start_at(now_epoch_ms)?;
        self.fire(self.signals.on_start(), "on_start");
        self.persist();
        Some(event)
    }

    pub fn pause(&mut self) -> Option<Event> {
        self.pause_at(now_ms())
    }

    pub fn pause_at(&mut self, now_epoch_ms: u64) -> Option<Event> {
        let event = self.engine.pause_at(now_epoch_ms)?;
        self.fire(self.signals.on_pause(), "on_pause");
        self.persist();
        Some(event)
    }

    pub fn resume(&mut self) -> Option<Event> {
        self.resume_at(now_ms())
    }

    pub fn resume_at(&mut self, now_epoch_ms: u64) -> Option<Event> {
        let event = self.engine.resume_at(now_epoch_ms)?;
        self.fire(self.signals.on_resume(), "on_resume");
        self.persist();
        Some(event)
    }

    /// Stop and reset the countdown. Idempotent.
    pub fn stop(&mut self) -> Option<Event> {
        let event = self.engine.stop();
        self.fire(self.signals.on_stop(), "on_stop");
        self.persist();
        event
    }

    pub fn tick(&mut self) -> Vec<Event> {
        self.tick_at(now_ms())
    }

    /// Drive the countdown. On completion of a work session the rating
    /// prompt opens; on completion of a break the cadence advances and the
    /// next work session is armed.
    pub fn tick_at(&mut self, now_epoch_ms: u64) -> Vec<Event> {
        let Some(completed) = self.engine.tick_at(now_epoch_ms) else {
            return Vec::new();
        };
        let session_type = match completed {
            Event::SessionCompleted { session_type, .. } => session_type,
            _ => return vec![completed],
        };

        let mut events = vec![completed];
        match session_type {
            SessionType::Work => {
                self.sequencer.on_work_complete();
                self.notify(
                    "Work Session Complete!",
                    "Time for a break! Keep up the good work!",
                );
                events.push(Event::RatingPrompted { at: Utc::now() });
            }
            SessionType::ShortBreak | SessionType::LongBreak => {
                self.notify("Break Time Over", "Ready to get back to work?");
                self.sequencer.on_break_complete();
                self.engine
                    .arm(SessionType::Work, self.prefs.work_duration_secs);
                events.push(Event::SessionAdvanced {
                    session_type: SessionType::Work,
                    duration_secs: self.engine.session_duration_secs(),
                    at: Utc::now(),
                });
            }
        }
        self.persist();
        events
    }

    /// Answer the flow prompt for the just-finished work session.
    ///
    /// Updates the streak, adjusts the next work duration, decides the
    /// break, and arms the engine for whatever comes next. A rating with
    /// no pending prompt is a no-op.
    pub fn record_rating(&mut self, rating: FlowRating) -> Vec<Event> {
        if !self.sequencer.pending_rating() {
            return Vec::new();
        }

        let streak = self.flow.record_rating(rating);
        let previous_secs = self.prefs.work_duration_secs;
        let policy = DurationPolicy::new(self.prefs.minimum_secs, self.prefs.maximum_secs);
        let adjustment = policy.next_duration(previous_secs, rating, streak);
        self.prefs.work_duration_secs = adjustment.new_duration_secs;

        let decision = BreakPolicy::decide(rating, streak);
        self.sequencer.resolve_rating();

        let mut events = vec![
            Event::RatingRecorded {
                rating,
                streak,
                at: Utc::now(),
            },
            Event::DurationAdjusted {
                previous_secs,
                new_secs: adjustment.new_duration_secs,
                reason: adjustment.reason,
                at: Utc::now(),
            },
            Event::BreakDecided {
                break_type: decision.break_type,
                duration_secs: decision.duration_secs,
                long_break: self.sequencer.long_break_due(),
                at: Utc::now(),
            },
        ];

        if decision.break_type != BreakType::Optional {
            let next = self.sequencer.next_break_type();
            self.engine.arm(next, decision.duration_secs);
            events.push(Event::SessionAdvanced {
                session_type: next,
                duration_secs: self.engine.session_duration_secs(),
                at: Utc::now(),
            });
        } else {
            // Flow continuation: straight into the next work session.
            self.engine
                .arm(SessionType::Work, adjustment.new_duration_secs);
            events.push(Event::SessionAdvanced {
                session_type: SessionType::Work,
                duration_secs: self.engine.session_duration_secs(),
                at: Utc::now(),
            });
        }

        self.persist();
        events
    }

    /// Close the flow prompt without an answer: no streak change, no
    /// duration adjustment, default suggested break.
    pub fn dismiss_rating(&mut self) -> Vec<Event> {
        if !self.sequencer.pending_rating() {
            return Vec::new();
        }

        let decision = BreakPolicy::unrated();
        self.sequencer.resolve_rating();
        let next = self.sequencer.next_break_type();
        self.engine.arm(next, decision.duration_secs);

        let events = vec![
            Event::BreakDecided {
                break_type: decision.break_type,
                duration_secs: decision.duration_secs,
                long_break: self.sequencer.long_break_due(),
                at: Utc::now(),
            },
            Event::SessionAdvanced {
                session_type: next,
                duration_secs: self.engine.session_duration_secs(),
                at: Utc::now(),
            },
        ];
        self.persist();
        events
    }

    /// Skip an armed break. Counts toward the long-break cadence so
    /// skipping cannot postpone long breaks forever.
    pub fn skip_break(&mut self) -> Vec<Event> {
        if !self.engine.session_type().is_break() {
            return Vec::new();
        }

        self.fire(self.signals.on_skip_break(), "on_skip_break");
        self.sequencer.on_break_complete();
        self.engine
            .arm(SessionType::Work, self.prefs.work_duration_secs);

        let events = vec![
            Event::BreakSkipped { at: Utc::now() },
            Event::SessionAdvanced {
                session_type: SessionType::Work,
                duration_secs: self.engine.session_duration_secs(),
                at: Utc::now(),
            },
        ];
        self.persist();
        events
    }

    /// Zero the daily flow counter (host-driven day rollover).
    pub fn reset_daily(&mut self) {
        self.flow.reset_daily();
        self.persist();
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn fire(&self, result: Result<(), Box<dyn std::error::Error>>, name: &str) {
        if let Err(e) = result {
            debug!("signal {name} failed: {e}");
        }
    }

    fn notify(&self, title: &str, body: &str) {
        if let Err(e) = self.notifier.notify(title, body) {
            warn!("notification failed: {e}");
        }
    }

    fn persist(&self) {
        self.save_snapshot(KEY_TIMER, &self.engine);
        self.save_snapshot(KEY_FLOW, &self.flow);
        self.save_snapshot(KEY_SESSION, &self.sequencer);
        self.save_snapshot(KEY_PREFS, &self.prefs);
    }

    fn save_snapshot<T: Serialize>(&self, key: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(json) => {
                if let Err(e) = self.store.save(key, &json) {
                    warn!("failed to persist {key}: {e}");
                }
            }
            Err(e) => warn!("failed to serialize {key}: {e}"),
        }
    }
}

fn restore<T: DeserializeOwned>(store: &dyn StateStore, key: &str) -> Option<T> {
    let json = store.load(key)?;
    match serde_json::from_str(&json) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("corrupt snapshot under '{key}', using defaults: {e}");
            None
        }
    }
}

fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
