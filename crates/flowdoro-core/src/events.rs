use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::flow::FlowRating;
use crate::policy::{AdjustmentReason, BreakType};
use crate::timer::{SessionType, TimerStatus};

/// Every state change in the system produces an Event.
/// The CLI prints them; host shells and future GUIs subscribe to them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        session_type: SessionType,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerResumed {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerStopped {
        session_type: SessionType,
        at: DateTime<Utc>,
    },
    /// The countdown reached zero while running.
    SessionCompleted {
        session_type: SessionType,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    /// A completed work session is waiting for a flow rating.
    RatingPrompted {
        at: DateTime<Utc>,
    },
    RatingRecorded {
        rating: FlowRating,
        streak: u32,
        at: DateTime<Utc>,
    },
    /// The duration policy changed the next work duration.
    DurationAdjusted {
        previous_secs: u64,
        new_secs: u64,
        reason: AdjustmentReason,
        at: DateTime<Utc>,
    },
    /// The break policy classified the next break.
    BreakDecided {
        break_type: BreakType,
        duration_secs: u64,
        long_break: bool,
        at: DateTime<Utc>,
    },
    /// The sequencer armed the timer for the next session.
    SessionAdvanced {
        session_type: SessionType,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    BreakSkipped {
        at: DateTime<Utc>,
    },
    StateSnapshot {
        status: TimerStatus,
        session_type: SessionType,
        remaining_secs: u64,
        total_secs: u64,
        display: String,
        progress_pct: f64,
        at: DateTime<Utc>,
    },
}
