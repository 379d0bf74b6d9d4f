//! Session sequencing and long-break cadence.
//!
//! The sequencer owns the session counters; the engine owns the running
//! countdown. A completed work session latches `pending_rating` until the
//! user answers (or dismisses) the flow prompt, so the cycle never
//! auto-advances past an unrated session.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionType {
    Work,
    ShortBreak,
    LongBreak,
}

impl SessionType {
    pub fn is_break(self) -> bool {
        matches!(self, SessionType::ShortBreak | SessionType::LongBreak)
    }

    pub fn label(self) -> &'static str {
        match self {
            SessionType::Work => "Work",
            SessionType::ShortBreak => "Short Break",
            SessionType::LongBreak => "Long Break",
        }
    }
}

/// Session counters and the long-break cadence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSequencer {
    /// Fully-completed breaks.
    completed_sessions: u32,
    sessions_before_long_break: u32,
    /// True between a finished work session and its recorded rating.
    pending_rating: bool,
}

impl SessionSequencer {
    pub fn new(sessions_before_long_break: u32) -> Self {
        Self {
            completed_sessions: 0,
            // A zero cadence would make every break a long break; treat it
            // as the default instead.
            sessions_before_long_break: if sessions_before_long_break == 0 {
                4
            } else {
                sessions_before_long_break
            },
            pending_rating: false,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn completed_sessions(&self) -> u32 {
        self.completed_sessions
    }

    pub fn sessions_before_long_break(&self) -> u32 {
        self.sessions_before_long_break
    }

    pub fn pending_rating(&self) -> bool {
        self.pending_rating
    }

    pub fn long_break_due(&self) -> bool {
        self.completed_sessions > 0
            && self.completed_sessions % self.sessions_before_long_break == 0
    }

    /// The session type for the next non-optional break.
    pub fn next_break_type(&self) -> SessionType {
        if self.long_break_due() {
            SessionType::LongBreak
        } else {
            SessionType::ShortBreak
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// A work session finished; hold for a rating.
    pub fn on_work_complete(&mut self) {
        self.pending_rating = true;
    }

    /// The rating prompt was answered or dismissed.
    pub fn resolve_rating(&mut self) {
        self.pending_rating = false;
    }

    /// A break finished (or was skipped); counts toward the cadence.
    pub fn on_break_complete(&mut self) {
        self.completed_sessions += 1;
    }

    pub fn set_sessions_before_long_break(&mut self, sessions: u32) {
        if sessions > 0 {
            self.sessions_before_long_break = sessions;
        }
    }
}

impl Default for SessionSequencer {
    fn default() -> Self {
        Self::new(4)
    }
}
