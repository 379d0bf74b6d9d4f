//! Flow rating history and streak tracking.
//!
//! After each completed work session the user reports how it went. The
//! tracker keeps the full rating history for statistics, a bounded view of
//! the most recent ratings for display, and the running Flow streak that
//! drives the duration and break policies.

use serde::{Deserialize, Serialize};

/// How many ratings the "recent sessions" view retains.
const RECENT_RATINGS: usize = 5;

/// Self-reported focus level for a completed work session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowRating {
    Distracted,
    Ok,
    Focused,
    Flow,
}

impl FlowRating {
    /// Human-readable label for prompts and notifications.
    pub fn label(self) -> &'static str {
        match self {
            FlowRating::Distracted => "Distracted",
            FlowRating::Ok => "OK",
            FlowRating::Focused => "Focused",
            FlowRating::Flow => "In Flow",
        }
    }
}

impl std::str::FromStr for FlowRating {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "distracted" => Ok(FlowRating::Distracted),
            "ok" => Ok(FlowRating::Ok),
            "focused" => Ok(FlowRating::Focused),
            "flow" => Ok(FlowRating::Flow),
            other => Err(format!(
                "unknown rating '{other}' (expected distracted, ok, focused or flow)"
            )),
        }
    }
}

/// Progress toward the configured daily flow-session goal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DailyProgress {
    pub current: u32,
    pub goal: u32,
    /// 0.0 when the goal is 0.
    pub percentage: f64,
}

/// Rating history, Flow streak and daily goal progress.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowTracker {
    /// Most recent rating, if any session has been rated yet.
    rating: Option<FlowRating>,
    /// Append-only history, used for average statistics.
    history: Vec<FlowRating>,
    /// Last few ratings for display.
    recent: Vec<FlowRating>,
    /// Consecutive Flow ratings. Resets on any non-Flow rating.
    streak: u32,
    daily_sessions: u32,
    daily_goal: u32,
}

impl FlowTracker {
    pub fn new(daily_goal: u32) -> Self {
        Self {
            rating: None,
            history: Vec::new(),
            recent: Vec::new(),
            streak: 0,
            daily_sessions: 0,
            daily_goal,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn rating(&self) -> Option<FlowRating> {
        self.rating
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    pub fn recent(&self) -> &[FlowRating] {
        &self.recent
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn daily_goal(&self) -> u32 {
        self.daily_goal
    }

    /// Fraction of rated sessions that were Flow, rounded to 2 decimals.
    /// 0.0 when nothing has been rated.
    pub fn average_flow_ratio(&self) -> f64 {
        if self.history.is_empty() {
            return 0.0;
        }
        let flow_count = self
            .history
            .iter()
            .filter(|r| **r == FlowRating::Flow)
            .count();
        let ratio = flow_count as f64 / self.history.len() as f64;
        (ratio * 100.0).round() / 100.0
    }

    pub fn daily_progress(&self) -> DailyProgress {
        let percentage = if self.daily_goal == 0 {
            0.0
        } else {
            self.daily_sessions as f64 / self.daily_goal as f64 * 100.0
        };
        DailyProgress {
            current: self.daily_sessions,
            goal: self.daily_goal,
            percentage,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Record a rating for the just-finished work session.
    ///
    /// A Flow rating extends the streak and counts toward the daily goal;
    /// anything else resets the streak to zero. Returns the updated streak.
    pub fn record_rating(&mut self, rating: FlowRating) -> u32 {
        if rating == FlowRating::Flow {
            self.streak += 1;
            self.daily_sessions += 1;
        } else {
            self.streak = 0;
        }
        self.rating = Some(rating);
        self.history.push(rating);
        self.recent.push(rating);
        if self.recent.len() > RECENT_RATINGS {
            let overflow = self.recent.len() - RECENT_RATINGS;
            self.recent.drain(..overflow);
        }
        self.streak
    }

    pub fn set_daily_goal(&mut self, goal: u32) {
        self.daily_goal = goal;
    }

    /// Zero the daily session count. The host calls this on day rollover.
    pub fn reset_daily(&mut self) {
        self.daily_sessions = 0;
    }
}

impl Default for FlowTracker {
    fn default() -> Self {
        Self::new(3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flow_rating_extends_streak() {
        let mut tracker = FlowTracker::default();
        assert_eq!(tracker.record_rating(FlowRating::Flow), 1);
        assert_eq!(tracker.record_rating(FlowRating::Flow), 2);
        assert_eq!(tracker.streak(), 2);
    }

    #[test]
    fn non_flow_rating_resets_streak() {
        let mut tracker = FlowTracker::default();
        for _ in 0..5 {
            tracker.record_rating(FlowRating::Flow);
        }
        assert_eq!(tracker.record_rating(FlowRating::Ok), 0);
        assert_eq!(tracker.streak(), 0);
    }

    #[test]
    fn recent_view_keeps_last_five() {
        let mut tracker = FlowTracker::default();
        for _ in 0..4 {
            tracker.record_rating(FlowRating::Distracted);
        }
        for _ in 0..3 {
            tracker.record_rating(FlowRating::Flow);
        }
        assert_eq!(tracker.recent().len(), 5);
        assert_eq!(tracker.recent()[4], FlowRating::Flow);
        assert_eq!(tracker.recent()[0], FlowRating::Distracted);
        assert_eq!(tracker.history_len(), 7);
    }

    #[test]
    fn average_flow_ratio_rounds_to_two_decimals() {
        let mut tracker = FlowTracker::default();
        assert_eq!(tracker.average_flow_ratio(), 0.0);

        tracker.record_rating(FlowRating::Flow);
        tracker.record_rating(FlowRating::Ok);
        tracker.record_rating(FlowRating::Distracted);
        // 1/3 = 0.333... -> 0.33
        assert_eq!(tracker.average_flow_ratio(), 0.33);
    }

    #[test]
    fn daily_progress_counts_flow_sessions_only() {
        let mut tracker = FlowTracker::new(3);
        tracker.record_rating(FlowRating::Flow);
        tracker.record_rating(FlowRating::Focused);
        tracker.record_rating(FlowRating::Flow);

        let progress = tracker.daily_progress();
        assert_eq!(progress.current, 2);
        assert_eq!(progress.goal, 3);
        assert!((progress.percentage - 66.666).abs() < 0.01);
    }

    #[test]
    fn daily_progress_zero_goal_is_guarded() {
        let mut tracker = FlowTracker::new(0);
        tracker.record_rating(FlowRating::Flow);
        assert_eq!(tracker.daily_progress().percentage, 0.0);
    }

    #[test]
    fn reset_daily_zeroes_count_but_keeps_streak() {
        let mut tracker = FlowTracker::default();
        tracker.record_rating(FlowRating::Flow);
        tracker.record_rating(FlowRating::Flow);
        tracker.reset_daily();
        assert_eq!(tracker.daily_progress().current, 0);
        assert_eq!(tracker.streak(), 2);
    }

    #[test]
    fn rating_parses_case_insensitively() {
        assert_eq!("Flow".parse::<FlowRating>().unwrap(), FlowRating::Flow);
        assert_eq!("OK".parse::<FlowRating>().unwrap(), FlowRating::Ok);
        assert!("meh".parse::<FlowRating>().is_err());
    }
}
