//! Next-work-duration rule table.
//!
//! Each rating carries a base increment in seconds. The increment is
//! scaled down for very short or very long current sessions, a capped
//! bonus rewards sustained Flow streaks, and the result is clamped to the
//! configured duration bounds.

use serde::{Deserialize, Serialize};

use crate::flow::FlowRating;

/// Base increments per rating, in seconds.
pub mod increments {
    pub const FLOW: i64 = 25 * 60;
    pub const FOCUSED: i64 = 5 * 60;
    pub const OK: i64 = 3 * 60;
    pub const DISTRACTED: i64 = -2 * 60;
}

/// Sessions shorter than this scale their increment by [`SMALL_SESSION_SCALE`].
const SMALL_SESSION_SECS: u64 = 10 * 60;
/// Sessions at least this long scale their increment by [`LARGE_SESSION_SCALE`].
const LARGE_SESSION_SECS: u64 = 25 * 60;
const SMALL_SESSION_SCALE: f64 = 0.5;
const LARGE_SESSION_SCALE: f64 = 0.25;

/// Per-streak bonus applied to the scaled increment, capped at
/// [`STREAK_BONUS_CAP`] streaks.
const STREAK_BONUS_STEP: f64 = 0.3;
const STREAK_BONUS_CAP: u32 = 3;

/// Which branch of the rule table produced an adjustment.
///
/// Stable per branch; used for display and event payloads, never for
/// control flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentReason {
    FlowExtension,
    FlowStreakBonus,
    FocusIncrease,
    Maintain,
    DistractionReduction,
}

impl std::fmt::Display for AdjustmentReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            AdjustmentReason::FlowExtension => "Extended due to flow state",
            AdjustmentReason::FlowStreakBonus => "Flow streak bonus applied",
            AdjustmentReason::FocusIncrease => "Increased due to good focus",
            AdjustmentReason::Maintain => "Maintained current duration",
            AdjustmentReason::DistractionReduction => "Reduced due to distraction",
        };
        f.write_str(text)
    }
}

/// Result of a duration policy evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationAdjustment {
    pub new_duration_secs: u64,
    pub reason: AdjustmentReason,
}

/// The duration rule table, parameterized over the configured bounds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DurationPolicy {
    min_secs: u64,
    max_secs: u64,
}

impl DurationPolicy {
    /// A policy clamping to `[min_secs, max_secs]`. Inverted bounds are
    /// normalized rather than rejected.
    pub fn new(min_secs: u64, max_secs: u64) -> Self {
        if min_secs <= max_secs {
            Self { min_secs, max_secs }
        } else {
            Self {
                min_secs: max_secs,
                max_secs: min_secs,
            }
        }
    }

    pub fn min_secs(&self) -> u64 {
        self.min_secs
    }

    pub fn max_secs(&self) -> u64 {
        self.max_secs
    }

    /// Compute the next work duration from the rating of the session that
    /// just finished.
    ///
    /// The base increment is scaled by session size first, then the Flow
    /// streak bonus multiplies the scaled increment, flooring to whole
    /// seconds at each step.
    pub fn next_duration(
        &self,
        current_secs: u64,
        rating: FlowRating,
        streak: u32,
    ) -> DurationAdjustment {
        let base = match rating {
            FlowRating::Flow => increments::FLOW,
            FlowRating::Focused => increments::FOCUSED,
            FlowRating::Ok => increments::OK,
            FlowRating::Distracted => increments::DISTRACTED,
        };

        let mut increment = base as f64;
        if current_secs < SMALL_SESSION_SECS {
            increment = (increment * SMALL_SESSION_SCALE).floor();
        } else if current_secs >= LARGE_SESSION_SECS {
            increment = (increment * LARGE_SESSION_SCALE).floor();
        }

        let reason = if rating == FlowRating::Flow && streak > 0 {
            let bonus = streak.min(STREAK_BONUS_CAP) as f64 * STREAK_BONUS_STEP;
            increment = (increment * (1.0 + bonus)).floor();
            AdjustmentReason::FlowStreakBonus
        } else {
            match rating {
                FlowRating::Flow => AdjustmentReason::FlowExtension,
                FlowRating::Focused => AdjustmentReason::FocusIncrease,
                FlowRating::Ok => AdjustmentReason::Maintain,
                FlowRating::Distracted => AdjustmentReason::DistractionReduction,
            }
        };

        let unclamped = current_secs as i64 + increment as i64;
        let new_duration_secs =
            unclamped.clamp(self.min_secs as i64, self.max_secs as i64) as u64;

        DurationAdjustment {
            new_duration_secs,
            reason,
        }
    }
}
