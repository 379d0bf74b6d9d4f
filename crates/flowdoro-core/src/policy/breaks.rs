//! Break requirement rule table.
//!
//! Flow state is protected from interruption until the streak ceiling
//! forces a break; distraction always forces an immediate, longer break;
//! intermediate ratings get a proportional suggestion.

use serde::{Deserialize, Serialize};

use crate::flow::FlowRating;

/// Consecutive Flow sessions allowed before a break becomes required.
pub const MAX_NO_BREAK_SESSIONS: u32 = 4;

/// Break lengths per rating, in seconds.
pub mod break_secs {
    pub const DISTRACTED: u64 = 5 * 60;
    pub const OK: u64 = 3 * 60;
    pub const FOCUSED: u64 = 2 * 60;
    pub const FLOW: u64 = 0;
}

/// How strongly the break should be enforced by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BreakType {
    Optional,
    Suggested,
    Required,
}

/// Result of a break policy evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakDecision {
    pub break_type: BreakType,
    pub duration_secs: u64,
}

/// The break rule table.
pub struct BreakPolicy;

impl BreakPolicy {
    /// Classify the break after a rated work session.
    pub fn decide(rating: FlowRating, streak: u32) -> BreakDecision {
        match rating {
            FlowRating::Flow if streak < MAX_NO_BREAK_SESSIONS => BreakDecision {
                break_type: BreakType::Optional,
                duration_secs: break_secs::FLOW,
            },
            FlowRating::Flow => BreakDecision {
                break_type: BreakType::Required,
                duration_secs: break_secs::FOCUSED,
            },
            FlowRating::Distracted => BreakDecision {
                break_type: BreakType::Required,
                duration_secs: break_secs::DISTRACTED,
            },
            FlowRating::Focused => BreakDecision {
                break_type: BreakType::Suggested,
                duration_secs: break_secs::FOCUSED,
            },
            FlowRating::Ok => BreakDecision {
                break_type: BreakType::Suggested,
                duration_secs: break_secs::OK,
            },
        }
    }

    /// The default decision when no rating was given: a suggested break of
    /// the middle length, with no effect on the streak.
    pub fn unrated() -> BreakDecision {
        BreakDecision {
            break_type: BreakType::Suggested,
            duration_secs: break_secs::OK,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flow_below_ceiling_is_optional() {
        for streak in 0..MAX_NO_BREAK_SESSIONS {
            let decision = BreakPolicy::decide(FlowRating::Flow, streak);
            assert_eq!(decision.break_type, BreakType::Optional);
            assert_eq!(decision.duration_secs, 0);
        }
    }

    #[test]
    fn flow_at_ceiling_requires_break() {
        let decision = BreakPolicy::decide(FlowRating::Flow, MAX_NO_BREAK_SESSIONS);
        assert_eq!(decision.break_type, BreakType::Required);
        assert_eq!(decision.duration_secs, break_secs::FOCUSED);
    }

    #[test]
    fn distracted_always_requires_long_break() {
        for streak in [0, 1, 10, 100] {
            let decision = BreakPolicy::decide(FlowRating::Distracted, streak);
            assert_eq!(decision.break_type, BreakType::Required);
            assert_eq!(decision.duration_secs, 300);
        }
    }

    #[test]
    fn focused_and_ok_suggest_proportional_breaks() {
        let focused = BreakPolicy::decide(FlowRating::Focused, 2);
        assert_eq!(focused.break_type, BreakType::Suggested);
        assert_eq!(focused.duration_secs, break_secs::FOCUSED);

        let ok = BreakPolicy::decide(FlowRating::Ok, 0);
        assert_eq!(ok.break_type, BreakType::Suggested);
        assert_eq!(ok.duration_secs, break_secs::OK);
    }

    #[test]
    fn unrated_defaults_to_suggested() {
        let decision = BreakPolicy::unrated();
        assert_eq!(decision.break_type, BreakType::Suggested);
        assert_eq!(decision.duration_secs, break_secs::OK);
    }
}
