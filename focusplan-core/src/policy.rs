//! Tunable constants for a scheduling run.

use serde::{Deserialize, Serialize};

/// Session sizing, focus weighting and safety bounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulePolicy {
    /// Longest single session without a focus key.
    pub chunk_minutes: i32,
    /// Longest single session while a focus key is active.
    pub focus_chunk_minutes: i32,
    /// Consecutive focus sessions allowed before a normal task gets a turn.
    pub focus_burst: u32,
    /// Cap on dependency-resolution passes.
    pub max_resolve_passes: usize,
    /// Consecutive calendar days without a placement before the day loop gives up.
    pub max_horizon_days: u32,
    /// Appended to the notes of every continuation row.
    pub continuation_marker: String,
    /// Appended to the title of every continuation row.
    pub continuation_suffix: String,
}

impl Default for SchedulePolicy {
    fn default() -> Self {
        Self {
            chunk_minutes: 90,
            focus_chunk_minutes: 120,
            focus_burst: 2,
            max_resolve_passes: 10_000,
            max_horizon_days: 366,
            continuation_marker: "[auto-cont]".to_string(),
            continuation_suffix: " (cont.)".to_string(),
        }
    }
}

impl SchedulePolicy {
    /// Session cap for this run, never below one minute.
    pub fn session_cap(&self, focused: bool) -> i32 {
        let cap = if focused {
            self.focus_chunk_minutes
        } else {
            self.chunk_minutes
        };
        cap.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_session_sizes() {
        let policy = SchedulePolicy::default();
        assert_eq!(policy.session_cap(false), 90);
        assert_eq!(policy.session_cap(true), 120);
        assert_eq!(policy.focus_burst, 2);
    }

    #[test]
    fn zero_cap_is_clamped() {
        let policy = SchedulePolicy {
            chunk_minutes: 0,
            ..SchedulePolicy::default()
        };
        assert_eq!(policy.session_cap(false), 1);
    }

    #[test]
    fn partial_policy_fills_defaults() {
        let policy: SchedulePolicy = serde_json::from_str(r#"{"chunk_minutes": 45}"#).unwrap();
        assert_eq!(policy.chunk_minutes, 45);
        assert_eq!(policy.focus_chunk_minutes, 120);
        assert_eq!(policy.continuation_marker, "[auto-cont]");
    }
}
