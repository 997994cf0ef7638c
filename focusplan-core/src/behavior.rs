//! Estimate inflation from recorded overruns.
//!
//! Applied by the caller before scheduling: if recent work has been running
//! long, every pending estimate grows by the average overrun.

use serde::{Deserialize, Serialize};

use crate::task::Task;

/// How many of the most recent samples feed the average.
pub const OVERRUN_WINDOW: usize = 20;

/// One completed-task record. Only the overrun matters here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverrunSample {
    pub task_id: Option<String>,
    pub overrun_minutes: i32,
}

/// Mean overrun over the newest [`OVERRUN_WINDOW`] samples (newest first).
///
/// Integer division, so the result truncates toward zero. No samples means 0.
pub fn average_overrun_minutes(samples: &[OverrunSample]) -> i32 {
    let recent = &samples[..samples.len().min(OVERRUN_WINDOW)];
    if recent.is_empty() {
        return 0;
    }
    let total: i64 = recent.iter().map(|s| i64::from(s.overrun_minutes)).sum();
    let mean = total / recent.len() as i64;
    i32::try_from(mean).unwrap_or(0)
}

/// Grow every positive estimate by `minutes`. Non-positive `minutes` is a no-op.
///
/// Returns how many tasks were adjusted.
pub fn inflate_estimates(tasks: &mut [Task], minutes: i32) -> usize {
    if minutes <= 0 {
        return 0;
    }
    let extra_hours = f64::from(minutes) / 60.0;
    let mut adjusted = 0;
    for task in tasks.iter_mut().filter(|t| t.estimated_hours > 0.0) {
        task.estimated_hours += extra_hours;
        adjusted += 1;
    }
    adjusted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples(values: &[i32]) -> Vec<OverrunSample> {
        values
            .iter()
            .map(|&m| OverrunSample {
                task_id: None,
                overrun_minutes: m,
            })
            .collect()
    }

    #[test]
    fn average_truncates() {
        assert_eq!(average_overrun_minutes(&samples(&[10, 15])), 12);
        assert_eq!(average_overrun_minutes(&samples(&[-10, 5])), -2);
        assert_eq!(average_overrun_minutes(&[]), 0);
    }

    #[test]
    fn only_newest_twenty_count() {
        let mut values = vec![30; OVERRUN_WINDOW];
        values.extend([600, 600, 600]);
        assert_eq!(average_overrun_minutes(&samples(&values)), 30);
    }

    #[test]
    fn extreme_samples_do_not_overflow_the_sum() {
        let values = vec![i32::MAX; OVERRUN_WINDOW];
        assert_eq!(average_overrun_minutes(&samples(&values)), i32::MAX);
        assert_eq!(average_overrun_minutes(&samples(&[i32::MIN, i32::MIN])), i32::MIN);
    }

    #[test]
    fn inflation_skips_unestimated_tasks() {
        let mut tasks = vec![
            Task::new("a", "a").with_hours(1.0),
            Task::new("b", "b"),
        ];
        assert_eq!(inflate_estimates(&mut tasks, 30), 1);
        assert_eq!(tasks[0].estimated_hours, 1.5);
        assert_eq!(tasks[1].estimated_hours, 0.0);
    }

    #[test]
    fn non_positive_overrun_changes_nothing() {
        let mut tasks = vec![Task::new("a", "a").with_hours(1.0)];
        assert_eq!(inflate_estimates(&mut tasks, -5), 0);
        assert_eq!(tasks[0].estimated_hours, 1.0);
    }

    #[test]
    fn sample_rows_decode_with_extra_columns() {
        let rows: Vec<OverrunSample> = serde_json::from_str(
            r#"[{"user_id": "u1", "task_id": "t1", "overrun_minutes": 12, "end_time": "10:00"}]"#,
        )
        .unwrap();
        assert_eq!(rows[0].overrun_minutes, 12);
    }
}
