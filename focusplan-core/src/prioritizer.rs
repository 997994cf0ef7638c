//! Task ordering for the scheduling queue.
//!
//! Ranking (first level that discriminates wins):
//! - priority_level ASC
//! - deadline score ASC (no deadline scores as the sentinel date, i.e. first)
//! - hard deadline before soft/absent
//! - estimated_hours ASC
//!
//! Anything still tied keeps its input order.

use chrono::NaiveDate;
use std::cmp::Ordering;

use crate::task::Task;
use crate::time::{DATE_FORMAT, sentinel_date};

/// Sort key from a task's deadline date.
///
/// Absent or unparseable deadlines score as the sentinel, which is earlier than
/// any real date. That puts undated tasks ahead of dated ones at equal priority.
// TODO: confirm with product whether undated work should really outrank dated work.
pub fn deadline_score(task: &Task) -> NaiveDate {
    task.deadline_date
        .as_deref()
        .filter(|d| !d.is_empty())
        .and_then(|d| NaiveDate::parse_from_str(d, DATE_FORMAT).ok())
        .unwrap_or_else(sentinel_date)
}

pub fn compare_tasks(a: &Task, b: &Task) -> Ordering {
    a.priority_level
        .cmp(&b.priority_level)
        .then_with(|| deadline_score(a).cmp(&deadline_score(b)))
        // true sorts first
        .then_with(|| b.has_hard_deadline().cmp(&a.has_hard_deadline()))
        .then_with(|| a.estimated_hours.total_cmp(&b.estimated_hours))
}

/// Borrowing sort; the input slice is left untouched.
pub fn prioritize<'a, I>(tasks: I) -> Vec<&'a Task>
where
    I: IntoIterator<Item = &'a Task>,
{
    let mut ordered: Vec<&Task> = tasks.into_iter().collect();
    ordered.sort_by(|a, b| compare_tasks(a, b));
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(tasks: &[&Task]) -> Vec<String> {
        tasks.iter().map(|t| t.id.clone()).collect()
    }

    #[test]
    fn priority_level_dominates() {
        let tasks = vec![
            Task::new("low", "low").with_priority(3),
            Task::new("high", "high").with_priority(1).with_deadline(None, "2030-01-01"),
        ];
        assert_eq!(ids(&prioritize(&tasks)), vec!["high", "low"]);
    }

    #[test]
    fn earlier_deadline_first() {
        let tasks = vec![
            Task::new("later", "later").with_deadline(None, "2024-07-01"),
            Task::new("sooner", "sooner").with_deadline(None, "2024-06-12"),
        ];
        assert_eq!(ids(&prioritize(&tasks)), vec!["sooner", "later"]);
    }

    #[test]
    fn undated_task_outranks_dated_task() {
        let tasks = vec![
            Task::new("dated", "dated").with_deadline(Some("hard"), "2024-06-11"),
            Task::new("undated", "undated"),
        ];
        assert_eq!(ids(&prioritize(&tasks)), vec!["undated", "dated"]);
    }

    #[test]
    fn garbage_deadline_scores_like_none() {
        let bad = Task::new("bad", "bad").with_deadline(None, "someday");
        assert_eq!(deadline_score(&bad), sentinel_date());
    }

    #[test]
    fn hard_deadline_breaks_date_tie() {
        let tasks = vec![
            Task::new("soft", "soft").with_deadline(Some("soft"), "2024-06-14"),
            Task::new("hard", "hard").with_deadline(Some("hard"), "2024-06-14"),
        ];
        assert_eq!(ids(&prioritize(&tasks)), vec!["hard", "soft"]);
    }

    #[test]
    fn shorter_task_breaks_final_tie() {
        let tasks = vec![
            Task::new("long", "long").with_hours(3.0),
            Task::new("short", "short").with_hours(0.5),
            Task::new("mid", "mid").with_hours(1.0),
        ];
        assert_eq!(ids(&prioritize(&tasks)), vec!["short", "mid", "long"]);
    }

    #[test]
    fn full_ties_keep_input_order() {
        let tasks = vec![
            Task::new("first", "a").with_hours(1.0),
            Task::new("second", "b").with_hours(1.0),
        ];
        assert_eq!(ids(&prioritize(&tasks)), vec!["first", "second"]);
    }
}
