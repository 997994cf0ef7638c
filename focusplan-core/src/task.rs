//! Records the scheduler reads (tasks, events, settings) and writes
//! (updates, continuation inserts).
//!
//! Field names follow the stored row shape so callers can pass rows straight
//! through `serde_json`. Nulls in string and list columns decode as empty.

use serde::{Deserialize, Deserializer, Serialize};

use crate::time::to_minutes;

pub const STATUS_PLANNED: &str = "planned";
pub const STATUS_COMPLETED: &str = "completed";
pub const DEADLINE_HARD: &str = "hard";

pub const DEFAULT_WORK_START: i32 = 9 * 60;
pub const DEFAULT_WORK_END: i32 = 17 * 60;
pub const DEFAULT_BREAK_MINUTES: i32 = 15;
/// Longest break a settings row may ask for: one full day.
pub const MAX_BREAK_MINUTES: i32 = 24 * 60;

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A unit of work, possibly already placed on the calendar.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Task {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub user_id: String,
    pub project_id: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    pub company: Option<String>,
    pub project: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub task_date: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub estimated_hours: f64,
    /// Lower is more urgent.
    #[serde(deserialize_with = "null_as_default")]
    pub priority_level: i32,
    pub deadline_type: Option<String>,
    pub deadline_date: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub dependencies: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub status: String,
    pub notes: Option<String>,
}

impl Task {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            status: STATUS_PLANNED.to_string(),
            ..Self::default()
        }
    }

    pub fn on(mut self, date: impl Into<String>) -> Self {
        self.task_date = date.into();
        self
    }

    pub fn at(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.start_time = Some(start.into());
        self.end_time = Some(end.into());
        self
    }

    pub fn with_hours(mut self, hours: f64) -> Self {
        self.estimated_hours = hours;
        self
    }

    pub fn with_priority(mut self, level: i32) -> Self {
        self.priority_level = level;
        self
    }

    pub fn with_deadline(mut self, kind: Option<&str>, date: impl Into<String>) -> Self {
        self.deadline_type = kind.map(str::to_string);
        self.deadline_date = Some(date.into());
        self
    }

    pub fn depends_on(mut self, ids: &[&str]) -> Self {
        self.dependencies = ids.iter().map(|id| id.to_string()).collect();
        self
    }

    pub fn in_project(mut self, company: impl Into<String>, project: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self.project = Some(project.into());
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    pub fn is_completed(&self) -> bool {
        self.status.eq_ignore_ascii_case(STATUS_COMPLETED)
    }

    /// Both start and end are set.
    pub fn is_placed(&self) -> bool {
        self.start_time.is_some() && self.end_time.is_some()
    }

    pub fn has_hard_deadline(&self) -> bool {
        self.deadline_type.as_deref() == Some(DEADLINE_HARD)
    }

    /// Minutes the engine must place: `ceil(estimated_hours * 60)`.
    pub fn required_minutes(&self) -> i32 {
        (self.estimated_hours * 60.0).ceil() as i32
    }

    /// Composite `company · project` label, with "Unassigned"/"General" for blanks.
    pub fn project_key(&self) -> String {
        let company = non_blank(self.company.as_deref()).unwrap_or("Unassigned");
        let project = non_blank(self.project.as_deref()).unwrap_or("General");
        format!("{company} · {project}")
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Immovable calendar commitment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Event {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub user_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub event_date: String,
    #[serde(deserialize_with = "null_as_default")]
    pub start_time: String,
    #[serde(deserialize_with = "null_as_default")]
    pub end_time: String,
}

impl Event {
    pub fn new(
        date: impl Into<String>,
        start: impl Into<String>,
        end: impl Into<String>,
    ) -> Self {
        Self {
            event_date: date.into(),
            start_time: start.into(),
            end_time: end.into(),
            ..Self::default()
        }
    }
}

/// Working-hours policy, in minutes of the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub work_start_minutes: i32,
    pub work_end_minutes: i32,
    /// Gap inserted after each placed session and after every fixed event.
    pub break_minutes: i32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            work_start_minutes: DEFAULT_WORK_START,
            work_end_minutes: DEFAULT_WORK_END,
            break_minutes: DEFAULT_BREAK_MINUTES,
        }
    }
}

/// Settings as stored: wall-clock strings and a numeric break length.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsRow {
    pub work_start: Option<String>,
    pub work_end: Option<String>,
    pub break_length: Option<f64>,
}

impl Settings {
    /// Each missing field falls back to the default independently.
    pub fn from_row(row: &SettingsRow) -> Self {
        let defaults = Self::default();
        Self {
            work_start_minutes: row
                .work_start
                .as_deref()
                .map_or(defaults.work_start_minutes, to_minutes),
            work_end_minutes: row
                .work_end
                .as_deref()
                .map_or(defaults.work_end_minutes, to_minutes),
            break_minutes: row
                .break_length
                .map_or(defaults.break_minutes, |b| (b as i32).clamp(0, MAX_BREAK_MINUTES)),
        }
    }
}

/// Rewrite of an existing task's first session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Update {
    pub id: String,
    pub task_date: String,
    pub start_time: String,
    pub end_time: String,
}

/// New row for a continuation session of a task that did not fit in one sitting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insert {
    pub user_id: String,
    pub title: String,
    /// Written as `""` when the source task has no label.
    #[serde(default, deserialize_with = "null_as_default")]
    pub company: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub project: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub task_date: String,
    pub start_time: String,
    pub end_time: String,
    pub is_milestone: bool,
    pub estimated_hours: f64,
    pub status: String,
    pub dependencies: Vec<String>,
    pub priority_level: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline_date: Option<String>,
}

impl Insert {
    /// Minutes this continuation occupies.
    pub fn minutes(&self) -> i32 {
        to_minutes(&self.end_time).saturating_sub(to_minutes(&self.start_time))
    }
}

impl Update {
    pub fn minutes(&self) -> i32 {
        to_minutes(&self.end_time).saturating_sub(to_minutes(&self.start_time))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSummary {
    pub updated: usize,
    pub inserted: usize,
}

/// Everything one scheduling run produced, in placement order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleResult {
    pub updates: Vec<Update>,
    pub inserts: Vec<Insert>,
    /// Tasks left when the day loop gave up on a window with no room. Empty in normal runs.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unplaced: Vec<String>,
}

impl ScheduleResult {
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty() && self.inserts.is_empty()
    }

    pub fn summary(&self) -> ScheduleSummary {
        ScheduleSummary {
            updated: self.updates.len(),
            inserted: self.inserts.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_row_with_nulls_deserializes() {
        let row = r#"{
            "id": "t1",
            "user_id": "u1",
            "project_id": null,
            "title": "Write report",
            "company": null,
            "project": "Q3",
            "task_date": "2024-06-10",
            "start_time": null,
            "end_time": null,
            "estimated_hours": 1.5,
            "priority_level": 2,
            "deadline_type": "hard",
            "deadline_date": "2024-06-14",
            "dependencies": null,
            "status": "planned",
            "notes": null,
            "is_milestone": false
        }"#;
        let task: Task = serde_json::from_str(row).unwrap();
        assert_eq!(task.id, "t1");
        assert!(task.dependencies.is_empty());
        assert!(!task.is_placed());
        assert!(task.has_hard_deadline());
        assert_eq!(task.required_minutes(), 90);
        assert_eq!(task.project_key(), "Unassigned · Q3");
    }

    #[test]
    fn completed_status_is_case_insensitive() {
        assert!(Task::new("a", "a").with_status("Completed").is_completed());
        assert!(!Task::new("b", "b").is_completed());
    }

    #[test]
    fn required_minutes_rounds_up() {
        assert_eq!(Task::new("a", "a").with_hours(3.5).required_minutes(), 210);
        assert_eq!(Task::new("b", "b").with_hours(0.01).required_minutes(), 1);
    }

    #[test]
    fn project_key_defaults_blank_labels() {
        let task = Task::new("a", "a").in_project("", "");
        assert_eq!(task.project_key(), "Unassigned · General");
        let task = Task::new("b", "b").in_project("Acme", "Launch");
        assert_eq!(task.project_key(), "Acme · Launch");
    }

    #[test]
    fn settings_row_falls_back_per_field() {
        let row = SettingsRow {
            work_start: Some("08:30".to_string()),
            work_end: None,
            break_length: Some(10.0),
        };
        let settings = Settings::from_row(&row);
        assert_eq!(settings.work_start_minutes, 510);
        assert_eq!(settings.work_end_minutes, DEFAULT_WORK_END);
        assert_eq!(settings.break_minutes, 10);
        assert_eq!(Settings::from_row(&SettingsRow::default()), Settings::default());
    }

    #[test]
    fn insert_omits_absent_optionals() {
        let insert = Insert {
            user_id: "u1".into(),
            title: "x (cont.)".into(),
            company: String::new(),
            project: String::new(),
            project_id: None,
            notes: None,
            task_date: "2024-06-10".into(),
            start_time: "09:00".into(),
            end_time: "10:30".into(),
            is_milestone: false,
            estimated_hours: 1.5,
            status: STATUS_PLANNED.into(),
            dependencies: vec![],
            priority_level: 1,
            deadline_type: None,
            deadline_date: None,
        };
        let json = serde_json::to_value(&insert).unwrap();
        assert!(json.get("notes").is_none());
        assert!(json.get("deadline_date").is_none());
        assert_eq!(json["company"], "");
        assert_eq!(json["project"], "");
        assert_eq!(insert.minutes(), 90);
    }

    #[test]
    fn settings_row_break_is_bounded() {
        let huge = SettingsRow {
            break_length: Some(1e12),
            ..SettingsRow::default()
        };
        assert_eq!(Settings::from_row(&huge).break_minutes, MAX_BREAK_MINUTES);
        let negative = SettingsRow {
            break_length: Some(-20.0),
            ..SettingsRow::default()
        };
        assert_eq!(Settings::from_row(&negative).break_minutes, 0);
    }
}
