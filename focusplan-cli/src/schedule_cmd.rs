use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Args;
use focusplan_core::time::{parse_day, today_in};
use focusplan_core::{
    Event, OverrunSample, Scheduler, Settings, SettingsRow, Task, WorkWindow,
    average_overrun_minutes, busy_time, inflate_estimates, is_schedulable, prioritize, resolve,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::Config;
use crate::state::{read_json, read_json_or_default, write_output};

#[derive(Args, Debug)]
pub struct ScheduleArgs {
    /// JSON array of task rows
    #[arg(long)]
    pub tasks: PathBuf,

    /// JSON array of calendar event rows
    #[arg(long)]
    pub events: Option<PathBuf>,

    /// Settings row (object, or array whose first row is used); defaults from config.toml
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// JSON array of recent overrun samples, newest first
    #[arg(long)]
    pub overrun_history: Option<PathBuf>,

    /// Composite "Company · Project" label to favour
    #[arg(long)]
    pub focus: Option<String>,

    /// Also move tasks that already have a start and end time
    #[arg(long, default_value_t = false)]
    pub allow_reshuffle: bool,

    /// Ignore tasks and events before this day (default: today in the configured timezone)
    #[arg(long)]
    pub start_day: Option<String>,

    /// Write the full result here instead of stdout
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Print only the updated/inserted counts
    #[arg(long, default_value_t = false)]
    pub summary_only: bool,
}

/// Settings files come either as one row or as a query result array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SettingsFile {
    Rows(Vec<SettingsRow>),
    Row(SettingsRow),
}

fn load_settings(path: Option<&Path>, cfg: &Config) -> Result<Settings> {
    let Some(path) = path else {
        return Ok(cfg.work_hours.settings());
    };
    let row = match read_json::<SettingsFile>(path)? {
        SettingsFile::Row(row) => Some(row),
        SettingsFile::Rows(rows) => rows.into_iter().next(),
    };
    Ok(row.map_or_else(|| cfg.work_hours.settings(), |r| Settings::from_row(&r)))
}

fn resolve_start_day(arg: Option<&str>, cfg: &Config) -> Result<NaiveDate> {
    match arg {
        Some(day) => parse_day(day),
        None => today_in(&cfg.timezone).context("resolve today from config timezone"),
    }
}

fn on_or_after(date: &str, start: NaiveDate) -> bool {
    parse_day(date).is_ok_and(|d| d >= start)
}

/// Keep only rows dated on/after `start`, like the stored-row query would.
pub fn filter_from(tasks: Vec<Task>, events: Vec<Event>, start: NaiveDate) -> (Vec<Task>, Vec<Event>) {
    let tasks = tasks.into_iter().filter(|t| on_or_after(&t.task_date, start)).collect();
    let events = events.into_iter().filter(|e| on_or_after(&e.event_date, start)).collect();
    (tasks, events)
}

pub fn schedule(args: ScheduleArgs, cfg: &Config) -> Result<()> {
    let start = resolve_start_day(args.start_day.as_deref(), cfg)?;
    let tasks: Vec<Task> = read_json(&args.tasks)?;
    let events: Vec<Event> = read_json_or_default(args.events.as_deref())?;
    let settings = load_settings(args.settings.as_deref(), cfg)?;
    let (mut tasks, events) = filter_from(tasks, events, start);

    if let Some(p) = args.overrun_history.as_deref() {
        let samples: Vec<OverrunSample> = read_json(p)?;
        let overrun = average_overrun_minutes(&samples);
        let adjusted = inflate_estimates(&mut tasks, overrun);
        info!(overrun_minutes = overrun, adjusted, "applied overrun history");
    }

    info!(
        start_day = %start,
        tasks = tasks.len(),
        events = events.len(),
        focus = args.focus.as_deref().unwrap_or(""),
        "scheduling"
    );
    let scheduler = Scheduler::new(cfg.policy.clone());
    let result = scheduler.schedule(
        &tasks,
        &events,
        &settings,
        args.focus.as_deref(),
        args.allow_reshuffle,
    );

    let body = if args.summary_only {
        serde_json::to_string_pretty(&result.summary())?
    } else {
        serde_json::to_string_pretty(&result)?
    };
    write_output(args.out.as_deref(), &body)?;
    if args.out.is_some() {
        let summary = result.summary();
        println!("updated={} inserted={}", summary.updated, summary.inserted);
    }
    Ok(())
}

/// Print the order the engine would hand sessions out in.
pub fn queue(tasks_path: &Path, allow_reshuffle: bool, cfg: &Config) -> Result<()> {
    let tasks: Vec<Task> = read_json(tasks_path)?;
    let eligible = tasks.iter().filter(|t| is_schedulable(t, allow_reshuffle));
    let prioritized = prioritize(eligible);
    let resolution = resolve(&prioritized, cfg.policy.max_resolve_passes);

    for (i, t) in resolution.queue.iter().enumerate() {
        println!(
            "{:>3}. [p{}] {} | {} | {:.2}h | deps={}",
            i + 1,
            t.priority_level,
            t.id,
            t.title,
            t.estimated_hours,
            t.dependencies.join(",")
        );
    }
    if !resolution.outcome.is_ordered() {
        println!("\nDependency order not fully enforced: {:?}", resolution.outcome);
    }
    Ok(())
}

/// Print the free intervals for one day.
pub fn free_slots(
    date: &str,
    tasks_path: Option<&Path>,
    events_path: Option<&Path>,
    settings_path: Option<&Path>,
    cfg: &Config,
) -> Result<()> {
    let day = parse_day(date)?;
    let tasks: Vec<Task> = read_json_or_default(tasks_path)?;
    let events: Vec<Event> = read_json_or_default(events_path)?;
    let settings = load_settings(settings_path, cfg)?;

    let busy = busy_time(&tasks, &events, &settings, false);
    let free = busy.free_on(day, WorkWindow::from(&settings));
    if free.is_empty() {
        println!("{day}: no free time");
    }
    for slot in free {
        println!("{day} {slot} ({} min)", slot.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_day_filter_drops_past_and_undated_rows() {
        let start = parse_day("2024-06-10").unwrap();
        let tasks = vec![
            Task::new("old", "old").on("2024-06-07"),
            Task::new("today", "today").on("2024-06-10"),
            Task::new("undated", "undated"),
            Task::new("later", "later").on("2024-06-20"),
        ];
        let events = vec![
            Event::new("2024-06-09", "09:00", "10:00"),
            Event::new("2024-06-11", "09:00", "10:00"),
        ];
        let (tasks, events) = filter_from(tasks, events, start);
        let ids: Vec<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["today", "later"]);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn settings_file_accepts_row_or_rows() {
        let rows: SettingsFile =
            serde_json::from_str(r#"[{"work_start": "10:00", "work_end": "18:00", "break_length": 5}]"#).unwrap();
        assert!(matches!(rows, SettingsFile::Rows(ref r) if r.len() == 1));
        let row: SettingsFile = serde_json::from_str(r#"{"work_start": "10:00"}"#).unwrap();
        assert!(matches!(row, SettingsFile::Row(_)));
    }

    #[test]
    fn explicit_start_day_must_parse() {
        let cfg = Config::default();
        assert!(resolve_start_day(Some("June 10"), &cfg).is_err());
        assert_eq!(
            resolve_start_day(Some("2024-06-10"), &cfg).unwrap(),
            parse_day("2024-06-10").unwrap()
        );
    }
}
