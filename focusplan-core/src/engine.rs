//! Auto-scheduler: places pending tasks into free weekday working time.
//!
//! One run is a pure function of its inputs:
//! 1. filter schedulable tasks
//! 2. collect busy time (placed tasks that stay put, events plus a break)
//! 3. prioritize, then dependency-order, then split into focus/normal lanes
//! 4. walk weekdays from the first input task's date, filling each free
//!    interval session by session until both lanes are empty
//!
//! Sessions are capped at the policy's chunk size. The first session of a task
//! becomes an [`Update`]; every later one becomes a continuation [`Insert`].

use chrono::NaiveDate;
use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::availability::{BusyCalendar, Interval, WorkWindow};
use crate::dependency::{self, ResolveOutcome};
use crate::policy::SchedulePolicy;
use crate::prioritizer;
use crate::session_queue::{QueueEntry, SessionQueues};
use crate::task::{Event, Insert, STATUS_PLANNED, ScheduleResult, Settings, Task, Update};
use crate::time::{format_date, parse_date, shift_days, snap_to_weekday, to_minutes, to_time_string};

/// Schedule with the default policy.
pub fn auto_schedule(
    tasks: &[Task],
    events: &[Event],
    settings: &Settings,
    focus_key: Option<&str>,
    allow_reshuffle: bool,
) -> ScheduleResult {
    Scheduler::default().schedule(tasks, events, settings, focus_key, allow_reshuffle)
}

/// A task is eligible when it has work left and is either unplaced or reshuffling is allowed.
pub fn is_schedulable(task: &Task, allow_reshuffle: bool) -> bool {
    task.estimated_hours > 0.0 && !task.is_completed() && (allow_reshuffle || !task.is_placed())
}

#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    policy: SchedulePolicy,
}

impl Scheduler {
    pub fn new(policy: SchedulePolicy) -> Self {
        Self { policy }
    }

    pub fn schedule(
        &self,
        tasks: &[Task],
        events: &[Event],
        settings: &Settings,
        focus_key: Option<&str>,
        allow_reshuffle: bool,
    ) -> ScheduleResult {
        let schedulable: Vec<&Task> = tasks
            .iter()
            .filter(|t| is_schedulable(t, allow_reshuffle))
            .collect();
        let Some(first) = tasks.first() else {
            return ScheduleResult::default();
        };
        if schedulable.is_empty() {
            debug!(total = tasks.len(), "no schedulable tasks");
            return ScheduleResult::default();
        }

        let busy = busy_time(tasks, events, settings, allow_reshuffle);
        let queues = self.build_queues(&schedulable, focus_key);

        let mut run = Run {
            policy: &self.policy,
            window: WorkWindow::from(settings),
            break_minutes: settings.break_minutes.max(0),
            session_cap: self.policy.session_cap(queues.is_focused()),
            queues,
            busy,
            result: ScheduleResult::default(),
        };
        run.fill_from(parse_date(&first.task_date));

        let summary = run.result.summary();
        info!(
            schedulable = schedulable.len(),
            updated = summary.updated,
            inserted = summary.inserted,
            unplaced = run.result.unplaced.len(),
            "auto-schedule complete"
        );
        run.result
    }

    fn build_queues<'a>(&self, schedulable: &[&'a Task], focus_key: Option<&str>) -> SessionQueues<'a> {
        let prioritized = prioritizer::prioritize(schedulable.iter().copied());
        let resolution = dependency::resolve(&prioritized, self.policy.max_resolve_passes);
        match resolution.outcome {
            ResolveOutcome::Ordered => {}
            ResolveOutcome::Stalled { unresolved } => {
                warn!(unresolved, "dependency cycle or unresolvable chain; scheduling leftovers unordered");
            }
            ResolveOutcome::PassLimit { unresolved } => {
                warn!(
                    unresolved,
                    passes = resolution.passes,
                    "dependency pass limit hit; scheduling leftovers unordered"
                );
            }
        }

        let mut queues = SessionQueues::new(focus_key, self.policy.focus_burst);
        for task in resolution.queue {
            queues.push(QueueEntry::new(task));
        }
        queues
    }
}

/// Busy time for a run, keyed by day.
///
/// Placed tasks that this run will not move block their slot; every event
/// blocks its slot plus a trailing break.
pub fn busy_time(
    tasks: &[Task],
    events: &[Event],
    settings: &Settings,
    allow_reshuffle: bool,
) -> BusyCalendar {
    let break_minutes = settings.break_minutes.max(0);
    let moving: HashSet<&str> = tasks
        .iter()
        .filter(|t| is_schedulable(t, allow_reshuffle))
        .map(|t| t.id.as_str())
        .collect();
    let mut busy = BusyCalendar::new();

    for task in tasks {
        let (Some(start), Some(end)) = (&task.start_time, &task.end_time) else {
            continue;
        };
        if moving.contains(task.id.as_str()) {
            continue;
        }
        busy.add(
            parse_date(&task.task_date),
            Interval::new(to_minutes(start), to_minutes(end)),
        );
    }
    for event in events {
        busy.add(
            parse_date(&event.event_date),
            Interval::new(
                to_minutes(&event.start_time),
                to_minutes(&event.end_time).saturating_add(break_minutes),
            ),
        );
    }
    busy
}

/// Mutable state of one scheduling run.
struct Run<'p, 'a> {
    policy: &'p SchedulePolicy,
    window: WorkWindow,
    break_minutes: i32,
    session_cap: i32,
    queues: SessionQueues<'a>,
    busy: BusyCalendar,
    result: ScheduleResult,
}

impl Run<'_, '_> {
    /// Walk weekdays from `anchor` until both lanes drain.
    ///
    /// Gives up once `max_horizon_days` calendar days in a row pass without a
    /// single placement.
    fn fill_from(&mut self, anchor: NaiveDate) {
        let mut day = anchor;
        let mut idle_days: u32 = 0;

        while !self.queues.is_empty() {
            let weekday = snap_to_weekday(day);
            let skipped = u32::try_from((weekday - day).num_days()).unwrap_or(u32::MAX);
            idle_days = idle_days.saturating_add(skipped);
            day = weekday;
            if idle_days >= self.policy.max_horizon_days {
                self.give_up(day, idle_days);
                return;
            }

            let mut placed = 0;
            for slot in self.busy.free_on(day, self.window) {
                placed += self.fill_slot(day, slot);
            }
            if placed == 0 {
                debug!(date = %day, "nothing placed");
                idle_days = idle_days.saturating_add(1);
            } else {
                idle_days = 0;
            }

            let next = shift_days(day, 1);
            if next == day {
                self.give_up(day, idle_days);
                return;
            }
            day = next;
        }
    }

    /// Returns how many sessions were placed in `slot`.
    fn fill_slot(&mut self, day: NaiveDate, slot: Interval) -> usize {
        let mut placed = 0;
        let mut at = slot.start;
        while at < slot.end {
            let Some((mut entry, lane)) = self.queues.pop_next() else {
                break;
            };

            let minutes = entry
                .remaining_minutes
                .min(self.session_cap)
                .min(slot.end.saturating_sub(at));
            let end = at + minutes;
            debug!(
                task_id = %entry.task.id,
                date = %day,
                start = %to_time_string(at),
                end = %to_time_string(end),
                ?lane,
                first = entry.first_session,
                "placed session"
            );
            if entry.first_session {
                self.result.updates.push(Update {
                    id: entry.task.id.clone(),
                    task_date: format_date(day),
                    start_time: to_time_string(at),
                    end_time: to_time_string(end),
                });
                entry.first_session = false;
            } else {
                let insert = continuation(entry.task, day, at, end, self.policy);
                self.result.inserts.push(insert);
            }

            entry.remaining_minutes -= minutes;
            let resume = end.saturating_add(self.break_minutes);
            at = if resume <= slot.end { resume } else { slot.end };

            placed += 1;
            if entry.remaining_minutes > 0 {
                self.queues.push(entry);
            }
        }
        placed
    }

    fn give_up(&mut self, day: NaiveDate, idle_days: u32) {
        let unplaced: Vec<String> = self.queues.drain().map(|e| e.task.id.clone()).collect();
        warn!(
            idle_days,
            stopped_at = %day,
            unplaced = unplaced.len(),
            "no free time within the horizon; giving up with work left"
        );
        self.result.unplaced = unplaced;
    }
}

/// New row for a later session of `task`.
fn continuation(task: &Task, day: NaiveDate, start: i32, end: i32, policy: &SchedulePolicy) -> Insert {
    let marker = &policy.continuation_marker;
    let notes = match &task.notes {
        Some(existing) => format!("{existing}\n{marker}"),
        None => marker.clone(),
    };
    Insert {
        user_id: task.user_id.clone(),
        title: format!("{}{}", task.title, policy.continuation_suffix),
        company: task.company.clone().unwrap_or_default(),
        project: task.project.clone().unwrap_or_default(),
        project_id: task.project_id.clone(),
        notes: Some(notes),
        task_date: format_date(day),
        start_time: to_time_string(start),
        end_time: to_time_string(end),
        is_milestone: false,
        estimated_hours: f64::from(end - start) / 60.0,
        status: STATUS_PLANNED.to_string(),
        dependencies: Vec::new(),
        priority_level: task.priority_level,
        deadline_type: task.deadline_type.clone(),
        deadline_date: task.deadline_date.clone(),
    }
}
