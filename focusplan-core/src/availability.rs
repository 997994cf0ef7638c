//! Free-interval computation for a single day.
//!
//! Busy intervals come in unordered and may overlap; the walk below tolerates
//! both because the cursor only ever moves forward.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::task::Settings;
use crate::time::to_time_string;

/// Half-open `[start, end)` range in minutes of the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Interval {
    pub start: i32,
    pub end: i32,
}

impl Interval {
    pub fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> i32 {
        self.end.saturating_sub(self.start).max(0)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end && other.start < self.end
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", to_time_string(self.start), to_time_string(self.end))
    }
}

/// Working-hours window for a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkWindow {
    pub start: i32,
    pub end: i32,
}

impl From<&Settings> for WorkWindow {
    fn from(settings: &Settings) -> Self {
        Self {
            start: settings.work_start_minutes,
            end: settings.work_end_minutes,
        }
    }
}

/// Subtract `busy` from `window`, returning free intervals in chronological order.
///
/// Zero-length and inverted intervals are never emitted, so an empty window
/// yields no free time at all.
pub fn free_intervals(busy: &[Interval], window: WorkWindow) -> Vec<Interval> {
    if busy.is_empty() {
        return non_empty(vec![Interval::new(window.start, window.end)]);
    }

    let mut sorted = busy.to_vec();
    sorted.sort_by_key(|b| b.start);

    let mut free = Vec::new();
    let mut cursor = window.start;
    for b in &sorted {
        if b.start > cursor {
            free.push(Interval::new(cursor, b.start.min(window.end)));
        }
        cursor = cursor.max(b.end);
        if cursor >= window.end {
            break;
        }
    }
    if cursor < window.end {
        free.push(Interval::new(cursor, window.end));
    }
    non_empty(free)
}

fn non_empty(intervals: Vec<Interval>) -> Vec<Interval> {
    intervals.into_iter().filter(|i| !i.is_empty()).collect()
}

/// Busy intervals accumulated per calendar day.
#[derive(Debug, Clone, Default)]
pub struct BusyCalendar {
    days: HashMap<NaiveDate, Vec<Interval>>,
}

impl BusyCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, date: NaiveDate, interval: Interval) {
        self.days.entry(date).or_default().push(interval);
    }

    pub fn busy_on(&self, date: NaiveDate) -> &[Interval] {
        self.days.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn free_on(&self, date: NaiveDate, window: WorkWindow) -> Vec<Interval> {
        free_intervals(self.busy_on(date), window)
    }
}
