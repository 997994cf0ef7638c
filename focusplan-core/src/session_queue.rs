//! Focus/normal work queues with burst-weighted interleaving.
//!
//! Without a focus key every entry lives in the normal lane and the queues
//! behave as a single FIFO. With a focus key, entries whose project key
//! matches go to the focus lane and selection prefers it for up to `burst`
//! consecutive sessions before a normal entry gets a turn.

use std::collections::VecDeque;

use crate::task::Task;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lane {
    Focus,
    Normal,
}

/// A task with minutes still to place.
#[derive(Debug, Clone)]
pub struct QueueEntry<'a> {
    pub task: &'a Task,
    pub remaining_minutes: i32,
    pub first_session: bool,
}

impl<'a> QueueEntry<'a> {
    pub fn new(task: &'a Task) -> Self {
        Self {
            task,
            remaining_minutes: task.required_minutes(),
            first_session: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionQueues<'a> {
    focus_key: Option<String>,
    burst_size: u32,
    burst: u32,
    focus: VecDeque<QueueEntry<'a>>,
    normal: VecDeque<QueueEntry<'a>>,
}

impl<'a> SessionQueues<'a> {
    /// An empty focus key counts as no focus key.
    pub fn new(focus_key: Option<&str>, burst_size: u32) -> Self {
        let focus_key = focus_key.filter(|k| !k.is_empty()).map(str::to_string);
        let burst = if focus_key.is_some() { burst_size } else { 0 };
        Self {
            focus_key,
            burst_size,
            burst,
            focus: VecDeque::new(),
            normal: VecDeque::new(),
        }
    }

    pub fn is_focused(&self) -> bool {
        self.focus_key.is_some()
    }

    pub fn lane_for(&self, task: &Task) -> Lane {
        match &self.focus_key {
            Some(key) if task.project_key() == *key => Lane::Focus,
            _ => Lane::Normal,
        }
    }

    /// Append to the tail of the task's lane. Used for new and recycled entries.
    pub fn push(&mut self, entry: QueueEntry<'a>) {
        match self.lane_for(entry.task) {
            Lane::Focus => self.focus.push_back(entry),
            Lane::Normal => self.normal.push_back(entry),
        }
    }

    /// Pick the next entry to place.
    ///
    /// Focus lane while the burst lasts, then normal (which refills the
    /// burst), then focus again with a burst of one so a newly requeued normal
    /// entry can interleave.
    pub fn pop_next(&mut self) -> Option<(QueueEntry<'a>, Lane)> {
        let focused = self.is_focused();
        if focused && self.burst > 0 {
            if let Some(entry) = self.focus.pop_front() {
                self.burst -= 1;
                return Some((entry, Lane::Focus));
            }
        }
        if let Some(entry) = self.normal.pop_front() {
            if focused {
                self.burst = self.burst_size;
            }
            return Some((entry, Lane::Normal));
        }
        if let Some(entry) = self.focus.pop_front() {
            if focused {
                self.burst = 1;
            }
            return Some((entry, Lane::Focus));
        }
        None
    }

    pub fn is_empty(&self) -> bool {
        self.focus.is_empty() && self.normal.is_empty()
    }

    pub fn len(&self) -> usize {
        self.focus.len() + self.normal.len()
    }

    /// Drain whatever is left, focus lane first.
    pub fn drain(&mut self) -> impl Iterator<Item = QueueEntry<'a>> + '_ {
        self.focus.drain(..).chain(self.normal.drain(..))
    }
}
