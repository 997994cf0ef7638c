//! Best-effort dependency ordering of the prioritized task list.
//!
//! Each pass scans the not-yet-queued tasks in their current order and queues
//! every task whose dependencies are satisfied. A dependency is satisfied when
//! it is unknown to this run, completed, or already queued (including earlier
//! in the same pass). Passes repeat until everything is queued. A pass that
//! queues nothing means a cycle or an unresolvable chain; the leftovers are
//! appended as-is so they still get scheduled.

use std::collections::{HashMap, HashSet};

use crate::task::Task;

/// How the resolver finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveOutcome {
    /// Every task was queued after its dependencies.
    Ordered,
    /// A pass made no progress; `unresolved` tasks were appended unordered.
    Stalled { unresolved: usize },
    /// The pass cap was hit; `unresolved` tasks were appended unordered.
    PassLimit { unresolved: usize },
}

impl ResolveOutcome {
    pub fn is_ordered(&self) -> bool {
        matches!(self, ResolveOutcome::Ordered)
    }
}

#[derive(Debug, Clone)]
pub struct Resolution<'a> {
    pub queue: Vec<&'a Task>,
    pub outcome: ResolveOutcome,
    pub passes: usize,
}

/// Reorder `prioritized` so dependencies come first, keeping priority order otherwise.
pub fn resolve<'a>(prioritized: &[&'a Task], max_passes: usize) -> Resolution<'a> {
    let by_id: HashMap<&str, &Task> = prioritized.iter().map(|t| (t.id.as_str(), *t)).collect();

    let mut queued: HashSet<&str> = HashSet::with_capacity(prioritized.len());
    let mut queue: Vec<&'a Task> = Vec::with_capacity(prioritized.len());
    let mut remaining: Vec<&'a Task> = prioritized.to_vec();
    let mut passes = 0;
    let mut outcome = ResolveOutcome::Ordered;

    while !remaining.is_empty() {
        if passes >= max_passes {
            outcome = ResolveOutcome::PassLimit {
                unresolved: remaining.len(),
            };
            break;
        }
        passes += 1;

        let before = queue.len();
        let mut blocked = Vec::with_capacity(remaining.len());
        for task in remaining {
            if dependencies_met(task, &queued, &by_id) {
                queued.insert(task.id.as_str());
                queue.push(task);
            } else {
                blocked.push(task);
            }
        }
        remaining = blocked;

        if queue.len() == before {
            outcome = ResolveOutcome::Stalled {
                unresolved: remaining.len(),
            };
            break;
        }
    }

    queue.extend(remaining);
    Resolution {
        queue,
        outcome,
        passes,
    }
}

fn dependencies_met(task: &Task, queued: &HashSet<&str>, by_id: &HashMap<&str, &Task>) -> bool {
    task.dependencies.iter().all(|dep_id| match by_id.get(dep_id.as_str()) {
        None => true,
        Some(dep) => dep.is_completed() || queued.contains(dep_id.as_str()),
    })
}
