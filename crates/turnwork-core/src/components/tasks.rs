//! Queue of named sub-tasks inside one activity, such as several items
//! salvaged one after another.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimpleTask {
    /// Name of the target being processed.
    pub target_name: String,
    pub moves_total: i32,
    pub moves_left: i32,
}

impl SimpleTask {
    pub fn complete(&self) -> bool {
        self.moves_left <= 0
    }

    /// Completed fraction in `[0, 1]`.
    pub fn progress(&self) -> f32 {
        fraction_done(self.moves_total, self.moves_left)
    }
}

fn fraction_done(total: i32, left: i32) -> f32 {
    if total <= 0 {
        return 0.0;
    }
    (1.0 - left.max(0) as f32 / total as f32).clamp(0.0, 1.0)
}

/// Progress over every queued task of an activity.
///
/// Totals cover finished and queued tasks alike. The index is 1-based and
/// only meant for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskQueue {
    moves_total: i32,
    moves_left: i32,
    index: u32,
    total_tasks: u32,
    targets: VecDeque<SimpleTask>,
}

impl Default for TaskQueue {
    fn default() -> Self {
        Self {
            moves_total: 0,
            moves_left: 0,
            index: 1,
            total_tasks: 0,
            targets: VecDeque::new(),
        }
    }
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a fresh task.
    pub fn push(&mut self, name: impl Into<String>, moves_total: i32) {
        self.push_partial(name, moves_total, moves_total);
    }

    /// Queue a task that is already partly done.
    pub fn push_partial(&mut self, name: impl Into<String>, moves_total: i32, moves_left: i32) {
        self.moves_total += moves_total;
        self.moves_left += moves_left;
        self.targets.push_back(SimpleTask {
            target_name: name.into(),
            moves_total,
            moves_left,
        });
        self.total_tasks += 1;
    }

    /// Drop the current task and advance to the next. Work the dropped
    /// task still had is removed from the totals.
    pub fn pop(&mut self) -> Option<SimpleTask> {
        let task = self.targets.pop_front()?;
        self.moves_left -= task.moves_left.max(0);
        if !self.targets.is_empty() {
            self.index += 1;
        }
        Some(task)
    }

    /// Forget every task, finished or not.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Spend (negative) or refund work on the current task.
    pub fn mod_moves_left(&mut self, delta: i32) {
        let Some(front) = self.targets.front_mut() else {
            return;
        };
        let before = front.moves_left;
        front.moves_left = (front.moves_left + delta).max(0);
        self.moves_left += front.moves_left - before;
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn complete(&self) -> bool {
        self.total_tasks > 0 && self.moves_left <= 0
    }

    pub fn front(&self) -> Option<&SimpleTask> {
        self.targets.front()
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn total_tasks(&self) -> u32 {
        self.total_tasks
    }

    pub fn moves_total(&self) -> i32 {
        self.moves_total
    }

    pub fn moves_left(&self) -> i32 {
        self.moves_left
    }

    /// Completed fraction over all tasks.
    pub fn progress(&self) -> f32 {
        fraction_done(self.moves_total, self.moves_left)
    }
}
