//! Per-actor stack of displaced activity records.

use serde::{Deserialize, Serialize};

use super::ActivityRecord;

/// LIFO of records pushed aside by something higher-priority. The most
/// recently displaced record is the top.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Backlog {
    entries: Vec<ActivityRecord>,
}

impl Backlog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: ActivityRecord) {
        self.entries.push(record);
    }

    pub fn pop(&mut self) -> Option<ActivityRecord> {
        self.entries.pop()
    }

    pub fn peek(&self) -> Option<&ActivityRecord> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries from bottom to top.
    pub fn iter(&self) -> impl Iterator<Item = &ActivityRecord> {
        self.entries.iter()
    }

    /// Drop every entry matching `pred`, returning how many were removed.
    pub fn retain(&mut self, mut pred: impl FnMut(&ActivityRecord) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|r| pred(r));
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
