//! The learner-facing activity log
//!
//! Newest entry first, bounded; the oldest entry falls off when full. Every
//! line is also emitted as a tracing event so it reaches any installed
//! subscriber.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::info;

/// One line in the activity log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Clock tick at which the line was written
    pub tick: u64,
    pub message: String,
}

/// Capped, most-recent-first log
#[derive(Debug, Clone)]
pub struct SessionLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
    written: u64,
}

impl SessionLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
            written: 0,
        }
    }

    pub fn push(&mut self, tick: u64, message: impl Into<String>) {
        let message = message.into();
        info!(target: "lanlab::session", tick, "{}", message);
        self.entries.push_front(LogEntry { tick, message });
        self.entries.truncate(self.capacity);
        self.written += 1;
    }

    /// Lines written since creation, including those since dropped
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Entries, newest first
    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&LogEntry> {
        self.entries.front()
    }

    /// Whether any retained line contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.entries.iter().any(|e| e.message.contains(needle))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for SessionLog {
    fn default() -> Self {
        Self::new(50)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newest_first() {
        let mut log = SessionLog::default();
        log.push(0, "first");
        log.push(3, "second");
        let messages: Vec<&str> = log.entries().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["second", "first"]);
        assert_eq!(log.latest().unwrap().tick, 3);
    }

    #[test]
    fn test_overflow_drops_oldest() {
        let mut log = SessionLog::default();
        for i in 0..60 {
            log.push(i, format!("line {i}"));
        }
        assert_eq!(log.len(), 50);
        assert_eq!(log.written(), 60);
        assert_eq!(log.latest().unwrap().message, "line 59");
        assert_eq!(log.entries().last().unwrap().message, "line 10");
        assert!(!log.contains("line 9"));
    }

    #[test]
    fn test_zero_capacity_keeps_one() {
        let mut log = SessionLog::new(0);
        log.push(0, "a");
        log.push(0, "b");
        assert_eq!(log.len(), 1);
        assert_eq!(log.latest().unwrap().message, "b");
    }
}
