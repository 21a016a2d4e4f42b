//! Bounded activity log
//!
//! Append-only record of timestamped console events, newest first. Retains at
//! most the configured number of entries; the oldest are evicted on overflow
//! and eviction never blocks insertion. Entries are immutable once appended.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Severity tag of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

/// One immutable activity log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// Creation-ordered, process-unique
    pub id: u64,
    /// Short display time
    pub timestamp: String,
    /// Sortable creation time
    pub full_timestamp: DateTime<Utc>,
    pub message: String,
    pub severity: Severity,
    /// Weak back-reference; the referenced request may already be evicted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

/// Capacity-bounded, newest-first activity log.
#[derive(Debug)]
pub struct ActivityLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
    next_id: u64,
}

impl ActivityLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            next_id: 0,
        }
    }

    /// Append an entry at the head, evicting from the tail past capacity.
    pub fn append(
        &mut self,
        severity: Severity,
        message: impl Into<String>,
        request_id: Option<String>,
    ) -> LogEntry {
        let now = Utc::now();
        let entry = LogEntry {
            id: self.next_id,
            timestamp: Local::now().format("%H:%M:%S").to_string(),
            full_timestamp: now,
            message: message.into(),
            severity,
            request_id,
        };
        self.next_id += 1;

        self.entries.push_front(entry.clone());
        self.entries.truncate(self.capacity);
        entry
    }

    /// Empty the log, leaving a single marker entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.append(Severity::Info, "Activity log cleared", None);
    }

    /// All entries, newest first.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_is_newest_first() {
        let mut log = ActivityLog::new(50);
        log.append(Severity::Info, "first", None);
        log.append(Severity::Success, "second", None);

        let entries = log.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].message, "second");
        assert_eq!(entries[1].message, "first");
    }

    #[test]
    fn ids_are_creation_ordered() {
        let mut log = ActivityLog::new(50);
        let a = log.append(Severity::Info, "a", None);
        let b = log.append(Severity::Info, "b", None);
        assert!(b.id > a.id);
    }

    #[test]
    fn capacity_evicts_oldest() {
        let mut log = ActivityLog::new(50);
        for i in 0..60 {
            log.append(Severity::Info, format!("entry {}", i), None);
        }

        assert_eq!(log.len(), 50);
        let entries = log.entries();
        // Newest at the head, oldest retained entry is number 10
        assert_eq!(entries[0].message, "entry 59");
        assert_eq!(entries[49].message, "entry 10");
    }

    #[test]
    fn clear_leaves_single_marker() {
        let mut log = ActivityLog::new(50);
        for _ in 0..5 {
            log.append(Severity::Warning, "noise", None);
        }

        log.clear();
        assert_eq!(log.len(), 1);
        assert_eq!(log.entries()[0].message, "Activity log cleared");

        // Clearing again is equivalent: still exactly one marker
        log.clear();
        assert_eq!(log.len(), 1);
        assert_eq!(log.entries()[0].message, "Activity log cleared");
    }

    #[test]
    fn request_back_reference_is_kept() {
        let mut log = ActivityLog::new(10);
        let entry = log.append(Severity::Error, "failed", Some("req-123".to_string()));
        assert_eq!(entry.request_id.as_deref(), Some("req-123"));
    }
}
