//! Request history ledger
//!
//! Capacity-bounded record of per-request summaries, newest first. A record is
//! inserted once at initiation and mutated in place as the request resolves;
//! it leaves the ledger only by capacity eviction. Updates addressed to an
//! evicted record are silently dropped.

use std::collections::VecDeque;

use crate::tracker::RequestRecord;

/// Bounded, newest-first ledger of request summaries.
#[derive(Debug)]
pub struct HistoryLedger {
    entries: VecDeque<RequestRecord>,
    capacity: usize,
}

impl HistoryLedger {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Insert a record at the head, evicting from the tail past capacity.
    pub fn record(&mut self, record: RequestRecord) {
        self.entries.push_front(record);
        self.entries.truncate(self.capacity);
    }

    /// Mutate the entry matching `id` in place. Returns false when the entry
    /// has already been evicted; the update then has no visible effect.
    pub fn update_in_place<F>(&mut self, id: &str, update: F) -> bool
    where
        F: FnOnce(&mut RequestRecord),
    {
        match self.entries.iter_mut().find(|record| record.id == id) {
            Some(record) => {
                update(record);
                true
            }
            None => false,
        }
    }

    /// Empty the ledger.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// All entries, newest first.
    pub fn entries(&self) -> Vec<RequestRecord> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
