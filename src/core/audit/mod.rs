//! Operation journal for the allocation engine
//!
//! Keeps a bounded, append-only history of create and delete attempts with:
//! - UTC timestamps
//! - The process the operation targeted (when known)
//! - A human-readable outcome message
//!
//! When full, the oldest entry is dropped.

use crate::core::registry::ProcessId;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;

/// Operation types recorded in the journal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Create,
    Delete,
}

/// Single journal entry
#[derive(Debug, Clone, Serialize)]
pub struct JournalEntry {
    pub timestamp: DateTime<Utc>,
    pub operation: Operation,
    /// Target process; `None` for a create that was rejected
    pub process_id: Option<ProcessId>,
    pub succeeded: bool,
    pub message: String,
}

/// Bounded history of engine operations
#[derive(Debug, Clone)]
pub struct Journal {
    entries: VecDeque<JournalEntry>,
    capacity: usize,
}

impl Journal {
    /// Create a journal holding at most `capacity` entries (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Journal {
            entries: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    pub fn record(
        &mut self,
        operation: Operation,
        process_id: Option<ProcessId>,
        succeeded: bool,
        message: impl Into<String>,
    ) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(JournalEntry {
            timestamp: Utc::now(),
            operation,
            process_id,
            succeeded,
            message: message.into(),
        });
    }

    /// Entries from oldest to newest
    pub fn entries(&self) -> impl Iterator<Item = &JournalEntry> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&JournalEntry> {
        self.entries.back()
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
}
