//! Registry of live processes and their block ranges

use crate::core::allocator::extent::Extent;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Range;

/// Unique process identifier
///
/// Issued by a monotonic counter starting at 1 and never reused within one
/// engine, so ordering by id is ordering by creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProcessId(u64);

impl ProcessId {
    pub const fn new(raw: u64) -> Self {
        ProcessId(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::str::FromStr for ProcessId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(ProcessId)
    }
}

/// A process's allocated block range
///
/// Immutable once created; records are only ever inserted or removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessRecord {
    pub id: ProcessId,
    pub name: String,
    /// Size as requested, before rounding up to whole blocks
    pub requested_size_bytes: u64,
    pub start_block: usize,
    pub block_count: usize,
    /// Presentation attribute (e.g. a colour), not interpreted by the engine
    pub tag: String,
}

impl ProcessRecord {
    pub fn extent(&self) -> Extent {
        Extent::new(self.start_block, self.block_count)
    }

    /// Block indices covered by this process
    pub fn blocks(&self) -> Range<usize> {
        self.start_block..self.start_block + self.block_count
    }

    pub fn covers(&self, block: usize) -> bool {
        self.extent().contains(block)
    }
}

impl fmt::Display for ProcessRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (id {}, {} bytes, {} blocks from block {})",
            self.name, self.id, self.requested_size_bytes, self.block_count, self.start_block
        )
    }
}

/// Live processes keyed by id, iterated in creation order
#[derive(Debug, Clone)]
pub struct ProcessRegistry {
    processes: BTreeMap<ProcessId, ProcessRecord>,
    next_id: u64,
}

impl Default for ProcessRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessRegistry {
    pub fn new() -> Self {
        ProcessRegistry {
            processes: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Issue a fresh id
    ///
    /// Only call once an allocation is certain to succeed; a consumed id is
    /// never handed out again.
    pub fn issue_id(&mut self) -> ProcessId {
        let id = ProcessId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn insert(&mut self, record: ProcessRecord) {
        debug_assert!(
            !self.processes.contains_key(&record.id),
            "duplicate process id {}",
            record.id
        );
        self.processes.insert(record.id, record);
    }

    pub fn remove(&mut self, id: ProcessId) -> Option<ProcessRecord> {
        self.processes.remove(&id)
    }

    pub fn get(&self, id: ProcessId) -> Option<&ProcessRecord> {
        self.processes.get(&id)
    }

    pub fn contains(&self, id: ProcessId) -> bool {
        self.processes.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.processes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }

    /// Records in creation order
    pub fn iter(&self) -> impl Iterator<Item = &ProcessRecord> {
        self.processes.values()
    }

    /// The live process whose range covers `block`, if any
    pub fn owner_of(&self, block: usize) -> Option<&ProcessRecord> {
        self.iter().find(|p| p.covers(block))
    }
}
