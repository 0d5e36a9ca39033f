//! Allocation engine
//!
//! Owns the occupancy bitmap, the process registry, the next-fit cursor and
//! the operation journal. Every request is validated and placed before any
//! state changes, so a failed call changes nothing but the journal.

use crate::core::allocator::bitmap::OccupancyBitmap;
use crate::core::allocator::extent::Extent;
use crate::core::allocator::{Placer, StrategyKind};
use crate::core::audit::{Journal, Operation};
use crate::core::config::EngineConfig;
use crate::core::error::{AllocationError, ConfigError, Result};
use crate::core::registry::{ProcessId, ProcessRecord, ProcessRegistry};
use crate::core::stats::{FragmentationReport, MemoryStats};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Fixed-block memory allocation simulator
///
/// # Examples
///
/// ```
/// use blockmap_rs::{MemoryManager, StrategyKind};
///
/// let mut memory = MemoryManager::new(1024, 128).unwrap();
/// let p1 = memory.create_process("P1", 300, "#3B82F6", StrategyKind::FirstFit).unwrap();
/// assert_eq!(p1.start_block, 0);
/// assert_eq!(p1.block_count, 3);
///
/// memory.delete_process(p1.id).unwrap();
/// assert!(memory.snapshot().iter().all(|occupied| !occupied));
/// ```
#[derive(Debug, Clone)]
pub struct MemoryManager {
    config: EngineConfig,
    bitmap: OccupancyBitmap,
    registry: ProcessRegistry,
    placer: Placer,
    journal: Journal,
}

impl MemoryManager {
    /// Create an engine over `total_memory_bytes` split into `block_size_bytes` blocks
    ///
    /// # Errors
    ///
    /// Returns `InvalidBlockSize` if `block_size_bytes` is 0, `TooManyBlocks`
    /// past [`EngineConfig::MAX_TOTAL_BLOCKS`], and `CapacityOverflow` when the
    /// rounded-up region size does not fit in a `u64`.
    pub fn new(total_memory_bytes: u64, block_size_bytes: u64) -> Result<Self, ConfigError> {
        Self::from_config(EngineConfig::new(total_memory_bytes, block_size_bytes))
    }

    pub fn from_config(config: EngineConfig) -> Result<Self, ConfigError> {
        config.check()?;

        let total_blocks = config.block_count()?;
        info!(
            total_memory_bytes = config.total_memory_bytes,
            block_size_bytes = config.block_size_bytes,
            total_blocks,
            "Initialized memory manager"
        );

        Ok(MemoryManager {
            bitmap: OccupancyBitmap::new(total_blocks),
            registry: ProcessRegistry::new(),
            placer: Placer::new(),
            journal: Journal::new(config.journal_capacity),
            config,
        })
    }

    /// Allocate a contiguous block range for a new process
    ///
    /// The block count is `ceil(size_bytes / block_size)`. The range is
    /// chosen by `strategy`.
    ///
    /// # Errors
    ///
    /// - `InvalidSize` if `size_bytes` is 0
    /// - `InsufficientMemory` if the strategy finds no free run long enough
    pub fn create_process(
        &mut self,
        name: impl Into<String>,
        size_bytes: u64,
        tag: impl Into<String>,
        strategy: StrategyKind,
    ) -> Result<ProcessRecord> {
        let name = name.into();

        match self.try_create(name.clone(), size_bytes, tag.into(), strategy) {
            Ok(record) => {
                info!(
                    id = %record.id,
                    name = %record.name,
                    start_block = record.start_block,
                    block_count = record.block_count,
                    %strategy,
                    "Created process"
                );
                self.journal.record(
                    Operation::Create,
                    Some(record.id),
                    true,
                    format!("Created process {record}"),
                );
                Ok(record)
            }
            Err(err) => {
                debug!(%name, size_bytes, %strategy, error = %err, "Rejected process");
                self.journal.record(
                    Operation::Create,
                    None,
                    false,
                    format!("Could not create process {name}: {err}"),
                );
                Err(err)
            }
        }
    }

    /// Allocate using the configured default strategy
    pub fn create_process_default(
        &mut self,
        name: impl Into<String>,
        size_bytes: u64,
        tag: impl Into<String>,
    ) -> Result<ProcessRecord> {
        let strategy = self.config.default_strategy;
        self.create_process(name, size_bytes, tag, strategy)
    }

    fn try_create(
        &mut self,
        name: String,
        size_bytes: u64,
        tag: String,
        strategy: StrategyKind,
    ) -> Result<ProcessRecord> {
        if size_bytes == 0 {
            return Err(AllocationError::InvalidSize { size_bytes: 0 });
        }

        let required_blocks = self.blocks_for(size_bytes);
        let start_block = self
            .placer
            .place(strategy, &self.bitmap, required_blocks)
            .ok_or_else(|| AllocationError::InsufficientMemory {
                required_blocks,
                free_blocks: self.bitmap.count_free(),
            })?;

        debug!(%strategy, required_blocks, start_block, "Placement found");

        // Nothing below can fail
        let record = ProcessRecord {
            id: self.registry.issue_id(),
            name,
            requested_size_bytes: size_bytes,
            start_block,
            block_count: required_blocks,
            tag,
        };
        self.bitmap.set_range(start_block, required_blocks, true);
        self.registry.insert(record.clone());

        Ok(record)
    }

    /// Release a process's blocks and remove it from the registry
    ///
    /// A failed delete leaves the bitmap, registry and next-fit cursor
    /// untouched. It is still appended to the [`Journal`], which records
    /// attempts rather than allocation state.
    ///
    /// # Errors
    ///
    /// Returns `ProcessNotFound` if no live process has this id.
    pub fn delete_process(&mut self, id: ProcessId) -> Result<ProcessRecord> {
        let Some(record) = self.registry.remove(id) else {
            debug!(%id, "Delete of unknown process");
            let err = AllocationError::ProcessNotFound(id);
            self.journal.record(
                Operation::Delete,
                Some(id),
                false,
                format!("Could not delete process: {err}"),
            );
            return Err(err);
        };

        self.bitmap
            .set_range(record.start_block, record.block_count, false);

        info!(%id, name = %record.name, block_count = record.block_count, "Deleted process");
        self.journal.record(
            Operation::Delete,
            Some(id),
            true,
            format!("Deleted process {record}"),
        );

        Ok(record)
    }

    /// Blocks needed to hold `size_bytes`
    ///
    /// Saturates at `usize::MAX`, which no bitmap can satisfy.
    pub fn blocks_for(&self, size_bytes: u64) -> usize {
        usize::try_from(size_bytes.div_ceil(self.config.block_size_bytes)).unwrap_or(usize::MAX)
    }

    /// Per-block occupancy, one entry per block
    pub fn snapshot(&self) -> Vec<bool> {
        self.bitmap.to_vec()
    }

    /// Live processes in creation order
    pub fn list_processes(&self) -> Vec<ProcessRecord> {
        self.registry.iter().cloned().collect()
    }

    pub fn processes(&self) -> impl Iterator<Item = &ProcessRecord> {
        self.registry.iter()
    }

    /// Block indices held by each live process
    pub fn blocks_by_process(&self) -> BTreeMap<ProcessId, Vec<usize>> {
        self.registry
            .iter()
            .map(|p| (p.id, p.blocks().collect()))
            .collect()
    }

    pub fn process(&self, id: ProcessId) -> Option<&ProcessRecord> {
        self.registry.get(id)
    }

    /// The live process covering `block`, if any
    pub fn owner_of(&self, block: usize) -> Option<&ProcessRecord> {
        self.registry.owner_of(block)
    }

    pub fn stats(&self) -> MemoryStats {
        MemoryStats::compute(
            &self.bitmap,
            self.config.total_memory_bytes,
            self.config.block_size_bytes,
        )
    }

    pub fn fragmentation(&self) -> FragmentationReport {
        FragmentationReport::compute(&self.bitmap)
    }

    /// Maximal free runs, left to right
    pub fn free_runs(&self) -> Vec<Extent> {
        self.bitmap.free_runs().collect()
    }

    pub fn next_fit_cursor(&self) -> usize {
        self.placer.next_fit_cursor()
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn total_blocks(&self) -> usize {
        self.bitmap.len()
    }

    pub fn block_size_bytes(&self) -> u64 {
        self.config.block_size_bytes
    }

    pub fn total_memory_bytes(&self) -> u64 {
        self.config.total_memory_bytes
    }

    /// Check that the bitmap is exactly the union of live ranges
    ///
    /// Also checks that every range is in bounds and no two ranges overlap.
    pub fn verify_consistency(&self) -> bool {
        let total = self.bitmap.len();
        let mut expected = OccupancyBitmap::new(total);

        for record in self.registry.iter() {
            if record.block_count == 0 || record.start_block + record.block_count > total {
                warn!(id = %record.id, "Process range out of bounds");
                return false;
            }
            if record.blocks().any(|b| expected.is_occupied(b)) {
                warn!(id = %record.id, "Process range overlaps another process");
                return false;
            }
            expected.set_range(record.start_block, record.block_count, true);
        }

        if expected != self.bitmap {
            warn!("Occupancy bitmap does not match live process ranges");
            return false;
        }
        true
    }
}
