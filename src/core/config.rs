//! Engine configuration
//!
//! Loaded from TOML, for example:
//!
//! ```toml
//! total_memory_bytes = 2048
//! block_size_bytes = 128
//! default_strategy = "best"
//! journal_capacity = 64
//! ```
//!
//! Missing keys fall back to [`EngineConfig::default`].

use crate::core::allocator::StrategyKind;
use crate::core::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct EngineConfig {
    /// Size of the simulated memory region
    pub total_memory_bytes: u64,

    /// Size of one block; the region is split into `ceil(total / block)` blocks
    #[validate(range(min = 1))]
    pub block_size_bytes: u64,

    /// Strategy used by callers that do not name one
    pub default_strategy: StrategyKind,

    /// Maximum number of journal entries retained
    #[validate(range(min = 1))]
    pub journal_capacity: usize,
}

impl EngineConfig {
    pub const DEFAULT_TOTAL_MEMORY: u64 = 2048;
    pub const DEFAULT_BLOCK_SIZE: u64 = 128;
    pub const DEFAULT_JOURNAL_CAPACITY: usize = 256;
    /// Upper bound on the number of simulated blocks (2 MiB of bitmap words)
    pub const MAX_TOTAL_BLOCKS: u64 = 1 << 24;

    pub fn new(total_memory_bytes: u64, block_size_bytes: u64) -> Self {
        EngineConfig {
            total_memory_bytes,
            block_size_bytes,
            ..Self::default()
        }
    }

    pub fn with_default_strategy(mut self, strategy: StrategyKind) -> Self {
        self.default_strategy = strategy;
        self
    }

    pub fn with_journal_capacity(mut self, capacity: usize) -> Self {
        self.journal_capacity = capacity;
        self
    }

    /// Number of blocks the region is divided into
    ///
    /// 0 for a config that [`EngineConfig::check`] rejects.
    pub fn total_blocks(&self) -> usize {
        self.block_count().unwrap_or(0)
    }

    /// `ceil(total / block)`, bounded so that the bitmap stays allocatable and
    /// every block's bytes fit in a `u64`
    pub fn block_count(&self) -> Result<usize, ConfigError> {
        if self.block_size_bytes == 0 {
            return Err(ConfigError::InvalidBlockSize(self.block_size_bytes));
        }

        let blocks = self.total_memory_bytes.div_ceil(self.block_size_bytes);
        if blocks > Self::MAX_TOTAL_BLOCKS {
            return Err(ConfigError::TooManyBlocks {
                blocks,
                max: Self::MAX_TOTAL_BLOCKS,
            });
        }
        if blocks.checked_mul(self.block_size_bytes).is_none() {
            return Err(ConfigError::CapacityOverflow {
                total_blocks: blocks,
                block_size_bytes: self.block_size_bytes,
            });
        }

        usize::try_from(blocks).map_err(|_| ConfigError::TooManyBlocks {
            blocks,
            max: Self::MAX_TOTAL_BLOCKS,
        })
    }

    /// Validate all fields
    pub fn check(&self) -> Result<(), ConfigError> {
        self.block_count()?;
        self.validate()?;
        Ok(())
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(source)?;
        config.check()?;
        Ok(config)
    }

    /// Read and validate a TOML config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&source)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            total_memory_bytes: Self::DEFAULT_TOTAL_MEMORY,
            block_size_bytes: Self::DEFAULT_BLOCK_SIZE,
            default_strategy: StrategyKind::FirstFit,
            journal_capacity: Self::DEFAULT_JOURNAL_CAPACITY,
        }
    }
}
