use crate::core::registry::ProcessId;
use thiserror::Error;

/// Failures reported by allocation and deletion requests
///
/// Every variant is recoverable. The engine guarantees that no bitmap or
/// registry state changed when one of these is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AllocationError {
    #[error("Invalid size: {size_bytes} bytes (must be greater than 0)")]
    InvalidSize { size_bytes: i64 },

    #[error(
        "Insufficient memory: {required_blocks} contiguous blocks required, \
         {free_blocks} free (fragmentation or memory full)"
    )]
    InsufficientMemory {
        required_blocks: usize,
        free_blocks: usize,
    },

    #[error("Process not found: {0}")]
    ProcessNotFound(ProcessId),
}

/// Failures while building an engine or loading its configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid block size: {0} (must be greater than 0)")]
    InvalidBlockSize(u64),

    #[error("Too many blocks: {blocks} (at most {max} supported)")]
    TooManyBlocks { blocks: u64, max: u64 },

    #[error(
        "Memory size overflows: {total_blocks} blocks of {block_size_bytes} bytes \
         exceed the addressable byte range"
    )]
    CapacityOverflow {
        total_blocks: u64,
        block_size_bytes: u64,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

pub type Result<T, E = AllocationError> = std::result::Result<T, E>;
