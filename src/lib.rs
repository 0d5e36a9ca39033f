//! # Blockmap - Fixed-Block Memory Allocation Simulator
//!
//! `blockmap-rs` simulates a memory region split into equal-size blocks. A
//! bit-per-block occupancy map tracks which blocks are in use, and named
//! processes receive contiguous block ranges under one of four classical
//! placement strategies:
//!
//! - **First-fit**: lowest start block that admits the request
//! - **Next-fit**: first-fit resumed after the previous next-fit placement
//! - **Best-fit**: smallest free run that fits
//! - **Worst-fit**: largest free run that fits
//!
//! ## Quick Start
//!
//! ```rust
//! use blockmap_rs::{MemoryManager, StrategyKind, AllocationError};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // 1024 bytes in 128-byte blocks = 8 blocks
//! let mut memory = MemoryManager::new(1024, 128)?;
//!
//! let p1 = memory.create_process("P1", 300, "#3B82F6", StrategyKind::FirstFit)?;
//! let p2 = memory.create_process("P2", 128, "#EF4444", StrategyKind::FirstFit)?;
//! assert_eq!((p1.start_block, p2.start_block), (0, 3));
//!
//! let stats = memory.stats();
//! assert_eq!(stats.occupancy_label(), "50.00");
//!
//! // Failures are plain values
//! let err = memory.create_process("P3", 4096, "", StrategyKind::WorstFit).unwrap_err();
//! assert!(matches!(err, AllocationError::InsufficientMemory { .. }));
//! # Ok(())
//! # }
//! ```

pub mod core;

pub use crate::core::{
    allocator::{
        bitmap::OccupancyBitmap, extent::Extent, ParseStrategyError, PlacementStrategy,
        StrategyKind,
    },
    audit::{Journal, JournalEntry, Operation},
    config::EngineConfig,
    engine::MemoryManager,
    error::{AllocationError, ConfigError, Result},
    palette::TagPalette,
    registry::{ProcessId, ProcessRecord},
    stats::{FragmentationReport, MemoryStats},
};
