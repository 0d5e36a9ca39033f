//! Allocation engine internals
//!
//! - [`error`] - Error types for engine operations
//! - [`allocator`] - Occupancy bitmap and placement strategies:
//!   - [`allocator::bitmap`] - Bit-per-block occupancy store
//!   - [`allocator::extent`] - Block ranges and free-run enumeration
//!   - [`allocator::first_fit`], [`allocator::next_fit`],
//!     [`allocator::best_fit`], [`allocator::worst_fit`]
//! - [`registry`] - Live process records
//! - [`engine`] - The [`MemoryManager`] tying them together
//! - [`stats`] - Occupancy and fragmentation statistics
//! - [`config`] - TOML-backed engine configuration
//! - [`audit`] - Bounded journal of create/delete operations
//! - [`palette`] - Rotating colour tags for processes

pub mod allocator;
pub mod audit;
pub mod config;
pub mod engine;
pub mod error;
pub mod palette;
pub mod registry;
pub mod stats;

pub use engine::MemoryManager;
