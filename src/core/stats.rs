//! Occupancy statistics
//!
//! Computed on demand from the bitmap and configuration, never cached.

use crate::core::allocator::bitmap::OccupancyBitmap;
use crate::core::allocator::extent::Extent;
use serde::Serialize;

/// Snapshot of memory usage
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemoryStats {
    pub total_memory_bytes: u64,
    pub block_size_bytes: u64,
    pub total_blocks: usize,
    pub occupied_blocks: usize,
    pub free_blocks: usize,
    /// Percentage of occupied blocks, rounded to two decimals
    pub occupancy_percent: f64,
    pub used_bytes: u64,
    pub free_bytes: u64,
}

impl MemoryStats {
    pub fn compute(bitmap: &OccupancyBitmap, total_memory_bytes: u64, block_size_bytes: u64) -> Self {
        let total_blocks = bitmap.len();
        let occupied_blocks = bitmap.count_occupied();
        let free_blocks = total_blocks - occupied_blocks;

        let occupancy_percent = if total_blocks == 0 {
            0.0
        } else {
            round2(occupied_blocks as f64 / total_blocks as f64 * 100.0)
        };

        MemoryStats {
            total_memory_bytes,
            block_size_bytes,
            total_blocks,
            occupied_blocks,
            free_blocks,
            occupancy_percent,
            used_bytes: (occupied_blocks as u64).saturating_mul(block_size_bytes),
            free_bytes: (free_blocks as u64).saturating_mul(block_size_bytes),
        }
    }

    /// Occupancy as a fixed two-decimal string, e.g. `"50.00"`
    pub fn occupancy_label(&self) -> String {
        format!("{:.2}", self.occupancy_percent)
    }
}

/// How scattered the free space is
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FragmentationReport {
    /// Number of maximal free runs
    pub free_runs: usize,
    /// Length of the longest free run (0 when memory is full)
    pub largest_free_run: usize,
    pub free_blocks: usize,
    /// `1 - largest_free_run / free_blocks`: 0.0 when all free space is one run
    pub fragmentation_ratio: f64,
}

impl FragmentationReport {
    pub fn compute(bitmap: &OccupancyBitmap) -> Self {
        let runs: Vec<Extent> = bitmap.free_runs().collect();
        let free_blocks: usize = runs.iter().map(|r| r.length).sum();
        let largest_free_run = runs.iter().map(|r| r.length).max().unwrap_or(0);

        let fragmentation_ratio = if free_blocks == 0 {
            0.0
        } else {
            1.0 - (largest_free_run as f64 / free_blocks as f64)
        };

        FragmentationReport {
            free_runs: runs.len(),
            largest_free_run,
            free_blocks,
            fragmentation_ratio,
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_half_occupied() {
        let mut bitmap = OccupancyBitmap::new(8);
        bitmap.set_range(0, 4, true);

        let stats = MemoryStats::compute(&bitmap, 1024, 128);
        assert_eq!(stats.occupied_blocks, 4);
        assert_eq!(stats.free_blocks, 4);
        assert_eq!(stats.occupancy_percent, 50.0);
        assert_eq!(stats.occupancy_label(), "50.00");
        assert_eq!(stats.used_bytes, 512);
        assert_eq!(stats.free_bytes, 512);
    }

    #[test]
    fn test_stats_rounds_to_two_decimals() {
        let mut bitmap = OccupancyBitmap::new(3);
        bitmap.set_range(0, 1, true);

        let stats = MemoryStats::compute(&bitmap, 300, 100);
        assert_eq!(stats.occupancy_label(), "33.33");
        assert!((stats.occupancy_percent - 33.33).abs() < 1e-9);
    }

    #[test]
    fn test_stats_zero_blocks() {
        let bitmap = OccupancyBitmap::new(0);
        let stats = MemoryStats::compute(&bitmap, 0, 128);
        assert_eq!(stats.occupancy_percent, 0.0);
        assert_eq!(stats.occupancy_label(), "0.00");
    }

    #[test]
    fn test_stats_byte_totals_saturate() {
        let bitmap = OccupancyBitmap::new(2);
        let stats = MemoryStats::compute(&bitmap, u64::MAX, 1 << 63);
        assert_eq!(stats.free_bytes, u64::MAX);
        assert_eq!(stats.used_bytes, 0);
    }

    #[test]
    fn test_fragmentation_single_run() {
        let mut bitmap = OccupancyBitmap::new(10);
        bitmap.set_range(0, 4, true);

        let report = FragmentationReport::compute(&bitmap);
        assert_eq!(report.free_runs, 1);
        assert_eq!(report.largest_free_run, 6);
        assert_eq!(report.fragmentation_ratio, 0.0);
    }

    #[test]
    fn test_fragmentation_split_runs() {
        // free runs of 2 and 6
        let mut bitmap = OccupancyBitmap::new(10);
        bitmap.set_range(2, 2, true);

        let report = FragmentationReport::compute(&bitmap);
        assert_eq!(report.free_runs, 2);
        assert_eq!(report.free_blocks, 8);
        assert!((report.fragmentation_ratio - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_fragmentation_full_memory() {
        let mut bitmap = OccupancyBitmap::new(4);
        bitmap.set_range(0, 4, true);

        let report = FragmentationReport::compute(&bitmap);
        assert_eq!(report.free_runs, 0);
        assert_eq!(report.fragmentation_ratio, 0.0);
    }
}
