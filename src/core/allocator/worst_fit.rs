//! Worst-fit placement

use crate::core::allocator::bitmap::OccupancyBitmap;
use crate::core::allocator::extent::Extent;
use crate::core::allocator::PlacementStrategy;

/// Picks the largest free run, leftmost on ties
#[derive(Debug, Clone, Copy, Default)]
pub struct WorstFit;

impl PlacementStrategy for WorstFit {
    fn find(&mut self, bitmap: &OccupancyBitmap, required_blocks: usize) -> Option<usize> {
        let mut worst: Option<Extent> = None;

        for run in bitmap.free_runs() {
            if run.length < required_blocks {
                continue;
            }
            if worst.map_or(true, |w| run.length > w.length) {
                worst = Some(run);
            }
        }

        worst.map(|run| run.start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bitmap_from(pattern: &str) -> OccupancyBitmap {
        let mut bitmap = OccupancyBitmap::new(pattern.len());
        for (i, c) in pattern.chars().enumerate() {
            if c == 'x' {
                bitmap.set_range(i, 1, true);
            }
        }
        bitmap
    }

    #[test]
    fn test_worst_fit_prefers_larger_run() {
        // free runs: 0-2 (3), 4-7 (4)
        let bitmap = bitmap_from("...x....");
        assert_eq!(WorstFit.find(&bitmap, 2), Some(4));
    }

    #[test]
    fn test_worst_fit_tie_goes_leftmost() {
        // free runs: 0-2 (3), 4-6 (3), 8 (1)
        let bitmap = bitmap_from("...x...x.");
        assert_eq!(WorstFit.find(&bitmap, 1), Some(0));
        assert_eq!(WorstFit.find(&bitmap, 3), Some(0));
    }

    #[test]
    fn test_worst_fit_no_fit() {
        let bitmap = bitmap_from("..x..x..");
        assert_eq!(WorstFit.find(&bitmap, 3), None);
    }

    #[test]
    fn test_worst_fit_whole_free_bitmap() {
        let bitmap = OccupancyBitmap::new(8);
        assert_eq!(WorstFit.find(&bitmap, 8), Some(0));
    }
}
