//! Best-fit placement

use crate::core::allocator::bitmap::OccupancyBitmap;
use crate::core::allocator::extent::Extent;
use crate::core::allocator::PlacementStrategy;

/// Picks the smallest free run that can hold the request
///
/// Leaves larger runs intact for later requests. Among runs of equal
/// length the leftmost wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct BestFit;

impl PlacementStrategy for BestFit {
    fn find(&mut self, bitmap: &OccupancyBitmap, required_blocks: usize) -> Option<usize> {
        let mut best: Option<Extent> = None;

        for run in bitmap.free_runs() {
            if run.length < required_blocks {
                continue;
            }
            // Strict comparison keeps the earliest run on ties
            if best.map_or(true, |b| run.length < b.length) {
                best = Some(run);
                if run.length == required_blocks {
                    break; // exact fit cannot be beaten
                }
            }
        }

        best.map(|run| run.start)
    }
}
