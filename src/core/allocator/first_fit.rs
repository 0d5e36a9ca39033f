//! First-fit placement

use crate::core::allocator::bitmap::OccupancyBitmap;
use crate::core::allocator::PlacementStrategy;

/// Returns the leftmost position admitting a sufficient contiguous run
///
/// Stops as soon as the current run reaches the requested length, so the
/// answer is not necessarily the start of the leftmost *maximal* run.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstFit;

impl PlacementStrategy for FirstFit {
    fn find(&mut self, bitmap: &OccupancyBitmap, required_blocks: usize) -> Option<usize> {
        scan_window(bitmap, 0, bitmap.len(), required_blocks)
    }
}

/// Left-to-right scan over blocks `[from, to)`
///
/// Tracks the current run's start and length and returns the start once the
/// length reaches `required_blocks`. Runs never extend past `to`.
pub(crate) fn scan_window(
    bitmap: &OccupancyBitmap,
    from: usize,
    to: usize,
    required_blocks: usize,
) -> Option<usize> {
    if required_blocks == 0 || required_blocks > to.saturating_sub(from) {
        return None;
    }

    let mut run_start = from;
    let mut run_length = 0usize;

    for index in from..to {
        if bitmap.is_occupied(index) {
            run_length = 0;
            continue;
        }

        if run_length == 0 {
            run_start = index;
        }
        run_length += 1;

        if run_length == required_blocks {
            return Some(run_start);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_fit_empty_bitmap_starts_at_zero() {
        let bitmap = OccupancyBitmap::new(8);
        assert_eq!(FirstFit.find(&bitmap, 3), Some(0));
        assert_eq!(FirstFit.find(&bitmap, 8), Some(0));
    }

    #[test]
    fn test_first_fit_picks_lowest_qualifying_start() {
        // [x . . x . . . .]
        let mut bitmap = OccupancyBitmap::new(8);
        bitmap.set_range(0, 1, true);
        bitmap.set_range(3, 1, true);

        assert_eq!(FirstFit.find(&bitmap, 1), Some(1));
        assert_eq!(FirstFit.find(&bitmap, 2), Some(1));
        assert_eq!(FirstFit.find(&bitmap, 3), Some(4));
        assert_eq!(FirstFit.find(&bitmap, 5), None);
    }

    #[test]
    fn test_first_fit_skips_short_runs() {
        // [. x . . x . . .]
        let mut bitmap = OccupancyBitmap::new(8);
        bitmap.set_range(1, 1, true);
        bitmap.set_range(4, 1, true);

        assert_eq!(FirstFit.find(&bitmap, 3), Some(5));
    }

    #[test]
    fn test_first_fit_full_bitmap() {
        let mut bitmap = OccupancyBitmap::new(4);
        bitmap.set_range(0, 4, true);
        assert_eq!(FirstFit.find(&bitmap, 1), None);
    }

    #[test]
    fn test_scan_window_respects_bounds() {
        let bitmap = OccupancyBitmap::new(10);
        assert_eq!(scan_window(&bitmap, 7, 10, 3), Some(7));
        assert_eq!(scan_window(&bitmap, 8, 10, 3), None);
        assert_eq!(scan_window(&bitmap, 0, 2, 3), None);
    }
}
