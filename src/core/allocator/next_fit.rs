//! Next-fit placement
//!
//! Same scan as first-fit, resumed at a cursor left by the previous
//! successful next-fit placement. The scan covers `[cursor, len)` and then
//! wraps to `[0, cursor)`; a run never continues across the wrap point, so a
//! returned range always ends inside the bitmap.

use crate::core::allocator::bitmap::OccupancyBitmap;
use crate::core::allocator::first_fit::scan_window;
use crate::core::allocator::PlacementStrategy;

#[derive(Debug, Clone, Copy, Default)]
pub struct NextFit {
    /// Block immediately after the last next-fit placement, modulo the bitmap length
    cursor: usize,
}

impl NextFit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }
}

impl PlacementStrategy for NextFit {
    fn find(&mut self, bitmap: &OccupancyBitmap, required_blocks: usize) -> Option<usize> {
        let total = bitmap.len();
        if total == 0 || required_blocks > total {
            return None;
        }

        let cursor = self.cursor % total;
        let start = scan_window(bitmap, cursor, total, required_blocks)
            .or_else(|| scan_window(bitmap, 0, cursor, required_blocks))?;

        self.cursor = (start + required_blocks) % total;
        Some(start)
    }
}
