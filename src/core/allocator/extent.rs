//! Contiguous block ranges and free-run enumeration
//!
//! An extent is a half-open range `[start, start + length)` of blocks. Free
//! runs are the maximal extents of free blocks in an occupancy bitmap.

use crate::core::allocator::bitmap::OccupancyBitmap;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// An extent representing a contiguous range of blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Extent {
    /// Starting block index
    pub start: usize,
    /// Number of contiguous blocks
    pub length: usize,
}

impl Extent {
    pub fn new(start: usize, length: usize) -> Self {
        Extent { start, length }
    }

    /// One past the last block
    pub fn end(&self) -> usize {
        self.start + self.length
    }

    /// Check if this extent contains a block index
    pub fn contains(&self, block: usize) -> bool {
        block >= self.start && block < self.end()
    }

    /// Check if two extents share at least one block
    pub fn overlaps(&self, other: &Extent) -> bool {
        self.start < other.end() && other.start < self.end()
    }

    /// Check if this extent is adjacent to another
    pub fn is_adjacent(&self, other: &Extent) -> bool {
        self.end() == other.start || other.end() == self.start
    }

    pub fn blocks(&self) -> Range<usize> {
        self.start..self.end()
    }
}

/// Iterator over the maximal free runs of a bitmap
///
/// Position `len()` acts as an implicit occupied sentinel so the final run is
/// flushed at the end of the bitmap.
pub struct FreeRuns<'a> {
    bitmap: &'a OccupancyBitmap,
    pos: usize,
}

impl<'a> FreeRuns<'a> {
    pub(crate) fn new(bitmap: &'a OccupancyBitmap) -> Self {
        FreeRuns { bitmap, pos: 0 }
    }
}

impl Iterator for FreeRuns<'_> {
    type Item = Extent;

    fn next(&mut self) -> Option<Extent> {
        let total = self.bitmap.len();

        while self.pos < total && self.bitmap.is_occupied(self.pos) {
            self.pos += 1;
        }
        if self.pos >= total {
            return None;
        }

        let start = self.pos;
        while self.pos < total && !self.bitmap.is_occupied(self.pos) {
            self.pos += 1;
        }
        Some(Extent::new(start, self.pos - start))
    }
}
