//! Occupancy bitmap for fixed-size blocks
//!
//! Packs one bit per block into 64-bit words.
//! Each bit represents one block of simulated memory.

use crate::core::allocator::extent::FreeRuns;
use serde::{Deserialize, Serialize};

const WORD_BITS: usize = 64;

/// Bit-per-block occupancy store
///
/// Represents block state with bits:
/// - 0 = free block
/// - 1 = occupied block
///
/// Bits past `total_blocks` in the last word are always 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccupancyBitmap {
    /// Bitmap words (each word = 64 bits = 64 blocks)
    words: Vec<u64>,

    /// Total number of blocks tracked
    total_blocks: usize,
}

impl OccupancyBitmap {
    /// Create a bitmap with every block free
    pub fn new(total_blocks: usize) -> Self {
        let num_words = total_blocks.div_ceil(WORD_BITS);
        OccupancyBitmap {
            words: vec![0u64; num_words],
            total_blocks,
        }
    }

    #[inline]
    fn locate(index: usize) -> (usize, u64) {
        (index / WORD_BITS, 1u64 << (index % WORD_BITS))
    }

    pub fn len(&self) -> usize {
        self.total_blocks
    }

    pub fn is_empty(&self) -> bool {
        self.total_blocks == 0
    }

    /// Check whether a block is occupied
    ///
    /// `index` must be below `len()`.
    #[inline]
    pub fn is_occupied(&self, index: usize) -> bool {
        debug_assert!(index < self.total_blocks, "block {index} out of range");
        let (word_idx, mask) = Self::locate(index);
        (self.words[word_idx] & mask) != 0
    }

    /// Mark `count` consecutive blocks starting at `start` as occupied or free
    ///
    /// The caller guarantees `start + count <= len()`. Bits outside the range
    /// are left untouched.
    pub fn set_range(&mut self, start: usize, count: usize, occupied: bool) {
        debug_assert!(
            start + count <= self.total_blocks,
            "range {start}+{count} exceeds {} blocks",
            self.total_blocks
        );

        let end = start + count;
        let mut pos = start;
        while pos < end {
            let (word_idx, _) = Self::locate(pos);
            let bit_idx = pos % WORD_BITS;
            let span = (WORD_BITS - bit_idx).min(end - pos);

            // Whole-word fast path, otherwise a contiguous mask inside the word
            let mask = if span == WORD_BITS {
                u64::MAX
            } else {
                ((1u64 << span) - 1) << bit_idx
            };

            if occupied {
                self.words[word_idx] |= mask;
            } else {
                self.words[word_idx] &= !mask;
            }
            pos += span;
        }
    }

    /// Number of occupied blocks
    pub fn count_occupied(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Number of free blocks
    pub fn count_free(&self) -> usize {
        self.total_blocks - self.count_occupied()
    }

    /// Per-block occupancy flags in index order
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.total_blocks).map(move |i| self.is_occupied(i))
    }

    /// Unpacked copy of the bitmap, one entry per block
    pub fn to_vec(&self) -> Vec<bool> {
        self.iter().collect()
    }

    /// Maximal free runs, left to right
    pub fn free_runs(&self) -> FreeRuns<'_> {
        FreeRuns::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bitmap_creation() {
        let bitmap = OccupancyBitmap::new(1000);
        assert_eq!(bitmap.len(), 1000);
        assert_eq!(bitmap.count_free(), 1000);
        assert_eq!(bitmap.count_occupied(), 0);
    }

    #[test]
    fn test_empty_bitmap() {
        let bitmap = OccupancyBitmap::new(0);
        assert!(bitmap.is_empty());
        assert_eq!(bitmap.to_vec(), Vec::<bool>::new());
        assert_eq!(bitmap.free_runs().count(), 0);
    }

    #[test]
    fn test_set_range_marks_only_requested_blocks() {
        let mut bitmap = OccupancyBitmap::new(8);
        bitmap.set_range(2, 3, true);

        assert_eq!(
            bitmap.to_vec(),
            vec![false, false, true, true, true, false, false, false]
        );
        assert_eq!(bitmap.count_occupied(), 3);
    }

    #[test]
    fn test_set_range_clear() {
        let mut bitmap = OccupancyBitmap::new(8);
        bitmap.set_range(0, 8, true);
        bitmap.set_range(3, 2, false);

        assert!(bitmap.is_occupied(2));
        assert!(!bitmap.is_occupied(3));
        assert!(!bitmap.is_occupied(4));
        assert!(bitmap.is_occupied(5));
        assert_eq!(bitmap.count_free(), 2);
    }

    #[test]
    fn test_set_range_across_word_boundary() {
        let mut bitmap = OccupancyBitmap::new(200);
        bitmap.set_range(60, 80, true);

        assert!(!bitmap.is_occupied(59));
        for i in 60..140 {
            assert!(bitmap.is_occupied(i), "block {i} should be occupied");
        }
        assert!(!bitmap.is_occupied(140));
        assert_eq!(bitmap.count_occupied(), 80);

        bitmap.set_range(64, 64, false);
        assert_eq!(bitmap.count_occupied(), 16);
        assert!(bitmap.is_occupied(63));
        assert!(!bitmap.is_occupied(64));
        assert!(!bitmap.is_occupied(127));
        assert!(bitmap.is_occupied(128));
    }

    #[test]
    fn test_set_range_zero_count_is_noop() {
        let mut bitmap = OccupancyBitmap::new(16);
        bitmap.set_range(5, 0, true);
        assert_eq!(bitmap.count_occupied(), 0);
    }

    #[test]
    fn test_fill_non_multiple_of_word() {
        let mut bitmap = OccupancyBitmap::new(70);
        bitmap.set_range(0, 70, true);
        assert_eq!(bitmap.count_occupied(), 70);
        assert_eq!(bitmap.count_free(), 0);
    }
}
