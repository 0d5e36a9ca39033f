//! Block placement for the simulated memory region
//!
//! The occupancy bitmap is the single source of truth for which blocks are
//! in use. Placement strategies query it read-only and report a candidate
//! start block; only the engine mutates the bitmap after a strategy succeeds.
//!
//! - First-fit: lowest start that admits the request
//! - Next-fit: first-fit resumed from where the previous next-fit ended
//! - Best-fit: smallest free run that fits, leftmost on ties
//! - Worst-fit: largest free run that fits, leftmost on ties

pub mod best_fit;
pub mod bitmap;
pub mod extent;
pub mod first_fit;
pub mod next_fit;
pub mod worst_fit;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use self::best_fit::BestFit;
use self::bitmap::OccupancyBitmap;
use self::first_fit::FirstFit;
use self::next_fit::NextFit;
use self::worst_fit::WorstFit;

/// Placement strategy trait
///
/// Finds where a contiguous range of `required_blocks` could be placed.
/// Implementations never mutate the bitmap. `required_blocks` is always at
/// least 1; if it exceeds the bitmap length the answer is `None`.
pub trait PlacementStrategy {
    /// Return the start block of a suitable free range, or `None` if no run fits
    fn find(&mut self, bitmap: &OccupancyBitmap, required_blocks: usize) -> Option<usize>;
}

/// The four classical placement strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StrategyKind {
    #[default]
    #[serde(rename = "first", alias = "first-fit")]
    FirstFit,
    #[serde(rename = "next", alias = "next-fit")]
    NextFit,
    #[serde(rename = "best", alias = "best-fit")]
    BestFit,
    #[serde(rename = "worst", alias = "worst-fit")]
    WorstFit,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 4] = [
        StrategyKind::FirstFit,
        StrategyKind::NextFit,
        StrategyKind::BestFit,
        StrategyKind::WorstFit,
    ];

    /// Short name used in configs and on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::FirstFit => "first",
            StrategyKind::NextFit => "next",
            StrategyKind::BestFit => "best",
            StrategyKind::WorstFit => "worst",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown placement strategy '{0}'. Valid options: first, next, best, worst")]
pub struct ParseStrategyError(pub String);

impl FromStr for StrategyKind {
    type Err = ParseStrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "first" | "first-fit" | "first_fit" | "firstfit" => Ok(StrategyKind::FirstFit),
            "next" | "next-fit" | "next_fit" | "nextfit" => Ok(StrategyKind::NextFit),
            "best" | "best-fit" | "best_fit" | "bestfit" => Ok(StrategyKind::BestFit),
            "worst" | "worst-fit" | "worst_fit" | "worstfit" => Ok(StrategyKind::WorstFit),
            _ => Err(ParseStrategyError(s.to_string())),
        }
    }
}

/// Dispatches a request to the strategy named by a [`StrategyKind`]
///
/// Owns the only stateful strategy (the next-fit cursor) so that state lives
/// as long as the engine that holds the placer.
#[derive(Debug, Clone, Default)]
pub struct Placer {
    next_fit: NextFit,
}

impl Placer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn place(
        &mut self,
        kind: StrategyKind,
        bitmap: &OccupancyBitmap,
        required_blocks: usize,
    ) -> Option<usize> {
        match kind {
            StrategyKind::FirstFit => FirstFit.find(bitmap, required_blocks),
            StrategyKind::NextFit => self.next_fit.find(bitmap, required_blocks),
            StrategyKind::BestFit => BestFit.find(bitmap, required_blocks),
            StrategyKind::WorstFit => WorstFit.find(bitmap, required_blocks),
        }
    }

    /// Block index where the next next-fit search resumes
    pub fn next_fit_cursor(&self) -> usize {
        self.next_fit.cursor()
    }
}
