//! Rotating tag palette for process colouring

/// Ten distinguishable colours, in rotation order
pub const DEFAULT_COLORS: [&str; 10] = [
    "#3B82F6", // blue
    "#EF4444", // red
    "#10B981", // green
    "#F59E0B", // amber
    "#8B5CF6", // purple
    "#EC4899", // pink
    "#14B8A6", // teal
    "#F97316", // orange
    "#06B6D4", // cyan
    "#6366F1", // indigo
];

/// Hands out tags in a fixed cycle
///
/// The caller advances the palette only after a successful create, so a
/// rejected request does not skip a colour.
#[derive(Debug, Clone, Default)]
pub struct TagPalette {
    position: usize,
}

impl TagPalette {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tag that the next process will receive
    pub fn peek(&self) -> &'static str {
        DEFAULT_COLORS[self.position % DEFAULT_COLORS.len()]
    }

    pub fn advance(&mut self) {
        self.position = self.position.wrapping_add(1);
    }
}
