//! Layout primitives for chart spacing
//!
//! Margins reserve the space around the square grid: the left margin holds
//! the row labels, the others keep the grid off the card edges.

use serde::{Deserialize, Serialize};

// ============================================================================
// Margin
// ============================================================================

/// Space around the chart content (top, right, bottom, left)
///
/// Squares start at `(left, top)`; labels live inside the left margin,
/// right-aligned against the grid.
///
/// # Examples
///
/// ```ignore
/// // Individual control: top=14, right=10, bottom=30, left=160
/// let m = Margin::new(14, 10, 30, 160);
///
/// let total_height = m.vertical();  // top + bottom
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Margin {
    /// Top margin (pixels)
    pub top: u32,

    /// Right margin (pixels)
    pub right: u32,

    /// Bottom margin (pixels)
    pub bottom: u32,

    /// Left margin (pixels), also the label column width
    pub left: u32,
}

impl Margin {
    /// Creates a margin with individual control for each side
    pub const fn new(top: u32, right: u32, bottom: u32, left: u32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Returns total horizontal margin (left + right)
    pub const fn horizontal(&self) -> u32 {
        self.left.saturating_add(self.right)
    }

    /// Returns total vertical margin (top + bottom)
    pub const fn vertical(&self) -> u32 {
        self.top.saturating_add(self.bottom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_margin_totals() {
        let m = Margin::new(14, 10, 30, 160);
        assert_eq!(m.horizontal(), 170);
        assert_eq!(m.vertical(), 44);
    }
}
