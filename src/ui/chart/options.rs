//! Geometry options for the waffle chart

use serde::{Deserialize, Serialize};

use super::constants::{
    CHART_MARGIN, DEFAULT_CHART_WIDTH_PX, DEFAULT_SQUARE_SIZE_PX, DEFAULT_SQUARES_PER_ROW,
    LABEL_TO_SQUARE_DISTANCE_PX, SQUARE_DISTANCE_PX,
};
use crate::ui::styling::Margin;

/// Everything the layout engine needs to place labels and squares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutOptions {
    /// Edge length of one square in pixels
    pub square_size: u32,
    /// Width of the whole chart (viewport) in pixels
    pub svg_width: u32,
    /// Gap between squares and between row blocks in pixels
    pub square_distance: u32,
    /// Gap between a label's right edge and the grid in pixels
    pub label_to_square_distance: u32,
    pub margin: Margin,
    /// Squares per visual line before wrapping
    pub squares_per_row: u32,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            square_size: DEFAULT_SQUARE_SIZE_PX,
            svg_width: DEFAULT_CHART_WIDTH_PX,
            square_distance: SQUARE_DISTANCE_PX,
            label_to_square_distance: LABEL_TO_SQUARE_DISTANCE_PX,
            margin: CHART_MARGIN,
            squares_per_row: DEFAULT_SQUARES_PER_ROW,
        }
    }
}

impl LayoutOptions {
    /// Distance from one square's origin to the next
    pub const fn pitch(&self) -> u32 {
        self.square_size.saturating_add(self.square_distance)
    }

    /// Widest a label may render, the left margin minus the label gap
    pub const fn max_label_width(&self) -> u32 {
        self.margin.left.saturating_sub(self.label_to_square_distance)
    }

    /// Squares per line, never 0
    pub fn columns(&self) -> u32 {
        self.squares_per_row.max(1)
    }

    /// Visual lines needed for `amount` squares
    pub fn lines_for(&self, amount: u32) -> u32 {
        amount.div_ceil(self.columns())
    }

    /// Height of a row block holding `amount` squares, saturating at `u32::MAX`
    pub fn block_height(&self, amount: u32) -> u32 {
        self.lines_for(amount).saturating_mul(self.pitch())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_card() {
        let options = LayoutOptions::default();
        assert_eq!(options.square_size, 18);
        assert_eq!(options.svg_width, 486);
        assert_eq!(options.pitch(), 23);
        assert_eq!(options.max_label_width(), 140);
    }

    #[test]
    fn test_block_height_wraps_lines() {
        let options = LayoutOptions::default();
        assert_eq!(options.lines_for(23), 3);
        assert_eq!(options.block_height(23), 3 * 23);
        assert_eq!(options.lines_for(10), 1);
        assert_eq!(options.lines_for(0), 0);
    }

    #[test]
    fn test_zero_columns_clamped() {
        let options = LayoutOptions {
            squares_per_row: 0,
            ..LayoutOptions::default()
        };
        assert_eq!(options.lines_for(4), 4);
    }

    #[test]
    fn test_block_height_saturates() {
        let options = LayoutOptions::default();
        assert_eq!(options.block_height(u32::MAX), u32::MAX);

        let options = LayoutOptions {
            square_size: u32::MAX,
            ..LayoutOptions::default()
        };
        assert_eq!(options.pitch(), u32::MAX);
        assert_eq!(options.block_height(1), u32::MAX);
    }
}
