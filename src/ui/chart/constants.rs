//! Constants for waffle chart rendering
//!
//! Card-level knobs (square size, squares per row, width) come from the
//! configuration; the values here are fixed by the chart's look.

use crate::ui::styling::Margin;

/// Default edge length of one square in pixels
pub const DEFAULT_SQUARE_SIZE_PX: u32 = 18;

/// Default number of squares before a row wraps onto a new line
pub const DEFAULT_SQUARES_PER_ROW: u32 = 10;

/// Default chart width in pixels
pub const DEFAULT_CHART_WIDTH_PX: u32 = 486;

/// Gap between neighbouring squares, and between row blocks
pub const SQUARE_DISTANCE_PX: u32 = 5;

/// Gap between the right edge of a label and the first square
pub const LABEL_TO_SQUARE_DISTANCE_PX: u32 = 20;

/// Margin around the square grid; the left side holds the labels
pub const CHART_MARGIN: Margin = Margin::new(14, 10, 30, 160);

/// Corner radius of each square in pixels
pub const SQUARE_CORNER_RADIUS_PX: u32 = 2;

/// Border width of each square in pixels
pub const SQUARE_BORDER_WIDTH_PX: u32 = 1;
