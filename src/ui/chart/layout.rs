//! Grid layout of display rows
//!
//! Each row becomes a block: a label right-aligned in the left margin and
//! `amount` squares filled row-major, wrapping after `squares_per_row`.
//! Blocks stack vertically and the viewport height follows the content.

use alloc::vec::Vec;

use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

use super::options::LayoutOptions;
use super::truncate::fit_label;
use crate::power::{DisplayRow, MAX_SQUARES};
use crate::ui::core::{PlacedLabel, TextMeasure};
use crate::ui::styling::HexColor;

/// Placed geometry for one display row.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedRow {
    pub label: PlacedLabel,
    /// Squares in row-major order, in canvas coordinates.
    pub squares: Vec<Rectangle>,
    pub color_fill: HexColor,
    pub color_border: HexColor,
    /// Area reserved for the squares, including trailing gaps.
    pub block: Rectangle,
}

/// Complete chart geometry produced by one layout pass.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChartLayout {
    pub rows: Vec<PlacedRow>,
    /// Exact logical size the chart needs.
    pub viewport: Size,
}

impl ChartLayout {
    /// Total number of squares placed.
    pub fn square_count(&self) -> usize {
        self.rows.iter().map(|row| row.squares.len()).sum()
    }
}

/// Computes label and square positions for `rows`.
///
/// All coordinates are absolute canvas pixels: the grid origin sits at
/// `(margin.left, margin.top)` and labels end `label_to_square_distance`
/// pixels left of it. A row places at most [`MAX_SQUARES`] squares and the
/// vertical extent saturates instead of overflowing.
pub fn compute_layout<M: TextMeasure + ?Sized>(
    rows: &[DisplayRow],
    options: &LayoutOptions,
    measure: &M,
) -> ChartLayout {
    let origin = Point::new(options.margin.left as i32, options.margin.top as i32);
    let pitch = i32::try_from(options.pitch()).unwrap_or(i32::MAX);
    let columns = options.columns();
    let max_label_width = options.max_label_width();
    let label_x = origin.x - options.label_to_square_distance as i32;

    let mut current_y: u32 = 0;
    let mut placed = Vec::with_capacity(rows.len());

    for row in rows {
        let amount = row.amount.min(MAX_SQUARES);
        let row_height = options.block_height(amount);
        let block_top = origin
            .y
            .saturating_add(i32::try_from(current_y).unwrap_or(i32::MAX));

        // Center the label on the squares, not on the trailing gap
        let squares_height = row_height.saturating_sub(options.square_distance);
        let label_y =
            block_top.saturating_add(i32::try_from(squares_height / 2).unwrap_or(i32::MAX));

        let fitted = fit_label(&row.name, max_label_width, measure);
        let label = PlacedLabel {
            text: fitted.text,
            anchor: Point::new(label_x, label_y),
            truncated: fitted.truncated,
        };

        let squares = (0..amount)
            .map(|j| {
                let col = (j % columns) as i32;
                let line = (j / columns) as i32;
                Rectangle::new(
                    Point::new(
                        origin.x.saturating_add(col.saturating_mul(pitch)),
                        block_top.saturating_add(line.saturating_mul(pitch)),
                    ),
                    Size::new(options.square_size, options.square_size),
                )
            })
            .collect();

        placed.push(PlacedRow {
            label,
            squares,
            color_fill: row.color_fill,
            color_border: row.color_border,
            block: Rectangle::new(
                Point::new(origin.x, block_top),
                Size::new(columns.saturating_mul(options.pitch()), row_height),
            ),
        });

        current_y = current_y
            .saturating_add(row_height)
            .saturating_add(options.square_distance);
    }

    ChartLayout {
        rows: placed,
        viewport: Size::new(
            options.svg_width,
            current_y.saturating_add(options.margin.vertical()),
        ),
    }
}
