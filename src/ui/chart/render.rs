//! Drawing a chart layout onto a surface

use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{
    PrimitiveStyle, PrimitiveStyleBuilder, RoundedRectangle, StrokeAlignment,
};

use super::constants::{SQUARE_BORDER_WIDTH_PX, SQUARE_CORNER_RADIUS_PX};
use super::layout::{ChartLayout, PlacedRow, compute_layout};
use super::options::LayoutOptions;
use crate::power::DisplayRow;
use crate::ui::core::ChartSurface;
use crate::ui::styling::HexColor;

/// Lays out `rows` and paints them onto `surface`.
///
/// The surface is cleared first and its viewport resized to exactly the
/// content size, so consecutive passes never leave stale squares behind.
/// Calls must not overlap on the same surface.
pub fn layout<S: ChartSurface>(
    surface: &mut S,
    rows: &[DisplayRow],
    options: &LayoutOptions,
) -> Result<ChartLayout, S::Error> {
    surface.reset();

    let chart = compute_layout(rows, options, &*surface);
    surface.resize_viewport(chart.viewport);
    draw_chart(&chart, surface)?;

    Ok(chart)
}

/// Paints an already computed layout.
pub fn draw_chart<S: ChartSurface>(chart: &ChartLayout, surface: &mut S) -> Result<(), S::Error> {
    let background = surface.background();

    for row in &chart.rows {
        surface.draw_label(&row.label)?;

        let style = square_style(row, background);
        let corner = Size::new(SQUARE_CORNER_RADIUS_PX, SQUARE_CORNER_RADIUS_PX);
        for square in &row.squares {
            RoundedRectangle::with_equal_corners(*square, corner)
                .into_styled(style)
                .draw(surface)?;
        }
    }

    Ok(())
}

fn square_style(
    row: &PlacedRow,
    background: HexColor,
) -> PrimitiveStyle<embedded_graphics::pixelcolor::Rgb565> {
    PrimitiveStyleBuilder::new()
        .fill_color(row.color_fill.to_rgb565(background))
        .stroke_color(row.color_border.to_rgb565(background))
        .stroke_width(SQUARE_BORDER_WIDTH_PX)
        .stroke_alignment(StrokeAlignment::Inside)
        .build()
}
