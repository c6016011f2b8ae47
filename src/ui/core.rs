// src/ui/core.rs
//! Core UI traits for drawing the waffle chart

use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::{PixelColor, Rgb565};
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use embedded_graphics::text::Baseline;
use embedded_graphics::text::renderer::TextRenderer;

use crate::ui::styling::HexColor;

/// Ellipsis appended to truncated labels when the font can render it.
pub const ELLIPSIS: &str = "\u{2026}";

/// Trait for any UI element that can be drawn
pub trait Drawable {
    /// Draw the element to the display
    fn draw<D: DrawTarget<Color = Rgb565>>(&self, display: &mut D) -> Result<(), D::Error>;

    /// Get the bounds of this drawable element
    fn bounds(&self) -> Rectangle;

    /// Check if this element needs to be redrawn
    fn is_dirty(&self) -> bool;

    /// Mark this element as clean (already drawn)
    fn mark_clean(&mut self);
}

/// Measures rendered text width in pixels.
pub trait TextMeasure {
    /// Width of `text` as it would be rendered, or `None` if the
    /// environment cannot measure text.
    fn text_width(&self, text: &str) -> Option<u32>;

    /// Marker appended to a truncated label.
    fn ellipsis(&self) -> &str {
        ELLIPSIS
    }
}

impl<C: PixelColor> TextMeasure for MonoTextStyle<'_, C> {
    fn text_width(&self, text: &str) -> Option<u32> {
        let metrics = self.measure_string(text, Point::zero(), Baseline::Middle);
        Some(metrics.bounding_box.size.width)
    }
}

impl<T: TextMeasure + ?Sized> TextMeasure for &T {
    fn text_width(&self, text: &str) -> Option<u32> {
        (**self).text_width(text)
    }

    fn ellipsis(&self) -> &str {
        (**self).ellipsis()
    }
}

/// A label ready to be drawn: right-aligned at `anchor`, vertically centered on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedLabel {
    pub text: alloc::string::String,
    pub anchor: Point,
    /// Whether `text` was shortened to fit the label column.
    pub truncated: bool,
}

/// Drawing surface the chart layout paints onto.
///
/// Besides pixel drawing it owns the label font (and therefore text
/// measurement) and a logical viewport sized to the chart content.
pub trait ChartSurface: DrawTarget<Color = Rgb565> + TextMeasure {
    /// Remove everything drawn by the previous layout pass.
    fn reset(&mut self);

    /// Resize the logical viewport to exactly `size`.
    fn resize_viewport(&mut self, size: Size);

    /// Background the translucent square fills are composited over.
    fn background(&self) -> HexColor;

    /// Draw a row label with the surface's label font.
    fn draw_label(&mut self, label: &PlacedLabel) -> Result<(), Self::Error>;
}
