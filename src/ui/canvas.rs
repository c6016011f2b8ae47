//! Heap-backed chart canvas with a content-sized viewport.
//!
//! The layout engine draws into this buffer instead of the display. Its
//! logical size follows the chart content, and after drawing only the
//! rectangle of changed pixels is flushed to the real display.

use alloc::vec;
use alloc::vec::Vec;
use core::convert::Infallible;
use embedded_graphics::Drawable as EgDrawable;
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::mono_font::iso_8859_1::FONT_6X12;
use embedded_graphics::pixelcolor::{Rgb565, Rgb888};
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use embedded_graphics::text::{Alignment, Baseline, Text, TextStyle, TextStyleBuilder};
use log::debug;

use crate::ui::core::{ChartSurface, Drawable, PlacedLabel, TextMeasure};
use crate::ui::styling::{CARD_BACKGROUND, HexColor, LABEL_TEXT};

/// Labels end at their anchor and are centered on it vertically.
const LABEL_TEXT_STYLE: TextStyle = TextStyleBuilder::new()
    .alignment(Alignment::Right)
    .baseline(Baseline::Middle)
    .build();

/// Ellipsis the mono fonts can render.
const ASCII_ELLIPSIS: &str = "...";

/// Bounding box of pixels that have changed since the last flush.
#[derive(Debug, Clone, Copy)]
struct DirtyRect {
    min_x: usize,
    min_y: usize,
    max_x: usize,
    max_y: usize,
}

impl DirtyRect {
    /// Expand the dirty region to include the given pixel coordinate.
    fn expand(&mut self, x: usize, y: usize) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    /// Create a new dirty rect covering a single pixel.
    fn from_point(x: usize, y: usize) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x,
            max_y: y,
        }
    }

    /// Dirty rect covering a whole `width` x `height` buffer.
    fn full(width: usize, height: usize) -> Option<Self> {
        (width > 0 && height > 0).then(|| Self {
            min_x: 0,
            min_y: 0,
            max_x: width - 1,
            max_y: height - 1,
        })
    }
}

fn opaque(color: HexColor) -> Rgb565 {
    Rgb565::from(Rgb888::from(color))
}

/// Canvas implementing [`ChartSurface`] over an RGB565 pixel buffer.
///
/// Starts with an empty viewport; every layout pass resizes it to the
/// chart content.
pub struct ChartCanvas {
    pixels: Vec<Rgb565>,
    size: Size,
    background: HexColor,
    label_style: MonoTextStyle<'static, Rgb565>,
    dirty: Option<DirtyRect>,
}

impl Default for ChartCanvas {
    fn default() -> Self {
        Self::new()
    }
}

impl ChartCanvas {
    /// Create an empty canvas with the card background and 12px labels.
    pub fn new() -> Self {
        Self {
            pixels: Vec::new(),
            size: Size::zero(),
            background: CARD_BACKGROUND,
            label_style: MonoTextStyle::new(&FONT_6X12, opaque(LABEL_TEXT)),
            dirty: None,
        }
    }

    pub fn with_background(mut self, background: HexColor) -> Self {
        self.background = background;
        self
    }

    pub fn with_label_style(mut self, style: MonoTextStyle<'static, Rgb565>) -> Self {
        self.label_style = style;
        self
    }

    /// Color of one pixel, `None` outside the viewport.
    pub fn pixel(&self, point: Point) -> Option<Rgb565> {
        let (x, y) = (point.x, point.y);
        if x < 0 || y < 0 || x as u32 >= self.size.width || y as u32 >= self.size.height {
            return None;
        }
        Some(self.pixels[y as usize * self.size.width as usize + x as usize])
    }

    /// Write a single pixel, expanding the dirty rect only if the color changed.
    #[inline]
    fn set_pixel(&mut self, x: usize, y: usize, color: Rgb565) {
        let idx = y * self.size.width as usize + x;
        if self.pixels[idx] != color {
            self.pixels[idx] = color;
            match &mut self.dirty {
                Some(rect) => rect.expand(x, y),
                None => self.dirty = Some(DirtyRect::from_point(x, y)),
            }
        }
    }

    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.size.width && (y as u32) < self.size.height
    }

    /// Flush the dirty region to `display` at `offset`, then reset the dirty state.
    ///
    /// If nothing changed, this is a no-op.
    pub fn flush<D>(&mut self, display: &mut D, offset: Point) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        let Some(rect) = self.dirty.take() else {
            return Ok(());
        };

        let width = rect.max_x - rect.min_x + 1;
        let height = rect.max_y - rect.min_y + 1;

        debug!(
            "Flushing {}x{} dirty region at ({}, {})",
            width, height, rect.min_x, rect.min_y
        );

        let area = Rectangle::new(
            offset + Point::new(rect.min_x as i32, rect.min_y as i32),
            Size::new(width as u32, height as u32),
        );

        let pixels = &self.pixels;
        let stride = self.size.width as usize;
        let pixel_iter = (rect.min_y..=rect.max_y).flat_map(move |y| {
            let row_start = y * stride + rect.min_x;
            pixels[row_start..row_start + width].iter().copied()
        });

        display.fill_contiguous(&area, pixel_iter)
    }
}

impl OriginDimensions for ChartCanvas {
    fn size(&self) -> Size {
        self.size
    }
}

impl DrawTarget for ChartCanvas {
    type Color = Rgb565;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(coord, color) in pixels {
            if self.in_bounds(coord.x, coord.y) {
                self.set_pixel(coord.x as usize, coord.y as usize, color);
            }
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let w = i64::from(self.size.width);
        let h = i64::from(self.size.height);
        let left = i64::from(area.top_left.x);
        let top = i64::from(area.top_left.y);

        let x_start = left.clamp(0, w) as usize;
        let y_start = top.clamp(0, h) as usize;
        let x_end = (left + i64::from(area.size.width)).clamp(0, w) as usize;
        let y_end = (top + i64::from(area.size.height)).clamp(0, h) as usize;

        for y in y_start..y_end {
            for x in x_start..x_end {
                self.set_pixel(x, y, color);
            }
        }
        Ok(())
    }
}

impl TextMeasure for ChartCanvas {
    fn text_width(&self, text: &str) -> Option<u32> {
        self.label_style.text_width(text)
    }

    fn ellipsis(&self) -> &str {
        ASCII_ELLIPSIS
    }
}

impl ChartSurface for ChartCanvas {
    fn reset(&mut self) {
        self.pixels.fill(opaque(self.background));
        self.dirty = DirtyRect::full(self.size.width as usize, self.size.height as usize);
    }

    fn resize_viewport(&mut self, size: Size) {
        if size == self.size {
            return;
        }

        debug!("Resizing chart viewport to {}x{}", size.width, size.height);
        self.size = size;
        let len = (size.width as usize).saturating_mul(size.height as usize);
        self.pixels = vec![opaque(self.background); len];
        self.dirty = DirtyRect::full(size.width as usize, size.height as usize);
    }

    fn background(&self) -> HexColor {
        self.background
    }

    fn draw_label(&mut self, label: &PlacedLabel) -> Result<(), Self::Error> {
        let style = self.label_style;
        Text::with_text_style(&label.text, label.anchor, style, LABEL_TEXT_STYLE).draw(self)?;
        Ok(())
    }
}

impl Drawable for ChartCanvas {
    fn draw<D: DrawTarget<Color = Rgb565>>(&self, display: &mut D) -> Result<(), D::Error> {
        display.fill_contiguous(&self.bounds(), self.pixels.iter().copied())
    }

    fn bounds(&self) -> Rectangle {
        Rectangle::new(Point::zero(), self.size)
    }

    fn is_dirty(&self) -> bool {
        self.dirty.is_some()
    }

    fn mark_clean(&mut self) {
        self.dirty = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::mock_display::MockDisplay;

    #[test]
    fn test_new_canvas_is_empty() {
        let canvas = ChartCanvas::new();
        assert_eq!(canvas.size(), Size::zero());
        assert!(!canvas.is_dirty());
        assert_eq!(canvas.pixel(Point::zero()), None);
    }

    #[test]
    fn test_resize_fills_background_and_marks_dirty() {
        let mut canvas = ChartCanvas::new();
        canvas.resize_viewport(Size::new(20, 10));

        assert_eq!(canvas.size(), Size::new(20, 10));
        assert_eq!(canvas.pixel(Point::new(19, 9)), Some(opaque(CARD_BACKGROUND)));
        assert_eq!(canvas.pixel(Point::new(20, 9)), None);
        assert!(canvas.is_dirty());
    }

    #[test]
    fn test_draw_outside_viewport_is_clipped() {
        let mut canvas = ChartCanvas::new();
        canvas.resize_viewport(Size::new(4, 4));
        canvas.mark_clean();

        canvas
            .fill_solid(&Rectangle::new(Point::new(2, 2), Size::new(10, 10)), Rgb565::RED)
            .unwrap();

        assert_eq!(canvas.pixel(Point::new(3, 3)), Some(Rgb565::RED));
        assert_eq!(canvas.pixel(Point::new(1, 1)), Some(opaque(CARD_BACKGROUND)));
    }

    #[test]
    fn test_reset_clears_content() {
        let mut canvas = ChartCanvas::new();
        canvas.resize_viewport(Size::new(4, 4));
        canvas.fill_solid(&canvas.bounds(), Rgb565::GREEN).unwrap();
        canvas.mark_clean();

        canvas.reset();

        assert_eq!(canvas.pixel(Point::new(0, 0)), Some(opaque(CARD_BACKGROUND)));
        assert!(canvas.is_dirty());
    }

    #[test]
    fn test_flush_sends_only_changed_region() {
        let mut canvas = ChartCanvas::new().with_background(HexColor::rgb(0, 0, 0));
        canvas.resize_viewport(Size::new(8, 8));
        canvas.mark_clean();
        canvas
            .fill_solid(&Rectangle::new(Point::new(1, 2), Size::new(2, 1)), Rgb565::RED)
            .unwrap();

        let mut display = MockDisplay::<Rgb565>::new();
        canvas.flush(&mut display, Point::zero()).unwrap();

        assert_eq!(display.get_pixel(Point::new(1, 2)), Some(Rgb565::RED));
        assert_eq!(display.get_pixel(Point::new(2, 2)), Some(Rgb565::RED));
        assert_eq!(display.get_pixel(Point::new(0, 0)), None);
        assert!(!canvas.is_dirty());

        // Nothing changed since
        let mut untouched = MockDisplay::<Rgb565>::new();
        canvas.flush(&mut untouched, Point::zero()).unwrap();
        assert_eq!(untouched.get_pixel(Point::new(1, 2)), None);
    }

    #[test]
    fn test_measures_with_label_font() {
        let canvas = ChartCanvas::new();
        assert_eq!(canvas.text_width("Fridge"), Some(36));
        assert_eq!(canvas.ellipsis(), "...");
    }
}
