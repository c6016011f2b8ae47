//! Color definitions for the waffle chart
//!
//! Chart colors are carried as [`HexColor`] so they keep the `#rrggbb` /
//! `#rrggbbaa` form used by dashboard themes. They are only converted to
//! RGB565 at the very end, when a square or label is painted onto a surface.
//!
//! # RGB565 Format
//! - Red: 5 bits (0-31)
//! - Green: 6 bits (0-63)
//! - Blue: 5 bits (0-31)
//!
//! Conversion goes through `Rgb888`, which embedded-graphics narrows for us.

use alloc::string::String;
use core::fmt;
use core::str::FromStr;

use embedded_graphics::pixelcolor::{Rgb565, Rgb888};
use thiserror_no_std::Error;

// ============================================================================
// Chart Colors
// ============================================================================

/// Color of the synthetic "untracked consumption" row.
pub const UNAVAILABLE_COLOR: HexColor = HexColor::rgb(0xbd, 0xbd, 0xbd);

/// Alpha applied to every square fill (the border keeps full opacity).
pub const FILL_ALPHA: u8 = 0x7f;

/// Card background the chart is painted on - dark dashboard surface
pub const CARD_BACKGROUND: HexColor = HexColor::rgb(0x1c, 0x1c, 0x1c);

/// Secondary text color used for row labels
pub const LABEL_TEXT: HexColor = HexColor::rgb(0x9b, 0x9b, 0x9b);

// ============================================================================
// HexColor
// ============================================================================

/// Errors raised while parsing a color string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorParseError {
    /// The string does not start with `#`.
    #[error("color must start with '#'")]
    MissingHash,

    /// The string has a digit count other than 3, 6 or 8.
    #[error("color must have 3, 6 or 8 hex digits, found {0}")]
    InvalidLength(usize),

    /// The string contains a non-hex character.
    #[error("invalid hex digit in color")]
    InvalidDigit,

    /// Neither a `#` color nor a known CSS color name.
    #[error("unknown color name {0:?}")]
    UnknownName(String),
}

/// An sRGB color with an alpha channel, as written in themes (`#4269d0`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HexColor {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
}

impl HexColor {
    /// Creates an opaque color.
    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha: 0xff,
        }
    }

    /// Returns the same color with the given alpha.
    pub const fn with_alpha(self, alpha: u8) -> Self {
        Self { alpha, ..self }
    }

    pub const fn is_opaque(&self) -> bool {
        self.alpha == 0xff
    }

    /// Composites this color over an opaque `background`.
    ///
    /// The background's own alpha is ignored.
    pub fn blend_over(self, background: HexColor) -> Rgb888 {
        let alpha = u16::from(self.alpha);
        let mix = |fg: u8, bg: u8| -> u8 {
            let value = u16::from(fg) * alpha + u16::from(bg) * (255 - alpha);
            // Rounded division by 255
            ((value + 127) / 255) as u8
        };

        Rgb888::new(
            mix(self.red, background.red),
            mix(self.green, background.green),
            mix(self.blue, background.blue),
        )
    }

    /// Converts to a display color, blending over `background` when translucent.
    pub fn to_rgb565(self, background: HexColor) -> Rgb565 {
        Rgb565::from(self.blend_over(background))
    }

    /// Formats the color into a fixed-capacity buffer.
    pub fn to_hex(&self) -> heapless::String<9> {
        use core::fmt::Write;

        let mut out = heapless::String::new();
        // 9 bytes always fit "#rrggbbaa"
        let _ = write!(out, "{self}");
        out
    }
}

impl From<HexColor> for Rgb888 {
    fn from(color: HexColor) -> Self {
        Rgb888::new(color.red, color.green, color.blue)
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)?;
        if !self.is_opaque() {
            write!(f, "{:02x}", self.alpha)?;
        }
        Ok(())
    }
}

impl FromStr for HexColor {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .trim()
            .strip_prefix('#')
            .ok_or(ColorParseError::MissingHash)?;

        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ColorParseError::InvalidDigit);
        }

        let byte_at = |i: usize| -> Result<u8, ColorParseError> {
            u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| ColorParseError::InvalidDigit)
        };
        let nibble_at = |i: usize| -> Result<u8, ColorParseError> {
            let n = u8::from_str_radix(&digits[i..i + 1], 16)
                .map_err(|_| ColorParseError::InvalidDigit)?;
            Ok(n * 0x11)
        };

        match digits.len() {
            3 => Ok(Self::rgb(nibble_at(0)?, nibble_at(1)?, nibble_at(2)?)),
            6 => Ok(Self::rgb(byte_at(0)?, byte_at(2)?, byte_at(4)?)),
            8 => Ok(Self::rgb(byte_at(0)?, byte_at(2)?, byte_at(4)?).with_alpha(byte_at(6)?)),
            other => Err(ColorParseError::InvalidLength(other)),
        }
    }
}
