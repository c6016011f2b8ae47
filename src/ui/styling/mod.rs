//! Styling for the waffle chart
//!
//! - [`colors`] - `HexColor`, fixed chart colors and RGB565 conversion
//! - [`palette`] - per-device graph colors with theme overrides
//! - [`layout`] - chart margins
//!
//! # Examples
//!
//! ```ignore
//! use power_waffle::ui::styling::*;
//!
//! let palette = GraphPalette::new(&NoStyle);
//! let border = palette.color_for_index(0);
//! let fill = border.with_alpha(FILL_ALPHA);
//! ```

pub mod colors;
pub mod layout;
mod named;
pub mod palette;

pub use colors::{
    CARD_BACKGROUND, ColorParseError, FILL_ALPHA, HexColor, LABEL_TEXT, UNAVAILABLE_COLOR,
};
pub use layout::Margin;
pub use named::named_color;
pub use palette::{
    ColorSource, GRAPH_COLORS, GraphPalette, NoStyle, StyleLookup, fallback_color,
    resolve_theme_color,
};
