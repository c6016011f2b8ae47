//! Per-device graph colors
//!
//! Every tracked device gets a color keyed by its position in the device
//! list. Themes may override a slot through the `--graph-color-{n}` style
//! variable (1-based); otherwise the fixed fallback palette is cycled.

use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::String;

use log::warn;

use super::colors::HexColor;
use super::named::named_color;

/// Fallback graph palette, cycled by index modulo its length.
pub const GRAPH_COLORS: [HexColor; 57] = [
    HexColor::rgb(0x42, 0x69, 0xd0),
    HexColor::rgb(0xf4, 0xbd, 0x4a),
    HexColor::rgb(0xff, 0x72, 0x5c),
    HexColor::rgb(0x6c, 0xc5, 0xb0),
    HexColor::rgb(0xa4, 0x63, 0xf2),
    HexColor::rgb(0xff, 0x8a, 0xb7),
    HexColor::rgb(0x9c, 0x6b, 0x4e),
    HexColor::rgb(0x97, 0xbb, 0xf5),
    HexColor::rgb(0x01, 0xab, 0x63),
    HexColor::rgb(0x94, 0x98, 0xa0),
    HexColor::rgb(0x09, 0x4b, 0xad),
    HexColor::rgb(0xc9, 0x90, 0x00),
    HexColor::rgb(0xd8, 0x4f, 0x3e),
    HexColor::rgb(0x49, 0xa2, 0x8f),
    HexColor::rgb(0x04, 0x87, 0x32),
    HexColor::rgb(0xd9, 0x68, 0x95),
    HexColor::rgb(0x80, 0x43, 0xce),
    HexColor::rgb(0x75, 0x99, 0xd1),
    HexColor::rgb(0x7a, 0x4c, 0x31),
    HexColor::rgb(0x74, 0x78, 0x7f),
    HexColor::rgb(0x69, 0x89, 0xf4),
    HexColor::rgb(0xff, 0xd4, 0x44),
    HexColor::rgb(0xff, 0x95, 0x7c),
    HexColor::rgb(0x8f, 0xe9, 0xd3),
    HexColor::rgb(0x62, 0xcc, 0x71),
    HexColor::rgb(0xff, 0xad, 0xda),
    HexColor::rgb(0xc8, 0x84, 0xff),
    HexColor::rgb(0xba, 0xde, 0xff),
    HexColor::rgb(0xbf, 0x8b, 0x6d),
    HexColor::rgb(0xb6, 0xba, 0xc2),
    HexColor::rgb(0x92, 0x7a, 0xcc),
    HexColor::rgb(0x97, 0xee, 0x3f),
    HexColor::rgb(0xbf, 0x39, 0x47),
    HexColor::rgb(0x9f, 0x5b, 0x00),
    HexColor::rgb(0xf4, 0x87, 0x58),
    HexColor::rgb(0x8c, 0xae, 0xd6),
    HexColor::rgb(0xf2, 0xb9, 0x4f),
    HexColor::rgb(0xef, 0xf2, 0x6e),
    HexColor::rgb(0xe4, 0x38, 0x72),
    HexColor::rgb(0xd9, 0xb1, 0x00),
    HexColor::rgb(0x9d, 0x7a, 0x00),
    HexColor::rgb(0x69, 0x8c, 0xff),
    HexColor::rgb(0xd9, 0xd9, 0xd9),
    HexColor::rgb(0x00, 0xd2, 0x7e),
    HexColor::rgb(0xd0, 0x68, 0x00),
    HexColor::rgb(0x00, 0x9f, 0x82),
    HexColor::rgb(0xc4, 0x92, 0x00),
    HexColor::rgb(0xcb, 0xe8, 0xff),
    HexColor::rgb(0xfe, 0xcd, 0xdf),
    HexColor::rgb(0xc2, 0x7e, 0xb6),
    HexColor::rgb(0x8c, 0xd2, 0xce),
    HexColor::rgb(0xc4, 0xb8, 0xd9),
    HexColor::rgb(0xf8, 0x83, 0xb0),
    HexColor::rgb(0xa4, 0x91, 0x00),
    HexColor::rgb(0xf4, 0x88, 0x00),
    HexColor::rgb(0x27, 0xd0, 0xdf),
    HexColor::rgb(0xa0, 0x4a, 0x9b),
];

/// Fallback color for a device index.
pub fn fallback_color(index: usize) -> HexColor {
    GRAPH_COLORS[index % GRAPH_COLORS.len()]
}

// ============================================================================
// Style lookup
// ============================================================================

/// Read access to theme style variables (e.g. `--graph-color-1`).
pub trait StyleLookup {
    /// Returns the raw value of a style variable, if the theme sets it.
    fn property(&self, name: &str) -> Option<&str>;
}

impl StyleLookup for BTreeMap<String, String> {
    fn property(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

/// A theme that sets no variables.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoStyle;

impl StyleLookup for NoStyle {
    fn property(&self, _name: &str) -> Option<&str> {
        None
    }
}

/// Source of per-index device colors handed to the reducer.
pub trait ColorSource {
    fn color_for_index(&self, index: usize) -> HexColor;
}

impl<F: Fn(usize) -> HexColor> ColorSource for F {
    fn color_for_index(&self, index: usize) -> HexColor {
        self(index)
    }
}

/// Resolves a theme color value: hex strings are parsed, CSS names looked up.
pub fn resolve_theme_color(value: &str) -> Option<HexColor> {
    let value = value.trim();
    if value.starts_with('#') {
        value.parse().ok()
    } else {
        named_color(value)
    }
}

/// Graph palette backed by theme overrides with the fixed palette as fallback.
pub struct GraphPalette<'a, S: StyleLookup> {
    style: &'a S,
}

impl<'a, S: StyleLookup> GraphPalette<'a, S> {
    pub fn new(style: &'a S) -> Self {
        Self { style }
    }
}

impl<S: StyleLookup> ColorSource for GraphPalette<'_, S> {
    fn color_for_index(&self, index: usize) -> HexColor {
        // Style variables are numbered from 1
        let variable = format!("--graph-color-{}", index + 1);

        match self.style.property(&variable).filter(|v| !v.trim().is_empty()) {
            None => fallback_color(index),
            Some(value) => resolve_theme_color(value).unwrap_or_else(|| {
                warn!("Ignoring unresolvable theme color {variable} = {value:?}");
                fallback_color(index)
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_palette_cycles() {
        assert_eq!(fallback_color(0), HexColor::rgb(0x42, 0x69, 0xd0));
        assert_eq!(fallback_color(56), HexColor::rgb(0xa0, 0x4a, 0x9b));
        assert_eq!(fallback_color(57), fallback_color(0));
        assert_eq!(fallback_color(60), fallback_color(3));
    }

    #[test]
    fn test_theme_overrides_are_one_based() {
        let mut theme = BTreeMap::new();
        theme.insert("--graph-color-1".to_string(), "#ff0000".to_string());
        theme.insert("--graph-color-3".to_string(), "teal".to_string());

        let palette = GraphPalette::new(&theme);

        assert_eq!(palette.color_for_index(0), HexColor::rgb(0xff, 0, 0));
        assert_eq!(palette.color_for_index(1), fallback_color(1));
        assert_eq!(palette.color_for_index(2), HexColor::rgb(0x00, 0x80, 0x80));
    }

    #[test]
    fn test_unresolvable_override_falls_back() {
        let mut theme = BTreeMap::new();
        theme.insert("--graph-color-2".to_string(), "var(--accent)".to_string());
        theme.insert("--graph-color-3".to_string(), "  ".to_string());

        let palette = GraphPalette::new(&theme);

        assert_eq!(palette.color_for_index(1), fallback_color(1));
        assert_eq!(palette.color_for_index(2), fallback_color(2));
    }

    #[test]
    fn test_no_style_uses_fallback() {
        let palette = GraphPalette::new(&NoStyle);
        for i in 0..GRAPH_COLORS.len() {
            assert_eq!(palette.color_for_index(i), GRAPH_COLORS[i]);
        }
    }
}
