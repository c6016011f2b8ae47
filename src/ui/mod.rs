// src/ui/mod.rs
//! Waffle chart UI
//!
//! This module provides:
//! - Core traits for drawable elements, text measurement and chart surfaces
//! - The grid layout engine with label truncation
//! - A heap-backed canvas with dirty region tracking
//! - Colors, palettes and margins

pub mod canvas;
pub mod chart;
pub mod core;
pub mod styling;

// Re-export commonly used items
pub use canvas::ChartCanvas;
pub use chart::{ChartLayout, LayoutOptions, PlacedRow, compute_layout, layout};
pub use core::{ChartSurface, Drawable, ELLIPSIS, PlacedLabel, TextMeasure};
pub use styling::{ColorSource, GraphPalette, HexColor, Margin};
