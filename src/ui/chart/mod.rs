//! Waffle chart layout engine
//!
//! Turns sorted [`DisplayRow`](crate::power::DisplayRow)s into labelled
//! blocks of unit squares on a [`ChartSurface`](crate::ui::core::ChartSurface):
//!
//! - one block per row, `amount` squares filled row-major and wrapped after
//!   `squares_per_row`
//! - labels right-aligned in the left margin, truncated by live text
//!   measurement until they fit
//! - a viewport sized to the content, never clipped and never oversized
//!
//! The engine knows nothing about where rows come from.
//!
//! # Examples
//!
//! ```ignore
//! use power_waffle::ui::chart::{LayoutOptions, layout};
//! use power_waffle::ui::canvas::ChartCanvas;
//!
//! let mut canvas = ChartCanvas::new();
//! let chart = layout(&mut canvas, &rows, &LayoutOptions::default())?;
//! canvas.flush(&mut display, Point::zero())?;
//! ```

pub mod constants;
mod layout;
mod options;
mod render;
mod truncate;

pub use layout::{ChartLayout, PlacedRow, compute_layout};
pub use options::LayoutOptions;
pub use render::{draw_chart, layout};
pub use truncate::{FittedLabel, fit_label};
