//! Reduction of power readings into waffle chart rows

use alloc::string::String;
use alloc::vec::Vec;

use log::debug;

use super::{PowerReading, available};
use crate::ui::styling::{ColorSource, FILL_ALPHA, HexColor, UNAVAILABLE_COLOR};

/// Watts represented by a single square.
pub const WATTS_PER_SQUARE: f32 = 10.0;

/// Most squares one row may hold (100 kW); larger readings are clamped.
pub const MAX_SQUARES: u32 = 10_000;

/// One chart row: a label, its square count and its colors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayRow {
    pub name: String,
    /// Number of squares, between 1 and [`MAX_SQUARES`].
    pub amount: u32,
    pub color_fill: HexColor,
    pub color_border: HexColor,
}

/// Knobs of the reduction that come from the card configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReduceOptions {
    /// Devices drawing less than this many watts are hidden.
    pub minimal_power_displayed: f32,
    /// Append the synthetic untracked-consumption row.
    pub include_untracked: bool,
}

impl Default for ReduceOptions {
    fn default() -> Self {
        Self {
            minimal_power_displayed: 2.0,
            include_untracked: true,
        }
    }
}

/// Converts watts into a square count: `max(floor(watts / 10), 1)`,
/// capped at [`MAX_SQUARES`].
pub fn squares_for(watts: f32) -> u32 {
    // Float-to-int casts saturate: negatives and NaN become 0
    let squares = (watts / WATTS_PER_SQUARE) as u32;
    squares.clamp(1, MAX_SQUARES)
}

/// Load not attributed to any tracked device, never negative.
///
/// A total that under-reports the known devices is raised to their sum.
pub fn untracked_load(consumption: &[PowerReading], total_load: f32) -> f32 {
    let total_known_load: f32 = consumption.iter().map(PowerReading::watts).sum();
    let sanitized_total_load = total_known_load.max(available(total_load));
    sanitized_total_load - total_known_load
}

/// Row before bucketing, still carrying raw watts.
struct Candidate {
    name: String,
    watts: f32,
    color_fill: HexColor,
    color_border: HexColor,
}

impl Candidate {
    fn new(name: String, watts: f32, border: HexColor) -> Self {
        Self {
            name,
            watts,
            color_fill: border.with_alpha(FILL_ALPHA),
            color_border: border,
        }
    }

    fn into_row(self) -> DisplayRow {
        DisplayRow {
            name: self.name,
            amount: squares_for(self.watts),
            color_fill: self.color_fill,
            color_border: self.color_border,
        }
    }
}

/// Reduces one refresh cycle of readings into sorted chart rows.
///
/// Colors are assigned by position in `consumption` before anything is
/// filtered, so a device keeps its color when others drop below the
/// threshold. The untracked row, when enabled, is exempt from the threshold.
/// Rows come back sorted by descending `amount`; ties keep no particular order.
pub fn reduce<C, L>(
    consumption: &[PowerReading],
    total_load: f32,
    options: &ReduceOptions,
    colors: &C,
    untracked_label: L,
) -> Vec<DisplayRow>
where
    C: ColorSource + ?Sized,
    L: FnOnce() -> String,
{
    let unknown_load = untracked_load(consumption, total_load);

    debug!(
        "Reducing {} readings: total load {:.1} W, untracked {:.1} W",
        consumption.len(),
        available(total_load),
        unknown_load
    );

    let mut candidates: Vec<Candidate> = consumption
        .iter()
        .enumerate()
        .map(|(idx, reading)| {
            Candidate::new(reading.name.clone(), reading.watts(), colors.color_for_index(idx))
        })
        .filter(|candidate| candidate.watts >= options.minimal_power_displayed)
        .collect();

    if options.include_untracked {
        candidates.push(Candidate::new(untracked_label(), unknown_load, UNAVAILABLE_COLOR));
    }

    let mut rows: Vec<DisplayRow> = candidates.into_iter().map(Candidate::into_row).collect();
    rows.sort_by(|a, b| b.amount.cmp(&a.amount));
    rows
}
