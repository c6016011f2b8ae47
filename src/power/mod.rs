//! Power readings and their reduction into chart rows
//!
//! A refresh cycle produces a fresh set of [`PowerReading`]s plus one total
//! load figure. [`reduce`] turns them into sorted [`DisplayRow`]s that the
//! chart layout consumes; nothing is retained between cycles.

mod reduce;

pub use reduce::{
    DisplayRow, MAX_SQUARES, ReduceOptions, WATTS_PER_SQUARE, reduce, squares_for,
    untracked_load,
};

use alloc::string::String;

/// Instantaneous wattage sample for one tracked device.
#[derive(Debug, Clone, PartialEq)]
pub struct PowerReading {
    pub name: String,
    /// Last observed power in watts; NaN when the sensor is unavailable.
    pub power: f32,
}

impl PowerReading {
    pub fn new(name: impl Into<String>, power: f32) -> Self {
        Self {
            name: name.into(),
            power,
        }
    }

    /// Power in watts with unavailable values read as 0.
    pub fn watts(&self) -> f32 {
        available(self.power)
    }
}

/// Coerces an unavailable (NaN or infinite) value to 0 W.
#[inline]
pub fn available(value: f32) -> f32 {
    if value.is_finite() { value } else { 0.0 }
}

/// Sums power values, counting unavailable ones as 0 W.
pub fn sum_available<I>(values: I) -> f32
where
    I: IntoIterator<Item = f32>,
{
    values.into_iter().map(available).sum()
}
