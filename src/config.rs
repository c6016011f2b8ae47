//! Card configuration
//!
//! Every field has a default, so an empty document is a valid configuration.
//! Keys are snake_case; the camelCase spellings used by dashboard YAML are
//! accepted as aliases.

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec;
use alloc::vec::Vec;
use core::fmt;
use core::time::Duration;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use thiserror_no_std::Error;

use crate::power::ReduceOptions;
use crate::sources::SensorLookup;
use crate::ui::chart::LayoutOptions;
use crate::ui::chart::constants::{
    DEFAULT_CHART_WIDTH_PX, DEFAULT_SQUARE_SIZE_PX, DEFAULT_SQUARES_PER_ROW,
};

pub const DEFAULT_HEADER: &str = "Power consumption";
pub const DEFAULT_MINIMAL_POWER_DISPLAYED_W: f32 = 2.0;
pub const DEFAULT_UPDATE_FREQUENCY_S: u32 = 10;
pub const DEFAULT_SENSOR_LOOKUP: &str = "_energy -> _power";

/// Configuration errors
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// A size or interval that must be positive is zero
    #[error("{field} must be greater than zero")]
    MustBePositive { field: &'static str },

    /// Threshold is negative or not a number
    #[error("minimal_power_displayed must be a non-negative number, got {0}")]
    InvalidThreshold(f32),

    /// Lookup rule is not of the form `search -> replacement`
    #[error("malformed sensor lookup {rule:?}, expected \"search -> replacement\"")]
    MalformedLookup { rule: String },
}

/// How much sensor-mapping diagnostics the card produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DebugSetting {
    /// Log mappings and keep them for display
    True,
    /// Silent
    #[default]
    False,
    /// Log mappings only
    ConsoleOnly,
}

impl DebugSetting {
    /// Whether sensor mappings are logged.
    pub const fn logs(self) -> bool {
        !matches!(self, Self::False)
    }

    /// Whether sensor mappings are recorded for display.
    pub const fn records(self) -> bool {
        matches!(self, Self::True)
    }
}

impl core::str::FromStr for DebugSetting {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "true" => Ok(Self::True),
            "false" => Ok(Self::False),
            "console-only" => Ok(Self::ConsoleOnly),
            other => Err(other.to_string()),
        }
    }
}

struct DebugSettingVisitor;

impl Visitor<'_> for DebugSettingVisitor {
    type Value = DebugSetting;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("true, false or \"console-only\"")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
        Ok(if v {
            DebugSetting::True
        } else {
            DebugSetting::False
        })
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        v.parse()
            .map_err(|_| E::unknown_variant(v, &["true", "false", "console-only"]))
    }
}

// Accepts both YAML booleans and the string spellings
impl<'de> Deserialize<'de> for DebugSetting {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(DebugSettingVisitor)
    }
}

/// Card options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardConfig {
    /// Card title; empty hides the header
    pub header: String,
    #[serde(alias = "includeUntracked")]
    pub include_untracked: bool,
    #[serde(alias = "squareSize")]
    pub square_size: u32,
    #[serde(alias = "squaresPerRow")]
    pub squares_per_row: u32,
    /// Chart width in pixels
    pub width: u32,
    /// Devices below this many watts are hidden
    #[serde(alias = "minimalPowerDisplayed")]
    pub minimal_power_displayed: f32,
    /// Seconds between refreshes
    #[serde(alias = "updateFrequency")]
    pub update_frequency: u32,
    /// `search -> replacement` rules mapping energy to power sensors
    #[serde(alias = "energyToPowerSensorLookups")]
    pub energy_to_power_sensor_lookups: Vec<String>,
    pub debug: DebugSetting,
    /// Style variables, e.g. `--graph-color-1`
    pub theme: BTreeMap<String, String>,
}

impl Default for CardConfig {
    fn default() -> Self {
        Self {
            header: DEFAULT_HEADER.to_string(),
            include_untracked: true,
            square_size: DEFAULT_SQUARE_SIZE_PX,
            squares_per_row: DEFAULT_SQUARES_PER_ROW,
            width: DEFAULT_CHART_WIDTH_PX,
            minimal_power_displayed: DEFAULT_MINIMAL_POWER_DISPLAYED_W,
            update_frequency: DEFAULT_UPDATE_FREQUENCY_S,
            energy_to_power_sensor_lookups: vec![DEFAULT_SENSOR_LOOKUP.to_string()],
            debug: DebugSetting::False,
            theme: BTreeMap::new(),
        }
    }
}

impl CardConfig {
    /// Checks the values serde cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("square_size", self.square_size),
            ("squares_per_row", self.squares_per_row),
            ("width", self.width),
            ("update_frequency", self.update_frequency),
        ];
        if let Some(&(field, _)) = positive.iter().find(|(_, value)| *value == 0) {
            return Err(ConfigError::MustBePositive { field });
        }

        let threshold = self.minimal_power_displayed;
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(ConfigError::InvalidThreshold(threshold));
        }

        self.lookups().map(|_| ())
    }

    /// Header text, `None` when hidden.
    pub fn header(&self) -> Option<&str> {
        (!self.header.is_empty()).then_some(self.header.as_str())
    }

    /// Parsed sensor lookup rules, in order.
    pub fn lookups(&self) -> Result<Vec<SensorLookup>, ConfigError> {
        self.energy_to_power_sensor_lookups
            .iter()
            .map(|rule| rule.parse())
            .collect()
    }

    pub fn layout_options(&self) -> LayoutOptions {
        LayoutOptions {
            square_size: self.square_size,
            svg_width: self.width,
            squares_per_row: self.squares_per_row,
            ..LayoutOptions::default()
        }
    }

    pub fn reduce_options(&self) -> ReduceOptions {
        ReduceOptions {
            minimal_power_displayed: self.minimal_power_displayed,
            include_untracked: self.include_untracked,
        }
    }

    pub fn update_interval(&self) -> Duration {
        Duration::from_secs(u64::from(self.update_frequency))
    }
}
