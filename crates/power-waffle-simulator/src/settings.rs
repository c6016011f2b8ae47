use std::path::{Path, PathBuf};

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;

use power_waffle::config::{CardConfig, DebugSetting};

/// Settings file looked up in the working directory (any format `config` knows).
const SETTINGS_FILE: &str = "power-waffle";
const ENV_PREFIX: &str = "POWER_WAFFLE";

/// Lookup rules of the demo card, most specific first.
const DEMO_LOOKUPS: [&str; 3] = [
    "_total_energy -> _power_consumption",
    "_accumulated_consumption -> _power",
    "_energy -> _power",
];

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimulatorSettings {
    pub card: CardConfig,
    /// Refreshes to run before the headless snapshot is written
    pub refresh_cycles: u32,
    pub snapshot_path: PathBuf,
    /// Pixel scale of the snapshot and the window
    pub scale: u32,
}

impl Default for SimulatorSettings {
    fn default() -> Self {
        Self {
            card: CardConfig {
                energy_to_power_sensor_lookups: DEMO_LOOKUPS.iter().map(|s| s.to_string()).collect(),
                debug: DebugSetting::ConsoleOnly,
                ..CardConfig::default()
            },
            refresh_cycles: 3,
            snapshot_path: PathBuf::from("power-waffle.png"),
            scale: 1,
        }
    }
}

impl SimulatorSettings {
    /// Loads `path` (or the optional default settings file) overlaid with
    /// `POWER_WAFFLE__*` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(p) => File::from(p),
            None => File::with_name(SETTINGS_FILE).required(false),
        };

        let builder = Config::builder().add_source(file).add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("card.energy_to_power_sensor_lookups")
                .try_parsing(true),
        );
        Self::from_builder(builder)
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let settings: Self = builder.build()?.try_deserialize()?;
        if settings.scale == 0 {
            return Err(ConfigError::Message("scale must be greater than zero".into()));
        }
        Ok(settings)
    }
}
