//! Energy sources and the mapping from energy sensors to power sensors
//!
//! Energy preferences only name cumulative energy sensors (kWh). The chart
//! needs instantaneous power, so every energy sensor is mapped to a power
//! sensor by substring substitution rules such as `"_energy -> _power"`,
//! keeping the first candidate the host confirms is a watt sensor.

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::str::FromStr;

use log::{info, warn};
use serde::Deserialize;
use thiserror_no_std::Error;

use crate::config::{ConfigError, DebugSetting};
use crate::power::{PowerReading, sum_available};

/// Unit a candidate sensor must report to count as a power sensor.
pub const POWER_UNIT: &str = "W";

/// Errors raised while building the energy source model.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SourceError {
    /// Source category other than grid, solar or battery
    #[error("unsupported power source type: {0}")]
    UnsupportedSourceType(String),

    /// Source entry without the sensor its category requires
    #[error("{kind} source has no energy sensor")]
    MissingEnergySensor {
        /// Source category
        kind: &'static str,
    },
}

/// One `search -> replacement` substitution rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorLookup {
    pub search: String,
    pub replacement: String,
}

impl SensorLookup {
    pub fn new(search: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            search: search.into(),
            replacement: replacement.into(),
        }
    }

    /// Candidate power sensor: the first occurrence of `search` replaced.
    pub fn apply(&self, energy_sensor: &str) -> String {
        energy_sensor.replacen(&self.search, &self.replacement, 1)
    }
}

impl FromStr for SensorLookup {
    type Err = ConfigError;

    fn from_str(rule: &str) -> Result<Self, Self::Err> {
        let malformed = || ConfigError::MalformedLookup {
            rule: rule.to_string(),
        };

        let (search, replacement) = rule.split_once("->").ok_or_else(malformed)?;
        let (search, replacement) = (search.trim(), replacement.trim());
        if search.is_empty() || replacement.contains("->") {
            return Err(malformed());
        }

        Ok(Self::new(search, replacement))
    }
}

/// Read access to the host's entity states.
pub trait SensorStates {
    /// Numeric state of `entity`; `None` when missing or not a number.
    fn state(&self, entity: &str) -> Option<f32>;

    /// Unit of measurement attribute of `entity`.
    fn unit_of_measurement(&self, entity: &str) -> Option<&str>;

    /// Whether `entity` exists and reports watts.
    fn is_power_sensor(&self, entity: &str) -> bool {
        self.unit_of_measurement(entity) == Some(POWER_UNIT)
    }
}

/// Returns the first lookup candidate accepted by `is_power_sensor`.
pub fn guess_power_sensor<F>(
    energy_sensor: &str,
    lookups: &[SensorLookup],
    is_power_sensor: F,
) -> Option<String>
where
    F: Fn(&str) -> bool,
{
    lookups
        .iter()
        .map(|lookup| lookup.apply(energy_sensor))
        .find(|candidate| is_power_sensor(candidate))
}

/// Outcome of one energy-to-power mapping attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorMapping {
    pub energy_sensor: String,
    /// `None` when no rule produced a power sensor.
    pub power_sensor: Option<String>,
}

/// Maps energy sensors to power sensors, logging and recording the
/// attempts according to the card's debug setting.
pub struct SensorResolver<'a> {
    lookups: &'a [SensorLookup],
    debug: DebugSetting,
    mappings: Vec<SensorMapping>,
}

impl<'a> SensorResolver<'a> {
    pub fn new(lookups: &'a [SensorLookup], debug: DebugSetting) -> Self {
        Self {
            lookups,
            debug,
            mappings: Vec::new(),
        }
    }

    /// Maps one energy sensor using `states` to confirm candidates.
    pub fn resolve<S: SensorStates + ?Sized>(
        &mut self,
        energy_sensor: &str,
        states: &S,
    ) -> Option<String> {
        let power_sensor = guess_power_sensor(energy_sensor, self.lookups, |candidate| {
            states.is_power_sensor(candidate)
        });

        if self.debug.logs() {
            match &power_sensor {
                Some(sensor) => {
                    info!("Mapped energy sensor \"{energy_sensor}\" to power sensor \"{sensor}\"")
                }
                None => warn!("Could not map energy sensor \"{energy_sensor}\" to any power sensor"),
            }
        }

        if self.debug.records() {
            self.mappings.push(SensorMapping {
                energy_sensor: energy_sensor.to_string(),
                power_sensor: power_sensor.clone(),
            });
        }

        power_sensor
    }

    /// Attempts recorded so far, only kept when debug is `true`.
    pub fn mappings(&self) -> &[SensorMapping] {
        &self.mappings
    }

    pub fn into_mappings(self) -> Vec<SensorMapping> {
        self.mappings
    }
}

/// Grid import flow entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FlowFrom {
    pub stat_energy_from: String,
}

/// Source entry as stored in the energy preferences.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EnergySourceEntry {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub flow_from: Vec<FlowFrom>,
    #[serde(default)]
    pub stat_energy_from: Option<String>,
}

/// Tracked device as stored in the energy preferences.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeviceConsumption {
    pub name: String,
    pub stat_consumption: String,
}

/// The parts of the energy preferences the card uses.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct EnergyPreferences {
    #[serde(default)]
    pub energy_sources: Vec<EnergySourceEntry>,
    #[serde(default)]
    pub device_consumption: Vec<DeviceConsumption>,
}

/// A validated energy source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnergySource {
    Grid { flow_from: Vec<FlowFrom> },
    Solar { stat_energy_from: String },
    Battery { stat_energy_from: String },
}

impl EnergySource {
    /// Energy sensor whose power counterpart feeds the total load.
    ///
    /// Only the first grid flow is used.
    pub fn energy_sensor(&self) -> &str {
        match self {
            Self::Grid { flow_from } => flow_from
                .first()
                .map_or("", |flow| flow.stat_energy_from.as_str()),
            Self::Solar { stat_energy_from } | Self::Battery { stat_energy_from } => {
                stat_energy_from
            }
        }
    }
}

impl TryFrom<EnergySourceEntry> for EnergySource {
    type Error = SourceError;

    fn try_from(entry: EnergySourceEntry) -> Result<Self, Self::Error> {
        match entry.kind.as_str() {
            "grid" if entry.flow_from.is_empty() => {
                Err(SourceError::MissingEnergySensor { kind: "grid" })
            }
            "grid" => Ok(Self::Grid {
                flow_from: entry.flow_from,
            }),
            "solar" => entry
                .stat_energy_from
                .map(|stat_energy_from| Self::Solar { stat_energy_from })
                .ok_or(SourceError::MissingEnergySensor { kind: "solar" }),
            "battery" => entry
                .stat_energy_from
                .map(|stat_energy_from| Self::Battery { stat_energy_from })
                .ok_or(SourceError::MissingEnergySensor { kind: "battery" }),
            _ => Err(SourceError::UnsupportedSourceType(entry.kind)),
        }
    }
}

/// A tracked device and the power sensor it was mapped to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PowerConsumer {
    pub name: String,
    pub sensor: String,
}

/// Power sensors resolved from the energy preferences.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PowerMeters {
    /// Sensors summed into the total load
    pub sources: Vec<String>,
    pub consumers: Vec<PowerConsumer>,
}

impl PowerMeters {
    /// Resolves every source and device of `preferences`.
    ///
    /// Sources and devices whose power sensor cannot be guessed are skipped
    /// with a warning. An unsupported source category fails the whole
    /// configuration.
    pub fn resolve<S: SensorStates + ?Sized>(
        preferences: &EnergyPreferences,
        resolver: &mut SensorResolver<'_>,
        states: &S,
    ) -> Result<Self, SourceError> {
        let mut meters = Self::default();

        for entry in &preferences.energy_sources {
            let source = EnergySource::try_from(entry.clone())?;
            match resolver.resolve(source.energy_sensor(), states) {
                Some(sensor) => meters.sources.push(sensor),
                None => warn!("Could not guess power sensor for {} source", entry.kind),
            }
        }

        for device in &preferences.device_consumption {
            match resolver.resolve(&device.stat_consumption, states) {
                Some(sensor) => meters.consumers.push(PowerConsumer {
                    name: device.name.clone(),
                    sensor,
                }),
                None => warn!("Could not guess power sensor for device {}", device.name),
            }
        }

        info!(
            "Resolved {} power sources and {} consumers",
            meters.sources.len(),
            meters.consumers.len()
        );

        Ok(meters)
    }

    /// Current reading of every consumer; unavailable states read as NaN.
    pub fn read_consumption<S: SensorStates + ?Sized>(&self, states: &S) -> Vec<PowerReading> {
        self.consumers
            .iter()
            .map(|consumer| {
                PowerReading::new(
                    consumer.name.clone(),
                    states.state(&consumer.sensor).unwrap_or(f32::NAN),
                )
            })
            .collect()
    }

    /// Current total load across all sources.
    pub fn read_total_load<S: SensorStates + ?Sized>(&self, states: &S) -> f32 {
        total_load(
            self.sources
                .iter()
                .map(|sensor| states.state(sensor).unwrap_or(f32::NAN)),
        )
    }
}

/// Sums source readings, reading unavailable values as 0.
///
/// Production sources (solar, a discharging battery) are expected to report
/// negative values, so the sum is the net load of the household.
pub fn total_load<I: IntoIterator<Item = f32>>(values: I) -> f32 {
    sum_available(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::collections::BTreeMap;
    use alloc::vec;

    #[derive(Default)]
    struct States(BTreeMap<&'static str, (&'static str, &'static str)>);

    impl States {
        fn with(mut self, entity: &'static str, state: &'static str, unit: &'static str) -> Self {
            self.0.insert(entity, (state, unit));
            self
        }
    }

    impl SensorStates for States {
        fn state(&self, entity: &str) -> Option<f32> {
            self.0.get(entity).and_then(|(state, _)| state.parse().ok())
        }

        fn unit_of_measurement(&self, entity: &str) -> Option<&str> {
            self.0.get(entity).map(|(_, unit)| *unit)
        }
    }

    fn default_lookups() -> Vec<SensorLookup> {
        vec![SensorLookup::new("_energy", "_power")]
    }

    #[test]
    fn test_parse_lookup_trims_both_sides() {
        let lookup: SensorLookup = " _total_energy ->  _power_consumption ".parse().unwrap();
        assert_eq!(lookup, SensorLookup::new("_total_energy", "_power_consumption"));

        let empty_replacement: SensorLookup = "_energy ->".parse().unwrap();
        assert_eq!(empty_replacement.replacement, "");
    }

    #[test]
    fn test_parse_lookup_rejects_malformed_rules() {
        for rule in ["_energy _power", "-> _power", "a -> b -> c"] {
            assert_eq!(
                rule.parse::<SensorLookup>(),
                Err(ConfigError::MalformedLookup {
                    rule: rule.to_string()
                })
            );
        }
    }

    #[test]
    fn test_lookup_replaces_first_occurrence_only() {
        let lookup = SensorLookup::new("_energy", "_power");
        assert_eq!(lookup.apply("sensor.oven_energy_energy"), "sensor.oven_power_energy");
        assert_eq!(lookup.apply("sensor.unrelated"), "sensor.unrelated");
    }

    #[test]
    fn test_guess_takes_first_accepted_candidate() {
        let lookups = vec![
            SensorLookup::new("_total_energy", "_power_consumption"),
            SensorLookup::new("_energy", "_power"),
        ];
        let guessed = guess_power_sensor("sensor.fridge_total_energy", &lookups, |candidate| {
            candidate == "sensor.fridge_total_power"
        });
        assert_eq!(guessed.as_deref(), Some("sensor.fridge_total_power"));

        let none = guess_power_sensor("sensor.fridge_total_energy", &lookups, |_| false);
        assert_eq!(none, None);
    }

    #[test]
    fn test_resolver_requires_watt_unit() {
        let states = States::default()
            .with("sensor.tv_power", "80", "W")
            .with("sensor.boiler_power", "1.2", "kW");
        let lookups = default_lookups();
        let mut resolver = SensorResolver::new(&lookups, DebugSetting::False);

        assert_eq!(
            resolver.resolve("sensor.tv_energy", &states).as_deref(),
            Some("sensor.tv_power")
        );
        assert_eq!(resolver.resolve("sensor.boiler_energy", &states), None);
        assert_eq!(resolver.resolve("sensor.missing_energy", &states), None);
    }

    #[test]
    fn test_mappings_recorded_only_in_full_debug() {
        let states = States::default().with("sensor.tv_power", "80", "W");
        let lookups = default_lookups();

        let mut recording = SensorResolver::new(&lookups, DebugSetting::True);
        recording.resolve("sensor.tv_energy", &states);
        recording.resolve("sensor.lamp_energy", &states);
        assert_eq!(
            recording.mappings(),
            &[
                SensorMapping {
                    energy_sensor: "sensor.tv_energy".to_string(),
                    power_sensor: Some("sensor.tv_power".to_string()),
                },
                SensorMapping {
                    energy_sensor: "sensor.lamp_energy".to_string(),
                    power_sensor: None,
                },
            ]
        );

        let mut console_only = SensorResolver::new(&lookups, DebugSetting::ConsoleOnly);
        console_only.resolve("sensor.tv_energy", &states);
        assert!(console_only.into_mappings().is_empty());
    }

    #[test]
    fn test_source_categories() {
        let grid = EnergySourceEntry {
            kind: "grid".to_string(),
            flow_from: vec![
                FlowFrom {
                    stat_energy_from: "sensor.grid_in_energy".to_string(),
                },
                FlowFrom {
                    stat_energy_from: "sensor.grid_in2_energy".to_string(),
                },
            ],
            stat_energy_from: None,
        };
        let source = EnergySource::try_from(grid).unwrap();
        assert_eq!(source.energy_sensor(), "sensor.grid_in_energy");

        let solar = EnergySourceEntry {
            kind: "solar".to_string(),
            flow_from: Vec::new(),
            stat_energy_from: Some("sensor.pv_energy".to_string()),
        };
        assert_eq!(
            EnergySource::try_from(solar).unwrap(),
            EnergySource::Solar {
                stat_energy_from: "sensor.pv_energy".to_string()
            }
        );
    }

    #[test]
    fn test_unsupported_source_type_is_fatal() {
        let gas = EnergySourceEntry {
            kind: "gas".to_string(),
            flow_from: Vec::new(),
            stat_energy_from: Some("sensor.gas_energy".to_string()),
        };
        let err = EnergySource::try_from(gas).unwrap_err();
        assert_eq!(err, SourceError::UnsupportedSourceType("gas".to_string()));
        assert_eq!(err.to_string(), "unsupported power source type: gas");

        let preferences = EnergyPreferences {
            energy_sources: vec![EnergySourceEntry {
                kind: "water".to_string(),
                flow_from: Vec::new(),
                stat_energy_from: None,
            }],
            device_consumption: Vec::new(),
        };
        let lookups = default_lookups();
        let mut resolver = SensorResolver::new(&lookups, DebugSetting::False);
        assert!(PowerMeters::resolve(&preferences, &mut resolver, &States::default()).is_err());
    }

    #[test]
    fn test_missing_sensor_for_category() {
        let grid = EnergySourceEntry {
            kind: "grid".to_string(),
            flow_from: Vec::new(),
            stat_energy_from: None,
        };
        assert_eq!(
            EnergySource::try_from(grid),
            Err(SourceError::MissingEnergySensor { kind: "grid" })
        );
    }

    #[test]
    fn test_resolve_and_read_meters() {
        let states = States::default()
            .with("sensor.grid_power", "350", "W")
            .with("sensor.pv_power", "-120", "W")
            .with("sensor.fridge_power", "95.5", "W")
            .with("sensor.dryer_power", "unavailable", "W");
        let preferences = EnergyPreferences {
            energy_sources: vec![
                EnergySourceEntry {
                    kind: "grid".to_string(),
                    flow_from: vec![FlowFrom {
                        stat_energy_from: "sensor.grid_energy".to_string(),
                    }],
                    stat_energy_from: None,
                },
                EnergySourceEntry {
                    kind: "solar".to_string(),
                    flow_from: Vec::new(),
                    stat_energy_from: Some("sensor.pv_energy".to_string()),
                },
            ],
            device_consumption: vec![
                DeviceConsumption {
                    name: "Fridge".to_string(),
                    stat_consumption: "sensor.fridge_energy".to_string(),
                },
                DeviceConsumption {
                    name: "Dryer".to_string(),
                    stat_consumption: "sensor.dryer_energy".to_string(),
                },
                DeviceConsumption {
                    name: "Unmapped".to_string(),
                    stat_consumption: "sensor.unmapped_kwh".to_string(),
                },
            ],
        };
        let lookups = default_lookups();
        let mut resolver = SensorResolver::new(&lookups, DebugSetting::False);
        let meters = PowerMeters::resolve(&preferences, &mut resolver, &states).unwrap();

        assert_eq!(meters.sources, vec!["sensor.grid_power", "sensor.pv_power"]);
        assert_eq!(meters.consumers.len(), 2);

        let consumption = meters.read_consumption(&states);
        assert_eq!(consumption[0], PowerReading::new("Fridge", 95.5));
        assert!(consumption[1].power.is_nan());
        assert_eq!(consumption[1].watts(), 0.0);

        assert_eq!(meters.read_total_load(&states), 230.0);
    }

    #[test]
    fn test_total_load_skips_unavailable() {
        assert_eq!(total_load([100.0, f32::NAN, -40.0]), 60.0);
        assert_eq!(total_load(core::iter::empty()), 0.0);
    }
}
