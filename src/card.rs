//! The power graph card
//!
//! Ties the pieces together: configuration, sensor resolution, the periodic
//! refresh, the reducer and the chart layout on a [`ChartCanvas`].

use alloc::string::String;
use alloc::vec::Vec;
use core::time::Duration;

use log::{debug, info};
use thiserror_no_std::Error;

use crate::config::{CardConfig, ConfigError};
use crate::locale::{EnglishLocale, Localize, UNTRACKED_CONSUMPTION_KEY};
use crate::power::{PowerReading, reduce};
use crate::sources::{
    EnergyPreferences, PowerMeters, SensorLookup, SensorMapping, SensorResolver, SensorStates,
    SourceError,
};
use crate::ui::canvas::ChartCanvas;
use crate::ui::chart::{ChartLayout, LayoutOptions, layout};
use crate::ui::styling::{
    ColorParseError, GraphPalette, HexColor, StyleLookup, named_color,
};

/// Style variable overriding the canvas background.
pub const BACKGROUND_VARIABLE: &str = "--card-background-color";

/// Errors that prevent the card from being set up
#[derive(Debug, Error, PartialEq)]
pub enum CardError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid energy source: {0}")]
    Source(#[from] SourceError),

    #[error("invalid theme color: {0}")]
    Color(#[from] ColorParseError),
}

/// Fixed-interval refresh timer driven by the host's monotonic clock.
///
/// The first poll fires immediately. Ticks missed while the host was busy
/// are collapsed into one, so refreshes never pile up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshSchedule {
    interval: Duration,
    next_due: Option<Duration>,
    cancelled: bool,
}

impl RefreshSchedule {
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_due: None,
            cancelled: false,
        }
    }

    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Time of the next refresh, `None` before the first poll or after cancel.
    pub fn next_due(&self) -> Option<Duration> {
        if self.cancelled { None } else { self.next_due }
    }

    /// Returns true when a refresh is due at `now`.
    pub fn poll(&mut self, now: Duration) -> bool {
        if self.cancelled {
            return false;
        }

        match self.next_due {
            Some(due) if now < due => false,
            Some(due) => {
                let next = due + self.interval;
                self.next_due = Some(if next <= now { now + self.interval } else { next });
                true
            }
            None => {
                self.next_due = Some(now + self.interval);
                true
            }
        }
    }

    /// Stops the schedule for good.
    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    pub const fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}

/// Resolves the canvas background from the theme, if overridden.
fn theme_background<S: StyleLookup + ?Sized>(theme: &S) -> Result<Option<HexColor>, CardError> {
    let Some(value) = theme.property(BACKGROUND_VARIABLE).map(str::trim) else {
        return Ok(None);
    };

    if value.starts_with('#') {
        return Ok(Some(value.parse()?));
    }
    named_color(value)
        .map(Some)
        .ok_or_else(|| CardError::Color(ColorParseError::UnknownName(String::from(value))))
}

/// Waffle chart card showing live per-device power draw.
pub struct PowerGraphCard<L: Localize = EnglishLocale> {
    config: CardConfig,
    lookups: Vec<SensorLookup>,
    layout_options: LayoutOptions,
    locale: L,
    canvas: ChartCanvas,
    schedule: RefreshSchedule,
    meters: Option<PowerMeters>,
    mappings: Vec<SensorMapping>,
}

impl PowerGraphCard<EnglishLocale> {
    pub fn new(config: CardConfig) -> Result<Self, CardError> {
        Self::with_locale(config, EnglishLocale)
    }
}

impl<L: Localize> PowerGraphCard<L> {
    /// Validates `config` and builds a card using `locale` for its labels.
    pub fn with_locale(config: CardConfig, locale: L) -> Result<Self, CardError> {
        config.validate()?;

        let mut canvas = ChartCanvas::new();
        if let Some(background) = theme_background(&config.theme)? {
            canvas = canvas.with_background(background);
        }

        info!(
            "Card configured: {} px wide, {} squares per row, refresh every {} s",
            config.width, config.squares_per_row, config.update_frequency
        );

        Ok(Self {
            lookups: config.lookups()?,
            layout_options: config.layout_options(),
            schedule: RefreshSchedule::new(config.update_interval()),
            config,
            locale,
            canvas,
            meters: None,
            mappings: Vec::new(),
        })
    }

    pub fn config(&self) -> &CardConfig {
        &self.config
    }

    pub fn header(&self) -> Option<&str> {
        self.config.header()
    }

    pub fn canvas(&self) -> &ChartCanvas {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut ChartCanvas {
        &mut self.canvas
    }

    pub fn schedule(&self) -> &RefreshSchedule {
        &self.schedule
    }

    /// Sensor mappings of the last [`configure`](Self::configure), when debug is `true`.
    pub fn debug_mappings(&self) -> &[SensorMapping] {
        &self.mappings
    }

    pub fn meters(&self) -> Option<&PowerMeters> {
        self.meters.as_ref()
    }

    /// Maps the energy preferences onto power sensors.
    ///
    /// Replaces any previous mapping. Fails on an unsupported source category.
    pub fn configure<S: SensorStates + ?Sized>(
        &mut self,
        preferences: &EnergyPreferences,
        states: &S,
    ) -> Result<&PowerMeters, CardError> {
        let mut resolver = SensorResolver::new(&self.lookups, self.config.debug);
        let meters = PowerMeters::resolve(preferences, &mut resolver, states)?;
        self.mappings = resolver.into_mappings();

        Ok(self.meters.insert(meters))
    }

    /// Rebuilds the chart from one set of readings.
    ///
    /// Runs to completion before returning, so two refreshes never interleave.
    pub fn refresh(&mut self, consumption: &[PowerReading], total_load: f32) -> ChartLayout {
        let palette = GraphPalette::new(&self.config.theme);
        let locale = &self.locale;
        let rows = reduce(
            consumption,
            total_load,
            &self.config.reduce_options(),
            &palette,
            || locale.localize(UNTRACKED_CONSUMPTION_KEY),
        );

        let Ok(chart) = layout(&mut self.canvas, &rows, &self.layout_options);
        debug!(
            "Refreshed chart: {} rows, {} squares, {}x{}",
            chart.rows.len(),
            chart.square_count(),
            chart.viewport.width,
            chart.viewport.height
        );
        chart
    }

    /// Reads the configured meters from `states` and refreshes.
    ///
    /// Returns `None` until [`configure`](Self::configure) has succeeded.
    pub fn refresh_from<S: SensorStates + ?Sized>(&mut self, states: &S) -> Option<ChartLayout> {
        let meters = self.meters.as_ref()?;
        let consumption = meters.read_consumption(states);
        let total_load = meters.read_total_load(states);
        Some(self.refresh(&consumption, total_load))
    }

    /// Refreshes from `states` if the schedule is due at `now`.
    pub fn tick<S: SensorStates + ?Sized>(
        &mut self,
        now: Duration,
        states: &S,
    ) -> Option<ChartLayout> {
        if !self.schedule.poll(now) {
            return None;
        }
        self.refresh_from(states)
    }

    /// Cancels the periodic refresh, e.g. when the card is removed.
    pub fn stop(&mut self) {
        info!("Stopping card refresh");
        self.schedule.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DebugSetting;
    use crate::sources::{DeviceConsumption, EnergySourceEntry, FlowFrom};
    use crate::ui::core::ChartSurface;
    use crate::ui::styling::{UNAVAILABLE_COLOR, fallback_color};
    use alloc::collections::BTreeMap;
    use alloc::string::{String, ToString};
    use alloc::vec;
    use embedded_graphics::prelude::*;

    const SECOND: Duration = Duration::from_secs(1);

    struct States(BTreeMap<String, f32>);

    impl SensorStates for States {
        fn state(&self, entity: &str) -> Option<f32> {
            self.0.get(entity).copied()
        }

        fn unit_of_measurement(&self, entity: &str) -> Option<&str> {
            self.0.contains_key(entity).then_some("W")
        }
    }

    fn states(entries: &[(&str, f32)]) -> States {
        States(
            entries
                .iter()
                .map(|(name, value)| (name.to_string(), *value))
                .collect(),
        )
    }

    fn preferences() -> EnergyPreferences {
        EnergyPreferences {
            energy_sources: vec![EnergySourceEntry {
                kind: "grid".to_string(),
                flow_from: vec![FlowFrom {
                    stat_energy_from: "sensor.grid_energy".to_string(),
                }],
                stat_energy_from: None,
            }],
            device_consumption: vec![
                DeviceConsumption {
                    name: "A".to_string(),
                    stat_consumption: "sensor.a_energy".to_string(),
                },
                DeviceConsumption {
                    name: "B".to_string(),
                    stat_consumption: "sensor.b_energy".to_string(),
                },
            ],
        }
    }

    #[test]
    fn test_schedule_fires_immediately_then_per_interval() {
        let mut schedule = RefreshSchedule::new(10 * SECOND);

        assert!(schedule.poll(Duration::ZERO));
        assert!(!schedule.poll(5 * SECOND));
        assert!(schedule.poll(10 * SECOND));
        assert!(!schedule.poll(10 * SECOND));
        assert_eq!(schedule.next_due(), Some(20 * SECOND));
    }

    #[test]
    fn test_schedule_collapses_missed_ticks() {
        let mut schedule = RefreshSchedule::new(10 * SECOND);
        schedule.poll(Duration::ZERO);

        // Host stalled for 35 s: one refresh, not three
        assert!(schedule.poll(35 * SECOND));
        assert!(!schedule.poll(36 * SECOND));
        assert_eq!(schedule.next_due(), Some(45 * SECOND));
    }

    #[test]
    fn test_cancelled_schedule_never_fires() {
        let mut schedule = RefreshSchedule::new(SECOND);
        schedule.poll(Duration::ZERO);
        schedule.cancel();

        assert!(!schedule.poll(100 * SECOND));
        assert!(schedule.is_cancelled());
        assert_eq!(schedule.next_due(), None);
    }

    #[test]
    fn test_refresh_reduces_and_lays_out() {
        let mut card = PowerGraphCard::new(CardConfig::default()).unwrap();
        let consumption = vec![PowerReading::new("A", 5.0), PowerReading::new("B", 100.0)];

        let chart = card.refresh(&consumption, 200.0);
        let labels: Vec<&str> = chart.rows.iter().map(|r| r.label.text.as_str()).collect();

        assert_eq!(labels, vec!["B", "Untracked consumption", "A"]);
        assert_eq!(chart.square_count(), 20);
        assert_eq!(chart.rows[1].color_border, UNAVAILABLE_COLOR);
        assert_eq!(chart.rows[0].color_border, fallback_color(1));
        assert_eq!(card.canvas().size(), chart.viewport);
    }

    #[test]
    fn test_theme_overrides_device_color_and_background() {
        let mut config = CardConfig::default();
        config
            .theme
            .insert("--graph-color-1".to_string(), "#ff0000".to_string());
        config
            .theme
            .insert(BACKGROUND_VARIABLE.to_string(), "white".to_string());
        let mut card = PowerGraphCard::new(config).unwrap();

        let chart = card.refresh(&[PowerReading::new("A", 50.0)], 50.0);
        let a = chart.rows.iter().find(|r| r.label.text == "A").unwrap();

        assert_eq!(a.color_border, HexColor::rgb(0xff, 0, 0));
        assert_eq!(card.canvas().background(), HexColor::rgb(0xff, 0xff, 0xff));
    }

    #[test]
    fn test_invalid_setup_is_rejected() {
        let config = CardConfig {
            squares_per_row: 0,
            ..CardConfig::default()
        };
        assert!(matches!(
            PowerGraphCard::new(config),
            Err(CardError::Config(_))
        ));

        let mut config = CardConfig::default();
        config
            .theme
            .insert(BACKGROUND_VARIABLE.to_string(), "#12".to_string());
        assert!(matches!(
            PowerGraphCard::new(config),
            Err(CardError::Color(_))
        ));
    }

    #[test]
    fn test_unknown_background_name_is_reported() {
        let mut config = CardConfig::default();
        config
            .theme
            .insert(BACKGROUND_VARIABLE.to_string(), " rebeccapurpl ".to_string());

        match PowerGraphCard::new(config) {
            Err(CardError::Color(ColorParseError::UnknownName(name))) => {
                assert_eq!(name, "rebeccapurpl");
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("unknown color name accepted"),
        }
    }

    #[test]
    fn test_localized_untracked_label() {
        let locale = |_: &str| String::from("Nicht erfasst");
        let mut card = PowerGraphCard::with_locale(CardConfig::default(), locale).unwrap();

        let chart = card.refresh(&[], 100.0);
        assert_eq!(chart.rows[0].label.text, "Nicht erfasst");
    }

    #[test]
    fn test_tick_follows_schedule() {
        let config = CardConfig {
            debug: DebugSetting::True,
            ..CardConfig::default()
        };
        let mut card = PowerGraphCard::new(config).unwrap();
        let states = states(&[
            ("sensor.grid_power", 300.0),
            ("sensor.a_power", 120.0),
            ("sensor.b_power", f32::NAN),
        ]);

        // Not configured yet
        assert_eq!(card.refresh_from(&states), None);

        card.configure(&preferences(), &states).unwrap();
        assert_eq!(card.debug_mappings().len(), 3);

        let first = card.tick(Duration::ZERO, &states).unwrap();
        // A: 12 squares, untracked: 18, B unavailable and filtered
        assert_eq!(first.square_count(), 30);
        assert_eq!(card.tick(5 * SECOND, &states), None);
        assert!(card.tick(10 * SECOND, &states).is_some());

        card.stop();
        assert_eq!(card.tick(20 * SECOND, &states), None);
    }

    #[test]
    fn test_unsupported_source_surfaces_as_card_error() {
        let mut card = PowerGraphCard::new(CardConfig::default()).unwrap();
        let mut preferences = preferences();
        preferences.energy_sources[0].kind = "gas".to_string();

        let err = card.configure(&preferences, &states(&[])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid energy source: unsupported power source type: gas"
        );
    }
}
