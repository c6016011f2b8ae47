//! Synthetic household for the simulator.
//!
//! Exposes energy preferences plus live sensor states the way a home
//! automation host would, so the card resolves and reads its meters through
//! the same path it uses in production.

use std::collections::BTreeMap;
use std::f64::consts::TAU;

use power_waffle::sources::{
    DeviceConsumption, EnergyPreferences, EnergySourceEntry, FlowFrom, SensorStates,
};

/// Load nobody has a meter for: lighting, standby, the heating controller.
const BASE_UNTRACKED_W: f64 = 140.0;

/// One simulated device: how it is named and how much it draws over time.
struct MockDevice {
    name: &'static str,
    energy_sensor: &'static str,
    power_sensor: &'static str,
    unit: &'static str,
    /// Draw in watts at `t` seconds; NaN while unavailable
    load: fn(f64) -> f64,
}

fn wave(t: f64, period_secs: f64) -> f64 {
    (TAU * t / period_secs).sin()
}

const DEVICES: [MockDevice; 8] = [
    MockDevice {
        name: "Heat pump",
        energy_sensor: "sensor.heat_pump_total_energy",
        power_sensor: "sensor.heat_pump_power_consumption",
        unit: "W",
        load: |t| 1200.0 + 400.0 * wave(t, 600.0),
    },
    MockDevice {
        name: "Fridge",
        energy_sensor: "sensor.fridge_energy",
        power_sensor: "sensor.fridge_power",
        unit: "W",
        load: |t| if wave(t, 90.0) > 0.0 { 110.0 } else { 4.0 },
    },
    MockDevice {
        name: "Washing machine in the utility room",
        energy_sensor: "sensor.washer_accumulated_consumption",
        power_sensor: "sensor.washer_power",
        unit: "W",
        load: |t| (900.0 * wave(t, 240.0)).max(6.0),
    },
    MockDevice {
        name: "Television",
        energy_sensor: "sensor.tv_energy",
        power_sensor: "sensor.tv_power",
        unit: "W",
        load: |t| 85.0 + 10.0 * wave(t, 30.0),
    },
    MockDevice {
        name: "Router",
        energy_sensor: "sensor.router_energy",
        power_sensor: "sensor.router_power",
        unit: "W",
        load: |_| 9.0,
    },
    MockDevice {
        name: "Phone charger",
        energy_sensor: "sensor.charger_energy",
        power_sensor: "sensor.charger_power",
        unit: "W",
        load: |t| 1.5 + wave(t, 45.0).abs(),
    },
    MockDevice {
        name: "Garage freezer",
        energy_sensor: "sensor.garage_freezer_energy",
        power_sensor: "sensor.garage_freezer_power",
        unit: "W",
        // Drops off the network every other minute
        load: |t| if wave(t, 120.0) < 0.0 { f64::NAN } else { 75.0 },
    },
    MockDevice {
        name: "Boiler",
        energy_sensor: "sensor.boiler_energy",
        power_sensor: "sensor.boiler_power",
        // Reports kW, so it is never accepted as a power sensor
        unit: "kW",
        load: |_| 2.0,
    },
];

const GRID_ENERGY: &str = "sensor.grid_import_energy";
const GRID_POWER: &str = "sensor.grid_import_power";
const SOLAR_ENERGY: &str = "sensor.rooftop_pv_energy";
const SOLAR_POWER: &str = "sensor.rooftop_pv_power";

/// Solar production in watts, reported by the inverter as a negative value.
fn solar_production(t: f64) -> f64 {
    (800.0 * wave(t, 1800.0)).max(0.0)
}

/// Sensor states of the synthetic household at one point in time.
#[derive(Debug, Default)]
pub struct MockHome {
    states: BTreeMap<&'static str, (f32, &'static str)>,
}

impl MockHome {
    /// Household state `t` seconds into the simulation.
    pub fn at(t: f64) -> Self {
        let mut states = BTreeMap::new();
        let mut household = BASE_UNTRACKED_W;

        for device in &DEVICES {
            let load = (device.load)(t);
            if load.is_finite() && device.unit == "W" {
                household += load;
            }
            states.insert(device.power_sensor, (load as f32, device.unit));
        }

        // The grid meter sits upstream of the PV feed-in
        let production = solar_production(t);
        states.insert(GRID_POWER, ((household + production) as f32, "W"));
        states.insert(SOLAR_POWER, (-production as f32, "W"));

        Self { states }
    }

    /// Energy preferences as configured for this household.
    pub fn preferences() -> EnergyPreferences {
        EnergyPreferences {
            energy_sources: vec![
                EnergySourceEntry {
                    kind: "grid".to_string(),
                    flow_from: vec![FlowFrom {
                        stat_energy_from: GRID_ENERGY.to_string(),
                    }],
                    stat_energy_from: None,
                },
                EnergySourceEntry {
                    kind: "solar".to_string(),
                    flow_from: Vec::new(),
                    stat_energy_from: Some(SOLAR_ENERGY.to_string()),
                },
            ],
            device_consumption: DEVICES
                .iter()
                .map(|device| DeviceConsumption {
                    name: device.name.to_string(),
                    stat_consumption: device.energy_sensor.to_string(),
                })
                .collect(),
        }
    }
}

impl SensorStates for MockHome {
    fn state(&self, entity: &str) -> Option<f32> {
        self.states
            .get(entity)
            .map(|(value, _)| *value)
            .filter(|value| !value.is_nan())
    }

    fn unit_of_measurement(&self, entity: &str) -> Option<&str> {
        self.states.get(entity).map(|(_, unit)| *unit)
    }
}
