//! Desktop host for the power-waffle chart.
//!
//! Resolves a synthetic household's energy sensors to power sensors, drives
//! the card's periodic refresh and shows the result:
//!
//! - headless (default): runs `refresh_cycles` refreshes on a simulated clock
//!   and saves the final chart as a PNG at `snapshot_path`
//! - `--features window`: live SDL2 window refreshed on the card schedule
//!
//! Settings come from `power-waffle.toml` (or the path given as the first
//! argument) overlaid with `POWER_WAFFLE__*` environment variables.
//!
//! # Key bindings (window mode)
//!
//! | Key     | Action |
//! |---------|--------|
//! | Q / Esc | Quit   |

mod mock;
mod settings;

use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics_simulator::{OutputSettingsBuilder, SimulatorDisplay};
use log::{error, info, warn};

use power_waffle::PowerGraphCard;
use power_waffle::ui::{ChartCanvas, ChartLayout, Drawable};

use mock::MockHome;
use settings::SimulatorSettings;

fn log_debug_mappings(card: &PowerGraphCard) {
    for mapping in card.debug_mappings() {
        info!(
            "  {} -> {}",
            mapping.energy_sensor,
            mapping.power_sensor.as_deref().unwrap_or("?")
        );
    }
}

/// Runs `cycles` scheduled refreshes on a simulated clock, one card
/// interval apart, and returns the last chart.
fn simulate(card: &mut PowerGraphCard, cycles: u32) -> Option<ChartLayout> {
    let interval = card.schedule().interval();
    let mut last = None;

    for cycle in 0..cycles.max(1) {
        let now = interval * cycle;
        let home = MockHome::at(now.as_secs_f64());
        if let Some(chart) = card.tick(now, &home) {
            info!(
                "Refresh {} at {:?}: {} rows, {} squares",
                cycle + 1,
                now,
                chart.rows.len(),
                chart.square_count()
            );
            last = Some(chart);
        }
    }

    last
}

/// Writes the whole canvas to `path` as a PNG.
fn save_snapshot(canvas: &ChartCanvas, path: &Path, scale: u32) -> anyhow::Result<()> {
    let mut display = SimulatorDisplay::<Rgb565>::new(canvas.size());
    canvas.draw(&mut display)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }

    let output_settings = OutputSettingsBuilder::new().scale(scale).build();
    display
        .to_rgb_output_image(&output_settings)
        .save_png(path)
        .with_context(|| format!("writing snapshot {}", path.display()))?;

    Ok(())
}

fn run_headless(settings: &SimulatorSettings, card: &mut PowerGraphCard) -> anyhow::Result<()> {
    let chart = simulate(card, settings.refresh_cycles).context("card produced no chart")?;

    for row in &chart.rows {
        info!(
            "  {:>3} x {} {}",
            row.squares.len(),
            row.color_border.to_hex(),
            row.label.text
        );
        if row.label.truncated {
            warn!("Label truncated to {:?}", row.label.text);
        }
    }

    save_snapshot(card.canvas(), &settings.snapshot_path, settings.scale)?;
    info!(
        "Saved {}x{} chart to {}",
        chart.viewport.width,
        chart.viewport.height,
        settings.snapshot_path.display()
    );

    card.stop();
    Ok(())
}

#[cfg(feature = "window")]
fn run_window(settings: &SimulatorSettings, card: &mut PowerGraphCard) -> anyhow::Result<()> {
    use embedded_graphics::pixelcolor::Rgb888;
    use embedded_graphics_simulator::{SimulatorEvent, Window, sdl2::Keycode};
    use power_waffle::ui::ChartSurface;
    use std::time::{Duration, Instant};

    /// Tallest chart the window shows; longer charts are clipped.
    const WINDOW_HEIGHT_PX: u32 = 640;
    const FRAME_DURATION: Duration = Duration::from_millis(33);

    let background = Rgb565::from(Rgb888::from(card.canvas().background()));
    let mut display =
        SimulatorDisplay::<Rgb565>::new(Size::new(card.config().width, WINDOW_HEIGHT_PX));
    let output_settings = OutputSettingsBuilder::new().scale(settings.scale).build();
    let title = card.header().unwrap_or("power-waffle").to_string();
    let mut window = Window::new(&title, &output_settings);

    // The SDL window is created on the first update, before events() may be called
    display.clear(background)?;
    window.update(&display);

    let start = Instant::now();
    let mut shown = Size::zero();

    'running: loop {
        let frame_start = Instant::now();

        for event in window.events() {
            match event {
                SimulatorEvent::Quit => break 'running,
                SimulatorEvent::KeyDown { keycode, .. }
                    if keycode == Keycode::Q || keycode == Keycode::Escape =>
                {
                    break 'running;
                }
                _ => {}
            }
        }

        let now = start.elapsed();
        let home = MockHome::at(now.as_secs_f64());
        if let Some(chart) = card.tick(now, &home) {
            if chart.viewport != shown {
                // Height changed: repaint everything so no old rows linger
                display.clear(background)?;
                card.canvas().draw(&mut display)?;
                card.canvas_mut().mark_clean();
                shown = chart.viewport;
            } else {
                card.canvas_mut().flush(&mut display, Point::zero())?;
            }
        }

        window.update(&display);

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME_DURATION {
            std::thread::sleep(FRAME_DURATION - elapsed);
        }
    }

    card.stop();
    Ok(())
}

fn run() -> anyhow::Result<()> {
    let settings_path = std::env::args_os().nth(1).map(PathBuf::from);
    let settings =
        SimulatorSettings::load(settings_path.as_deref()).context("loading simulator settings")?;

    let mut card = PowerGraphCard::new(settings.card.clone())
        .map_err(|e| anyhow!("configuring card: {e}"))?;
    info!(
        "Card {:?}: {} px wide, refresh every {:?}",
        card.header().unwrap_or(""),
        card.config().width,
        card.schedule().interval()
    );

    let meters = card
        .configure(&MockHome::preferences(), &MockHome::at(0.0))
        .map_err(|e| anyhow!("resolving power sensors: {e}"))?;
    info!(
        "Tracking {} devices over {} sources",
        meters.consumers.len(),
        meters.sources.len()
    );
    log_debug_mappings(&card);

    #[cfg(feature = "window")]
    return run_window(&settings, &mut card);

    #[cfg(not(feature = "window"))]
    run_headless(&settings, &mut card)
}

fn main() {
    env_logger::init();
    info!("Starting power-waffle simulator");

    if let Err(e) = run() {
        error!("{e:#}");
        std::process::exit(1);
    }

    info!("Simulator exiting");
}
