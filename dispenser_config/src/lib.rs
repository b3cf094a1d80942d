#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the dispenser station.
//!
//! Only the hardware boundary and logging are configurable here. The dispense
//! timeline (relay pulse, sampling delay, windows, threshold) is fixed at
//! build time in `dispenser_core::timing`.
use serde::Deserialize;
use std::path::Path;

/// BCM pin driving the SSR when `[pins]` does not say otherwise.
pub const DEFAULT_RELAY_PIN: u8 = 17;
/// ADC input the alarm line is wired to when `[pins]` does not say otherwise.
pub const DEFAULT_ALARM_CHANNEL: u8 = 0;

const MAX_BCM_PIN: u8 = 27;
const MAX_ADC_CHANNEL: u8 = 7;
const ADC_FULL_SCALE: i32 = 1023;

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Pins {
    pub relay: u8,
    /// Drive the relay pin low to activate.
    pub relay_active_low: bool,
    pub alarm_channel: u8,
    pub spi_bus: u8,
    pub spi_slave_select: u8,
    pub spi_clock_hz: u32,
}

impl Default for Pins {
    fn default() -> Self {
        Self {
            relay: DEFAULT_RELAY_PIN,
            relay_active_low: false,
            alarm_channel: DEFAULT_ALARM_CHANNEL,
            spi_bus: 0,
            spi_slave_select: 0,
            spi_clock_hz: 1_000_000,
        }
    }
}

/// Behaviour of the simulated alarm line used when no board is attached.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Simulation {
    /// Constant level reported on every read.
    pub alarm_level: i32,
    /// Per-read delay modelling ADC conversion time (µs).
    pub read_latency_us: u64,
}

impl Default for Simulation {
    fn default() -> Self {
        Self {
            alarm_level: 512,
            read_latency_us: 50,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub pins: Pins,
    pub simulation: Simulation,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Read, parse and validate a config file.
pub fn load_file(path: &Path) -> eyre::Result<Config> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("read config {}: {}", path.display(), e))?;
    let cfg = load_toml(&text).map_err(|e| eyre::eyre!("parse config {}: {}", path.display(), e))?;
    cfg.validate()?;
    Ok(cfg)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Pins
        if self.pins.relay > MAX_BCM_PIN {
            eyre::bail!("pins.relay must be a BCM pin in 0..={MAX_BCM_PIN}");
        }
        if self.pins.alarm_channel > MAX_ADC_CHANNEL {
            eyre::bail!("pins.alarm_channel must be in 0..={MAX_ADC_CHANNEL}");
        }
        if self.pins.spi_bus > 2 {
            eyre::bail!("pins.spi_bus must be 0, 1 or 2");
        }
        if self.pins.spi_slave_select > 2 {
            eyre::bail!("pins.spi_slave_select must be 0, 1 or 2");
        }
        if !(10_000..=3_600_000).contains(&self.pins.spi_clock_hz) {
            eyre::bail!("pins.spi_clock_hz must be in [10000, 3600000]");
        }

        // Simulation
        if !(0..=ADC_FULL_SCALE).contains(&self.simulation.alarm_level) {
            eyre::bail!("simulation.alarm_level must be in [0, {ADC_FULL_SCALE}]");
        }
        if self.simulation.read_latency_us > 10_000 {
            eyre::bail!("simulation.read_latency_us is unreasonably large (>10ms)");
        }

        // Logging
        if let Some(rotation) = self.logging.rotation.as_deref()
            && !matches!(rotation, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly");
        }
        if let Some(level) = self.logging.level.as_deref()
            && !matches!(
                level.to_ascii_lowercase().as_str(),
                "error" | "warn" | "info" | "debug" | "trace"
            )
        {
            eyre::bail!("logging.level must be one of error|warn|info|debug|trace");
        }

        Ok(())
    }
}
