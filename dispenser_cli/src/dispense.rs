//! Hardware assembly and the three subcommands.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use dispenser_config::Config;
use dispenser_core::error::Result as CoreResult;
use dispenser_core::{AttemptReport, DispenseController, DispenseStatus, OperatingMode, Station};
use dispenser_traits::{AlarmLine, Relay};
use serde_json::json;
#[cfg(all(feature = "hardware", target_os = "linux"))]
use eyre::WrapErr;

use crate::console::StdioPort;

pub type BoxedRelay = Box<dyn Relay + Send>;
pub type BoxedAlarmLine = Box<dyn AlarmLine + Send>;

/// Open the relay and alarm line: rppal-backed with the `hardware` feature on
/// Linux, simulated otherwise.
pub fn open_hardware(cfg: &Config) -> eyre::Result<(BoxedRelay, BoxedAlarmLine)> {
    #[cfg(all(feature = "hardware", target_os = "linux"))]
    {
        let relay = dispenser_hardware::HardwareRelay::new(cfg.pins.relay, cfg.pins.relay_active_low)
            .wrap_err("open relay pin")?;
        let alarm = dispenser_hardware::HardwareAlarmLine::new(
            cfg.pins.spi_bus,
            cfg.pins.spi_slave_select,
            cfg.pins.spi_clock_hz,
            cfg.pins.alarm_channel,
        )
        .wrap_err("open alarm adc")?;
        tracing::info!(
            relay_pin = cfg.pins.relay,
            alarm_channel = cfg.pins.alarm_channel,
            "hardware backend"
        );
        Ok((Box::new(relay), Box::new(alarm)))
    }
    #[cfg(not(all(feature = "hardware", target_os = "linux")))]
    {
        let alarm = dispenser_hardware::SimulatedAlarmLine::new(cfg.simulation.alarm_level)
            .with_read_latency(std::time::Duration::from_micros(cfg.simulation.read_latency_us));
        tracing::info!(
            alarm_level = cfg.simulation.alarm_level,
            read_latency_us = cfg.simulation.read_latency_us,
            "simulated backend"
        );
        Ok((Box::new(dispenser_hardware::SimulatedRelay::new()), Box::new(alarm)))
    }
}

fn controller(cfg: &Config) -> eyre::Result<DispenseController<BoxedRelay, BoxedAlarmLine>> {
    let (relay, alarm) = open_hardware(cfg)?;
    Ok(DispenseController::builder()
        .with_relay(relay)
        .with_alarm_line(alarm)
        .build())
}

/// Serve stdin commands until Ctrl-C, or until stdin closes in interactive mode.
pub fn run_station(
    cfg: &Config,
    timed: bool,
    shutdown: Arc<AtomicBool>,
) -> CoreResult<DispenseStatus> {
    let mode = if timed {
        OperatingMode::Timed
    } else {
        OperatingMode::Interactive
    };
    let mut station = Station::new(controller(cfg)?, StdioPort::spawn()?).with_mode(mode);
    station.run(&shutdown)?;
    Ok(station.controller().status())
}

/// One attempt; returns the verdict and what the windows measured.
pub fn run_attempt(cfg: &Config) -> CoreResult<(DispenseStatus, Option<AttemptReport>)> {
    let mut ctl = controller(cfg)?;
    ctl.attempt_dispense()?;
    Ok((ctl.status(), ctl.last_report().copied()))
}

pub fn report_json(status: DispenseStatus, report: Option<&AttemptReport>) -> serde_json::Value {
    let window = |w: &dispenser_core::WindowSummary| {
        json!({ "samples": w.samples, "sum": w.sum, "mean": w.mean })
    };
    match report {
        Some(r) => json!({
            "status": status.code().to_string(),
            "verdict": status.to_string(),
            "elapsed_ms": r.elapsed_ms,
            "alarm_window": window(&r.alarm),
            "normal_window": window(&r.normal),
        }),
        None => json!({
            "status": status.code().to_string(),
            "verdict": status.to_string(),
        }),
    }
}

/// Open both lines, make sure the relay is released, take one alarm reading.
pub fn self_check(cfg: &Config) -> eyre::Result<i32> {
    let (mut relay, mut alarm) = open_hardware(cfg)?;
    relay
        .set_relay(false)
        .map_err(|e| eyre::eyre!("release relay: {e}"))?;
    let level = alarm
        .read_alarm_level()
        .map_err(|e| eyre::eyre!("read alarm line: {e}"))?;
    tracing::info!(level, "self-check ok");
    Ok(level)
}
