//! One blocking dispense attempt: relay pulse, waits, two sampling windows,
//! verdict.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use dispenser_traits::clock::Clock;
use dispenser_traits::{AlarmLine, BoxError, Relay};
use eyre::WrapErr;

use crate::error::Result;
use crate::hw_error::map_hw_error;
use crate::sampler::{WindowSummary, sample_window, verdict};
use crate::status::{DispenseStatus, StatusRegister};
use crate::timing::{
    ALARM_WINDOW, NORMAL_WINDOW, PRE_SAMPLING_WAIT, RELAY_ON_DURATION, WINDOW_BRIDGE,
};

/// Named stages of an attempt, in order. Used for logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispensePhase {
    RelayOn,
    WaitingToSample,
    SamplingAlarm,
    Bridging,
    SamplingNormal,
    Done,
}

impl fmt::Display for DispensePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::RelayOn => "relay_on",
            Self::WaitingToSample => "waiting_to_sample",
            Self::SamplingAlarm => "sampling_alarm",
            Self::Bridging => "bridging",
            Self::SamplingNormal => "sampling_normal",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// What one attempt measured.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttemptReport {
    pub alarm: WindowSummary,
    /// Not part of the verdict; kept for diagnostics.
    pub normal: WindowSummary,
    pub verdict: DispenseStatus,
    pub elapsed_ms: u64,
}

/// Owns the relay, the alarm line and the status register.
///
/// `attempt_dispense` takes `&mut self`, so holding the controller is what
/// grants exclusive use of the physical dispenser.
pub struct DispenseController<R, A> {
    relay: R,
    alarm: A,
    clock: Arc<dyn Clock + Send + Sync>,
    status: StatusRegister,
    last_report: Option<AttemptReport>,
    attempts: u64,
}

impl<R, A> fmt::Debug for DispenseController<R, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispenseController")
            .field("status", &self.status.get())
            .field("attempts", &self.attempts)
            .field("last_report", &self.last_report)
            .finish()
    }
}

fn hw<T>(r: std::result::Result<T, BoxError>) -> Result<T> {
    r.map_err(|e| eyre::Report::new(map_hw_error(&*e)))
}

impl<R: Relay, A: AlarmLine> DispenseController<R, A> {
    pub fn new(relay: R, alarm: A, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self {
            relay,
            alarm,
            clock,
            status: StatusRegister::new(),
            last_report: None,
            attempts: 0,
        }
    }

    pub fn status(&self) -> DispenseStatus {
        self.status.get()
    }

    pub fn last_report(&self) -> Option<&AttemptReport> {
        self.last_report.as_ref()
    }

    /// Attempts started since construction.
    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    pub fn clock(&self) -> &(dyn Clock + Send + Sync) {
        &*self.clock
    }

    pub fn relay(&self) -> &R {
        &self.relay
    }

    pub fn alarm_line(&self) -> &A {
        &self.alarm
    }

    /// Run one full attempt and commit the verdict to the status register.
    ///
    /// Blocks for the whole timeline (about 1540 ms). On a hardware error the
    /// relay is released on a best-effort basis, the status is set to
    /// `Failure` and the error is returned.
    pub fn attempt_dispense(&mut self) -> Result<()> {
        self.attempts = self.attempts.saturating_add(1);
        let attempt = self.attempts;
        let started = self.clock.now();
        self.status.set(DispenseStatus::InProgress);
        tracing::info!(attempt, "dispense attempt start");

        match self.run_sequence(started) {
            Ok(report) => {
                self.status.set(report.verdict);
                tracing::info!(
                    attempt,
                    verdict = %report.verdict,
                    alarm_samples = report.alarm.samples,
                    alarm_mean = report.alarm.mean,
                    normal_samples = report.normal.samples,
                    normal_mean = report.normal.mean,
                    elapsed_ms = report.elapsed_ms,
                    "dispense attempt complete"
                );
                self.last_report = Some(report);
                Ok(())
            }
            Err(e) => {
                if let Err(off) = self.relay.set_relay(false) {
                    tracing::error!(error = %off, "failed to release relay after error");
                }
                self.status.set(DispenseStatus::Failure);
                self.last_report = None;
                tracing::error!(attempt, error = %e, "dispense attempt aborted");
                Err(e)
            }
        }
    }

    fn run_sequence(&mut self, started: Instant) -> Result<AttemptReport> {
        tracing::debug!(phase = %DispensePhase::RelayOn);
        hw(self.relay.set_relay(true)).wrap_err("activate relay")?;
        self.clock.sleep(RELAY_ON_DURATION);
        hw(self.relay.set_relay(false)).wrap_err("release relay")?;

        tracing::debug!(phase = %DispensePhase::WaitingToSample);
        self.clock.sleep(PRE_SAMPLING_WAIT);

        tracing::debug!(phase = %DispensePhase::SamplingAlarm, offset_ms = self.clock.ms_since(started));
        let alarm = hw(sample_window(&mut self.alarm, &*self.clock, ALARM_WINDOW.duration))
            .wrap_err("sample alarm window")?;

        tracing::debug!(phase = %DispensePhase::Bridging);
        self.clock.sleep(WINDOW_BRIDGE);

        tracing::debug!(phase = %DispensePhase::SamplingNormal, offset_ms = self.clock.ms_since(started));
        let normal = hw(sample_window(&mut self.alarm, &*self.clock, NORMAL_WINDOW.duration))
            .wrap_err("sample normal window")?;

        let verdict = verdict(&alarm);
        tracing::debug!(phase = %DispensePhase::Done);
        Ok(AttemptReport {
            alarm: alarm.summary(),
            normal: normal.summary(),
            verdict,
            elapsed_ms: self.clock.ms_since(started),
        })
    }
}
