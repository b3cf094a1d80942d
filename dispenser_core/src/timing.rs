//! Build-time timeline of one dispense attempt.
//!
//! All offsets are measured from the moment the relay is driven active. The
//! dispenser keys its own alarm period to the start of activation, so the
//! pre-sampling wait is `SAMPLING_DELAY - RELAY_ON_DURATION` regardless of how
//! long the relay pulse lasts.

use std::time::Duration;

pub const RELAY_ON_MS: u64 = 100;
pub const SAMPLING_DELAY_MS: u64 = 1260;
pub const SAMPLING_WINDOW_MS: u64 = 130;
/// Gap between the end of the alarm window and the start of the normal window.
pub const WINDOW_BRIDGE_MS: u64 = 20;
/// Pause after each timed-mode cycle before the next loop iteration.
pub const TIMED_CYCLE_DELAY_MS: u64 = 1000;

/// Alarm-window mean strictly below this (raw ADC units) means the dispenser
/// raised its alarm.
pub const FAILURE_THRESHOLD: i32 = 2;

pub const RELAY_ON_DURATION: Duration = Duration::from_millis(RELAY_ON_MS);
pub const SAMPLING_DELAY: Duration = Duration::from_millis(SAMPLING_DELAY_MS);
pub const SAMPLING_WINDOW: Duration = Duration::from_millis(SAMPLING_WINDOW_MS);
pub const WINDOW_BRIDGE: Duration = Duration::from_millis(WINDOW_BRIDGE_MS);
pub const TIMED_CYCLE_DELAY: Duration = Duration::from_millis(TIMED_CYCLE_DELAY_MS);

/// Wait between relay release and the start of the alarm window.
pub const PRE_SAMPLING_WAIT: Duration =
    Duration::from_millis(SAMPLING_DELAY_MS - RELAY_ON_MS);

/// When to start polling, relative to relay activation, and for how long.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplingWindow {
    pub offset: Duration,
    pub duration: Duration,
}

impl SamplingWindow {
    pub const fn from_millis(offset_ms: u64, duration_ms: u64) -> Self {
        Self {
            offset: Duration::from_millis(offset_ms),
            duration: Duration::from_millis(duration_ms),
        }
    }

    /// Offset at which this window closes.
    pub fn end(&self) -> Duration {
        self.offset.saturating_add(self.duration)
    }
}

/// Window in which a faulting dispenser holds the alarm line low.
pub const ALARM_WINDOW: SamplingWindow =
    SamplingWindow::from_millis(SAMPLING_DELAY_MS, SAMPLING_WINDOW_MS);

/// Following window where the line should have returned to normal.
pub const NORMAL_WINDOW: SamplingWindow = SamplingWindow::from_millis(
    SAMPLING_DELAY_MS + SAMPLING_WINDOW_MS + WINDOW_BRIDGE_MS,
    SAMPLING_WINDOW_MS,
);

/// Nominal duration of one attempt, excluding polling overshoot.
pub const ATTEMPT_DURATION: Duration = Duration::from_millis(
    SAMPLING_DELAY_MS + SAMPLING_WINDOW_MS + WINDOW_BRIDGE_MS + SAMPLING_WINDOW_MS,
);
