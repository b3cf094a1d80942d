pub mod error;
pub mod mcp3008;

use dispenser_traits::{AlarmLine, BoxError, Relay};
use std::time::Duration;

/// Alarm level a healthy simulated dispenser holds (mid-scale on a 10-bit ADC).
pub const SIM_HEALTHY_LEVEL: i32 = 512;

/// Relay stand-in that records its state instead of driving a pin.
#[derive(Debug, Default)]
pub struct SimulatedRelay {
    active: bool,
    pulses: u32,
}

impl SimulatedRelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Number of inactive→active transitions seen so far.
    pub fn pulses(&self) -> u32 {
        self.pulses
    }
}

impl Relay for SimulatedRelay {
    fn set_relay(&mut self, active: bool) -> Result<(), BoxError> {
        if active && !self.active {
            self.pulses = self.pulses.saturating_add(1);
        }
        self.active = active;
        tracing::debug!(active, "relay (simulated)");
        Ok(())
    }
}

/// Alarm line stand-in that always reports the same level.
///
/// `read_latency` models ADC conversion time; the sampling windows poll
/// without sleeping, so a zero latency produces very large sample counts.
#[derive(Debug, Clone)]
pub struct SimulatedAlarmLine {
    level: i32,
    read_latency: Duration,
}

impl SimulatedAlarmLine {
    pub fn new(level: i32) -> Self {
        Self {
            level,
            read_latency: Duration::ZERO,
        }
    }

    pub fn healthy() -> Self {
        Self::new(SIM_HEALTHY_LEVEL)
    }

    /// A dispenser that pulls the line to ground for the whole attempt.
    pub fn faulted() -> Self {
        Self::new(0)
    }

    pub fn with_read_latency(mut self, latency: Duration) -> Self {
        self.read_latency = latency;
        self
    }

    pub fn level(&self) -> i32 {
        self.level
    }
}

impl AlarmLine for SimulatedAlarmLine {
    fn read_alarm_level(&mut self) -> Result<i32, BoxError> {
        if !self.read_latency.is_zero() {
            std::thread::sleep(self.read_latency);
        }
        Ok(self.level)
    }
}

/// Pin level that puts the relay in the requested state.
pub fn relay_pin_high(active: bool, active_low: bool) -> bool {
    active != active_low
}

#[cfg(all(feature = "hardware", target_os = "linux"))]
pub use hw::{HardwareAlarmLine, HardwareRelay};

#[cfg(all(feature = "hardware", target_os = "linux"))]
mod hw {
    use crate::error::{HwError, Result};
    use crate::mcp3008::Mcp3008;
    use super::relay_pin_high;
    use dispenser_traits::{AlarmLine, BoxError, Relay};
    use rppal::gpio::{Gpio, OutputPin};
    use rppal::spi::{Bus, Mode, SlaveSelect, Spi};

    /// SSR control line on a Raspberry Pi GPIO pin.
    pub struct HardwareRelay {
        pin: OutputPin,
        active_low: bool,
    }

    impl HardwareRelay {
        /// Claim `pin` as an output and park it inactive.
        pub fn new(pin: u8, active_low: bool) -> Result<Self> {
            let gpio = Gpio::new().map_err(|e| HwError::Gpio(e.to_string()))?;
            let pin = gpio
                .get(pin)
                .map_err(|e| HwError::Gpio(format!("open relay pin {pin}: {e}")))?;
            // Switch to output already at the inactive level; `into_output`
            // would keep whatever level was latched.
            let pin = if relay_pin_high(false, active_low) {
                pin.into_output_high()
            } else {
                pin.into_output_low()
            };
            Ok(Self { pin, active_low })
        }

        fn drive(&mut self, active: bool) {
            if relay_pin_high(active, self.active_low) {
                self.pin.set_high();
            } else {
                self.pin.set_low();
            }
        }
    }

    impl Relay for HardwareRelay {
        fn set_relay(&mut self, active: bool) -> std::result::Result<(), BoxError> {
            self.drive(active);
            tracing::trace!(active, "relay");
            Ok(())
        }
    }

    impl Drop for HardwareRelay {
        fn drop(&mut self) {
            self.drive(false);
        }
    }

    /// Alarm line read through an MCP3008 on the Pi's SPI bus.
    pub struct HardwareAlarmLine {
        adc: Mcp3008,
    }

    impl HardwareAlarmLine {
        pub fn new(bus: u8, slave_select: u8, clock_hz: u32, channel: u8) -> Result<Self> {
            let bus = match bus {
                0 => Bus::Spi0,
                1 => Bus::Spi1,
                2 => Bus::Spi2,
                other => return Err(HwError::Spi(format!("unsupported spi bus {other}"))),
            };
            let ss = match slave_select {
                0 => SlaveSelect::Ss0,
                1 => SlaveSelect::Ss1,
                2 => SlaveSelect::Ss2,
                other => {
                    return Err(HwError::Spi(format!("unsupported slave select {other}")));
                }
            };
            let spi = Spi::new(bus, ss, clock_hz, Mode::Mode0)
                .map_err(|e| HwError::Spi(format!("open adc spi: {e}")))?;
            Ok(Self {
                adc: Mcp3008::new(spi, channel)?,
            })
        }
    }

    impl AlarmLine for HardwareAlarmLine {
        fn read_alarm_level(&mut self) -> std::result::Result<i32, BoxError> {
            Ok(self.adc.read()?)
        }
    }
}
