pub mod clock;

pub use clock::{Clock, MonotonicClock};

/// Error type returned across hardware capability boundaries.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Digital output driving the dispenser's solid-state relay.
pub trait Relay {
    /// Drive the relay active (`true`, dispense triggered) or inactive.
    fn set_relay(&mut self, active: bool) -> Result<(), BoxError>;
}

/// Analog sense line the dispenser pulls low when it detects a fault.
pub trait AlarmLine {
    /// One raw reading on whatever integer scale the ADC reports.
    fn read_alarm_level(&mut self) -> Result<i32, BoxError>;
}

/// Byte-oriented command stream (serial console, stdin, test script).
pub trait CommandPort {
    /// Non-blocking: `Some(byte)` if one is waiting, `None` otherwise.
    fn poll_byte(&mut self) -> Result<Option<u8>, BoxError>;

    /// Emit one protocol line.
    fn write_line(&mut self, line: &str) -> Result<(), BoxError>;

    /// True once no further bytes can ever arrive.
    fn is_closed(&self) -> bool {
        false
    }
}

impl<T: Relay + ?Sized> Relay for Box<T> {
    fn set_relay(&mut self, active: bool) -> Result<(), BoxError> {
        (**self).set_relay(active)
    }
}

impl<T: AlarmLine + ?Sized> AlarmLine for Box<T> {
    fn read_alarm_level(&mut self) -> Result<i32, BoxError> {
        (**self).read_alarm_level()
    }
}

impl<T: CommandPort + ?Sized> CommandPort for Box<T> {
    fn poll_byte(&mut self) -> Result<Option<u8>, BoxError> {
        (**self).poll_byte()
    }

    fn write_line(&mut self, line: &str) -> Result<(), BoxError> {
        (**self).write_line(line)
    }

    fn is_closed(&self) -> bool {
        (**self).is_closed()
    }
}
