//! Single-byte command protocol and the interactive/timed main loop.
//!
//! | byte | action |
//! |------|--------|
//! | `A`  | one dispense attempt |
//! | `S`  | `Status: <U|I|F|S>` |
//! | `T`  | toggle interactive/timed mode |
//! | else | `Unrecognized command char: '<c>'` |
//!
//! Commands are case-insensitive. Input is polled once per loop iteration, so
//! a byte that arrives during an attempt waits until the iteration finishes.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use dispenser_traits::{AlarmLine, CommandPort, Relay};

use crate::controller::DispenseController;
use crate::error::{DispenserError, Result};
use crate::timing::TIMED_CYCLE_DELAY;

/// Sleep between polls when an interactive iteration found nothing to do.
pub const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Attempt,
    Status,
    ToggleMode,
    Unrecognized(char),
}

impl Command {
    /// Map an already-uppercased character to a command.
    pub fn parse(c: char) -> Self {
        match c {
            'A' => Self::Attempt,
            'S' => Self::Status,
            'T' => Self::ToggleMode,
            other => Self::Unrecognized(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OperatingMode {
    /// Act only on received commands.
    #[default]
    Interactive,
    /// Additionally run an attempt on every loop iteration.
    Timed,
}

impl OperatingMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Interactive => Self::Timed,
            Self::Timed => Self::Interactive,
        }
    }
}

impl fmt::Display for OperatingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Interactive => "interactive",
            Self::Timed => "timed",
        })
    }
}

pub fn status_line(status: crate::status::DispenseStatus) -> String {
    format!("Status: {}", status.code())
}

pub fn unrecognized_line(c: char) -> String {
    format!("Unrecognized command char: '{c}'")
}

/// Command layer: owns the controller, the command port and the mode.
pub struct Station<R, A, P> {
    controller: DispenseController<R, A>,
    port: P,
    mode: OperatingMode,
    epoch: Instant,
}

impl<R: Relay, A: AlarmLine, P: CommandPort> Station<R, A, P> {
    pub fn new(controller: DispenseController<R, A>, port: P) -> Self {
        let epoch = controller.clock().now();
        Self {
            controller,
            port,
            mode: OperatingMode::Interactive,
            epoch,
        }
    }

    pub fn with_mode(mut self, mode: OperatingMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> OperatingMode {
        self.mode
    }

    pub fn controller(&self) -> &DispenseController<R, A> {
        &self.controller
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    pub fn into_parts(self) -> (DispenseController<R, A>, P) {
        (self.controller, self.port)
    }

    fn emit(&mut self, line: &str) -> Result<()> {
        self.port
            .write_line(line)
            .map_err(|e| eyre::Report::new(DispenserError::Console(e.to_string())))
    }

    /// Next command character, uppercased, or `None` if nothing is waiting.
    pub fn poll_input(&mut self) -> Result<Option<char>> {
        let byte = self
            .port
            .poll_byte()
            .map_err(|e| eyre::Report::new(DispenserError::Console(e.to_string())))?;
        Ok(byte.map(|b| char::from(b).to_ascii_uppercase()))
    }

    pub fn report_status(&mut self) -> Result<()> {
        let line = status_line(self.controller.status());
        self.emit(&line)
    }

    pub fn dispatch(&mut self, input: Option<char>) -> Result<()> {
        let Some(c) = input else {
            return Ok(());
        };
        match Command::parse(c) {
            Command::Attempt => self.controller.attempt_dispense(),
            Command::Status => self.report_status(),
            Command::ToggleMode => {
                self.mode = self.mode.toggled();
                tracing::info!(mode = %self.mode, "operating mode toggled");
                Ok(())
            }
            Command::Unrecognized(other) => {
                tracing::debug!(byte = ?other, "unrecognized command");
                self.emit(&unrecognized_line(other))
            }
        }
    }

    /// One pass of the main loop. Returns whether anything happened.
    pub fn run_iteration(&mut self) -> Result<bool> {
        let input = self.poll_input()?;
        let handled = input.is_some();
        self.dispatch(input)?;

        if self.mode == OperatingMode::Timed {
            let millis = self.controller.clock().ms_since(self.epoch);
            self.emit(&format!("{millis}-timed mode, attempting to dispense"))?;
            self.controller.attempt_dispense()?;
            self.report_status()?;
            self.controller.clock().sleep(TIMED_CYCLE_DELAY);
            return Ok(true);
        }
        Ok(handled)
    }

    /// Loop until `shutdown` is set, or until input is closed while
    /// interactive (nothing could trigger further work).
    pub fn run(&mut self, shutdown: &AtomicBool) -> Result<()> {
        tracing::info!(mode = %self.mode, "command loop start");
        while !shutdown.load(Ordering::Relaxed) {
            if self.mode == OperatingMode::Interactive && self.port.is_closed() {
                tracing::info!("command input closed");
                break;
            }
            if !self.run_iteration()? {
                self.controller.clock().sleep(IDLE_POLL_INTERVAL);
            }
        }
        tracing::info!(
            attempts = self.controller.attempts(),
            status = %self.controller.status(),
            "command loop stopped"
        );
        Ok(())
    }
}
