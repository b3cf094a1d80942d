//! Outcome of the most recent dispense attempt.

use std::fmt;

/// Closed set of outcomes; `InProgress` only exists inside an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispenseStatus {
    /// No attempt since start-up.
    #[default]
    Untried,
    /// Relay actuated, verdict not yet computed.
    InProgress,
    /// Alarm detected in the alarm window.
    Failure,
    /// No alarm detected.
    Success,
}

impl DispenseStatus {
    /// Single-letter code used on the command console.
    pub fn code(self) -> char {
        match self {
            Self::Untried => 'U',
            Self::InProgress => 'I',
            Self::Failure => 'F',
            Self::Success => 'S',
        }
    }

    /// True for the two verdicts an attempt can end with.
    pub fn is_verdict(self) -> bool {
        matches!(self, Self::Failure | Self::Success)
    }
}

impl fmt::Display for DispenseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Untried => "untried",
            Self::InProgress => "in_progress",
            Self::Failure => "failure",
            Self::Success => "success",
        };
        f.write_str(name)
    }
}

/// Single stored status. Written by the controller, read by everyone else.
#[derive(Debug, Default)]
pub struct StatusRegister {
    value: DispenseStatus,
}

impl StatusRegister {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> DispenseStatus {
        self.value
    }

    pub(crate) fn set(&mut self, status: DispenseStatus) {
        tracing::trace!(from = %self.value, to = %status, "status");
        self.value = status;
    }
}
