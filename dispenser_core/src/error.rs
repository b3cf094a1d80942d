use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum DispenserError {
    #[error("hardware error: {0}")]
    Hardware(String),
    #[error("hardware fault: {0}")]
    HardwareFault(String),
    #[error("timeout waiting for hardware")]
    Timeout,
    #[error("console error: {0}")]
    Console(String),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
