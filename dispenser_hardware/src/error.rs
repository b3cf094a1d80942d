use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("gpio error: {0}")]
    Gpio(String),
    #[error("spi error: {0}")]
    Spi(String),
    #[error("adc channel {0} out of range (mcp3008 has channels 0..=7)")]
    ChannelOutOfRange(u8),
    #[error("short adc transfer: {0} of 3 bytes")]
    ShortTransfer(usize),
}

pub type Result<T> = std::result::Result<T, HwError>;
