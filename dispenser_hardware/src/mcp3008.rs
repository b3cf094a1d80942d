//! MCP3008 10-bit SPI ADC framing, plus the rppal-backed reader.
//!
//! A single-ended conversion is one 3-byte full-duplex transfer:
//! `[0x01, (0x8 | ch) << 4, 0x00]` out, result in the low 2 bits of byte 1
//! and all of byte 2.

use crate::error::{HwError, Result};

/// Highest single-ended input channel.
pub const MAX_CHANNEL: u8 = 7;

/// Full-scale reading (10 bits).
pub const FULL_SCALE: i32 = 1023;

pub fn request_frame(channel: u8) -> Result<[u8; 3]> {
    if channel > MAX_CHANNEL {
        return Err(HwError::ChannelOutOfRange(channel));
    }
    Ok([0x01, (0x08 | channel) << 4, 0x00])
}

pub fn decode_frame(rx: &[u8; 3]) -> i32 {
    (i32::from(rx[1] & 0x03) << 8) | i32::from(rx[2])
}

#[cfg(all(feature = "hardware", target_os = "linux"))]
pub struct Mcp3008 {
    spi: rppal::spi::Spi,
    tx: [u8; 3],
}

#[cfg(all(feature = "hardware", target_os = "linux"))]
impl Mcp3008 {
    pub fn new(spi: rppal::spi::Spi, channel: u8) -> Result<Self> {
        let tx = request_frame(channel)?;
        Ok(Self { spi, tx })
    }

    pub fn read(&mut self) -> Result<i32> {
        let mut rx = [0u8; 3];
        let n = self
            .spi
            .transfer(&mut rx, &self.tx)
            .map_err(|e| HwError::Spi(e.to_string()))?;
        if n < rx.len() {
            return Err(HwError::ShortTransfer(n));
        }
        let raw = decode_frame(&rx);
        tracing::trace!(raw, "mcp3008 sample");
        Ok(raw)
    }
}
