//! Maps `Box<dyn Error>` from trait boundaries to typed `DispenserError`.
//!
//! The capability traits in `dispenser_traits` return boxed errors; this
//! module converts them, downcasting `dispenser_hardware::error::HwError`
//! precisely when the `hardware-errors` feature is on.

use crate::error::DispenserError;

/// Map a trait-boundary error to a typed `DispenserError`.
pub fn map_hw_error(e: &(dyn std::error::Error + 'static)) -> DispenserError {
    #[cfg(feature = "hardware-errors")]
    {
        use dispenser_hardware::error::HwError;
        if let Some(hw) = e.downcast_ref::<HwError>() {
            return DispenserError::HardwareFault(hw.to_string());
        }
    }

    let s = e.to_string();
    if s.to_lowercase().contains("timeout") || s.to_lowercase().contains("timed out") {
        DispenserError::Timeout
    } else {
        DispenserError::Hardware(s)
    }
}
