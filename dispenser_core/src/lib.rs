#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Hardware-agnostic dispense sequencing.
//!
//! All hardware goes through `dispenser_traits::{Relay, AlarmLine, Clock}`.
//!
//! ## Architecture
//!
//! - **Timing**: build-time timeline of one attempt (`timing`)
//! - **Status**: outcome register written only by the controller (`status`)
//! - **Sampling**: polling windows and the threshold verdict (`sampler`)
//! - **Control**: the blocking attempt sequence (`controller`, `builder`)
//! - **Commands**: byte protocol and interactive/timed loop (`command`)

pub mod builder;
pub mod command;
pub mod controller;
pub mod error;
pub mod hw_error;
pub mod mocks;
pub mod sampler;
pub mod status;
pub mod timing;

pub use builder::DispenseControllerBuilder;
pub use command::{Command, OperatingMode, Station};
pub use controller::{AttemptReport, DispenseController, DispensePhase};
pub use error::{DispenserError, Result};
pub use sampler::{SampleAccumulator, WindowSummary};
pub use status::{DispenseStatus, StatusRegister};
pub use timing::SamplingWindow;
