//! Type-state builder for `DispenseController`.
//!
//! `build()` only exists once both a relay and an alarm line have been
//! supplied; the clock defaults to `MonotonicClock`.

use std::sync::Arc;

use dispenser_traits::clock::{Clock, MonotonicClock};
use dispenser_traits::{AlarmLine, Relay};

use crate::controller::DispenseController;

/// Placeholder for a capability not yet provided.
pub struct Missing;

pub struct DispenseControllerBuilder<R, A> {
    relay: R,
    alarm: A,
    clock: Option<Arc<dyn Clock + Send + Sync>>,
}

impl Default for DispenseControllerBuilder<Missing, Missing> {
    fn default() -> Self {
        Self {
            relay: Missing,
            alarm: Missing,
            clock: None,
        }
    }
}

impl DispenseController<Missing, Missing> {
    pub fn builder() -> DispenseControllerBuilder<Missing, Missing> {
        DispenseControllerBuilder::default()
    }
}

impl<R, A> DispenseControllerBuilder<R, A> {
    pub fn with_relay<R2: Relay>(self, relay: R2) -> DispenseControllerBuilder<R2, A> {
        DispenseControllerBuilder {
            relay,
            alarm: self.alarm,
            clock: self.clock,
        }
    }

    pub fn with_alarm_line<A2: AlarmLine>(self, alarm: A2) -> DispenseControllerBuilder<R, A2> {
        DispenseControllerBuilder {
            relay: self.relay,
            alarm,
            clock: self.clock,
        }
    }

    /// Inject a clock (tests pass a virtual one).
    pub fn with_clock<C: Clock + Send + Sync + 'static>(mut self, clock: C) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }
}

impl<R: Relay, A: AlarmLine> DispenseControllerBuilder<R, A> {
    pub fn build(self) -> DispenseController<R, A> {
        let clock = self
            .clock
            .unwrap_or_else(|| Arc::new(MonotonicClock::new()));
        DispenseController::new(self.relay, self.alarm, clock)
    }
}
