//! Fakes shared by the integration tests. Every fake holds a clone of the
//! virtual clock so hardware access moves time the way a real ADC would.
#![allow(dead_code)]

use std::time::{Duration, Instant};

use dispenser_core::DispenseController;
use dispenser_traits::clock::Clock;
use dispenser_traits::clock::test_clock::TestClock;
use dispenser_traits::{AlarmLine, BoxError, Relay};

/// Relay that logs `(virtual offset, state)` for every write.
pub struct RecordingRelay {
    clock: TestClock,
    pub events: Vec<(Duration, bool)>,
    pub fail_on_activate: bool,
}

impl RecordingRelay {
    pub fn new(clock: &TestClock) -> Self {
        Self {
            clock: clock.clone(),
            events: Vec::new(),
            fail_on_activate: false,
        }
    }
}

impl Relay for RecordingRelay {
    fn set_relay(&mut self, active: bool) -> Result<(), BoxError> {
        self.events.push((self.clock.offset(), active));
        if active && self.fail_on_activate {
            return Err("relay driver not responding".into());
        }
        Ok(())
    }
}

/// Alarm line replaying `seq` (repeating its last value), each read taking
/// `latency` of virtual time. Fails with an error once `fail_after` reads
/// have been served, if set.
pub struct SeqLine {
    clock: TestClock,
    latency: Duration,
    seq: Vec<i32>,
    idx: usize,
    pub reads: usize,
    pub fail_after: Option<usize>,
}

impl SeqLine {
    pub fn new(clock: &TestClock, latency_ms: u64, seq: impl Into<Vec<i32>>) -> Self {
        Self {
            clock: clock.clone(),
            latency: Duration::from_millis(latency_ms),
            seq: seq.into(),
            idx: 0,
            reads: 0,
            fail_after: None,
        }
    }

    pub fn constant(clock: &TestClock, latency_ms: u64, level: i32) -> Self {
        Self::new(clock, latency_ms, [level])
    }
}

impl AlarmLine for SeqLine {
    fn read_alarm_level(&mut self) -> Result<i32, BoxError> {
        if self.fail_after.is_some_and(|n| self.reads >= n) {
            return Err("adc transfer failed".into());
        }
        self.clock.advance(self.latency);
        self.reads += 1;
        let v = if self.idx < self.seq.len() {
            let x = self.seq[self.idx];
            self.idx += 1;
            x
        } else {
            self.seq.last().copied().unwrap_or(0)
        };
        Ok(v)
    }
}

pub fn controller(
    clock: &TestClock,
    line: SeqLine,
) -> DispenseController<RecordingRelay, SeqLine> {
    DispenseController::builder()
        .with_relay(RecordingRelay::new(clock))
        .with_alarm_line(line)
        .with_clock(clock.clone())
        .build()
}

/// Clock whose every `now()` call costs `stall` of virtual time, modelling a
/// thread descheduled between reading the clock and acting on it.
#[derive(Clone)]
pub struct StallingClock {
    inner: TestClock,
    stall: Duration,
}

impl StallingClock {
    pub fn new(inner: &TestClock, stall: Duration) -> Self {
        Self {
            inner: inner.clone(),
            stall,
        }
    }
}

impl Clock for StallingClock {
    fn now(&self) -> Instant {
        let t = self.inner.now();
        self.inner.advance(self.stall);
        t
    }

    fn sleep(&self, d: Duration) {
        self.inner.sleep(d);
    }
}
