//! Alarm-line polling windows and the pass/fail decision.
//!
//! A window is a tight loop: read the line, accumulate, repeat until the
//! window's duration has elapsed on the injected clock. There is no sleep
//! between reads, so the sample count depends only on how long each read
//! takes and two identical windows may collect different counts.

use dispenser_traits::clock::Clock;
use dispenser_traits::{AlarmLine, BoxError};
use std::time::Duration;

use crate::status::DispenseStatus;
use crate::timing::FAILURE_THRESHOLD;

/// Running count and sum of raw readings for one window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SampleAccumulator {
    count: u64,
    sum: i64,
}

impl SampleAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn push(&mut self, raw: i32) {
        self.count = self.count.saturating_add(1);
        self.sum = self.sum.saturating_add(i64::from(raw));
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn sum(&self) -> i64 {
        self.sum
    }

    /// Arithmetic mean, `None` for an empty window.
    pub fn mean(&self) -> Option<f64> {
        if self.count == 0 {
            return None;
        }
        Some(self.sum as f64 / self.count as f64)
    }

    /// Exact `mean < threshold` without floating point:
    /// `sum < threshold * count`. `None` for an empty window.
    pub fn mean_below(&self, threshold: i32) -> Option<bool> {
        if self.count == 0 {
            return None;
        }
        let bound = i128::from(threshold) * i128::from(self.count);
        Some(i128::from(self.sum) < bound)
    }

    pub fn summary(&self) -> WindowSummary {
        WindowSummary {
            samples: self.count,
            sum: self.sum,
            mean: self.mean(),
        }
    }
}

impl FromIterator<i32> for SampleAccumulator {
    fn from_iter<I: IntoIterator<Item = i32>>(iter: I) -> Self {
        let mut acc = Self::new();
        for raw in iter {
            acc.push(raw);
        }
        acc
    }
}

/// Diagnostic snapshot of a finished window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowSummary {
    pub samples: u64,
    pub sum: i64,
    pub mean: Option<f64>,
}

/// Poll `line` until `duration` has elapsed on `clock`.
pub fn sample_window<A, C>(
    line: &mut A,
    clock: &C,
    duration: Duration,
) -> Result<SampleAccumulator, BoxError>
where
    A: AlarmLine + ?Sized,
    C: Clock + ?Sized,
{
    let start = clock.now();
    let mut acc = SampleAccumulator::new();
    while clock.elapsed_since(start) < duration {
        acc.push(line.read_alarm_level()?);
    }
    Ok(acc)
}

/// Verdict from the alarm window alone.
///
/// An empty alarm window cannot show that the line stayed high, so it is
/// reported as `Failure`.
pub fn verdict(alarm: &SampleAccumulator) -> DispenseStatus {
    match alarm.mean_below(FAILURE_THRESHOLD) {
        Some(true) => DispenseStatus::Failure,
        Some(false) => DispenseStatus::Success,
        None => {
            tracing::warn!("alarm window collected no samples; reporting failure");
            DispenseStatus::Failure
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dispenser_traits::clock::test_clock::TestClock;
    use rstest::rstest;

    #[rstest]
    #[case(&[0, 0, 1, 0], DispenseStatus::Failure)]
    #[case(&[5, 5, 4, 6], DispenseStatus::Success)]
    #[case(&[2, 2, 2], DispenseStatus::Success)]
    #[case(&[2, 2, 1], DispenseStatus::Failure)]
    #[case(&[1023, 0, 0, 0], DispenseStatus::Success)]
    fn threshold_decision(#[case] samples: &[i32], #[case] expected: DispenseStatus) {
        let acc: SampleAccumulator = samples.iter().copied().collect();
        assert_eq!(verdict(&acc), expected);
    }

    #[test]
    fn empty_window_is_failure() {
        assert_eq!(verdict(&SampleAccumulator::new()), DispenseStatus::Failure);
        assert_eq!(SampleAccumulator::new().mean(), None);
    }

    #[test]
    fn mean_matches_sum_over_count() {
        let acc: SampleAccumulator = [0, 0, 1, 0].into_iter().collect();
        assert_eq!(acc.count(), 4);
        assert_eq!(acc.mean(), Some(0.25));
    }

    struct TickingLine {
        clock: TestClock,
        latency: Duration,
        level: i32,
    }

    impl AlarmLine for TickingLine {
        fn read_alarm_level(&mut self) -> Result<i32, BoxError> {
            self.clock.advance(self.latency);
            Ok(self.level)
        }
    }

    #[test]
    fn sample_count_follows_read_latency() {
        let clock = TestClock::new();
        let mut line = TickingLine {
            clock: clock.clone(),
            latency: Duration::from_millis(10),
            level: 7,
        };
        let acc = sample_window(&mut line, &clock, Duration::from_millis(130)).unwrap();
        assert_eq!(acc.count(), 13);
        assert_eq!(acc.sum(), 91);
        assert_eq!(clock.offset(), Duration::from_millis(130));

        line.latency = Duration::from_millis(65);
        let acc = sample_window(&mut line, &clock, Duration::from_millis(130)).unwrap();
        assert_eq!(acc.count(), 2);
    }

    #[test]
    fn read_error_ends_window() {
        struct Broken;
        impl AlarmLine for Broken {
            fn read_alarm_level(&mut self) -> Result<i32, BoxError> {
                Err("adc unplugged".into())
            }
        }
        let clock = TestClock::new();
        let err = sample_window(&mut Broken, &clock, Duration::from_millis(130)).unwrap_err();
        assert!(err.to_string().contains("adc"));
    }
}
