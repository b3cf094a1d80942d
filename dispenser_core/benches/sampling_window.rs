use criterion::{Criterion, black_box, criterion_group, criterion_main};
use std::time::{Duration, Instant};

use dispenser_core::sampler::{SampleAccumulator, sample_window, verdict};
use dispenser_traits::clock::MonotonicClock;
use dispenser_traits::{AlarmLine, BoxError};

// Alarm line with no conversion latency: measures pure loop overhead.
struct FreeRunningLine(i32);

impl AlarmLine for FreeRunningLine {
    fn read_alarm_level(&mut self) -> Result<i32, BoxError> {
        self.0 = self.0.wrapping_add(1) & 0x3FF;
        Ok(self.0)
    }
}

fn bench_accumulate(c: &mut Criterion) {
    let samples: Vec<i32> = (0..10_000).map(|i| i & 0x3FF).collect();
    c.bench_function("accumulate_10k", |b| {
        b.iter(|| {
            let acc: SampleAccumulator = black_box(&samples).iter().copied().collect();
            black_box(verdict(&acc))
        });
    });
}

fn bench_window(c: &mut Criterion) {
    let clock = MonotonicClock::new();
    let mut group = c.benchmark_group("sample_window");
    group.sample_size(10);
    group.bench_function("1ms_window", |b| {
        b.iter_custom(|iters| {
            let mut line = FreeRunningLine(0);
            let start = Instant::now();
            for _ in 0..iters {
                let acc = sample_window(&mut line, &clock, Duration::from_millis(1));
                black_box(acc.map(|a| a.count()).unwrap_or(0));
            }
            start.elapsed()
        });
    });
    group.finish();
}

criterion_group!(benches, bench_accumulate, bench_window);
criterion_main!(benches);
