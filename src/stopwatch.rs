use std::time::{Duration, Instant};

use tdigest::TDigest;

/// Collects recommendation latencies and reports their percentiles.
#[derive(Clone, Default, Debug)]
pub struct Stopwatch {
    durations_micros: Vec<f64>,
}

impl Stopwatch {
    pub fn new() -> Stopwatch {
        Stopwatch {
            durations_micros: Vec::new(),
        }
    }

    /// Runs `f` and returns its output together with the elapsed wall time.
    pub fn time<T, F: FnOnce() -> T>(f: F) -> (T, Duration) {
        let start_time = Instant::now();
        let output = f();
        (output, start_time.elapsed())
    }

    pub fn record(&mut self, duration: Duration) {
        self.durations_micros.push(duration.as_micros() as f64);
    }

    pub fn get_n(&self) -> usize {
        self.durations_micros.len()
    }

    /// `percentile` ranges from 0 to 100.
    pub fn get_percentile_in_micros(&self, percentile: f64) -> f64 {
        if self.durations_micros.is_empty() {
            return 0.0;
        }
        let t_digest = TDigest::new_with_size(100);
        let sorted_digest = t_digest.merge_unsorted(self.durations_micros.clone());
        sorted_digest.estimate_quantile(percentile / 100.0)
    }
}
