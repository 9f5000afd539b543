use std::time::Duration;

use log::warn;

/// Measurement of one kernel on one operand shape.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchResult {
    /// Kernel identifier.
    pub label: String,
    /// Wall-clock time of the whole timed phase.
    pub elapsed_time_ms: f64,
    /// `elapsed_time_ms / repeats`.
    pub mean_call_ms: f64,
    /// FLOPs of one call times the number of timed calls.
    pub total_flops: i64,
    /// `total_flops / elapsed seconds`; 0 when the timer read zero.
    pub throughput_flops_per_sec: f64,
    /// Output matched the oracle within tolerance.
    pub correct: bool,
    /// False for kernels whose output is not a product (calibration).
    pub verified: bool,
}

impl BenchResult {
    pub(crate) fn new(
        label: String,
        elapsed: Duration,
        repeats: usize,
        flops_per_call: u64,
        correct: Option<bool>,
    ) -> Self {
        let total = flops_per_call.saturating_mul(repeats as u64);
        let total_flops = i64::try_from(total).unwrap_or(i64::MAX);

        let secs = elapsed.as_secs_f64();
        let throughput_flops_per_sec = if secs > 0.0 {
            total_flops as f64 / secs
        } else {
            warn!("{label}: timed phase measured zero elapsed time, throughput unavailable");
            0.0
        };

        let elapsed_time_ms = secs * 1e3;
        BenchResult {
            mean_call_ms: elapsed_time_ms / repeats.max(1) as f64,
            elapsed_time_ms,
            total_flops,
            throughput_flops_per_sec,
            correct: correct.unwrap_or(false),
            verified: correct.is_some(),
            label,
        }
    }

    pub fn gflops(&self) -> f64 {
        self.throughput_flops_per_sec / 1e9
    }

    pub fn csv_header() -> &'static str {
        "kernel,ms,flop,flops,correct"
    }

    /// `kernel,ms,flop,flops,correct` with `correct` as 0/1.
    pub fn to_csv_row(&self) -> String {
        format!(
            "{},{:.4},{},{:.4e},{}",
            self.label,
            self.elapsed_time_ms,
            self.total_flops,
            self.throughput_flops_per_sec,
            u8::from(self.correct)
        )
    }
}
