use hdrhistogram::Histogram;

use crate::error::MetricsError;

/// Significant figures kept by the latency histogram.
const SIGNIFICANT_FIGURES: u8 = 3;
/// `100%` expressed in thousandths of a percent.
const PERCENT_SCALE: u32 = 100_000;

/// Latency distribution in microseconds.
#[derive(Debug, Clone)]
pub struct LatencyHistogram {
    hist: Histogram<u64>,
}

impl LatencyHistogram {
    /// Create a new latency histogram.
    ///
    /// # Errors
    ///
    /// Returns an error if the histogram cannot be created.
    pub fn new() -> Result<Self, MetricsError> {
        let hist =
            Histogram::<u64>::new(SIGNIFICANT_FIGURES).map_err(|err| MetricsError::Histogram {
                context: "create",
                source: Box::new(err),
            })?;
        Ok(Self { hist })
    }

    /// Record a latency value in microseconds.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be recorded.
    pub fn record(&mut self, latency_us: u64) -> Result<(), MetricsError> {
        let value = latency_us.max(1);
        self.hist
            .record(value)
            .map_err(|err| MetricsError::Histogram {
                context: "record",
                source: Box::new(err),
            })
    }

    /// Value at `rank` thousandths of a percent (`95_000` is p95), `0` when
    /// empty. Integer-only: the first recorded value whose cumulative count
    /// reaches `ceil(count * rank / 100_000)`.
    #[must_use]
    pub fn percentile(&self, rank: u32) -> u64 {
        let total = u128::from(self.count());
        if total == 0 {
            return 0;
        }
        let rank = u128::from(rank.min(PERCENT_SCALE));
        let target = total
            .saturating_mul(rank)
            .div_ceil(u128::from(PERCENT_SCALE))
            .max(1);
        let mut seen: u128 = 0;
        for bucket in self.hist.iter_recorded() {
            seen = seen.saturating_add(u128::from(bucket.count_at_value()));
            if seen >= target {
                return self.hist.highest_equivalent(bucket.value_iterated_to());
            }
        }
        self.hist.max()
    }

    #[must_use]
    pub fn min(&self) -> u64 {
        if self.count() == 0 {
            return 0;
        }
        self.hist.min()
    }

    #[must_use]
    pub fn max(&self) -> u64 {
        self.hist.max()
    }

    #[must_use]
    pub fn count(&self) -> u64 {
        self.hist.len()
    }
}

impl PartialEq for LatencyHistogram {
    fn eq(&self, other: &Self) -> bool {
        self.hist == other.hist
    }
}
