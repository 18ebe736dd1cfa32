use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use crate::error::MetricsError;

use super::types::{MetricKind, MetricValue, MetricsSnapshot, TrendSnapshot};
use super::LatencyHistogram;

/// Serialises snapshots against updates.
///
/// Every `add` holds the shared side for its whole update, a snapshot holds
/// the exclusive side, so a reader never sees half of an `add`.
#[derive(Debug, Default)]
struct SnapshotGate(RwLock<()>);

impl SnapshotGate {
    fn update(&self) -> RwLockReadGuard<'_, ()> {
        self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn freeze(&self) -> RwLockWriteGuard<'_, ()> {
        self.0.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug, Default)]
struct RateCell {
    passes: AtomicU64,
    total: AtomicU64,
}

#[derive(Debug)]
struct TrendCell {
    histogram: LatencyHistogram,
    sum_us: u128,
}

#[derive(Debug, Clone)]
enum MetricCell {
    Counter(Arc<AtomicU64>),
    Rate(Arc<RateCell>),
    Trend(Arc<Mutex<TrendCell>>),
}

impl MetricCell {
    const fn kind(&self) -> MetricKind {
        match self {
            MetricCell::Counter(_) => MetricKind::Counter,
            MetricCell::Rate(_) => MetricKind::Rate,
            MetricCell::Trend(_) => MetricKind::Trend,
        }
    }

    fn read(&self) -> MetricValue {
        match self {
            MetricCell::Counter(cell) => MetricValue::Counter {
                count: cell.load(Ordering::Relaxed),
            },
            MetricCell::Rate(cell) => MetricValue::Rate {
                passes: cell.passes.load(Ordering::Relaxed),
                total: cell.total.load(Ordering::Relaxed),
            },
            MetricCell::Trend(cell) => {
                let trend = cell.lock().unwrap_or_else(PoisonError::into_inner);
                MetricValue::Trend(TrendSnapshot {
                    count: trend.histogram.count(),
                    sum_us: trend.sum_us,
                    histogram: trend.histogram.clone(),
                })
            }
        }
    }
}

/// Adds `amount`, pinning at `u64::MAX`. Returns the previous value.
fn saturating_increment(cell: &AtomicU64, amount: u64) -> u64 {
    match cell.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |current| {
        Some(current.saturating_add(amount))
    }) {
        Ok(previous) | Err(previous) => previous,
    }
}

/// Monotonic counter handle.
#[derive(Debug, Clone)]
pub struct Counter {
    name: Arc<str>,
    cell: Arc<AtomicU64>,
    gate: Arc<SnapshotGate>,
}

impl Counter {
    pub fn add(&self, amount: u64) {
        let _update = self.gate.update();
        saturating_increment(&self.cell, amount);
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Boolean-observation rate handle.
#[derive(Debug, Clone)]
pub struct Rate {
    name: Arc<str>,
    cell: Arc<RateCell>,
    gate: Arc<SnapshotGate>,
}

impl Rate {
    pub fn add(&self, observation: bool) {
        let _update = self.gate.update();
        saturating_increment(&self.cell.total, 1);
        if observation {
            saturating_increment(&self.cell.passes, 1);
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Latency distribution handle.
#[derive(Debug, Clone)]
pub struct Trend {
    name: Arc<str>,
    cell: Arc<Mutex<TrendCell>>,
    gate: Arc<SnapshotGate>,
}

impl Trend {
    pub fn add(&self, latency: Duration) {
        let micros = u64::try_from(latency.as_micros()).unwrap_or(u64::MAX);
        let _update = self.gate.update();
        let mut trend = self.cell.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(err) = trend.histogram.record(micros) {
            tracing::warn!("Dropping sample for trend '{}': {}", self.name, err);
            return;
        }
        trend.sum_us = trend.sum_us.saturating_add(u128::from(micros.max(1)));
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Named metric registry shared by every virtual user of a run.
#[derive(Debug, Default)]
pub struct MetricSink {
    gate: Arc<SnapshotGate>,
    registry: Mutex<BTreeMap<String, MetricCell>>,
}

impl MetricSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new counter.
    ///
    /// # Errors
    ///
    /// Returns an error when the name is invalid or already registered.
    pub fn register_counter(&self, name: &str) -> Result<Counter, MetricsError> {
        let cell = Arc::new(AtomicU64::new(0));
        self.insert(name, MetricCell::Counter(Arc::clone(&cell)))?;
        Ok(Counter {
            name: Arc::from(name),
            cell,
            gate: Arc::clone(&self.gate),
        })
    }

    /// Registers a new rate.
    ///
    /// # Errors
    ///
    /// Returns an error when the name is invalid or already registered.
    pub fn register_rate(&self, name: &str) -> Result<Rate, MetricsError> {
        let cell = Arc::new(RateCell::default());
        self.insert(name, MetricCell::Rate(Arc::clone(&cell)))?;
        Ok(Rate {
            name: Arc::from(name),
            cell,
            gate: Arc::clone(&self.gate),
        })
    }

    /// Registers a new trend.
    ///
    /// # Errors
    ///
    /// Returns an error when the name is invalid or already registered, or
    /// when the histogram cannot be allocated.
    pub fn register_trend(&self, name: &str) -> Result<Trend, MetricsError> {
        let cell = Arc::new(Mutex::new(TrendCell {
            histogram: LatencyHistogram::new()?,
            sum_us: 0,
        }));
        self.insert(name, MetricCell::Trend(Arc::clone(&cell)))?;
        Ok(Trend {
            name: Arc::from(name),
            cell,
            gate: Arc::clone(&self.gate),
        })
    }

    /// Looks up an existing counter.
    ///
    /// # Errors
    ///
    /// Returns an error when no metric has that name or it is not a counter.
    pub fn counter(&self, name: &str) -> Result<Counter, MetricsError> {
        match self.lookup(name)? {
            MetricCell::Counter(cell) => Ok(Counter {
                name: Arc::from(name),
                cell,
                gate: Arc::clone(&self.gate),
            }),
            other @ (MetricCell::Rate(_) | MetricCell::Trend(_)) => {
                Err(wrong_kind(name, MetricKind::Counter, other.kind()))
            }
        }
    }

    /// Looks up an existing rate.
    ///
    /// # Errors
    ///
    /// Returns an error when no metric has that name or it is not a rate.
    pub fn rate(&self, name: &str) -> Result<Rate, MetricsError> {
        match self.lookup(name)? {
            MetricCell::Rate(cell) => Ok(Rate {
                name: Arc::from(name),
                cell,
                gate: Arc::clone(&self.gate),
            }),
            other @ (MetricCell::Counter(_) | MetricCell::Trend(_)) => {
                Err(wrong_kind(name, MetricKind::Rate, other.kind()))
            }
        }
    }

    #[must_use]
    pub fn kind_of(&self, name: &str) -> Option<MetricKind> {
        self.registry().get(name).map(MetricCell::kind)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.registry().contains_key(name)
    }

    /// Reads every metric at a single point in time.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        let _frozen = self.gate.freeze();
        let registry = self.registry();
        let metrics = registry
            .iter()
            .map(|(name, cell)| (name.clone(), cell.read()))
            .collect();
        MetricsSnapshot { metrics }
    }

    fn insert(&self, name: &str, cell: MetricCell) -> Result<(), MetricsError> {
        if !is_valid_metric_name(name) {
            return Err(MetricsError::InvalidMetricName {
                name: name.to_owned(),
            });
        }
        let mut registry = self.registry();
        if registry.contains_key(name) {
            return Err(MetricsError::DuplicateMetric {
                name: name.to_owned(),
            });
        }
        registry.insert(name.to_owned(), cell);
        Ok(())
    }

    fn lookup(&self, name: &str) -> Result<MetricCell, MetricsError> {
        self.registry()
            .get(name)
            .cloned()
            .ok_or_else(|| MetricsError::UnknownMetric {
                name: name.to_owned(),
            })
    }

    fn registry(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, MetricCell>> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn wrong_kind(name: &str, expected: MetricKind, actual: MetricKind) -> MetricsError {
    MetricsError::WrongMetricKind {
        name: name.to_owned(),
        expected,
        actual,
    }
}

pub(crate) fn is_valid_metric_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '.')
}
