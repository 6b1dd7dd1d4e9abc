//! Prometheus metrics for bill computation

use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry};

/// Counters and timings for the billing service
#[derive(Clone)]
pub struct BillingMetrics {
    pub bills_total: IntCounter,
    pub failures_total: IntCounterVec,
    pub cache_hits_total: IntCounter,
    pub cache_misses_total: IntCounter,
    pub calculation_duration_seconds: Histogram,
}

impl BillingMetrics {
    pub fn new() -> prometheus::Result<Self> {
        Ok(Self {
            bills_total: IntCounter::new("faifa_bills_total", "Total bills computed")?,
            failures_total: IntCounterVec::new(
                Opts::new("faifa_bill_failures_total", "Rejected bill requests by error kind"),
                &["kind"],
            )?,
            cache_hits_total: IntCounter::new(
                "faifa_bill_cache_hits_total",
                "Bills served from the cache",
            )?,
            cache_misses_total: IntCounter::new(
                "faifa_bill_cache_misses_total",
                "Bills computed after a cache miss",
            )?,
            calculation_duration_seconds: Histogram::with_opts(
                HistogramOpts::new(
                    "faifa_bill_calculation_duration_seconds",
                    "Time to validate and compute a bill",
                )
                .buckets(vec![0.00001, 0.00005, 0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05]),
            )?,
        })
    }

    pub fn register(&self, registry: &Registry) -> prometheus::Result<()> {
        registry.register(Box::new(self.bills_total.clone()))?;
        registry.register(Box::new(self.failures_total.clone()))?;
        registry.register(Box::new(self.cache_hits_total.clone()))?;
        registry.register(Box::new(self.cache_misses_total.clone()))?;
        registry.register(Box::new(self.calculation_duration_seconds.clone()))?;
        Ok(())
    }

    pub fn record_failure(&self, kind: &str) {
        self.failures_total.with_label_values(&[kind]).inc();
    }
}
