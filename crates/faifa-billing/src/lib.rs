//! # Faifa Billing
//!
//! Thai commercial electricity billing for MEA and PEA customers.
//!
//! ## Pipeline
//!
//! ```text
//! BillRequest --validate--> BillingInput --resolve--> RateEntry --compute--> BillResult
//! ```
//!
//! - [`normalize`]: coercion and per-tariff field requirements
//! - [`rates`]: rate table keyed by (provider, tier, structure, voltage)
//! - [`engine`]: pure bill arithmetic
//! - [`BillingService`]: the pipeline above, with optional caching and metrics

pub mod cache;
pub mod config;
pub mod engine;
pub mod metrics;
pub mod normalize;
pub mod rates;

use std::sync::Arc;

use faifa_common::{BillResult, BillingError, Result};
use tracing::{debug, info, instrument, warn};

pub use cache::{BillCache, CacheStats};
pub use config::{BillingConfig, CacheSettings};
pub use engine::compute_bill;
pub use metrics::BillingMetrics;
pub use normalize::{validate_request, BillRequest, BillingInput};
pub use rates::{RateEntry, RateTable};

/// Billing service
pub struct BillingService {
    rates: Arc<RateTable>,
    cache: Option<BillCache>,
    metrics: Option<BillingMetrics>,
}

impl BillingService {
    pub fn new(rates: impl Into<Arc<RateTable>>) -> Self {
        Self {
            rates: rates.into(),
            cache: None,
            metrics: None,
        }
    }

    /// Service over the built-in reference rates
    pub fn reference() -> Result<Self> {
        Ok(Self::new(RateTable::reference()?))
    }

    pub fn with_cache(mut self, cache: BillCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_metrics(mut self, metrics: BillingMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Build the service a configuration describes.
    ///
    /// Fails when the configured rate table cannot be loaded.
    pub fn from_config(config: &BillingConfig) -> Result<Self> {
        let rates = match &config.rates_path {
            Some(path) => RateTable::from_path(path)?,
            None => RateTable::reference()?,
        };
        info!(entries = rates.len(), "Rate table ready");

        let mut service = Self::new(rates);
        if config.cache.enabled {
            service = service.with_cache(
                BillCache::new(config.cache.max_entries).with_ttl(config.cache.ttl()),
            );
        }
        Ok(service)
    }

    pub fn rates(&self) -> &RateTable {
        &self.rates
    }

    pub fn cache(&self) -> Option<&BillCache> {
        self.cache.as_ref()
    }

    /// Validate a raw request and compute its bill
    #[instrument(skip(self, request))]
    pub fn calculate(&self, request: &BillRequest) -> Result<BillResult> {
        let _timer = self
            .metrics
            .as_ref()
            .map(|m| m.calculation_duration_seconds.start_timer());

        let result = validate_request(request).and_then(|input| self.calculate_input(&input));

        match &result {
            Ok(bill) => {
                if let Some(metrics) = &self.metrics {
                    metrics.bills_total.inc();
                }
                debug!(total = %bill.total(), "Bill calculated");
            }
            Err(e) => {
                if let Some(metrics) = &self.metrics {
                    metrics.record_failure(e.kind());
                }
                if e.is_client_error() {
                    warn!(error = %e, "Rejected bill request");
                } else {
                    warn!(error = %e, kind = e.kind(), "Bill calculation failed");
                }
            }
        }
        result
    }

    /// Compute the bill for an already validated input
    pub fn calculate_input(&self, input: &BillingInput) -> Result<BillResult> {
        let rate = self.rates.resolve(&input.key)?;

        let Some(cache) = &self.cache else {
            return self.compute(input, rate);
        };

        if let Some(bill) = cache.get(input) {
            if let Some(metrics) = &self.metrics {
                metrics.cache_hits_total.inc();
            }
            return Ok(bill);
        }
        if let Some(metrics) = &self.metrics {
            metrics.cache_misses_total.inc();
        }

        let bill = self.compute(input, rate)?;
        cache.set(input, &bill);
        Ok(bill)
    }

    fn compute(&self, input: &BillingInput, rate: &RateEntry) -> Result<BillResult> {
        compute_bill(
            input.key.tier,
            input.key.structure,
            rate,
            &input.usage,
            &input.params,
        )
        .map_err(|e| match e {
            // A rate row that passed load-time validation cannot mismatch
            BillingError::Configuration(msg) => {
                BillingError::Internal(format!("rate {}: {}", input.key, msg))
            }
            other => other,
        })
    }
}
