//! In-memory bill cache
//!
//! Bills are pure functions of their input, so a computed bill can be reused
//! for any identical request within the validity window.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use faifa_common::{BillResult, Result};
use rust_decimal::Decimal;
use tracing::debug;

use crate::normalize::BillingInput;

/// Cache statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of cached entries, expired ones included until purged
    pub entry_count: u64,
    pub hits: u64,
    pub misses: u64,
}

#[derive(Debug, Clone)]
struct CachedBill {
    bill: BillResult,
    expires_at: i64,
}

/// Canonical text of a decimal: `1500` and `1500.00` coincide
fn canonical(value: Decimal) -> String {
    value.normalize().to_string()
}

fn canonical_opt(value: Option<Decimal>) -> String {
    value.map(canonical).unwrap_or_else(|| "-".to_string())
}

fn cache_key(prefix: &str, input: &BillingInput) -> String {
    let usage = &input.usage;
    let params = &input.params;
    let hash = blake3::hash(
        format!(
            "{}|{}|{}|{}|{}|{}|{}|{}|{}|{}|{}|{}|{}|{}",
            input.key.provider,
            input.key.tier.number(),
            input.key.structure,
            input.key.voltage,
            canonical(usage.total_kwh),
            canonical_opt(usage.on_peak_kwh),
            canonical_opt(usage.off_peak_kwh),
            canonical(usage.overall_peak_kw),
            canonical_opt(usage.on_peak_kw),
            canonical_opt(usage.partial_peak_kw),
            canonical_opt(usage.off_peak_kw),
            canonical(params.ft_rate_satang),
            canonical(params.peak_kvar),
            canonical(params.highest_demand_charge),
        )
        .as_bytes(),
    );
    format!("{}:bill:{}", prefix, hash.to_hex())
}

/// Bounded TTL cache of computed bills, safe to share between threads
pub struct BillCache {
    cache: DashMap<String, CachedBill>,
    prefix: String,
    ttl: Duration,
    max_entries: usize,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl BillCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            cache: DashMap::new(),
            prefix: "faifa".to_string(),
            ttl: Duration::from_secs(300), // 5 minutes
            max_entries,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Create cache with custom prefix
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = prefix.to_string();
        self
    }

    /// Create cache with custom TTL
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    fn now_millis() -> i64 {
        chrono::Utc::now().timestamp_millis()
    }

    pub fn get(&self, input: &BillingInput) -> Option<BillResult> {
        let key = cache_key(&self.prefix, input);
        let now = Self::now_millis();

        let found = self
            .cache
            .get(&key)
            .filter(|entry| now < entry.expires_at)
            .map(|entry| entry.bill.clone());

        match found {
            Some(bill) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!(key = %key, "Bill cache hit");
                Some(bill)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    pub fn set(&self, input: &BillingInput, bill: &BillResult) {
        if self.max_entries == 0 {
            return;
        }

        // Evict old entries if at capacity
        if self.cache.len() >= self.max_entries {
            self.purge_expired();

            // If still at capacity, remove the entry closest to expiry
            if self.cache.len() >= self.max_entries {
                let oldest_key = self
                    .cache
                    .iter()
                    .min_by_key(|e| e.value().expires_at)
                    .map(|e| e.key().clone());
                if let Some(oldest_key) = oldest_key {
                    self.cache.remove(&oldest_key);
                }
            }
        }

        let ttl_millis = i64::try_from(self.ttl.as_millis()).unwrap_or(i64::MAX);
        self.cache.insert(
            cache_key(&self.prefix, input),
            CachedBill {
                bill: bill.clone(),
                expires_at: Self::now_millis().saturating_add(ttl_millis),
            },
        );
    }

    /// Return the cached bill, or compute and store it
    pub fn get_or_compute<F>(&self, input: &BillingInput, compute: F) -> Result<BillResult>
    where
        F: FnOnce() -> Result<BillResult>,
    {
        if let Some(bill) = self.get(input) {
            return Ok(bill);
        }
        let bill = compute()?;
        self.set(input, &bill);
        Ok(bill)
    }

    /// Drop expired entries, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let before = self.cache.len();
        let now = Self::now_millis();
        self.cache.retain(|_, v| now < v.expires_at);
        before.saturating_sub(self.cache.len())
    }

    pub fn clear(&self) {
        self.cache.clear();
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entry_count: self.cache.len() as u64,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}
