//! Read-only rate table keyed by (provider, tier, structure, voltage)

use std::collections::BTreeMap;
use std::path::Path;

use faifa_common::{
    BillingError, CustomerTier, Provider, RateKey, Result, TariffStructure, VoltageBand,
};
use tracing::{debug, info, instrument};

use super::entry::{RateEntry, RateRecord};
use super::reference;

/// Tariff coefficients for every supported combination.
///
/// Built once at startup; every row is shape-checked on the way in, so a
/// malformed table never reaches request handling.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateTable {
    entries: BTreeMap<RateKey, RateEntry>,
}

impl RateTable {
    /// Build a table, rejecting mis-shaped rows and duplicate keys
    pub fn from_records(records: impl IntoIterator<Item = RateRecord>) -> Result<Self> {
        let mut entries = BTreeMap::new();

        for RateRecord { key, entry } in records {
            entry
                .validate_shape(key.tier, key.structure)
                .map_err(|e| match e {
                    BillingError::Configuration(msg) => {
                        BillingError::Configuration(format!("rate {}: {}", key, msg))
                    }
                    other => other,
                })?;

            if entries.insert(key, entry).is_some() {
                return Err(BillingError::Configuration(format!(
                    "duplicate rate entry for {}",
                    key
                )));
            }
        }

        Ok(Self { entries })
    }

    /// Parse a JSON array of rate records
    pub fn from_json_str(json: &str) -> Result<Self> {
        let records: Vec<RateRecord> = serde_json::from_str(json)
            .map_err(|e| BillingError::Configuration(format!("Failed to parse rate table: {}", e)))?;
        Self::from_records(records)
    }

    /// Load a JSON rate table from disk
    #[instrument]
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            BillingError::Configuration(format!(
                "Failed to read rate table {}: {}",
                path.display(),
                e
            ))
        })?;

        let table = Self::from_json_str(&content)?;
        info!(entries = table.len(), path = %path.display(), "Loaded rate table");
        Ok(table)
    }

    /// Built-in MEA and PEA rates
    pub fn reference() -> Result<Self> {
        let table = Self::from_records(reference::records())?;
        debug!(entries = table.len(), "Built reference rate table");
        Ok(table)
    }

    /// Look up the rate row for a key
    pub fn resolve(&self, key: &RateKey) -> Result<&RateEntry> {
        self.entries
            .get(key)
            .ok_or_else(|| BillingError::RateNotFound {
                provider: key.provider.to_string(),
                tier: key.tier.to_string(),
                structure: key.structure.to_string(),
                voltage: key.voltage.to_string(),
            })
    }

    /// Look up the rate row from its parts
    pub fn resolve_rate(
        &self,
        provider: Provider,
        tier: CustomerTier,
        structure: TariffStructure,
        voltage: VoltageBand,
    ) -> Result<&RateEntry> {
        self.resolve(&RateKey::new(provider, tier, structure, voltage))
    }

    pub fn get(&self, key: &RateKey) -> Option<&RateEntry> {
        self.entries.get(key)
    }

    /// Rows in key order
    pub fn entries(&self) -> impl Iterator<Item = (&RateKey, &RateEntry)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_records(&self) -> Vec<RateRecord> {
        self.entries
            .iter()
            .map(|(key, entry)| RateRecord::new(*key, entry.clone()))
            .collect()
    }

    /// Serialize in the same format [`RateTable::from_json_str`] reads
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_records())?)
    }
}
