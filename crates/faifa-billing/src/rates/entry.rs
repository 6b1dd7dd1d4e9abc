//! Rate rows: the charge coefficients for one (provider, tier, structure,
//! voltage) combination.

use faifa_common::{
    BillingError, CustomerTier, RateKey, Result, TariffStructure, MAX_INPUT_VALUE,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One band of a progressive energy tariff
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnergyTier {
    /// Consumption at which this band starts (kWh)
    pub threshold_kwh: Decimal,
    /// Price for each kWh inside the band
    pub rate_per_kwh: Decimal,
}

impl EnergyTier {
    pub fn new(threshold_kwh: Decimal, rate_per_kwh: Decimal) -> Self {
        Self {
            threshold_kwh,
            rate_per_kwh,
        }
    }
}

/// How consumption (kWh) is priced
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EnergyCharge {
    /// Single price per kWh
    Flat { rate: Decimal },
    /// Progressive bands, thresholds strictly increasing from zero
    Tiered { tiers: Vec<EnergyTier> },
    /// Separate on-peak and off-peak prices
    TimeOfUse {
        on_peak_rate: Decimal,
        off_peak_rate: Decimal,
    },
}

impl EnergyCharge {
    pub fn kind(&self) -> &'static str {
        match self {
            EnergyCharge::Flat { .. } => "flat",
            EnergyCharge::Tiered { .. } => "tiered",
            EnergyCharge::TimeOfUse { .. } => "time_of_use",
        }
    }

    fn coefficients(&self) -> Vec<Decimal> {
        match self {
            EnergyCharge::Flat { rate } => vec![*rate],
            EnergyCharge::Tiered { tiers } => tiers
                .iter()
                .flat_map(|t| [t.threshold_kwh, t.rate_per_kwh])
                .collect(),
            EnergyCharge::TimeOfUse {
                on_peak_rate,
                off_peak_rate,
            } => vec![*on_peak_rate, *off_peak_rate],
        }
    }
}

/// How peak power (kW) is priced
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DemandCharge {
    /// Single price per kW of overall peak demand
    Flat { rate: Decimal },
    /// Price per kW of on-peak demand only
    TimeOfUse { rate: Decimal },
    /// Independent prices per period
    TimeOfDay {
        on_peak_rate: Decimal,
        partial_peak_rate: Decimal,
        off_peak_rate: Decimal,
    },
}

impl DemandCharge {
    pub fn kind(&self) -> &'static str {
        match self {
            DemandCharge::Flat { .. } => "flat",
            DemandCharge::TimeOfUse { .. } => "time_of_use",
            DemandCharge::TimeOfDay { .. } => "time_of_day",
        }
    }

    fn coefficients(&self) -> Vec<Decimal> {
        match self {
            DemandCharge::Flat { rate } | DemandCharge::TimeOfUse { rate } => vec![*rate],
            DemandCharge::TimeOfDay {
                on_peak_rate,
                partial_peak_rate,
                off_peak_rate,
            } => vec![*on_peak_rate, *partial_peak_rate, *off_peak_rate],
        }
    }
}

/// Immutable tariff coefficients for one rate key
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RateEntry {
    /// Fixed monthly charge (baht)
    pub service_charge: Decimal,
    pub energy: EnergyCharge,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demand: Option<DemandCharge>,
}

impl RateEntry {
    pub fn flat(service_charge: Decimal, energy_rate: Decimal) -> Self {
        Self {
            service_charge,
            energy: EnergyCharge::Flat { rate: energy_rate },
            demand: None,
        }
    }

    pub fn tiered(service_charge: Decimal, tiers: Vec<EnergyTier>) -> Self {
        Self {
            service_charge,
            energy: EnergyCharge::Tiered { tiers },
            demand: None,
        }
    }

    pub fn time_of_use(service_charge: Decimal, on_peak_rate: Decimal, off_peak_rate: Decimal) -> Self {
        Self {
            service_charge,
            energy: EnergyCharge::TimeOfUse {
                on_peak_rate,
                off_peak_rate,
            },
            demand: None,
        }
    }

    pub fn with_demand(mut self, demand: DemandCharge) -> Self {
        self.demand = Some(demand);
        self
    }

    /// Check that the populated charge shapes match what `structure` prescribes
    /// for `tier`, and that every coefficient is usable.
    pub fn validate_shape(&self, tier: CustomerTier, structure: TariffStructure) -> Result<()> {
        if !tier.supports(structure) {
            return Err(BillingError::Configuration(format!(
                "{} does not support the '{}' tariff structure",
                tier, structure
            )));
        }

        let energy_ok = matches!(
            (structure, &self.energy),
            (TariffStructure::Normal, EnergyCharge::Flat { .. })
                | (TariffStructure::Normal, EnergyCharge::Tiered { .. })
                | (TariffStructure::Tou, EnergyCharge::TimeOfUse { .. })
                | (TariffStructure::Tod, EnergyCharge::Flat { .. })
        );
        if !energy_ok {
            return Err(BillingError::Configuration(format!(
                "{} '{}' rate cannot use a {} energy charge",
                tier,
                structure,
                self.energy.kind()
            )));
        }

        let demand_ok = match (&self.demand, tier.has_demand_charge()) {
            (None, false) => true,
            (Some(_), false) | (None, true) => false,
            (Some(demand), true) => matches!(
                (structure, demand),
                (TariffStructure::Normal, DemandCharge::Flat { .. })
                    | (TariffStructure::Tou, DemandCharge::TimeOfUse { .. })
                    | (TariffStructure::Tod, DemandCharge::TimeOfDay { .. })
            ),
        };
        if !demand_ok {
            let found = self.demand.as_ref().map_or("none", DemandCharge::kind);
            return Err(BillingError::Configuration(format!(
                "{} '{}' rate has a mismatched demand charge ({})",
                tier, structure, found
            )));
        }

        if let EnergyCharge::Tiered { tiers } = &self.energy {
            validate_tiers(tiers)?;
        }

        let coefficients: Vec<Decimal> = std::iter::once(self.service_charge)
            .chain(self.energy.coefficients())
            .chain(self.demand.iter().flat_map(DemandCharge::coefficients))
            .collect();
        if coefficients.iter().any(|c| c.is_sign_negative() && !c.is_zero()) {
            return Err(BillingError::Configuration(format!(
                "{} '{}' rate has a negative coefficient",
                tier, structure
            )));
        }
        if coefficients.iter().any(|c| *c > MAX_INPUT_VALUE) {
            return Err(BillingError::Configuration(format!(
                "{} '{}' rate has a coefficient above {}",
                tier, structure, MAX_INPUT_VALUE
            )));
        }

        Ok(())
    }
}

fn validate_tiers(tiers: &[EnergyTier]) -> Result<()> {
    let Some(first) = tiers.first() else {
        return Err(BillingError::Configuration(
            "tiered energy charge needs at least one band".to_string(),
        ));
    };
    if !first.threshold_kwh.is_zero() {
        return Err(BillingError::Configuration(format!(
            "first energy band must start at 0 kWh, found {}",
            first.threshold_kwh
        )));
    }
    for pair in tiers.windows(2) {
        if pair[1].threshold_kwh <= pair[0].threshold_kwh {
            return Err(BillingError::Configuration(format!(
                "energy band thresholds must strictly increase: {} then {}",
                pair[0].threshold_kwh, pair[1].threshold_kwh
            )));
        }
    }
    Ok(())
}

/// A rate row together with its lookup key, as stored in rate files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateRecord {
    #[serde(flatten)]
    pub key: RateKey,
    #[serde(flatten)]
    pub entry: RateEntry,
}

impl RateRecord {
    pub fn new(key: RateKey, entry: RateEntry) -> Self {
        Self { key, entry }
    }
}
