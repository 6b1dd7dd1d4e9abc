//! Energy charge: flat, progressive (tiered) and time-of-use pricing of kWh

use faifa_common::{BillingError, Result, UsageReading};
use rust_decimal::Decimal;

use crate::rates::{EnergyCharge, EnergyTier};

/// Unrounded energy charge for a reading
pub fn energy_charge(energy: &EnergyCharge, usage: &UsageReading) -> Result<Decimal> {
    match energy {
        EnergyCharge::Flat { rate } => Ok(usage.total_kwh * rate),
        EnergyCharge::Tiered { tiers } => Ok(tiered_charge(tiers, usage.total_kwh)),
        EnergyCharge::TimeOfUse {
            on_peak_rate,
            off_peak_rate,
        } => {
            let on_peak = require(usage.on_peak_kwh, "usage.on_peak_kwh")?;
            let off_peak = require(usage.off_peak_kwh, "usage.off_peak_kwh")?;
            Ok(on_peak * on_peak_rate + off_peak * off_peak_rate)
        }
    }
}

/// Progressive pricing: each band charges only the kWh that fall inside it.
///
/// Bands are `[threshold, next threshold)`; consumption exactly at a
/// threshold is billed entirely at the band that ends there.
pub fn tiered_charge(tiers: &[EnergyTier], kwh: Decimal) -> Decimal {
    let mut charge = Decimal::ZERO;

    for (i, tier) in tiers.iter().enumerate() {
        if kwh <= tier.threshold_kwh {
            break;
        }
        let band_end = tiers
            .get(i + 1)
            .map_or(kwh, |next| next.threshold_kwh.min(kwh));
        charge += (band_end - tier.threshold_kwh) * tier.rate_per_kwh;
    }

    charge
}

pub(crate) fn require(value: Option<Decimal>, field: &str) -> Result<Decimal> {
    value.ok_or_else(|| BillingError::field(field, "is required for this tariff"))
}
