//! Demand-side charges: peak demand, minimum-bill floor, power factor

use faifa_common::{
    BillPrecision, Result, UsageReading, FREE_KVAR_PER_KW, MINIMUM_DEMAND_RATIO,
    POWER_FACTOR_RATE,
};
use rust_decimal::{Decimal, RoundingStrategy};

use super::energy::require;
use crate::rates::DemandCharge;

/// Unrounded demand charge for a reading
pub fn demand_charge(demand: &DemandCharge, usage: &UsageReading) -> Result<Decimal> {
    match demand {
        DemandCharge::Flat { rate } => Ok(usage.overall_peak_kw * rate),
        // Off-peak demand is never charged under time-of-use
        DemandCharge::TimeOfUse { rate } => {
            Ok(require(usage.on_peak_kw, "usage.on_peak_kw")? * rate)
        }
        DemandCharge::TimeOfDay {
            on_peak_rate,
            partial_peak_rate,
            off_peak_rate,
        } => {
            let on_peak = require(usage.on_peak_kw, "usage.on_peak_kw")?;
            let partial_peak = require(usage.partial_peak_kw, "usage.partial_peak_kw")?;
            let off_peak = require(usage.off_peak_kw, "usage.off_peak_kw")?;
            Ok(on_peak * on_peak_rate + partial_peak * partial_peak_rate + off_peak * off_peak_rate)
        }
    }
}

/// Lowest demand charge that may be billed, given the trailing 12-month peak.
///
/// Rounded up to demand precision so rounding never undercuts the floor.
pub fn minimum_demand_charge(highest_demand_charge: Decimal) -> Decimal {
    (highest_demand_charge * MINIMUM_DEMAND_RATIO)
        .round_dp_with_strategy(BillPrecision::DEMAND_SCALE, RoundingStrategy::AwayFromZero)
}

/// Demand charge after minimum-bill protection.
///
/// The floor already sits on the demand grid, so rounding the result to
/// demand precision never takes it below the floor.
pub fn effective_demand_charge(calculated: Decimal, highest_demand_charge: Decimal) -> Decimal {
    calculated.max(minimum_demand_charge(highest_demand_charge))
}

/// kVAR above the free allowance, rounded to whole kVAR
pub fn excess_kvar(peak_kvar: Decimal, overall_peak_kw: Decimal) -> Decimal {
    let excess = (peak_kvar - overall_peak_kw * FREE_KVAR_PER_KW).max(Decimal::ZERO);
    BillPrecision::round_whole(excess)
}

/// Power-factor penalty, rounded to charge precision
pub fn power_factor_charge(peak_kvar: Decimal, overall_peak_kw: Decimal) -> Decimal {
    BillPrecision::round_charge(excess_kvar(peak_kvar, overall_peak_kw) * POWER_FACTOR_RATE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_flat_demand_uses_overall_peak() {
        let usage = UsageReading::with_peak(dec!(1500), dec!(75));
        let charge = demand_charge(&DemandCharge::Flat { rate: dec!(221.50) }, &usage).unwrap();
        assert_eq!(charge, dec!(16612.5));
    }

    #[test]
    fn test_time_of_use_ignores_off_peak_demand() {
        let usage = UsageReading::time_of_use(dec!(10000), dec!(20000))
            .with_on_peak_kw(dec!(100))
            .with_off_peak_kw(dec!(500));
        let charge = demand_charge(&DemandCharge::TimeOfUse { rate: dec!(210.00) }, &usage).unwrap();
        assert_eq!(charge, dec!(21000));
    }

    #[test]
    fn test_time_of_day_prices_each_period() {
        let usage = UsageReading::energy_only(dec!(50000))
            .with_on_peak_kw(dec!(100))
            .with_partial_peak_kw(dec!(80))
            .with_off_peak_kw(dec!(120));
        let demand = DemandCharge::TimeOfDay {
            on_peak_rate: dec!(332.71),
            partial_peak_rate: dec!(68.22),
            off_peak_rate: dec!(0),
        };
        // 100 * 332.71 + 80 * 68.22 + 120 * 0
        assert_eq!(demand_charge(&demand, &usage).unwrap(), dec!(38728.6));
    }

    #[test]
    fn test_time_of_day_requires_partial_peak() {
        let usage = UsageReading::energy_only(dec!(50000)).with_on_peak_kw(dec!(100));
        let demand = DemandCharge::TimeOfDay {
            on_peak_rate: dec!(332.71),
            partial_peak_rate: dec!(68.22),
            off_peak_rate: dec!(0),
        };
        assert!(demand_charge(&demand, &usage).is_err());
    }

    #[test]
    fn test_minimum_bill_floor() {
        assert_eq!(effective_demand_charge(dec!(16612.5), dec!(10000)), dec!(16612.5));
        assert_eq!(effective_demand_charge(dec!(100.0), dec!(10000)), dec!(7000));
        // 100.3 * 0.70 = 70.21, never billed as 70.2
        assert_eq!(minimum_demand_charge(dec!(100.3)), dec!(70.3));
    }

    #[test]
    fn test_power_factor() {
        // 60 - 75 * 0.6197 = 13.5225 -> 14 kVAR
        assert_eq!(excess_kvar(dec!(60), dec!(75)), dec!(14));
        assert_eq!(power_factor_charge(dec!(60), dec!(75)), dec!(784.98));
        // Within allowance
        assert_eq!(power_factor_charge(dec!(40), dec!(75)), dec!(0));
        // Exactly 0.5 kVAR over rounds up
        assert_eq!(excess_kvar(dec!(46.9775), dec!(75)), dec!(1));
    }
}
