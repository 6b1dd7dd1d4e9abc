//! Bill calculation
//!
//! ```text
//! Type 2:     base    = energy + service
//!             total   = base + Ft + VAT
//!
//! Types 3-5:  demand  = max(calculated demand, 70% of 12-month peak)
//!             subtotal = demand + energy + power factor + service + Ft
//!             total   = subtotal + VAT
//! ```
//!
//! Aggregates are summed from unrounded line items, and each field is rounded
//! only as the bill is assembled. VAT is taken on the rounded subtotal, so it
//! is exactly 7% of the subtotal shown on the bill.

use faifa_common::{
    BillPrecision, BillResult, BillingError, BillingParameters, CustomerTier, DemandBill, Result,
    SimpleBill, TariffStructure, UsageReading, ValidationErrors, MAX_INPUT_VALUE, SATANG_PER_BAHT,
    VAT_RATE,
};
use rust_decimal::Decimal;
use tracing::{debug, instrument};

use super::demand::{demand_charge, effective_demand_charge, power_factor_charge};
use super::energy::{energy_charge, require};
use crate::rates::RateEntry;

/// Compute an itemized bill.
///
/// Pure and deterministic: identical inputs always give an identical bill.
/// Fails with a validation error for unsupported tier/structure pairs or
/// inputs outside `0..=MAX_INPUT_VALUE`, and with a configuration error when `rate` does not
/// have the shape `structure` prescribes.
#[instrument(skip(rate, usage, params), fields(tier = %tier, structure = %structure))]
pub fn compute_bill(
    tier: CustomerTier,
    structure: TariffStructure,
    rate: &RateEntry,
    usage: &UsageReading,
    params: &BillingParameters,
) -> Result<BillResult> {
    ensure_supported(tier, structure)?;
    rate.validate_shape(tier, structure)?;
    ensure_in_range(usage, params)?;

    let bill = if tier.has_demand_charge() {
        BillResult::Full(demand_bill(structure, rate, usage, params)?)
    } else {
        BillResult::Simple(simple_bill(rate, usage, params)?)
    };

    debug!(total = %bill.total(), "Computed bill");
    Ok(bill)
}

/// Reject tier/structure pairs no utility bills under
pub fn ensure_supported(tier: CustomerTier, structure: TariffStructure) -> Result<()> {
    if tier.supports(structure) {
        return Ok(());
    }
    let expected = tier
        .supported_structures()
        .iter()
        .map(TariffStructure::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    Err(BillingError::field(
        "tariff_structure",
        format!(
            "{} does not support the '{}' tariff structure; expected one of: {}",
            tier, structure, expected
        ),
    ))
}

fn ensure_in_range(usage: &UsageReading, params: &BillingParameters) -> Result<()> {
    let mut errors = ValidationErrors::new();

    let usage_fields = usage
        .populated_fields()
        .into_iter()
        .map(|(name, value)| (format!("usage.{}", name), value));
    let param_fields = [
        ("ft_rate_satang", params.ft_rate_satang),
        ("peak_kvar", params.peak_kvar),
        ("highest_demand_charge", params.highest_demand_charge),
    ]
    .into_iter()
    .map(|(name, value)| (name.to_string(), value));

    for (field, value) in usage_fields.chain(param_fields) {
        if value < Decimal::ZERO {
            errors.push(field, "must be greater than or equal to 0");
        } else if value > MAX_INPUT_VALUE {
            errors.push(field, format!("must not exceed {}", MAX_INPUT_VALUE));
        }
    }

    Ok(errors.into_result()?)
}

fn fuel_adjustment_charge(kwh: Decimal, ft_rate_satang: Decimal) -> Decimal {
    kwh * (ft_rate_satang / SATANG_PER_BAHT)
}

fn simple_bill(
    rate: &RateEntry,
    usage: &UsageReading,
    params: &BillingParameters,
) -> Result<SimpleBill> {
    let energy = energy_charge(&rate.energy, usage)?;
    let service_charge = rate.service_charge;
    let fuel_adjustment = fuel_adjustment_charge(usage.total_kwh, params.ft_rate_satang);

    let energy_charge = BillPrecision::round_charge(energy);
    let base_tariff = BillPrecision::round_charge(energy + service_charge);
    let fuel_adjustment_charge = BillPrecision::round_demand(fuel_adjustment);

    let pre_vat = base_tariff + fuel_adjustment_charge;
    let vat = BillPrecision::round_total(pre_vat * VAT_RATE);
    let total_bill = BillPrecision::round_total(pre_vat + vat);

    debug!(%energy_charge, %base_tariff, %fuel_adjustment_charge, %vat, "Type 2 line items");

    Ok(SimpleBill {
        energy_charge,
        service_charge,
        base_tariff,
        fuel_adjustment_charge,
        vat,
        total_bill,
    })
}

fn demand_bill(
    structure: TariffStructure,
    rate: &RateEntry,
    usage: &UsageReading,
    params: &BillingParameters,
) -> Result<DemandBill> {
    let demand = rate.demand.as_ref().ok_or_else(|| {
        BillingError::Configuration("demand-metered rate has no demand charge".to_string())
    })?;

    let calculated_demand = demand_charge(demand, usage)?;
    let energy = energy_charge(&rate.energy, usage)?;
    let effective_demand = effective_demand_charge(calculated_demand, params.highest_demand_charge);
    let power_factor_charge = power_factor_charge(params.peak_kvar, usage.overall_peak_kw);
    let service_charge = rate.service_charge;

    // Time-of-use bills Ft on the metered periods, not on a separately supplied total
    let ft_kwh = match structure {
        TariffStructure::Tou => require(usage.period_kwh(), "usage.on_peak_kwh")?,
        TariffStructure::Normal | TariffStructure::Tod => usage.total_kwh,
    };
    let fuel_adjustment = fuel_adjustment_charge(ft_kwh, params.ft_rate_satang);

    let subtotal = BillPrecision::round_charge(
        effective_demand + energy + power_factor_charge + service_charge + fuel_adjustment,
    );
    let calculated_demand_charge = BillPrecision::round_demand(calculated_demand);
    let effective_demand_charge = BillPrecision::round_demand(effective_demand);
    let energy_charge = BillPrecision::round_charge(energy);
    let fuel_adjustment_charge = BillPrecision::round_demand(fuel_adjustment);
    let vat = BillPrecision::round_total(subtotal * VAT_RATE);
    let grand_total = BillPrecision::round_total(subtotal + vat);

    debug!(
        %calculated_demand_charge,
        %effective_demand_charge,
        %energy_charge,
        %power_factor_charge,
        %fuel_adjustment_charge,
        %subtotal,
        %vat,
        "Demand bill line items"
    );

    Ok(DemandBill {
        calculated_demand_charge,
        energy_charge,
        effective_demand_charge,
        power_factor_charge,
        service_charge,
        fuel_adjustment_charge,
        subtotal,
        vat,
        grand_total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rates::{DemandCharge, EnergyTier};
    use rust_decimal_macros::dec;

    fn small_tou_rate() -> RateEntry {
        RateEntry::time_of_use(dec!(33.29), dec!(5.7982), dec!(2.6369))
    }

    fn medium_normal_rate() -> RateEntry {
        RateEntry::flat(dec!(312.24), dec!(3.1751))
            .with_demand(DemandCharge::Flat { rate: dec!(221.50) })
    }

    fn large_tod_rate() -> RateEntry {
        RateEntry::flat(dec!(312.24), dec!(3.1751)).with_demand(DemandCharge::TimeOfDay {
            on_peak_rate: dec!(332.71),
            partial_peak_rate: dec!(68.22),
            off_peak_rate: dec!(0),
        })
    }

    #[test]
    fn test_type2_tou_reference_bill() {
        let usage = UsageReading::time_of_use(dec!(300), dec!(700));
        let bill = compute_bill(
            CustomerTier::Type2,
            TariffStructure::Tou,
            &small_tou_rate(),
            &usage,
            &BillingParameters::new(dec!(0)),
        )
        .unwrap();

        let bill = bill.as_simple().unwrap();
        // 300 * 5.7982 + 700 * 2.6369 = 3585.29, plus 33.29 service
        assert_eq!(bill.energy_charge, dec!(3585.29));
        assert_eq!(bill.base_tariff, dec!(3618.58));
        assert_eq!(bill.fuel_adjustment_charge, dec!(0));
        assert_eq!(bill.vat, dec!(253.3006));
        assert_eq!(bill.total_bill, dec!(3871.8806));
    }

    #[test]
    fn test_type2_with_fuel_adjustment() {
        let usage = UsageReading::time_of_use(dec!(300), dec!(700));
        let bill = compute_bill(
            CustomerTier::Type2,
            TariffStructure::Tou,
            &small_tou_rate(),
            &usage,
            &BillingParameters::new(dec!(39.72)),
        )
        .unwrap();

        let bill = bill.as_simple().unwrap();
        // 1000 kWh * 0.3972
        assert_eq!(bill.fuel_adjustment_charge, dec!(397.2));
        // (3618.58 + 397.2) * 0.07
        assert_eq!(bill.vat, dec!(281.1046));
        assert_eq!(bill.total_bill, dec!(4296.8846));
    }

    #[test]
    fn test_type2_progressive_rounding() {
        let rate = RateEntry::tiered(
            dec!(33.29),
            vec![
                EnergyTier::new(dec!(0), dec!(3.2484)),
                EnergyTier::new(dec!(150), dec!(4.2218)),
                EnergyTier::new(dec!(400), dec!(4.4217)),
            ],
        );
        let bill = compute_bill(
            CustomerTier::Type2,
            TariffStructure::Normal,
            &rate,
            &UsageReading::energy_only(dec!(151)),
            &BillingParameters::new(dec!(0)),
        )
        .unwrap();

        // 491.4818 rounds to 3 places
        assert_eq!(bill.energy_charge(), dec!(491.482));
        assert_eq!(bill.as_simple().unwrap().base_tariff, dec!(524.772));
    }

    #[test]
    fn test_type3_normal_full_bill() {
        let usage = UsageReading::with_peak(dec!(1500), dec!(75));
        let params = BillingParameters::new(dec!(39.72))
            .with_peak_kvar(dec!(60))
            .with_highest_demand_charge(dec!(10000));

        let bill = compute_bill(
            CustomerTier::Type3,
            TariffStructure::Normal,
            &medium_normal_rate(),
            &usage,
            &params,
        )
        .unwrap();
        let bill = bill.as_full().unwrap();

        assert_eq!(bill.calculated_demand_charge, dec!(16612.5));
        assert_eq!(bill.energy_charge, dec!(4762.65));
        assert_eq!(bill.effective_demand_charge, dec!(16612.5));
        assert_eq!(bill.power_factor_charge, dec!(784.98));
        assert_eq!(bill.service_charge, dec!(312.24));
        assert_eq!(bill.fuel_adjustment_charge, dec!(595.8));
        assert_eq!(bill.base_subtotal(), dec!(22472.37));
        assert_eq!(bill.subtotal, dec!(23068.17));
        assert_eq!(bill.vat, dec!(1614.7719));
        assert_eq!(bill.grand_total, dec!(24682.9419));
        assert_eq!(bill.grand_total, bill.subtotal + bill.vat);
    }

    #[test]
    fn test_subtotal_sums_unrounded_items() {
        // 75.3 kW * 221.50 = 16678.95, shown as 16679.0
        let usage = UsageReading::with_peak(dec!(1500), dec!(75.3));
        let params = BillingParameters::new(dec!(39.72))
            .with_peak_kvar(dec!(60))
            .with_highest_demand_charge(dec!(10000));

        let bill = compute_bill(
            CustomerTier::Type3,
            TariffStructure::Normal,
            &medium_normal_rate(),
            &usage,
            &params,
        )
        .unwrap();
        let bill = bill.as_full().unwrap();

        assert_eq!(bill.calculated_demand_charge, dec!(16679.0));
        assert_eq!(bill.effective_demand_charge, dec!(16679.0));
        // 60 - 75.3 * 0.6197 = 13.33659 -> 13 kVAR
        assert_eq!(bill.power_factor_charge, dec!(728.91));
        // 16678.95 + 4762.65 + 728.91 + 312.24 + 595.8, not 23078.6
        assert_eq!(bill.subtotal, dec!(23078.55));
        assert_eq!(bill.vat, dec!(1615.4985));
        assert_eq!(bill.grand_total, dec!(24694.0485));
        assert_eq!(bill.vat, bill.subtotal * VAT_RATE);
    }

    #[test]
    fn test_type4_tod_bill() {
        let usage = UsageReading::energy_only(dec!(50000))
            .with_on_peak_kw(dec!(100))
            .with_partial_peak_kw(dec!(80))
            .with_off_peak_kw(dec!(120));
        let params = BillingParameters::new(dec!(0)).with_peak_kvar(dec!(80));

        let bill = compute_bill(
            CustomerTier::Type4,
            TariffStructure::Tod,
            &large_tod_rate(),
            &usage,
            &params,
        )
        .unwrap();
        let bill = bill.as_full().unwrap();

        assert_eq!(bill.calculated_demand_charge, dec!(38728.6));
        assert_eq!(bill.energy_charge, dec!(158755));
        // Overall peak is the 120 kW off-peak reading: 80 - 74.364 -> 6 kVAR
        assert_eq!(bill.power_factor_charge, dec!(336.42));
        assert_eq!(bill.subtotal, dec!(198132.26));
        assert_eq!(bill.vat, dec!(13869.2582));
        assert_eq!(bill.grand_total, dec!(212001.5182));
    }

    #[test]
    fn test_minimum_bill_floor_applies() {
        let usage = UsageReading::with_peak(dec!(1000), dec!(10));
        let params = BillingParameters::new(dec!(0)).with_highest_demand_charge(dec!(100000));

        let bill = compute_bill(
            CustomerTier::Type3,
            TariffStructure::Normal,
            &medium_normal_rate(),
            &usage,
            &params,
        )
        .unwrap();
        let bill = bill.as_full().unwrap();

        assert_eq!(bill.calculated_demand_charge, dec!(2215));
        assert_eq!(bill.effective_demand_charge, dec!(70000));
        assert!(bill.floor_applied());
    }

    #[test]
    fn test_tou_fuel_adjustment_uses_periods() {
        let rate = RateEntry::time_of_use(dec!(312.24), dec!(4.3297), dec!(2.6369))
            .with_demand(DemandCharge::TimeOfUse { rate: dec!(210.00) });
        let mut usage = UsageReading::time_of_use(dec!(1000), dec!(2000)).with_on_peak_kw(dec!(50));
        // A stale total must not leak into Ft
        usage.total_kwh = dec!(9999);

        let bill = compute_bill(
            CustomerTier::Type5,
            TariffStructure::Tou,
            &rate,
            &usage,
            &BillingParameters::new(dec!(10)),
        )
        .unwrap();

        // 3000 kWh * 0.10
        assert_eq!(bill.fuel_adjustment_charge(), dec!(300));
    }

    #[test]
    fn test_type4_rejects_normal() {
        let err = compute_bill(
            CustomerTier::Type4,
            TariffStructure::Normal,
            &medium_normal_rate(),
            &UsageReading::with_peak(dec!(1500), dec!(75)),
            &BillingParameters::default(),
        )
        .unwrap_err();

        assert!(matches!(err, BillingError::Validation(_)));
        let message = err.to_string();
        assert!(message.contains("Type 4"));
        assert!(message.contains("normal"));
    }

    #[test]
    fn test_negative_input_rejected() {
        let usage = UsageReading::with_peak(dec!(1500), dec!(-1));
        let err = compute_bill(
            CustomerTier::Type3,
            TariffStructure::Normal,
            &medium_normal_rate(),
            &usage,
            &BillingParameters::new(dec!(-5)),
        )
        .unwrap_err();

        let BillingError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert!(errors.has_field("usage.peak_kw"));
        assert!(errors.has_field("ft_rate_satang"));
    }

    #[test]
    fn test_oversized_input_rejected() {
        let usage = UsageReading::energy_only(dec!(70000000000000000000000000000));
        let err = compute_bill(
            CustomerTier::Type2,
            TariffStructure::Normal,
            &RateEntry::flat(dec!(33.29), dec!(3.9086)),
            &usage,
            &BillingParameters::new(dec!(39.72)),
        )
        .unwrap_err();

        let BillingError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert!(errors.has_field("usage.total_kwh"));
        assert!(!errors.has_field("ft_rate_satang"));
    }

    #[test]
    fn test_largest_accepted_input_computes() {
        let usage = UsageReading::with_peak(MAX_INPUT_VALUE, MAX_INPUT_VALUE);
        let params = BillingParameters::new(MAX_INPUT_VALUE)
            .with_peak_kvar(MAX_INPUT_VALUE)
            .with_highest_demand_charge(MAX_INPUT_VALUE);

        let bill = compute_bill(
            CustomerTier::Type3,
            TariffStructure::Normal,
            &medium_normal_rate(),
            &usage,
            &params,
        )
        .unwrap();
        assert!(bill.total() > MAX_INPUT_VALUE);
    }

    #[test]
    fn test_mismatched_rate_is_configuration_error() {
        let err = compute_bill(
            CustomerTier::Type3,
            TariffStructure::Tou,
            &medium_normal_rate(),
            &UsageReading::time_of_use(dec!(1), dec!(1)).with_on_peak_kw(dec!(1)),
            &BillingParameters::default(),
        )
        .unwrap_err();
        assert!(matches!(err, BillingError::Configuration(_)));
    }

    #[test]
    fn test_deterministic() {
        let usage = UsageReading::with_peak(dec!(1500), dec!(75));
        let params = BillingParameters::new(dec!(39.72)).with_peak_kvar(dec!(60));
        let run = || {
            compute_bill(
                CustomerTier::Type3,
                TariffStructure::Normal,
                &medium_normal_rate(),
                &usage,
                &params,
            )
            .unwrap()
        };
        assert_eq!(run(), run());
    }
}
