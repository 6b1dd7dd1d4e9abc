//! Field requirements and normalization of raw usage and parameters
//!
//! | tier | structure | required usage fields                               |
//! |------|-----------|-----------------------------------------------------|
//! | 2    | normal    | total_kwh                                           |
//! | 2    | tou       | on_peak_kwh, off_peak_kwh                           |
//! | 3, 5 | normal    | total_kwh, peak_kw                                  |
//! | 3, 5 | tou       | on_peak_kwh, off_peak_kwh, on_peak_kw               |
//! | 4    | tod       | total_kwh, on_peak_kw, partial_peak_kw, off_peak_kw |
//! | 4    | tou       | on_peak_kwh, off_peak_kwh, on_peak_kw               |
//!
//! `total_kwh` is satisfied by an on/off-peak split and `peak_kw` by any
//! period demand reading.

use std::collections::HashMap;

use faifa_common::{
    BillingParameters, CustomerTier, TariffStructure, UsageReading, ValidationErrors,
};
use rust_decimal::Decimal;

use super::raw::{coerce_non_negative, RawBillingParameters, RawUsage};

/// Usage fields that must be supplied for a tier/structure pair
pub fn required_usage_fields(
    tier: CustomerTier,
    structure: TariffStructure,
) -> &'static [&'static str] {
    use CustomerTier::*;
    use TariffStructure::*;

    match (tier, structure) {
        (Type2, Normal) => &["total_kwh"],
        (Type2, Tou) => &["on_peak_kwh", "off_peak_kwh"],
        (Type3 | Type5, Normal) => &["total_kwh", "peak_kw"],
        (Type3 | Type4 | Type5, Tou) => &["on_peak_kwh", "off_peak_kwh", "on_peak_kw"],
        (Type4, Tod) => &["total_kwh", "on_peak_kw", "partial_peak_kw", "off_peak_kw"],
        // Rejected before requirements are consulted
        (Type4, Normal) | (Type2 | Type3 | Type5, Tod) => &[],
    }
}

/// Parameters that must be supplied for a tier
pub fn required_parameters(tier: CustomerTier) -> &'static [&'static str] {
    if tier.has_demand_charge() {
        &["ft_rate_satang", "peak_kvar", "highest_demand_charge"]
    } else {
        &["ft_rate_satang"]
    }
}

/// Coerce every present field, recording failures under `prefix.field`
fn coerce_fields<'a>(
    fields: impl IntoIterator<Item = (&'static str, Option<&'a serde_json::Value>)>,
    prefix: &str,
    errors: &mut ValidationErrors,
) -> HashMap<&'static str, Option<Decimal>> {
    let mut values = HashMap::new();

    for (name, raw) in fields {
        let Some(raw) = raw else { continue };
        match coerce_non_negative(raw) {
            Ok(value) => {
                values.insert(name, value);
            }
            Err(message) => {
                errors.push(format!("{}{}", prefix, name), message);
                // Present but invalid: not also reported as missing
                values.insert(name, None);
            }
        }
    }

    values
}

/// Check numeric fields of a usage payload without knowing the tariff
pub fn check_usage_numbers(raw: &RawUsage) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    coerce_fields(raw.fields(), "usage.", &mut errors);
    errors
}

/// Check numeric fields of a parameter payload without knowing the tariff
pub fn check_parameter_numbers(raw: &RawBillingParameters) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    coerce_fields(raw.fields(), "", &mut errors);
    errors
}

/// Validate a raw reading against the tier/structure requirements and fill
/// in the derived fields.
pub fn normalize_usage(
    tier: CustomerTier,
    structure: TariffStructure,
    raw: &RawUsage,
) -> Result<UsageReading, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let values = coerce_fields(raw.fields(), "usage.", &mut errors);
    let get = |name: &str| values.get(name).copied().flatten();

    let on_peak_kwh = get("on_peak_kwh");
    let off_peak_kwh = get("off_peak_kwh");
    let total_kwh = get("total_kwh").or(match (on_peak_kwh, off_peak_kwh) {
        (Some(on), Some(off)) => Some(on + off),
        _ => None,
    });

    let demand_readings = [
        get("peak_kw"),
        get("on_peak_kw"),
        get("off_peak_kw"),
        get("partial_peak_kw"),
    ];
    let overall_peak_kw = demand_readings.into_iter().flatten().max();

    for &field in required_usage_fields(tier, structure) {
        if values.contains_key(field) {
            continue;
        }
        let derived = match field {
            "total_kwh" => total_kwh.is_some(),
            "peak_kw" => overall_peak_kw.is_some(),
            _ => false,
        };
        if !derived {
            errors.push(
                format!("usage.{}", field),
                format!("is required for {} '{}' billing", tier, structure),
            );
        }
    }

    errors.into_result()?;

    Ok(UsageReading {
        total_kwh: total_kwh.unwrap_or(Decimal::ZERO),
        on_peak_kwh,
        off_peak_kwh,
        overall_peak_kw: overall_peak_kw.unwrap_or(Decimal::ZERO),
        on_peak_kw: get("on_peak_kw"),
        off_peak_kw: get("off_peak_kw"),
        partial_peak_kw: get("partial_peak_kw"),
    })
}

/// Validate raw billing parameters for a tier
pub fn normalize_parameters(
    tier: CustomerTier,
    raw: &RawBillingParameters,
) -> Result<BillingParameters, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let values = coerce_fields(raw.fields(), "", &mut errors);
    let get = |name: &str| values.get(name).copied().flatten();

    for &field in required_parameters(tier) {
        if !values.contains_key(field) {
            errors.push(field, format!("is required for {} billing", tier));
        }
    }

    errors.into_result()?;

    Ok(BillingParameters {
        ft_rate_satang: get("ft_rate_satang").unwrap_or(Decimal::ZERO),
        peak_kvar: get("peak_kvar").unwrap_or(Decimal::ZERO),
        highest_demand_charge: get("highest_demand_charge").unwrap_or(Decimal::ZERO),
    })
}
