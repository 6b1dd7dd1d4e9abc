//! Raw, transport-shaped inputs and numeric coercion
//!
//! Fields arrive as JSON numbers or numeric strings, under snake_case or
//! camelCase names, and any of them may be missing.

use std::str::FromStr;

use faifa_common::MAX_INPUT_VALUE;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Meter reading exactly as received
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawUsage {
    #[serde(alias = "totalKwh", skip_serializing_if = "Option::is_none")]
    pub total_kwh: Option<Value>,
    #[serde(alias = "onPeakKwh", skip_serializing_if = "Option::is_none")]
    pub on_peak_kwh: Option<Value>,
    #[serde(alias = "offPeakKwh", skip_serializing_if = "Option::is_none")]
    pub off_peak_kwh: Option<Value>,
    #[serde(alias = "peakKw", skip_serializing_if = "Option::is_none")]
    pub peak_kw: Option<Value>,
    #[serde(alias = "onPeakKw", skip_serializing_if = "Option::is_none")]
    pub on_peak_kw: Option<Value>,
    #[serde(alias = "partialPeakKw", skip_serializing_if = "Option::is_none")]
    pub partial_peak_kw: Option<Value>,
    #[serde(alias = "offPeakKw", skip_serializing_if = "Option::is_none")]
    pub off_peak_kw: Option<Value>,
}

impl RawUsage {
    /// Fields paired with their request-facing names
    pub(crate) fn fields(&self) -> [(&'static str, Option<&Value>); 7] {
        [
            ("total_kwh", self.total_kwh.as_ref()),
            ("on_peak_kwh", self.on_peak_kwh.as_ref()),
            ("off_peak_kwh", self.off_peak_kwh.as_ref()),
            ("peak_kw", self.peak_kw.as_ref()),
            ("on_peak_kw", self.on_peak_kw.as_ref()),
            ("partial_peak_kw", self.partial_peak_kw.as_ref()),
            ("off_peak_kw", self.off_peak_kw.as_ref()),
        ]
    }
}

/// Billing parameters exactly as received
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawBillingParameters {
    #[serde(
        alias = "ftRateSatang",
        alias = "fuelAdjustmentRateSatang",
        skip_serializing_if = "Option::is_none"
    )]
    pub ft_rate_satang: Option<Value>,
    #[serde(
        alias = "peakKvar",
        alias = "peakReactivePowerKvar",
        skip_serializing_if = "Option::is_none"
    )]
    pub peak_kvar: Option<Value>,
    #[serde(
        alias = "highestDemandCharge",
        alias = "historicalPeakDemandCharge",
        skip_serializing_if = "Option::is_none"
    )]
    pub highest_demand_charge: Option<Value>,
}

impl RawBillingParameters {
    pub(crate) fn fields(&self) -> [(&'static str, Option<&Value>); 3] {
        [
            ("ft_rate_satang", self.ft_rate_satang.as_ref()),
            ("peak_kvar", self.peak_kvar.as_ref()),
            ("highest_demand_charge", self.highest_demand_charge.as_ref()),
        ]
    }
}

/// Read a finite decimal in `0..=MAX_INPUT_VALUE` from a JSON number or
/// numeric string.
///
/// `Ok(None)` for JSON null. The error is the message to attach to the field.
pub fn coerce_non_negative(value: &Value) -> Result<Option<Decimal>, String> {
    let parsed = match value {
        Value::Null => return Ok(None),
        Value::Number(n) => parse_decimal(&n.to_string()),
        Value::String(s) => parse_decimal(s.trim()),
        Value::Bool(_) | Value::Array(_) | Value::Object(_) => {
            return Err("must be a number".to_string())
        }
    }?;

    if parsed < Decimal::ZERO {
        return Err("must be greater than or equal to 0".to_string());
    }
    if parsed > MAX_INPUT_VALUE {
        return Err(format!("must not exceed {}", MAX_INPUT_VALUE));
    }
    Ok(Some(parsed))
}

fn parse_decimal(text: &str) -> Result<Decimal, String> {
    if text.is_empty() {
        return Err("must be a number".to_string());
    }
    if let Ok(value) = Decimal::from_str(text).or_else(|_| Decimal::from_scientific(text)) {
        return Ok(value);
    }
    match text.parse::<f64>() {
        Ok(f) if !f.is_finite() => Err("must be a finite number".to_string()),
        // Parses as a float but overflows the decimal range
        Ok(_) => Err("must be a finite number within range".to_string()),
        Err(_) => Err("must be a number".to_string()),
    }
}
