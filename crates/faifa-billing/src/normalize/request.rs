//! Request facade: raw request in, typed billing input out

use std::str::FromStr;

use faifa_common::{
    BillingError, BillingParameters, CustomerTier, Provider, RateKey, Result, TariffStructure,
    UsageReading, ValidationErrors, VoltageBand,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::raw::{RawBillingParameters, RawUsage};
use super::validator::{
    check_parameter_numbers, check_usage_numbers, normalize_parameters, normalize_usage,
};
use crate::engine::ensure_supported;

/// A billing request as it arrives from a transport
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BillRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(
        alias = "customer_type",
        alias = "customerType",
        skip_serializing_if = "Option::is_none"
    )]
    pub tier: Option<Value>,
    #[serde(
        alias = "tariff_type",
        alias = "tariffType",
        alias = "tariffStructure",
        skip_serializing_if = "Option::is_none"
    )]
    pub tariff_structure: Option<String>,
    #[serde(
        alias = "voltage_level",
        alias = "voltageLevel",
        alias = "voltageBand",
        skip_serializing_if = "Option::is_none"
    )]
    pub voltage_band: Option<String>,
    pub usage: RawUsage,
    #[serde(flatten)]
    pub parameters: RawBillingParameters,
}

impl BillRequest {
    /// Parse a JSON request body
    pub fn from_json(body: &str) -> Result<Self> {
        serde_json::from_str(body)
            .map_err(|e| BillingError::field("request", format!("is not valid JSON: {}", e)))
    }
}

/// Validated, typed input to the billing engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingInput {
    pub key: RateKey,
    pub usage: UsageReading,
    pub params: BillingParameters,
}

impl BillingInput {
    pub fn new(key: RateKey, usage: UsageReading, params: BillingParameters) -> Self {
        Self { key, usage, params }
    }
}

fn parse_required<T: FromStr<Err = String>>(
    value: Option<&str>,
    field: &str,
    errors: &mut ValidationErrors,
) -> Option<T> {
    match value {
        None => {
            errors.push(field, "is required");
            None
        }
        Some(text) => match text.parse() {
            Ok(parsed) => Some(parsed),
            Err(message) => {
                errors.push(field, message);
                None
            }
        },
    }
}

fn parse_tier(value: Option<&Value>, errors: &mut ValidationErrors) -> Option<CustomerTier> {
    let parsed = match value {
        None | Some(Value::Null) => Err("is required".to_string()),
        Some(Value::Number(n)) => n
            .as_u64()
            .and_then(CustomerTier::from_number)
            .ok_or_else(|| format!("unknown customer type '{}', expected 2, 3, 4 or 5", n)),
        Some(Value::String(s)) => s.parse(),
        Some(_) => Err("must be a number or string".to_string()),
    };

    parsed.map_err(|message| errors.push("tier", message)).ok()
}

/// Validate every field of a request in one pass.
///
/// All field problems are reported together, except an unsupported
/// tier/structure pair, which is reported on its own.
pub fn validate_request(request: &BillRequest) -> Result<BillingInput> {
    let mut errors = ValidationErrors::new();

    let provider: Option<Provider> =
        parse_required(request.provider.as_deref(), "provider", &mut errors);
    let tier = parse_tier(request.tier.as_ref(), &mut errors);
    let structure: Option<TariffStructure> = parse_required(
        request.tariff_structure.as_deref(),
        "tariff_structure",
        &mut errors,
    );
    let voltage: Option<VoltageBand> =
        parse_required(request.voltage_band.as_deref(), "voltage_band", &mut errors);

    if let (Some(tier), Some(structure)) = (tier, structure) {
        ensure_supported(tier, structure)?;
    }

    let usage = match (tier, structure) {
        (Some(tier), Some(structure)) => normalize_usage(tier, structure, &request.usage)
            .map_err(|e| errors.extend(e))
            .ok(),
        _ => {
            errors.extend(check_usage_numbers(&request.usage));
            None
        }
    };

    let params = match tier {
        Some(tier) => normalize_parameters(tier, &request.parameters)
            .map_err(|e| errors.extend(e))
            .ok(),
        None => {
            errors.extend(check_parameter_numbers(&request.parameters));
            None
        }
    };

    match (provider, tier, structure, voltage, usage, params) {
        (Some(provider), Some(tier), Some(structure), Some(voltage), Some(usage), Some(params))
            if errors.is_empty() =>
        {
            let key = RateKey::new(provider, tier, structure, voltage);
            Ok(BillingInput::new(key, usage, params))
        }
        _ => Err(BillingError::Validation(errors)),
    }
}
