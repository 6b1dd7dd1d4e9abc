//! # Faifa Common
//!
//! Shared types and errors for the Faifa electricity billing engine.
//!
//! ## Core Types
//!
//! - [`Provider`], [`CustomerTier`], [`TariffStructure`], [`VoltageBand`]: the
//!   composite key ([`RateKey`]) that selects a rate row
//! - [`UsageReading`]: normalized meter reading for one billing period
//! - [`BillingParameters`]: Ft rate, reactive power and 12-month peak demand charge
//! - [`BillResult`]: itemized bill, [`SimpleBill`] or [`DemandBill`]
//!
//! ## Errors
//!
//! - [`BillingError::Validation`]: field-qualified input problems
//! - [`BillingError::RateNotFound`]: no rate row for the requested combination
//! - [`BillingError::Configuration`]: malformed rate table, fatal at startup

pub mod error;
pub mod types;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// Re-export commonly used types at crate root
pub use error::{BillingError, FieldError, Result, ValidationErrors};
pub use types::{
    bill::{BillPrecision, BillResult, DemandBill, SimpleBill},
    tariff::{CustomerTier, Provider, RateKey, TariffStructure, VoltageBand},
    usage::{BillingParameters, UsageReading},
};

/// Faifa version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Value added tax (7%)
pub const VAT_RATE: Decimal = dec!(0.07);

/// Share of the trailing 12-month peak demand charge billed as a minimum
pub const MINIMUM_DEMAND_RATIO: Decimal = dec!(0.70);

/// kVAR allowed per kW of peak demand before the power-factor penalty applies
pub const FREE_KVAR_PER_KW: Decimal = dec!(0.6197);

/// Penalty per excess kVAR (baht)
pub const POWER_FACTOR_RATE: Decimal = dec!(56.07);

/// Satang per baht
pub const SATANG_PER_BAHT: Decimal = dec!(100);

/// Largest meter reading or billing parameter accepted, in its own unit.
///
/// Keeps every product and sum in a bill far inside `Decimal`'s range.
pub const MAX_INPUT_VALUE: Decimal = dec!(1000000000000);
