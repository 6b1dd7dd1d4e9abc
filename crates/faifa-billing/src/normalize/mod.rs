//! Input normalization and validation
//!
//! Turns loosely-typed request data into a [`BillingInput`] the engine can
//! trust, or a [`faifa_common::ValidationErrors`] naming every bad field.

pub mod raw;
pub mod request;
pub mod validator;

pub use raw::{coerce_non_negative, RawBillingParameters, RawUsage};
pub use request::{validate_request, BillRequest, BillingInput};
pub use validator::{normalize_parameters, normalize_usage, required_usage_fields};
