//! Error types for the Faifa billing engine
//!
//! Provides a unified error type plus the field-qualified validation errors
//! returned by the input normalizer and the engine.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using BillingError
pub type Result<T> = std::result::Result<T, BillingError>;

/// Unified error type for billing operations
#[derive(Debug, Error)]
pub enum BillingError {
    // Input errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationErrors),

    // No rate row for the requested combination
    #[error("Rate not found: no {provider} rate for {tier}, '{structure}' tariff, voltage {voltage}")]
    RateNotFound {
        provider: String,
        tier: String,
        structure: String,
        voltage: String,
    },

    // Malformed rate table or settings, fatal at startup
    #[error("Configuration error: {0}")]
    Configuration(String),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    // Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl BillingError {
    /// Shorthand for a validation failure on a single field
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        BillingError::Validation(ValidationErrors::single(field, message))
    }

    /// Whether the caller can fix this by correcting the request.
    ///
    /// Transports map these to 4xx responses and everything else to 5xx.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            BillingError::Validation(_) | BillingError::RateNotFound { .. }
        )
    }

    /// Short stable label, used for metrics and logs
    pub fn kind(&self) -> &'static str {
        match self {
            BillingError::Validation(_) => "validation",
            BillingError::RateNotFound { .. } => "rate_not_found",
            BillingError::Configuration(_) => "configuration",
            BillingError::Serialization(_) => "serialization",
            BillingError::Internal(_) => "internal",
        }
    }
}

/// A single problem with one input field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Offending field, e.g. `usage.on_peak_kw`
    pub field: String,
    /// Human-readable reason
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Every field problem found in one validation pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.push(field, message);
        errors
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    /// Append every error from another pass
    pub fn extend(&mut self, other: ValidationErrors) {
        self.errors.extend(other.errors);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Whether any error names the given field
    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    /// Ok when nothing was collected, otherwise the collected errors
    pub fn into_result(self) -> std::result::Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .errors
            .iter()
            .map(FieldError::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&joined)
    }
}

impl std::error::Error for ValidationErrors {}

// Implement From for common external error types
impl From<serde_json::Error> for BillingError {
    fn from(err: serde_json::Error) -> Self {
        BillingError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for BillingError {
    fn from(err: std::io::Error) -> Self {
        BillingError::Configuration(err.to_string())
    }
}

impl From<config::ConfigError> for BillingError {
    fn from(err: config::ConfigError) -> Self {
        BillingError::Configuration(err.to_string())
    }
}

impl From<anyhow::Error> for BillingError {
    fn from(err: anyhow::Error) -> Self {
        BillingError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BillingError::RateNotFound {
            provider: "MEA".to_string(),
            tier: "Type 3".to_string(),
            structure: "tod".to_string(),
            voltage: "<12kV".to_string(),
        };
        assert!(err.to_string().contains("Type 3"));
        assert!(err.to_string().contains("<12kV"));
    }

    #[test]
    fn test_validation_errors_collect() {
        let mut errors = ValidationErrors::new();
        assert!(errors.clone().into_result().is_ok());

        errors.push("usage.total_kwh", "is required");
        errors.push("peak_kvar", "must be greater than or equal to 0");

        assert_eq!(errors.len(), 2);
        assert!(errors.has_field("peak_kvar"));
        assert_eq!(
            errors.to_string(),
            "usage.total_kwh: is required; peak_kvar: must be greater than or equal to 0"
        );
    }

    #[test]
    fn test_client_error_classification() {
        assert!(BillingError::field("tier", "is required").is_client_error());
        assert!(!BillingError::Configuration("bad table".into()).is_client_error());
        assert_eq!(BillingError::Internal("x".into()).kind(), "internal");
    }
}
