//! Error types for the Fleet Estimator.

use thiserror::Error;

/// Errors produced while validating inputs or evaluating an estimate.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EstimateError {
    #[error("invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    #[error("unknown vehicle type: {0:?} (expected sedan, van or truck)")]
    UnknownVehicleType(String),

    #[error("unknown operation type: {0:?} (expected relaxed, intermediate or intensive)")]
    UnknownOperationType(String),

    #[error("payback not achievable: monthly savings are {monthly_savings}")]
    PaybackNotAchievable { monthly_savings: i64 },

    #[error("{field} evaluated to a non-finite number")]
    NonFinite { field: &'static str },
}

impl EstimateError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        EstimateError::InvalidInput {
            field,
            reason: reason.into(),
        }
    }

    /// Whether the error was caused by the caller's input rather than
    /// by the computation itself.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            EstimateError::InvalidInput { .. }
                | EstimateError::UnknownVehicleType(_)
                | EstimateError::UnknownOperationType(_)
        )
    }
}

/// Errors produced while decoding a result token.
#[derive(Error, Debug)]
pub enum TokenError {
    #[error("result token base64 decode failed: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("result token JSON decode failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors produced while turning a contact request into a stored row.
#[derive(Error, Debug)]
pub enum ContactError {
    #[error("Missing required contact information")]
    MissingRequired,

    #[error("preliminary data could not be serialized: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors reported by a contact store backend.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("contact store unavailable: {0}")]
    Unavailable(String),

    #[error("contact store rejected the submission: {0}")]
    Rejected(String),
}
