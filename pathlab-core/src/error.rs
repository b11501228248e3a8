//! Error taxonomy for the simulation pipeline.
//!
//! Two tiers, mirroring how failures surface to callers:
//! - [`ValidationError`] — the caller sent something unusable. Every variant
//!   names the offending field so the message can go straight into a 400
//!   response. Never retried internally.
//! - [`SimError`] — the top-level pipeline error: validation, predictor
//!   failure, or an unexpected internal inconsistency.
//!
//! An event whose date falls outside the generated calendar is NOT an error;
//! it is recorded as an unresolved warning on the event report and the
//! simulation proceeds.

use thiserror::Error;

use crate::predictor::PredictionError;

/// Client-caused, recoverable-by-the-caller failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("missing required company fields: {}", .0.join(", "))]
    MissingCompanyFields(Vec<&'static str>),

    #[error("horizon must be between 1 and {max}, got {got}")]
    HorizonOutOfRange { got: i64, max: i64 },

    #[error("{field} must be a positive finite number, got {value}")]
    NotPositive { field: &'static str, value: f64 },

    #[error("unknown control '{0}'")]
    UnknownControl(String),

    #[error("control '{control}' length {got} != horizon {expected}")]
    ControlLengthMismatch {
        control: String,
        got: usize,
        expected: usize,
    },

    #[error("control '{control}' expects a {expected} scalar or per-day array")]
    ControlTypeMismatch {
        control: String,
        expected: &'static str,
    },

    #[error("unknown event field '{0}'")]
    UnknownEventField(String),

    #[error("event field '{field}' expects a {expected} value")]
    EventTypeMismatch {
        field: String,
        expected: &'static str,
    },
}

/// Top-level pipeline error.
#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("prediction failed: {0}")]
    Prediction(#[from] PredictionError),

    #[error("internal simulation error: {0}")]
    Internal(String),
}

impl SimError {
    /// True when the failure maps to a client error (400-equivalent).
    pub fn is_validation(&self) -> bool {
        matches!(self, SimError::Validation(_))
    }
}
