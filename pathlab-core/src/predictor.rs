//! Return prediction seam.
//!
//! The pipeline consumes a trained regression model only through the
//! [`ReturnModel`] contract: a panel in, one log-return per row out. The
//! model is fitted, loaded, and owned elsewhere; it is injected into the
//! orchestrator at construction and never mutated afterwards, so one
//! instance is safely shared across concurrent requests.
//!
//! When no model is configured the orchestrator falls back to the synthetic
//! generator (see [`crate::synthetic`]) and records that in provenance.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::panel::FeaturePanel;

/// An already-fitted model that predicts daily log-returns from the panel.
pub trait ReturnModel: Send + Sync {
    /// Predict one log-return per panel row, aligned by position.
    fn predict(&self, panel: &FeaturePanel) -> Result<Vec<f64>, PredictionError>;
}

/// Failure inside a trained model. Surfaced as an internal (500-equivalent)
/// error; the request is never retried automatically.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct PredictionError {
    message: String,
}

impl PredictionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// Which predictor produced the returns. Recorded in provenance so a
/// degraded (synthetic) simulation is never silent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictorKind {
    TrainedModel,
    SyntheticFallback,
}
