//! Request handlers. Thin: extract, call the core, map to DTOs.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use pathlab_core::controls::ControlCatalog;
use pathlab_core::sim::{SimulationInfo, SimulationRequest, Simulator};

use crate::error::ApiError;

#[derive(Debug, Serialize, Deserialize)]
pub struct SimulateResponse {
    pub status: String,
    pub simulation_info: SimulationInfo,
    pub ohlc_data: Vec<OhlcRecord>,
    pub predicted_log_returns: Vec<f64>,
    pub feature_panel_shape: PanelShape,
}

/// OHLC record as serialized to clients: prices rounded to 2 decimals.
/// Rounding is monotone, so the high/low ordering invariant survives it.
#[derive(Debug, Serialize, Deserialize)]
pub struct OhlcRecord {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PanelShape {
    pub rows: usize,
    pub columns: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model_loaded: bool,
    pub timestamp: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ControlsResponse {
    pub status: String,
    pub allowed_controls: ControlCatalog,
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Runs a scenario simulation.
///
/// # Errors
/// `400` with `{"error": ...}` for validation failures, `500` for
/// unexpected pipeline errors.
pub async fn simulate(
    State(simulator): State<Arc<Simulator>>,
    Json(request): Json<SimulationRequest>,
) -> Result<Json<SimulateResponse>, ApiError> {
    let result = simulator.simulate(&request)?;

    let ohlc_data = result
        .ohlc
        .iter()
        .map(|bar| OhlcRecord {
            date: bar.date,
            open: round2(bar.open),
            high: round2(bar.high),
            low: round2(bar.low),
            close: round2(bar.close),
        })
        .collect();

    Ok(Json(SimulateResponse {
        status: "success".to_string(),
        ohlc_data,
        predicted_log_returns: result.predicted_returns,
        feature_panel_shape: PanelShape {
            rows: result.feature_panel.len(),
            columns: result.feature_panel.column_count(),
        },
        simulation_info: result.info,
    }))
}

/// Liveness check; reports whether a trained model is configured.
pub async fn health(State(simulator): State<Arc<Simulator>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        model_loaded: simulator.model_loaded(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// Control catalog: numeric ranges and categorical enumerations for
/// client-side form validation.
pub async fn controls() -> Json<ControlsResponse> {
    Json(ControlsResponse {
        status: "success".to_string(),
        allowed_controls: ControlCatalog::new(),
    })
}
