//! Simulation orchestrator.
//!
//! Validates a scenario request, wires the pipeline stages in sequence
//! (calendar → panel → event overlay → return prediction → OHLC synthesis),
//! and assembles the result with provenance. Either a complete result is
//! produced or an error — no partial output.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::controls::ControlSet;
use crate::domain::{CompanyMeta, OhlcBar};
use crate::error::{SimError, ValidationError};
use crate::events::{apply_events, Event, UnresolvedEvent};
use crate::ohlc::synthesize_path;
use crate::panel::{build_panel, FeaturePanel, FEATURE_COLUMNS};
use crate::predictor::{PredictorKind, ReturnModel};
use crate::rng::{SimulationRng, Stage};
use crate::synthetic::{synthesize_returns, SYNTHETIC_FEATURES};

/// Horizon used when the request does not specify one.
pub const DEFAULT_HORIZON: i64 = 88;

/// How the caller supplies controls. The orchestrator treats both the same
/// way — scalars broadcast, series must match the horizon — the mode is
/// carried through to provenance for the caller's benefit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Hold,
    #[default]
    Trajectory,
}

/// A scenario simulation request.
///
/// Required fields are modeled as `Option` so the orchestrator can report
/// every omission as a named validation error rather than a decode failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimulationRequest {
    #[serde(default)]
    pub company_meta: Option<CompanyMeta>,
    #[serde(default)]
    pub last_close: Option<f64>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub horizon: Option<i64>,
    #[serde(default)]
    pub mode: Mode,
    #[serde(default)]
    pub controls: ControlSet,
    #[serde(default)]
    pub events: Vec<Event>,
    #[serde(default)]
    pub base_vol: Option<f64>,
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Provenance for one simulation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationInfo {
    pub company_name: String,
    pub ticker: String,
    pub sector: String,
    pub market_cap_bucket: String,
    pub mode: Mode,
    pub horizon: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub features_used: Vec<String>,
    pub predictor: PredictorKind,
    pub events_applied: usize,
    pub events_skipped: usize,
    pub base_vol: f64,
    pub seed: Option<u64>,
}

/// Complete output of one simulation run.
#[derive(Debug, Clone)]
pub struct SimulationResult {
    pub info: SimulationInfo,
    pub ohlc: Vec<OhlcBar>,
    pub predicted_returns: Vec<f64>,
    pub feature_panel: FeaturePanel,
    pub unresolved_events: Vec<UnresolvedEvent>,
}

/// The orchestrator. Holds the optional trained model as an immutable,
/// injected dependency; one instance is shared across requests.
pub struct Simulator {
    model: Option<Arc<dyn ReturnModel>>,
}

impl Simulator {
    /// A simulator with no trained model: every request runs the synthetic
    /// fallback (and says so in provenance).
    pub fn new() -> Self {
        Self { model: None }
    }

    pub fn with_model(model: Arc<dyn ReturnModel>) -> Self {
        Self { model: Some(model) }
    }

    pub fn model_loaded(&self) -> bool {
        self.model.is_some()
    }

    /// Runs the full pipeline for one request.
    ///
    /// # Errors
    /// [`SimError::Validation`] for client-caused problems (missing fields,
    /// bad horizon, control mismatches, unknown event fields);
    /// [`SimError::Prediction`] when the trained model fails;
    /// [`SimError::Internal`] for pipeline inconsistencies.
    pub fn simulate(&self, request: &SimulationRequest) -> Result<SimulationResult, SimError> {
        let meta = request
            .company_meta
            .as_ref()
            .ok_or(ValidationError::MissingField("company_meta"))?;
        let missing = meta.missing_fields();
        if !missing.is_empty() {
            return Err(ValidationError::MissingCompanyFields(missing).into());
        }

        let last_close = request
            .last_close
            .ok_or(ValidationError::MissingField("last_close"))?;
        if !last_close.is_finite() || last_close <= 0.0 {
            return Err(ValidationError::NotPositive {
                field: "last_close",
                value: last_close,
            }
            .into());
        }

        let start_date = request
            .start_date
            .ok_or(ValidationError::MissingField("start_date"))?;

        let horizon = request.horizon.unwrap_or(DEFAULT_HORIZON);

        let base_vol = request
            .base_vol
            .unwrap_or_else(|| meta.bucket().base_vol());
        if !base_vol.is_finite() || base_vol <= 0.0 {
            return Err(ValidationError::NotPositive {
                field: "base_vol",
                value: base_vol,
            }
            .into());
        }

        let panel = build_panel(meta, start_date, horizon, &request.controls)?;
        let overlay = apply_events(&panel, &request.events)?;
        let panel = overlay.panel;

        let rng = match request.seed {
            Some(seed) => SimulationRng::from_seed(seed),
            None => SimulationRng::from_entropy(),
        };

        let (predicted_returns, predictor, features_used) = match &self.model {
            Some(model) => {
                let returns = model.predict(&panel)?;
                if returns.len() != panel.len() {
                    return Err(SimError::Internal(format!(
                        "model returned {} predictions for {} panel rows",
                        returns.len(),
                        panel.len()
                    )));
                }
                (returns, PredictorKind::TrainedModel, FEATURE_COLUMNS)
            }
            None => {
                tracing::warn!("no trained model configured; using synthetic fallback");
                let returns =
                    synthesize_returns(&panel, base_vol, &mut rng.stage_rng(Stage::Returns))?;
                (returns, PredictorKind::SyntheticFallback, SYNTHETIC_FEATURES)
            }
        };

        let dates = panel.dates();
        let ohlc = synthesize_path(
            last_close,
            &predicted_returns,
            &dates,
            base_vol,
            &mut rng.stage_rng(Stage::Ohlc),
        )?;

        let end_date = *dates.last().expect("horizon >= 1 guarantees a last date");
        let info = SimulationInfo {
            company_name: meta.company_name.clone(),
            ticker: meta.ticker.clone(),
            sector: meta.sector.clone(),
            market_cap_bucket: meta.market_cap_bucket.clone(),
            mode: request.mode,
            horizon,
            start_date,
            end_date,
            features_used: features_used.iter().map(|s| s.to_string()).collect(),
            predictor,
            events_applied: overlay.applied,
            events_skipped: overlay.unresolved.len(),
            base_vol,
            seed: request.seed,
        };

        tracing::info!(
            ticker = %info.ticker,
            horizon = info.horizon,
            predictor = ?info.predictor,
            events_applied = info.events_applied,
            events_skipped = info.events_skipped,
            "simulation complete"
        );

        Ok(SimulationResult {
            info,
            ohlc,
            predicted_returns,
            feature_panel: panel,
            unresolved_events: overlay.unresolved,
        })
    }
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventValue;
    use crate::predictor::PredictionError;

    fn meta() -> CompanyMeta {
        CompanyMeta {
            company_id: None,
            company_name: "Acme Industries".into(),
            ticker: "ACME".into(),
            sector: "Industrials".into(),
            market_cap_bucket: "large_cap".into(),
            company_size: Some(80.0),
        }
    }

    fn request() -> SimulationRequest {
        SimulationRequest {
            company_meta: Some(meta()),
            last_close: Some(100.0),
            start_date: NaiveDate::from_ymd_opt(2025, 6, 27),
            horizon: Some(5),
            seed: Some(42),
            ..Default::default()
        }
    }

    struct ConstantModel(f64);

    impl ReturnModel for ConstantModel {
        fn predict(&self, panel: &FeaturePanel) -> Result<Vec<f64>, PredictionError> {
            Ok(vec![self.0; panel.len()])
        }
    }

    struct BrokenModel;

    impl ReturnModel for BrokenModel {
        fn predict(&self, _panel: &FeaturePanel) -> Result<Vec<f64>, PredictionError> {
            Err(PredictionError::new("weights file corrupt"))
        }
    }

    struct ShortModel;

    impl ReturnModel for ShortModel {
        fn predict(&self, panel: &FeaturePanel) -> Result<Vec<f64>, PredictionError> {
            Ok(vec![0.0; panel.len() - 1])
        }
    }

    #[test]
    fn missing_company_meta_rejected() {
        let req = SimulationRequest { company_meta: None, ..request() };
        let err = Simulator::new().simulate(&req).unwrap_err();
        assert!(matches!(
            err,
            SimError::Validation(ValidationError::MissingField("company_meta"))
        ));
    }

    #[test]
    fn empty_company_fields_listed_by_name() {
        let mut m = meta();
        m.ticker = String::new();
        m.company_size = None;
        let req = SimulationRequest { company_meta: Some(m), ..request() };
        let err = Simulator::new().simulate(&req).unwrap_err();
        match err {
            SimError::Validation(ValidationError::MissingCompanyFields(fields)) => {
                assert_eq!(fields, vec!["ticker", "company_size"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_last_close_and_start_date_rejected() {
        let req = SimulationRequest { last_close: None, ..request() };
        let err = Simulator::new().simulate(&req).unwrap_err();
        assert!(matches!(
            err,
            SimError::Validation(ValidationError::MissingField("last_close"))
        ));

        let req = SimulationRequest { start_date: None, ..request() };
        let err = Simulator::new().simulate(&req).unwrap_err();
        assert!(matches!(
            err,
            SimError::Validation(ValidationError::MissingField("start_date"))
        ));
    }

    #[test]
    fn non_positive_last_close_rejected() {
        let req = SimulationRequest { last_close: Some(0.0), ..request() };
        let err = Simulator::new().simulate(&req).unwrap_err();
        assert!(matches!(
            err,
            SimError::Validation(ValidationError::NotPositive { field: "last_close", .. })
        ));
    }

    #[test]
    fn bad_horizon_rejected() {
        for horizon in [0, -3, 100_000] {
            let req = SimulationRequest { horizon: Some(horizon), ..request() };
            let err = Simulator::new().simulate(&req).unwrap_err();
            assert!(matches!(
                err,
                SimError::Validation(ValidationError::HorizonOutOfRange { .. })
            ));
        }
    }

    #[test]
    fn horizon_defaults_to_88() {
        let req = SimulationRequest { horizon: None, ..request() };
        let result = Simulator::new().simulate(&req).unwrap();
        assert_eq!(result.info.horizon, DEFAULT_HORIZON);
        assert_eq!(result.ohlc.len(), 88);
        assert_eq!(result.feature_panel.len(), 88);
    }

    #[test]
    fn base_vol_defaults_from_bucket() {
        let result = Simulator::new().simulate(&request()).unwrap();
        assert_eq!(result.info.base_vol, 0.010); // large cap

        let mut m = meta();
        m.market_cap_bucket = "frontier".into();
        let req = SimulationRequest { company_meta: Some(m), ..request() };
        let result = Simulator::new().simulate(&req).unwrap();
        assert_eq!(result.info.base_vol, 0.015); // unrecognized bucket
    }

    #[test]
    fn explicit_base_vol_wins_and_must_be_positive() {
        let req = SimulationRequest { base_vol: Some(0.03), ..request() };
        let result = Simulator::new().simulate(&req).unwrap();
        assert_eq!(result.info.base_vol, 0.03);

        let req = SimulationRequest { base_vol: Some(-0.01), ..request() };
        let err = Simulator::new().simulate(&req).unwrap_err();
        assert!(matches!(
            err,
            SimError::Validation(ValidationError::NotPositive { field: "base_vol", .. })
        ));
    }

    #[test]
    fn synthetic_fallback_recorded_in_provenance() {
        let result = Simulator::new().simulate(&request()).unwrap();
        assert_eq!(result.info.predictor, PredictorKind::SyntheticFallback);
        assert_eq!(result.info.features_used.len(), SYNTHETIC_FEATURES.len());
        assert_eq!(result.info.seed, Some(42));
    }

    #[test]
    fn trained_model_used_when_configured() {
        let sim = Simulator::with_model(Arc::new(ConstantModel(0.01)));
        assert!(sim.model_loaded());
        let result = sim.simulate(&request()).unwrap();
        assert_eq!(result.info.predictor, PredictorKind::TrainedModel);
        assert_eq!(result.predicted_returns, vec![0.01; 5]);
        assert_eq!(result.info.features_used.len(), FEATURE_COLUMNS.len());
    }

    #[test]
    fn model_failure_is_not_a_validation_error() {
        let sim = Simulator::with_model(Arc::new(BrokenModel));
        let err = sim.simulate(&request()).unwrap_err();
        assert!(matches!(err, SimError::Prediction(_)));
        assert!(!err.is_validation());
    }

    #[test]
    fn model_length_mismatch_is_internal() {
        let sim = Simulator::with_model(Arc::new(ShortModel));
        let err = sim.simulate(&request()).unwrap_err();
        assert!(matches!(err, SimError::Internal(_)));
    }

    #[test]
    fn seeded_runs_are_bit_identical() {
        let sim = Simulator::new();
        let a = sim.simulate(&request()).unwrap();
        let b = sim.simulate(&request()).unwrap();
        assert_eq!(a.predicted_returns, b.predicted_returns);
        assert_eq!(a.ohlc, b.ohlc);
    }

    #[test]
    fn provenance_dates_and_counts() {
        let mut req = request();
        req.events = vec![
            Event {
                date: NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
                field: "earnings_announcement".into(),
                value: EventValue::Number(1.0),
            },
            Event {
                // Saturday — never a trading day
                date: NaiveDate::from_ymd_opt(2025, 7, 5).unwrap(),
                field: "major_news".into(),
                value: EventValue::Text("contract-win".into()),
            },
        ];
        let result = Simulator::new().simulate(&req).unwrap();
        assert_eq!(result.info.events_applied, 1);
        assert_eq!(result.info.events_skipped, 1);
        assert_eq!(result.unresolved_events.len(), 1);
        assert_eq!(
            result.info.start_date,
            NaiveDate::from_ymd_opt(2025, 6, 27).unwrap()
        );
        // 5 business days after Friday Jun 27: Jun 30 .. Jul 4
        assert_eq!(
            result.info.end_date,
            NaiveDate::from_ymd_opt(2025, 7, 4).unwrap()
        );
    }

    #[test]
    fn ohlc_starts_at_last_close() {
        let result = Simulator::new().simulate(&request()).unwrap();
        assert_eq!(result.ohlc[0].open, 100.0);
    }
}
