//! Feature panel construction.
//!
//! The panel is the per-day table consumed by the return predictor: one row
//! per trading day, date first, then the resolved control values, then the
//! company metadata repeated on every row.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::business_days;
use crate::controls::{
    resolve_categorical, resolve_numeric, validate_control_names, ControlSet,
    CATEGORICAL_CONTROLS, NUMERIC_CONTROLS,
};
use crate::domain::CompanyMeta;
use crate::error::ValidationError;

/// The feature columns a trained model consumes, in pipeline order.
pub const FEATURE_COLUMNS: &[&str] = &[
    "overall_market_sentiment",
    "fii_flows",
    "dii_flows",
    "global_market_cues",
    "inr_usd_delta",
    "crude_oil_delta",
    "earnings_announcement",
    "analyst_rating_change",
    "sector",
    "market_cap_bucket",
    "major_news",
    "insider_activity",
    "predefined_global_shock",
];

/// Total number of columns in a panel row: date + the thirteen feature
/// columns + company_id, ticker, company_name, company_size.
pub const COLUMN_COUNT: usize = 1 + FEATURE_COLUMNS.len() + 4;

/// One day of the feature panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelRow {
    pub date: NaiveDate,

    // Numeric controls
    pub overall_market_sentiment: f64,
    pub fii_flows: f64,
    pub dii_flows: f64,
    pub global_market_cues: f64,
    pub inr_usd_delta: f64,
    pub crude_oil_delta: f64,
    pub earnings_announcement: f64,
    pub analyst_rating_change: f64,

    // Categorical controls
    pub major_news: String,
    pub insider_activity: String,
    pub predefined_global_shock: String,

    // Company metadata, identical on every row
    pub sector: String,
    pub market_cap_bucket: String,
    pub company_id: String,
    pub ticker: String,
    pub company_name: String,
    pub company_size: f64,
}

/// The per-day feature table. Invariants: row count equals the horizon, rows
/// are date-ordered ascending, company metadata is identical across rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeaturePanel {
    rows: Vec<PanelRow>,
}

impl FeaturePanel {
    pub fn rows(&self) -> &[PanelRow] {
        &self.rows
    }

    pub(crate) fn rows_mut(&mut self) -> &mut [PanelRow] {
        &mut self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.rows.iter().map(|r| r.date).collect()
    }

    pub fn column_count(&self) -> usize {
        COLUMN_COUNT
    }
}

/// Builds the feature panel for a scenario.
///
/// Computes the trading calendar, resolves every registered control
/// (scalar broadcast, or per-day series of exactly `horizon` entries), and
/// repeats the company metadata across all rows.
///
/// # Errors
/// Validation errors for an out-of-range horizon, an unrecognized control
/// name, a series whose length differs from the horizon, or a control value
/// of the wrong kind.
pub fn build_panel(
    meta: &CompanyMeta,
    start_date: NaiveDate,
    horizon: i64,
    controls: &ControlSet,
) -> Result<FeaturePanel, ValidationError> {
    let dates = business_days(start_date, horizon)?;
    let n = dates.len();

    validate_control_names(controls)?;

    let mut numeric: Vec<Vec<f64>> = Vec::with_capacity(NUMERIC_CONTROLS.len());
    for spec in NUMERIC_CONTROLS {
        numeric.push(resolve_numeric(spec, controls.get(spec.name), n)?);
    }
    let mut categorical: Vec<Vec<String>> = Vec::with_capacity(CATEGORICAL_CONTROLS.len());
    for spec in CATEGORICAL_CONTROLS {
        categorical.push(resolve_categorical(spec, controls.get(spec.name), n)?);
    }

    let company_id = meta.resolved_company_id().to_string();
    let company_size = meta.company_size.unwrap_or_default();

    let rows = dates
        .into_iter()
        .enumerate()
        .map(|(i, date)| PanelRow {
            date,
            overall_market_sentiment: numeric[0][i],
            fii_flows: numeric[1][i],
            dii_flows: numeric[2][i],
            global_market_cues: numeric[3][i],
            inr_usd_delta: numeric[4][i],
            crude_oil_delta: numeric[5][i],
            earnings_announcement: numeric[6][i],
            analyst_rating_change: numeric[7][i],
            major_news: categorical[0][i].clone(),
            insider_activity: categorical[1][i].clone(),
            predefined_global_shock: categorical[2][i].clone(),
            sector: meta.sector.clone(),
            market_cap_bucket: meta.market_cap_bucket.clone(),
            company_id: company_id.clone(),
            ticker: meta.ticker.clone(),
            company_name: meta.company_name.clone(),
            company_size,
        })
        .collect();

    Ok(FeaturePanel { rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::ControlValue;

    fn meta() -> CompanyMeta {
        CompanyMeta {
            company_id: None,
            company_name: "Acme Industries".into(),
            ticker: "ACME".into(),
            sector: "Industrials".into(),
            market_cap_bucket: "mid_cap".into(),
            company_size: Some(55.0),
        }
    }

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 27).unwrap()
    }

    #[test]
    fn panel_has_one_row_per_horizon_day() {
        let panel = build_panel(&meta(), start(), 10, &ControlSet::new()).unwrap();
        assert_eq!(panel.len(), 10);
        let dates = panel.dates();
        assert!(dates.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn defaults_fill_unsupplied_controls() {
        let panel = build_panel(&meta(), start(), 3, &ControlSet::new()).unwrap();
        for row in panel.rows() {
            assert_eq!(row.overall_market_sentiment, 0.0);
            assert_eq!(row.earnings_announcement, 0.0);
            assert_eq!(row.major_news, "none");
            assert_eq!(row.predefined_global_shock, "none");
        }
    }

    #[test]
    fn scalar_control_broadcasts_across_rows() {
        let mut controls = ControlSet::new();
        controls.insert("overall_market_sentiment".into(), ControlValue::Number(0.4));
        let panel = build_panel(&meta(), start(), 5, &controls).unwrap();
        assert!(panel.rows().iter().all(|r| r.overall_market_sentiment == 0.4));
    }

    #[test]
    fn per_day_series_lands_positionally() {
        let mut controls = ControlSet::new();
        controls.insert(
            "fii_flows".into(),
            ControlValue::NumberSeries(vec![100.0, 200.0, 300.0]),
        );
        let panel = build_panel(&meta(), start(), 3, &controls).unwrap();
        let flows: Vec<f64> = panel.rows().iter().map(|r| r.fii_flows).collect();
        assert_eq!(flows, vec![100.0, 200.0, 300.0]);
    }

    #[test]
    fn wrong_length_series_rejected() {
        let mut controls = ControlSet::new();
        controls.insert(
            "fii_flows".into(),
            ControlValue::NumberSeries(vec![100.0, 200.0]),
        );
        let err = build_panel(&meta(), start(), 3, &controls).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::ControlLengthMismatch { got: 2, expected: 3, .. }
        ));
    }

    #[test]
    fn unknown_control_rejected() {
        let mut controls = ControlSet::new();
        controls.insert("sentiment".into(), ControlValue::Number(0.4));
        let err = build_panel(&meta(), start(), 3, &controls).unwrap_err();
        assert_eq!(err, ValidationError::UnknownControl("sentiment".into()));
    }

    #[test]
    fn metadata_repeated_identically() {
        let panel = build_panel(&meta(), start(), 4, &ControlSet::new()).unwrap();
        for row in panel.rows() {
            assert_eq!(row.sector, "Industrials");
            assert_eq!(row.market_cap_bucket, "mid_cap");
            assert_eq!(row.company_id, "ACME"); // falls back to ticker
            assert_eq!(row.company_name, "Acme Industries");
            assert_eq!(row.company_size, 55.0);
        }
    }

    #[test]
    fn column_count_is_stable() {
        let panel = build_panel(&meta(), start(), 1, &ControlSet::new()).unwrap();
        assert_eq!(panel.column_count(), 18);
    }
}
