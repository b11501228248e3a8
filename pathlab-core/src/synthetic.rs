//! Synthetic return generation — the fallback when no trained model is
//! configured.
//!
//! Heuristic, not calibrated: each day draws a base return from
//! Normal(0, base_vol) and stacks additive adjustments from the panel row on
//! top. Exactly one normal draw is consumed per row regardless of the row's
//! content, so overriding a single cell shifts that day's return by exactly
//! the cell's additive term while every other day is unchanged.

use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};

use crate::error::SimError;
use crate::panel::{FeaturePanel, PanelRow};

/// Additive impact of an earnings announcement flag (scaled by the flag).
pub const EARNINGS_IMPACT: f64 = 0.05;
/// Additive impact per unit of analyst rating change.
pub const ANALYST_IMPACT: f64 = 0.03;
/// Additive impact of a recognized positive/negative news label.
pub const NEWS_IMPACT: f64 = 0.025;
/// Additive impact of insider activity.
pub const INSIDER_IMPACT: f64 = 0.02;
/// Scale applied to (sentiment − 0.5).
pub const SENTIMENT_SCALE: f64 = 0.02;

/// Panel columns the generator actually reads; reported as the features used
/// when the synthetic fallback runs.
pub const SYNTHETIC_FEATURES: &[&str] = &[
    "earnings_announcement",
    "analyst_rating_change",
    "predefined_global_shock",
    "major_news",
    "insider_activity",
    "overall_market_sentiment",
];

/// Fixed magnitude of a recognized global shock; unrecognized labels
/// contribute nothing.
fn shock_impact(label: &str) -> f64 {
    match label {
        "geo_political" => -0.04,
        "pandemic_wave" => -0.06,
        "commodity_spike" => -0.03,
        "policy_rate_shock" => -0.02,
        "credit_event" => -0.05,
        _ => 0.0,
    }
}

fn news_impact(label: &str) -> f64 {
    match label {
        "none" => 0.0,
        "contract-win" | "product-launch" => NEWS_IMPACT,
        _ => -NEWS_IMPACT,
    }
}

fn insider_impact(label: &str) -> f64 {
    match label {
        "none" => 0.0,
        "promoter-buying" => INSIDER_IMPACT,
        _ => -INSIDER_IMPACT,
    }
}

/// The deterministic (non-random) part of a day's synthetic return.
fn adjustments(row: &PanelRow) -> f64 {
    row.earnings_announcement * EARNINGS_IMPACT
        + row.analyst_rating_change * ANALYST_IMPACT
        + shock_impact(&row.predefined_global_shock)
        + news_impact(&row.major_news)
        + insider_impact(&row.insider_activity)
        + (row.overall_market_sentiment - 0.5) * SENTIMENT_SCALE
}

/// Generates one synthetic log-return per panel row.
///
/// Deterministic for a given (panel, base_vol, rng state): the caller seeds
/// the rng, usually through [`crate::rng::SimulationRng`].
pub fn synthesize_returns(
    panel: &FeaturePanel,
    base_vol: f64,
    rng: &mut StdRng,
) -> Result<Vec<f64>, SimError> {
    let normal = Normal::new(0.0, base_vol)
        .map_err(|e| SimError::Internal(format!("bad base_vol {base_vol}: {e}")))?;

    Ok(panel
        .rows()
        .iter()
        .map(|row| normal.sample(rng) + adjustments(row))
        .collect())
}
