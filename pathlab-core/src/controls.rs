//! Scenario control registry and value resolution.
//!
//! A control is either numeric or categorical, supplied by the caller as a
//! scalar (broadcast across the horizon) or as a per-day array whose length
//! must equal the horizon exactly. Unrecognized control names are rejected so
//! a typo cannot silently fall back to a default.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A numeric control with its default and the advisory range exposed through
/// the control catalog. The range is a client-side form-validation aid; the
/// pipeline does not clamp or reject out-of-range values.
#[derive(Debug, Clone, Copy)]
pub struct NumericControlSpec {
    pub name: &'static str,
    pub default: f64,
    pub min: f64,
    pub max: f64,
}

/// A categorical control with its default and the labels the pipeline
/// assigns meaning to.
#[derive(Debug, Clone, Copy)]
pub struct CategoricalControlSpec {
    pub name: &'static str,
    pub default: &'static str,
    pub allowed: &'static [&'static str],
}

pub const NUMERIC_CONTROLS: &[NumericControlSpec] = &[
    NumericControlSpec { name: "overall_market_sentiment", default: 0.0, min: -1.0, max: 1.0 },
    NumericControlSpec { name: "fii_flows", default: 0.0, min: -2000.0, max: 2000.0 },
    NumericControlSpec { name: "dii_flows", default: 0.0, min: -1000.0, max: 1000.0 },
    NumericControlSpec { name: "global_market_cues", default: 0.0, min: -1.0, max: 1.0 },
    NumericControlSpec { name: "inr_usd_delta", default: 0.0, min: -0.05, max: 0.05 },
    NumericControlSpec { name: "crude_oil_delta", default: 0.0, min: -0.1, max: 0.1 },
    NumericControlSpec { name: "earnings_announcement", default: 0.0, min: 0.0, max: 1.0 },
    NumericControlSpec { name: "analyst_rating_change", default: 0.0, min: -2.0, max: 2.0 },
];

pub const CATEGORICAL_CONTROLS: &[CategoricalControlSpec] = &[
    CategoricalControlSpec {
        name: "major_news",
        default: "none",
        allowed: &["none", "contract-win", "product-launch", "ceo-resigns", "regulatory-fine"],
    },
    CategoricalControlSpec {
        name: "insider_activity",
        default: "none",
        allowed: &["none", "promoter-buying", "promoter-selling"],
    },
    CategoricalControlSpec {
        name: "predefined_global_shock",
        default: "none",
        allowed: &[
            "none",
            "geo_political",
            "pandemic_wave",
            "commodity_spike",
            "policy_rate_shock",
            "credit_event",
        ],
    },
];

/// A caller-supplied control value: scalar or per-day series, numeric or
/// categorical. Untagged so JSON/TOML scalars and arrays map directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ControlValue {
    Number(f64),
    Text(String),
    NumberSeries(Vec<f64>),
    TextSeries(Vec<String>),
}

/// The controls section of a request, keyed by control name.
pub type ControlSet = BTreeMap<String, ControlValue>;

/// Rejects control names that belong to neither registry.
pub fn validate_control_names(controls: &ControlSet) -> Result<(), ValidationError> {
    for name in controls.keys() {
        let known = NUMERIC_CONTROLS.iter().any(|c| c.name == name)
            || CATEGORICAL_CONTROLS.iter().any(|c| c.name == name);
        if !known {
            return Err(ValidationError::UnknownControl(name.clone()));
        }
    }
    Ok(())
}

/// Resolves a numeric control to exactly `n` per-day values.
///
/// Missing → the default, broadcast. Scalar → broadcast. Series → length must
/// equal `n` (no truncation or padding).
pub fn resolve_numeric(
    spec: &NumericControlSpec,
    value: Option<&ControlValue>,
    n: usize,
) -> Result<Vec<f64>, ValidationError> {
    match value {
        None => Ok(vec![spec.default; n]),
        Some(ControlValue::Number(x)) => Ok(vec![*x; n]),
        Some(ControlValue::NumberSeries(xs)) => {
            if xs.len() != n {
                return Err(ValidationError::ControlLengthMismatch {
                    control: spec.name.to_string(),
                    got: xs.len(),
                    expected: n,
                });
            }
            Ok(xs.clone())
        }
        Some(_) => Err(ValidationError::ControlTypeMismatch {
            control: spec.name.to_string(),
            expected: "numeric",
        }),
    }
}

/// Resolves a categorical control to exactly `n` per-day labels.
pub fn resolve_categorical(
    spec: &CategoricalControlSpec,
    value: Option<&ControlValue>,
    n: usize,
) -> Result<Vec<String>, ValidationError> {
    match value {
        None => Ok(vec![spec.default.to_string(); n]),
        Some(ControlValue::Text(s)) => Ok(vec![s.clone(); n]),
        Some(ControlValue::TextSeries(xs)) => {
            if xs.len() != n {
                return Err(ValidationError::ControlLengthMismatch {
                    control: spec.name.to_string(),
                    got: xs.len(),
                    expected: n,
                });
            }
            Ok(xs.clone())
        }
        Some(_) => Err(ValidationError::ControlTypeMismatch {
            control: spec.name.to_string(),
            expected: "categorical",
        }),
    }
}

// ─── Control catalog ─────────────────────────────────────────────────

/// Serializable view of the registry, served by the read-only catalog
/// endpoint for client-side form validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlCatalog {
    pub numeric: BTreeMap<String, NumericRange>,
    pub categorical: BTreeMap<String, CategoricalOptions>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NumericRange {
    pub min: f64,
    pub max: f64,
    pub default: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoricalOptions {
    pub allowed: Vec<String>,
    pub default: String,
}

impl ControlCatalog {
    pub fn new() -> Self {
        let numeric = NUMERIC_CONTROLS
            .iter()
            .map(|c| {
                (
                    c.name.to_string(),
                    NumericRange { min: c.min, max: c.max, default: c.default },
                )
            })
            .collect();
        let categorical = CATEGORICAL_CONTROLS
            .iter()
            .map(|c| {
                (
                    c.name.to_string(),
                    CategoricalOptions {
                        allowed: c.allowed.iter().map(|s| s.to_string()).collect(),
                        default: c.default.to_string(),
                    },
                )
            })
            .collect();
        Self { numeric, categorical }
    }
}

impl Default for ControlCatalog {
    fn default() -> Self {
        Self::new()
    }
}
