//! Company metadata supplied with a simulation request.

use serde::{Deserialize, Serialize};

/// Immutable company metadata, repeated across every row of the feature
/// panel. All fields arrive from the caller; nothing is looked up.
///
/// Fields are deserialized leniently (missing strings become empty) so the
/// orchestrator can report every missing field in one validation error
/// instead of failing on the first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyMeta {
    #[serde(default)]
    pub company_id: Option<String>,
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub ticker: String,
    #[serde(default)]
    pub sector: String,
    #[serde(default)]
    pub market_cap_bucket: String,
    #[serde(default)]
    pub company_size: Option<f64>,
}

impl CompanyMeta {
    /// Names of required fields that are absent or empty.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.company_name.is_empty() {
            missing.push("company_name");
        }
        if self.ticker.is_empty() {
            missing.push("ticker");
        }
        if self.sector.is_empty() {
            missing.push("sector");
        }
        if self.market_cap_bucket.is_empty() {
            missing.push("market_cap_bucket");
        }
        if self.company_size.is_none() {
            missing.push("company_size");
        }
        missing
    }

    /// The company identifier, falling back to the ticker when absent.
    pub fn resolved_company_id(&self) -> &str {
        self.company_id.as_deref().unwrap_or(&self.ticker)
    }

    pub fn bucket(&self) -> MarketCapBucket {
        MarketCapBucket::from_label(&self.market_cap_bucket)
    }
}

/// Market-cap bucket, parsed leniently from the caller's label
/// ("large_cap", "Large Cap", "large" all mean the same thing).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketCapBucket {
    Large,
    Mid,
    Small,
    /// Unrecognized label; gets the default base volatility.
    Other,
}

impl MarketCapBucket {
    pub fn from_label(label: &str) -> Self {
        let normalized: String = label
            .trim()
            .to_ascii_lowercase()
            .replace([' ', '-'], "_");
        match normalized.split('_').next() {
            Some("large") => MarketCapBucket::Large,
            Some("mid") => MarketCapBucket::Mid,
            Some("small") => MarketCapBucket::Small,
            _ => MarketCapBucket::Other,
        }
    }

    /// Default base daily volatility for the bucket.
    pub fn base_vol(self) -> f64 {
        match self {
            MarketCapBucket::Large => 0.010,
            MarketCapBucket::Mid => 0.015,
            MarketCapBucket::Small => 0.020,
            MarketCapBucket::Other => 0.015,
        }
    }
}
