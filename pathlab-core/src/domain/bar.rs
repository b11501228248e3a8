//! OhlcBar — one simulated trading day.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// OHLC record for a single simulated day.
///
/// Prices are unrounded f64; rounding for display is a presentation-layer
/// concern. The synthesizer guarantees `high >= max(open, close)` and
/// `low <= min(open, close)` for every bar it emits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OhlcBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl OhlcBar {
    /// OHLC ordering sanity check: finite prices, high covers the body from
    /// above, low covers it from below.
    pub fn is_sane(&self) -> bool {
        let finite = self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite();
        finite
            && self.high >= self.open.max(self.close)
            && self.low <= self.open.min(self.close)
            && self.open > 0.0
            && self.close > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bar() -> OhlcBar {
        OhlcBar {
            date: NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
            open: 100.0,
            high: 103.2,
            low: 99.1,
            close: 102.5,
        }
    }

    #[test]
    fn bar_is_sane() {
        assert!(sample_bar().is_sane());
    }

    #[test]
    fn bar_detects_high_below_body() {
        let mut bar = sample_bar();
        bar.high = 101.0; // below close
        assert!(!bar.is_sane());
    }

    #[test]
    fn bar_detects_non_finite_price() {
        let mut bar = sample_bar();
        bar.low = f64::NAN;
        assert!(!bar.is_sane());
    }

    #[test]
    fn degenerate_flat_bar_is_sane() {
        let bar = OhlcBar {
            date: NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
            open: 100.0,
            high: 100.0,
            low: 100.0,
            close: 100.0,
        };
        assert!(bar.is_sane());
    }

    #[test]
    fn bar_serialization_roundtrip() {
        let bar = sample_bar();
        let json = serde_json::to_string(&bar).unwrap();
        let deser: OhlcBar = serde_json::from_str(&json).unwrap();
        assert_eq!(bar, deser);
    }
}
