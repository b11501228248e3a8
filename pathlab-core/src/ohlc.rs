//! OHLC path synthesis from predicted log-returns.
//!
//! Closes chain deterministically from the returns; highs and lows widen the
//! open–close body with randomized exponential wicks scaled by an intrabar
//! volatility multiplier. No gap modeling: each day opens at the previous
//! close, and the first open is the caller's last known close.

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::Rng;
use rand_distr::{Distribution, Exp};

use crate::domain::OhlcBar;
use crate::error::SimError;

/// Wick mean as a fraction of the open–close body width.
const WICK_BODY_FRACTION: f64 = 0.3;

/// Synthesizes one OHLC bar per (date, log-return) pair.
///
/// Per day: open = previous close, close = open * exp(r), then two
/// independent exponential extras (mean `|close − open| * 0.3`, each scaled
/// by `base_vol * U[0.5, 1.5)`) widen the high and low sides. High and low
/// are clamped so `high >= max(open, close)` and `low <= min(open, close)`
/// hold unconditionally. A zero-width body yields zero extras without
/// consuming draws for them.
///
/// Deterministic for a given (inputs, rng state). Prices are unrounded.
pub fn synthesize_path(
    last_close: f64,
    returns: &[f64],
    dates: &[NaiveDate],
    base_vol: f64,
    rng: &mut StdRng,
) -> Result<Vec<OhlcBar>, SimError> {
    if returns.len() != dates.len() {
        return Err(SimError::Internal(format!(
            "return vector length {} != calendar length {}",
            returns.len(),
            dates.len()
        )));
    }

    let mut bars = Vec::with_capacity(returns.len());
    let mut current_close = last_close;

    for (&date, &log_return) in dates.iter().zip(returns) {
        let open = current_close;
        let close = open * log_return.exp();

        let intrabar_vol = base_vol * rng.gen_range(0.5..1.5);
        let wick_mean = (close - open).abs() * WICK_BODY_FRACTION;

        let (high_extra, low_extra) = if wick_mean > 0.0 {
            let exp = Exp::new(1.0 / wick_mean)
                .map_err(|e| SimError::Internal(format!("bad wick mean {wick_mean}: {e}")))?;
            (
                exp.sample(rng) * intrabar_vol,
                exp.sample(rng) * intrabar_vol,
            )
        } else {
            (0.0, 0.0)
        };

        let body_high = open.max(close);
        let body_low = open.min(close);

        // Clamp re-asserts the ordering invariant even under degenerate extras.
        let high = (body_high + high_extra).max(body_high);
        let low = (body_low - low_extra).min(body_low);

        bars.push(OhlcBar { date, open, high, low, close });
        current_close = close;
    }

    Ok(bars)
}
