//! Trading calendar generation.
//!
//! Weekdays only — Saturdays and Sundays are excluded, holidays are not
//! (no exchange calendar is consulted).

use chrono::{Datelike, NaiveDate, Weekday};

use crate::error::ValidationError;

/// Upper bound on the horizon a single request may ask for. Just under four
/// trading years; the default request horizon is 88.
pub const MAX_HORIZON: i64 = 1000;

/// Returns the next `horizon` business days strictly after `start`.
///
/// Deterministic and side-effect-free. The result is date-ordered ascending
/// and contains exactly `horizon` entries.
///
/// # Errors
/// [`ValidationError::HorizonOutOfRange`] when `horizon` is not in
/// `[1, MAX_HORIZON]`.
pub fn business_days(start: NaiveDate, horizon: i64) -> Result<Vec<NaiveDate>, ValidationError> {
    if horizon < 1 || horizon > MAX_HORIZON {
        return Err(ValidationError::HorizonOutOfRange {
            got: horizon,
            max: MAX_HORIZON,
        });
    }

    let mut dates = Vec::with_capacity(horizon as usize);
    let mut day = start;
    while dates.len() < horizon as usize {
        day = day.succ_opt().expect("date overflow generating calendar");
        if !is_weekend(day) {
            dates.push(day);
        }
    }
    Ok(dates)
}

fn is_weekend(day: NaiveDate) -> bool {
    matches!(day.weekday(), Weekday::Sat | Weekday::Sun)
}
