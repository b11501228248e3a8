//! Event overlay: targeted single-cell overrides of the feature panel.
//!
//! Applying events is a pure transform — the input panel is left untouched
//! and an updated copy is returned together with an application report.
//! Events are applied in input order, so a later event overwrites an earlier
//! one on the same (date, field) cell. An event whose date is not in the
//! generated calendar is skipped and recorded as an unresolved warning;
//! an event naming an unknown field is a validation error.
//!
//! Only control fields can be overridden. Company metadata is fixed per
//! request (the panel invariant requires it identical on every row) and the
//! date column is not a control.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::panel::{FeaturePanel, PanelRow};

/// A single-cell override: on `date`, set `field` to `value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub date: NaiveDate,
    pub field: String,
    pub value: EventValue,
}

/// The replacement value carried by an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventValue {
    Number(f64),
    Text(String),
}

/// An event that named a date outside the generated calendar. Non-fatal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnresolvedEvent {
    pub date: NaiveDate,
    pub field: String,
}

/// Result of applying an event list to a panel.
#[derive(Debug, Clone)]
pub struct EventApplication {
    pub panel: FeaturePanel,
    pub applied: usize,
    pub unresolved: Vec<UnresolvedEvent>,
}

/// Applies `events` to a copy of `panel`.
///
/// # Errors
/// [`ValidationError::UnknownEventField`] when an event names a field that is
/// not an overridable control, [`ValidationError::EventTypeMismatch`] when
/// the value kind does not match the field kind.
pub fn apply_events(
    panel: &FeaturePanel,
    events: &[Event],
) -> Result<EventApplication, ValidationError> {
    let mut updated = panel.clone();
    let mut applied = 0;
    let mut unresolved = Vec::new();

    for event in events {
        match updated
            .rows_mut()
            .iter_mut()
            .find(|row| row.date == event.date)
        {
            Some(row) => {
                set_control_field(row, &event.field, &event.value)?;
                applied += 1;
            }
            None => {
                tracing::warn!(
                    date = %event.date,
                    field = %event.field,
                    "event date not in simulation period; skipping"
                );
                unresolved.push(UnresolvedEvent {
                    date: event.date,
                    field: event.field.clone(),
                });
            }
        }
    }

    Ok(EventApplication { panel: updated, applied, unresolved })
}

fn set_control_field(
    row: &mut PanelRow,
    field: &str,
    value: &EventValue,
) -> Result<(), ValidationError> {
    let numeric_slot: Option<&mut f64> = match field {
        "overall_market_sentiment" => Some(&mut row.overall_market_sentiment),
        "fii_flows" => Some(&mut row.fii_flows),
        "dii_flows" => Some(&mut row.dii_flows),
        "global_market_cues" => Some(&mut row.global_market_cues),
        "inr_usd_delta" => Some(&mut row.inr_usd_delta),
        "crude_oil_delta" => Some(&mut row.crude_oil_delta),
        "earnings_announcement" => Some(&mut row.earnings_announcement),
        "analyst_rating_change" => Some(&mut row.analyst_rating_change),
        _ => None,
    };
    if let Some(slot) = numeric_slot {
        return match value {
            EventValue::Number(x) => {
                *slot = *x;
                Ok(())
            }
            EventValue::Text(_) => Err(ValidationError::EventTypeMismatch {
                field: field.to_string(),
                expected: "numeric",
            }),
        };
    }

    let text_slot: Option<&mut String> = match field {
        "major_news" => Some(&mut row.major_news),
        "insider_activity" => Some(&mut row.insider_activity),
        "predefined_global_shock" => Some(&mut row.predefined_global_shock),
        _ => None,
    };
    if let Some(slot) = text_slot {
        return match value {
            EventValue::Text(s) => {
                *slot = s.clone();
                Ok(())
            }
            EventValue::Number(_) => Err(ValidationError::EventTypeMismatch {
                field: field.to_string(),
                expected: "categorical",
            }),
        };
    }

    Err(ValidationError::UnknownEventField(field.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::ControlSet;
    use crate::domain::CompanyMeta;
    use crate::panel::build_panel;

    fn meta() -> CompanyMeta {
        CompanyMeta {
            company_id: Some("C-9".into()),
            company_name: "Acme Industries".into(),
            ticker: "ACME".into(),
            sector: "Industrials".into(),
            market_cap_bucket: "small_cap".into(),
            company_size: Some(12.0),
        }
    }

    fn panel() -> FeaturePanel {
        // 2025-06-27 is a Friday: rows are Jun 30, Jul 1, Jul 2.
        let start = NaiveDate::from_ymd_opt(2025, 6, 27).unwrap();
        build_panel(&meta(), start, 3, &ControlSet::new()).unwrap()
    }

    fn event(date: (i32, u32, u32), field: &str, value: EventValue) -> Event {
        Event {
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            field: field.into(),
            value,
        }
    }

    #[test]
    fn event_changes_only_the_targeted_cell() {
        let original = panel();
        let ev = event((2025, 7, 1), "earnings_announcement", EventValue::Number(1.0));
        let result = apply_events(&original, &[ev]).unwrap();

        assert_eq!(result.applied, 1);
        assert!(result.unresolved.is_empty());

        for (before, after) in original.rows().iter().zip(result.panel.rows()) {
            if after.date == NaiveDate::from_ymd_opt(2025, 7, 1).unwrap() {
                assert_eq!(after.earnings_announcement, 1.0);
                // every other field on the targeted row is untouched
                let mut reverted = after.clone();
                reverted.earnings_announcement = before.earnings_announcement;
                assert_eq!(&reverted, before);
            } else {
                assert_eq!(before, after);
            }
        }
    }

    #[test]
    fn input_panel_is_not_mutated() {
        let original = panel();
        let snapshot = original.clone();
        let ev = event((2025, 7, 1), "major_news", EventValue::Text("contract-win".into()));
        let _ = apply_events(&original, &[ev]).unwrap();
        assert_eq!(original, snapshot);
    }

    #[test]
    fn unmatched_date_is_recorded_not_fatal() {
        let original = panel();
        // Jul 5 2025 is a Saturday — never in the calendar.
        let ev = event((2025, 7, 5), "earnings_announcement", EventValue::Number(1.0));
        let result = apply_events(&original, &[ev]).unwrap();

        assert_eq!(result.applied, 0);
        assert_eq!(
            result.unresolved,
            vec![UnresolvedEvent {
                date: NaiveDate::from_ymd_opt(2025, 7, 5).unwrap(),
                field: "earnings_announcement".into(),
            }]
        );
        assert_eq!(result.panel, original);
    }

    #[test]
    fn unknown_field_is_a_validation_error() {
        let ev = event((2025, 7, 1), "earnings", EventValue::Number(1.0));
        let err = apply_events(&panel(), &[ev]).unwrap_err();
        assert_eq!(err, ValidationError::UnknownEventField("earnings".into()));
    }

    #[test]
    fn metadata_fields_are_not_overridable() {
        let ev = event((2025, 7, 1), "sector", EventValue::Text("Energy".into()));
        let err = apply_events(&panel(), &[ev]).unwrap_err();
        assert_eq!(err, ValidationError::UnknownEventField("sector".into()));
    }

    #[test]
    fn value_kind_must_match_field_kind() {
        let ev = event((2025, 7, 1), "fii_flows", EventValue::Text("lots".into()));
        let err = apply_events(&panel(), &[ev]).unwrap_err();
        assert!(matches!(err, ValidationError::EventTypeMismatch { .. }));

        let ev = event((2025, 7, 1), "major_news", EventValue::Number(1.0));
        let err = apply_events(&panel(), &[ev]).unwrap_err();
        assert!(matches!(err, ValidationError::EventTypeMismatch { .. }));
    }

    #[test]
    fn later_event_overwrites_earlier_on_same_cell() {
        let events = vec![
            event((2025, 6, 30), "analyst_rating_change", EventValue::Number(1.0)),
            event((2025, 6, 30), "analyst_rating_change", EventValue::Number(-2.0)),
        ];
        let result = apply_events(&panel(), &events).unwrap();
        assert_eq!(result.applied, 2);
        assert_eq!(result.panel.rows()[0].analyst_rating_change, -2.0);
    }
}
