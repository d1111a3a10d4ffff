//! Normalizer: [`RawExtraction`] → [`NormalizedReport`].
//!
//! A total function. Every field has a fallback, so malformed model output
//! degrades to zeros (required numbers) or absence (optional fields) rather
//! than an error, and no `NaN` or infinity ever reaches the report.
//!
//! Percentages are computed per entity against that entity's own daily
//! total. Line items are not required to sum to the total and nothing is
//! clamped: inconsistent source figures show up as-is.

use crate::model::{EntityReport, LineItem, NormalizedReport, RawEntity, RawExtraction, Share};
use serde_json::Value;
use tracing::debug;

/// Days used for the month-to-date average.
pub const DAYS_PER_MONTH: f64 = 30.0;

/// Normalize a raw extraction into a display-ready report.
pub fn normalize(raw: &RawExtraction) -> NormalizedReport {
    NormalizedReport {
        date: coerce_text(&raw.date).unwrap_or_default(),
        lantabur: raw.lantabur.as_ref().map(normalize_entity).unwrap_or_default(),
        taqwa: raw.taqwa.as_ref().map(normalize_entity).unwrap_or_default(),
        overall_grand_total: coerce_number(&raw.overall_grand_total),
    }
}

fn normalize_entity(raw: &RawEntity) -> EntityReport {
    let total = required_number(&raw.daily_production_total);

    let loading_capacity = match &raw.loading_capacity {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::Object(fields) => {
                    let value = fields.get("value").map(required_number).unwrap_or(0.0);
                    Some(LineItem {
                        name: fields.get("name").and_then(coerce_text).unwrap_or_default(),
                        value,
                        percentage: percentage(value, total),
                    })
                }
                other => {
                    debug!("Skipping non-object loading capacity entry: {other}");
                    None
                }
            })
            .collect(),
        _ => Vec::new(),
    };

    let in_house = share(&raw.in_house, total);
    let sub_contract = share(&raw.sub_contract, total);

    let total_this_month = coerce_number(&raw.total_this_month);

    EntityReport {
        daily_production_total: total,
        loading_capacity,
        in_house,
        sub_contract,
        lab_rft: coerce_text(&raw.lab_rft),
        total_this_month,
        average_per_day: total_this_month.map(|t| t / DAYS_PER_MONTH),
    }
}

/// `{ "value": n }` (or a bare number) with its share of `total`.
fn share(raw: &Value, total: f64) -> Share {
    let value = match raw {
        Value::Object(fields) => fields.get("value").map(required_number).unwrap_or(0.0),
        other => required_number(other),
    };
    Share {
        value,
        percentage: percentage(value, total),
    }
}

/// `round2(value / total * 100)`, or 0 when `total` is not positive.
pub fn percentage(value: f64, total: f64) -> f64 {
    if total > 0.0 {
        let p = round2(value / total * 100.0);
        if p.is_finite() {
            p
        } else {
            0.0
        }
    } else {
        0.0
    }
}

/// Round to two decimal places, halves away from zero.
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Coerce a value to a finite number.
///
/// Numbers pass through; strings are trimmed, thousands separators removed
/// and parsed. Anything else, including empty or unparseable strings and
/// non-finite results, yields `None`.
pub fn coerce_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let cleaned: String = s.trim().chars().filter(|c| *c != ',').collect();
            if cleaned.is_empty() {
                return None;
            }
            cleaned.parse::<f64>().ok()?
        }
        _ => return None,
    };
    n.is_finite().then_some(n)
}

fn required_number(value: &Value) -> f64 {
    coerce_number(value).unwrap_or(0.0)
}

/// Strings pass through verbatim; numbers and booleans are rendered.
fn coerce_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
