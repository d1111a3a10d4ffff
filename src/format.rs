//! Plain-text rendering of a [`NormalizedReport`].
//!
//! The text is what gets copied to the clipboard, shared, and sent to the
//! insights call, so it must be deterministic: the same report always
//! renders to the same bytes.
//!
//! ```text
//! Date: 02 Jun 2025
//!
//! ╰─>Lantabur Data:
//! Total = 13,266.2 kg
//! Loading cap:
//! Black: 2,853 kg (21.51%)
//!
//! Inhouse: 12,934.2 kg (97.50%)
//! Sub Contract: 332 kg (2.50%)
//!
//! LAB RFT: 0% (0 out of 1)
//! Total this month: 13,266.2 kg
//! Avg/day: 442.21 kg
//! ```

use crate::model::{Entity, EntityReport, NormalizedReport};
use std::fmt::Write as _;

/// Text shown when there is no report.
pub const NO_DATA: &str = "No data available.";

/// Render a report, or [`NO_DATA`] for `None`.
pub fn format_report(report: Option<&NormalizedReport>) -> String {
    let Some(report) = report else {
        return NO_DATA.to_string();
    };

    let mut out = format!("Date: {}\n\n", report.date);
    for (i, entity) in Entity::ALL.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&format_entity(entity.display_name(), report.entity(*entity)));
    }
    if let Some(grand) = report.overall_grand_total {
        let _ = write!(out, "\nOverall Grand Total: {} kg\n", group_thousands(grand, 3));
    }
    out.trim().to_string()
}

fn format_entity(name: &str, data: &EntityReport) -> String {
    let mut text = format!("╰─>{name} Data:\n");
    let _ = writeln!(text, "Total = {} kg", group_thousands(data.daily_production_total, 3));
    text.push_str("Loading cap:\n");
    for item in &data.loading_capacity {
        let _ = writeln!(
            text,
            "{}: {} kg ({:.2}%)",
            item.name,
            group_thousands(item.value, 3),
            item.percentage
        );
    }
    text.push('\n');
    let _ = writeln!(
        text,
        "Inhouse: {} kg ({:.2}%)",
        group_thousands(data.in_house.value, 3),
        data.in_house.percentage
    );
    let _ = writeln!(
        text,
        "Sub Contract: {} kg ({:.2}%)",
        group_thousands(data.sub_contract.value, 3),
        data.sub_contract.percentage
    );
    text.push('\n');
    let _ = writeln!(text, "LAB RFT: {}", data.lab_rft.as_deref().unwrap_or(""));
    if let (Some(month), Some(avg)) = (data.total_this_month, data.average_per_day) {
        let _ = writeln!(text, "Total this month: {} kg", group_thousands(month, 3));
        let _ = writeln!(text, "Avg/day: {} kg", group_thousands(avg, 2));
    }
    text
}

/// Format with `,` thousands grouping and at most `max_fraction` decimals,
/// trailing zeros dropped (`13266.2` → `"13,266.2"`, `2853.0` → `"2,853"`).
pub fn group_thousands(value: f64, max_fraction: usize) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let fixed = format!("{:.*}", max_fraction, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, f.trim_end_matches('0')),
        None => (fixed.as_str(), ""),
    };

    let digits = int_part.as_bytes();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, d) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*d as char);
    }

    let is_zero = grouped == "0" && frac_part.is_empty();
    let mut out = String::new();
    if value < 0.0 && !is_zero {
        out.push('-');
    }
    out.push_str(&grouped);
    if !frac_part.is_empty() {
        out.push('.');
        out.push_str(frac_part);
    }
    out
}
