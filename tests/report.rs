//! Integration tests for the parse → normalize → present path.
//!
//! Everything here runs on fixed model replies, so no API key or network
//! access is needed.

use edgequake_pdf2prod::{
    all_charts, format_report, normalize, parse_extraction, Dashboard, Entity, ReportError,
    UserPreferences, NO_DATA,
};

// ── Fixtures ─────────────────────────────────────────────────────────────────

/// A reply shaped the way the model usually answers: fenced, with a
/// thousands separator inside a string and Taqwa's month total missing.
const FENCED_REPLY: &str = r#"Here is the data:
```json
{
  "date": "02 Jun 2025",
  "lantabur": {
    "dailyProductionTotal": 13266.2,
    "loadingCapacity": [
      {"name": "Black", "value": 2853},
      {"name": "Avg Color", "value": "10,413.2"}
    ],
    "inHouse": {"value": "12,934.2"},
    "subContract": {"value": 332},
    "labRft": "0% (0 out of 1)",
    "totalThisMonth": 13266.2
  },
  "taqwa": {
    "dailyProductionTotal": 0,
    "loadingCapacity": [],
    "inHouse": {"value": 0},
    "subContract": {"value": 0}
  },
  "overallGrandTotal": 13266.2
}
```"#;

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn fenced_reply_normalizes() {
    let raw = parse_extraction(FENCED_REPLY).expect("reply should parse");
    let report = normalize(&raw);

    assert_eq!(report.date, "02 Jun 2025");
    let l = &report.lantabur;
    assert_eq!(l.daily_production_total, 13266.2);
    assert_eq!(l.loading_capacity.len(), 2);
    assert_eq!(l.loading_capacity[0].name, "Black");
    assert_eq!(l.loading_capacity[0].percentage, 21.51);
    assert_eq!(l.loading_capacity[1].value, 10413.2);
    assert_eq!(l.in_house.value, 12934.2);
    assert_eq!(l.in_house.percentage, 97.5);
    assert_eq!(l.sub_contract.percentage, 2.5);
    assert_eq!(l.lab_rft.as_deref(), Some("0% (0 out of 1)"));
    assert!(l.average_per_day.is_some());

    let t = &report.taqwa;
    assert_eq!(t.daily_production_total, 0.0);
    assert!(t.loading_capacity.is_empty());
    assert_eq!(t.in_house.percentage, 0.0);
    assert!(t.total_this_month.is_none());
    assert!(t.average_per_day.is_none());
    assert!(t.lab_rft.is_none());
}

#[test]
fn formatted_text_layout() {
    let report = normalize(&parse_extraction(FENCED_REPLY).unwrap());
    let text = format_report(Some(&report));

    assert!(text.starts_with("Date: 02 Jun 2025\n\n╰─>Lantabur Data:\nTotal = 13,266.2 kg\n"));
    assert!(text.contains("Black: 2,853 kg (21.51%)"));
    assert!(text.contains("Inhouse: 12,934.2 kg (97.50%)"));
    assert!(text.contains("Sub Contract: 332 kg (2.50%)"));
    assert!(text.contains("LAB RFT: 0% (0 out of 1)"));
    assert!(text.contains("Total this month: 13,266.2 kg"));
    assert!(text.contains("Avg/day: 442.21 kg"));
    assert!(text.contains("╰─>Taqwa Data:\nTotal = 0 kg"));
    assert!(text.ends_with("Overall Grand Total: 13,266.2 kg"));
    // Taqwa has no month-to-date figures, so only one Avg/day line.
    assert_eq!(text.matches("Avg/day:").count(), 1);
}

#[test]
fn normalize_and_format_are_deterministic() {
    let raw = parse_extraction(FENCED_REPLY).unwrap();
    let first = normalize(&raw);
    let second = normalize(&raw);
    assert_eq!(first, second);
    assert_eq!(format_report(Some(&first)), format_report(Some(&second)));
}

#[test]
fn normalized_report_renormalizes_to_itself() {
    let report = normalize(&parse_extraction(FENCED_REPLY).unwrap());
    let json = serde_json::to_string(&report).unwrap();
    let again = normalize(&parse_extraction(&json).unwrap());
    assert_eq!(again, report);
}

#[test]
fn empty_object_is_extraction_failure() {
    let err = parse_extraction("{}").unwrap_err();
    assert!(matches!(err, ReportError::ExtractionFailed { .. }));
    let (title, _) = err.user_message();
    assert_eq!(title, "PDF Processing Failed");
}

#[test]
fn prose_reply_is_extraction_failure() {
    let err = parse_extraction("Sorry, I cannot read this document.").unwrap_err();
    assert!(matches!(err, ReportError::ExtractionFailed { .. }));
}

#[test]
fn no_report_text() {
    assert_eq!(format_report(None), NO_DATA);
}

#[test]
fn charts_follow_report() {
    let report = normalize(&parse_extraction(FENCED_REPLY).unwrap());
    let charts = all_charts(&report);
    let titles: Vec<&str> = charts.iter().map(|c| c.title.as_str()).collect();
    assert_eq!(
        titles,
        [
            "Lantabur Loading Capacity",
            "Lantabur In-House vs Sub-Contract",
            "Taqwa In-House vs Sub-Contract",
            "Production This Month",
        ]
    );
    assert_eq!(charts[3].points.len(), 1);
    assert_eq!(charts[3].points[0].label, Entity::Lantabur.display_name());
}

#[test]
fn dashboard_round_trip_through_saved_reply() {
    let mut dashboard = Dashboard::new(UserPreferences::default());
    let raw = parse_extraction(FENCED_REPLY).unwrap();
    dashboard.load_raw(raw).unwrap();
    assert!(dashboard.text().contains("Avg/day: 442.21 kg"));
    assert_eq!(dashboard.charts().unwrap().len(), 4);

    dashboard.clear();
    assert_eq!(dashboard.text(), NO_DATA);
    assert!(matches!(dashboard.charts(), Err(ReportError::NoReport)));
}
