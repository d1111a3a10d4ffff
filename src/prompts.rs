//! Prompts for the three model calls.
//!
//! Every prompt lives here so the request code in [`crate::pipeline::llm`]
//! and [`crate::extract`] stays free of prose, and so tests can inspect the
//! exact text the model receives.

use serde_json::{json, Value};

/// JSON schema the extraction reply must follow.
///
/// `dailyProductionTotal`, `loadingCapacity`, `inHouse` and `subContract`
/// are required per entity; `labRft`, `totalThisMonth` and the top-level
/// `overallGrandTotal` may be omitted.
pub fn extraction_schema() -> Value {
    let item = json!({
        "type": "object",
        "properties": {
            "name": { "type": "string", "description": "Name of the color group or loading capacity item." },
            "value": { "type": "number", "description": "Production value in kg for this item." }
        },
        "required": ["name", "value"]
    });
    let kg_value = json!({
        "type": "object",
        "properties": { "value": { "type": "number", "description": "Production value in kg." } },
        "required": ["value"]
    });
    let entity = json!({
        "type": "object",
        "properties": {
            "dailyProductionTotal": { "type": "number", "description": "Total production for the day in kg." },
            "loadingCapacity": { "type": "array", "items": item },
            "inHouse": kg_value.clone(),
            "subContract": kg_value,
            "labRft": { "type": "string", "description": "LAB RFT string, e.g. \"0% (0 out of 1)\"." },
            "totalThisMonth": { "type": "number", "description": "Production so far this month in kg." }
        },
        "required": ["dailyProductionTotal", "loadingCapacity", "inHouse", "subContract"]
    });
    json!({
        "type": "object",
        "properties": {
            "date": { "type": "string", "description": "Date of the report, e.g. \"02 Jun 2025\"." },
            "lantabur": entity.clone(),
            "taqwa": entity,
            "overallGrandTotal": { "type": "number", "description": "Grand total across both industries in kg." }
        },
        "required": ["date", "lantabur", "taqwa"]
    })
}

/// Instructions for the extraction call, without the schema.
pub const EXTRACTION_INSTRUCTIONS: &str = r#"You are an expert data extraction tool specializing in parsing production reports from PDF documents.
You will be given a single-page production report. It contains production data for the 'Lantabur' and 'Taqwa' industries and follows a fixed, known format.

Extract the following and return it as ONE JSON object matching the schema below:

1. date: the date of the report (e.g. "02 Jun 2025").
2. For each of lantabur and taqwa:
   - dailyProductionTotal: total production for the day in kg.
   - loadingCapacity: every color group / loading capacity line in the order it appears, each as {"name", "value"}. Keep names exactly as printed; do not merge similar rows.
   - inHouse: {"value"} in-house production in kg.
   - subContract: {"value"} sub-contracted production in kg.
   - labRft: the LAB RFT text if present; omit it otherwise.
   - totalThisMonth: total production this month in kg if present; omit it otherwise.
3. overallGrandTotal: the grand total across both industries if the report prints one.

Rules:
- Numbers must be JSON numbers, not strings.
- Output ONLY the JSON object. No markdown fences, no commentary."#;

/// Full system prompt for the extraction call.
pub fn extraction_prompt() -> String {
    let schema = serde_json::to_string_pretty(&extraction_schema()).unwrap_or_default();
    format!("{EXTRACTION_INSTRUCTIONS}\n\nJSON schema:\n{schema}")
}

/// System prompt for the chart-description call.
pub const CHART_DESCRIPTION_PROMPT: &str = r#"You are an expert data analyst. Generate a concise textual description of the chart you are given, highlighting the key insights rather than restating the numbers.
Reply with ONE JSON object of the form {"description": "..."} and nothing else."#;

/// User message for the chart-description call.
pub fn chart_description_request(title: &str, kind: &str, data_json: &str) -> String {
    format!("Chart Title: {title}\nChart Type: {kind}\nChart Data: {data_json}")
}

/// System prompt for the insights call.
pub const INSIGHTS_PROMPT: &str = r#"You are an expert production data analyst.
Given the production data below, suggest a few potential explanations for the trends and patterns observed.
Reply with ONE JSON object of the form {"insights": ["...", "..."]} and nothing else."#;

/// User message for the insights call.
pub fn insights_request(report_text: &str) -> String {
    format!("Production Data:\n{report_text}")
}
