//! Response parsing: turn free-form model output into typed values.
//!
//! Even with a schema in the prompt, models wrap JSON in ```` ```json ````
//! fences, prepend a sentence of commentary, or answer a list question with
//! Markdown bullets. The rules here undo that deterministically:
//!
//! 1. Strip an outer code fence
//! 2. Locate the outermost `{ … }` object
//! 3. Deserialize into the target shape
//!
//! Only the extraction is strict: a reply with no usable object is an
//! [`ReportError::ExtractionFailed`]. Chart descriptions and insights fall
//! back to the plain text when the reply is not JSON.

use crate::error::ReportError;
use crate::model::RawExtraction;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

static RE_OUTER_FENCES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```[A-Za-z]*\s*\n(.*?)\n?```\s*$").unwrap());

static RE_LIST_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:[-*•]|\d+[.)])\s+").unwrap());

/// Remove a single code fence wrapping the whole reply.
pub fn strip_code_fences(input: &str) -> &str {
    let trimmed = input.trim();
    match RE_OUTER_FENCES.captures(trimmed) {
        Some(caps) => caps.get(1).map_or(trimmed, |m| m.as_str().trim()),
        None => trimmed,
    }
}

/// The outermost JSON object in `s`, ignoring any surrounding prose.
///
/// Each `{` is tried in order; the first one whose balanced span parses as
/// a JSON object wins, so stray braces in the prose around the reply are
/// skipped.
pub fn find_json_object(s: &str) -> Option<&str> {
    s.match_indices('{').find_map(|(start, _)| {
        let candidate = balanced_object(&s[start..])?;
        serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(candidate)
            .is_ok()
            .then_some(candidate)
    })
}

/// The prefix of `s` (which starts with `{`) up to its matching `}`.
/// Braces inside JSON strings are not counted.
fn balanced_object(s: &str) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, c) in s.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(&s[..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parse the extraction reply.
///
/// Fails when the reply holds no JSON object, the object does not fit the
/// report skeleton (an entity that is not an object, for instance), or
/// neither entity is present. Missing or mistyped fields *inside* an entity
/// are left for the normalizer.
pub fn parse_extraction(content: &str) -> Result<RawExtraction, ReportError> {
    let body = strip_code_fences(content);
    let json = find_json_object(body).ok_or_else(|| ReportError::ExtractionFailed {
        reason: "the model did not return a JSON object".into(),
    })?;

    let raw: RawExtraction =
        serde_json::from_str(json).map_err(|e| ReportError::ExtractionFailed {
            reason: format!("the model did not return the expected output structure: {e}"),
        })?;

    if raw.lantabur.is_none() && raw.taqwa.is_none() {
        return Err(ReportError::ExtractionFailed {
            reason: "the model did not return the expected output structure: \
                     no 'lantabur' or 'taqwa' data"
                .into(),
        });
    }

    Ok(raw)
}

#[derive(Deserialize)]
struct DescriptionReply {
    description: String,
}

#[derive(Deserialize)]
struct InsightsReply {
    insights: Vec<String>,
}

/// Parse a chart-description reply: `{"description": …}` or plain text.
pub fn parse_description(content: &str) -> Option<String> {
    let body = strip_code_fences(content);
    let text = find_json_object(body)
        .and_then(|json| serde_json::from_str::<DescriptionReply>(json).ok())
        .map(|reply| reply.description)
        .unwrap_or_else(|| body.to_string());
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Parse an insights reply: `{"insights": […]}` or a bulleted list.
pub fn parse_insights(content: &str) -> Vec<String> {
    let body = strip_code_fences(content);
    if let Some(reply) =
        find_json_object(body).and_then(|json| serde_json::from_str::<InsightsReply>(json).ok())
    {
        return reply
            .insights
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
    }

    body.lines()
        .map(|line| RE_LIST_MARKER.replace(line, "").trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}
