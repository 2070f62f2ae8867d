//! Verdict extraction from free-text judge responses
//!
//! Judges are asked for JSON only but rarely oblige: markdown fences,
//! prose around the object and trailing commas are all common. All of the
//! fuzzy handling lives behind this boundary so a parse failure surfaces
//! as a typed [`GradingError`] instead of leaking through the
//! orchestrator.

use super::grader::GradingError;
use regex::Regex;
use serde::de::DeserializeOwned;
use std::sync::LazyLock;

/// Strip a markdown code fence wrapping the payload, if present.
fn strip_code_fences(input: &str) -> String {
    static CODE_FENCE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"```(?:json|JSON)?\s*\n?([\s\S]*?)\n?```").unwrap());

    if let Some(caps) = CODE_FENCE_RE.captures(input) {
        if let Some(content) = caps.get(1) {
            return content.as_str().to_string();
        }
    }

    input.to_string()
}

/// Extract the first balanced JSON object from surrounding text.
fn extract_json_object(input: &str) -> Option<String> {
    let start = input.find('{')?;
    let substring = &input[start..];

    let mut depth = 0;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, c) in substring.char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }

        match c {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(substring[..=i].to_string());
                }
            }
            _ => {}
        }
    }

    None
}

/// Remove trailing commas before `}` or `]`.
fn repair_trailing_commas(input: &str) -> String {
    static TRAILING_COMMA_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r",(\s*[}\]])").unwrap());
    TRAILING_COMMA_RE.replace_all(input, "$1").to_string()
}

/// Parse a judge response into a typed verdict.
///
/// # Errors
///
/// [`GradingError::Verdict`] when no JSON object can be extracted,
/// [`GradingError::VerdictShape`] when JSON parses but does not match the
/// expected verdict type.
pub(crate) fn parse_verdict<T: DeserializeOwned>(response: &str) -> Result<T, GradingError> {
    let trimmed = response.trim();
    if trimmed.is_empty() {
        return Err(GradingError::Verdict("empty judge response".to_string()));
    }

    let candidate = strip_code_fences(trimmed);

    let raw = if serde_json::from_str::<serde_json::Value>(&candidate).is_ok() {
        candidate
    } else if let Some(extracted) = extract_json_object(&candidate) {
        let repaired = repair_trailing_commas(&extracted);
        if serde_json::from_str::<serde_json::Value>(&repaired).is_ok() {
            repaired
        } else {
            return Err(GradingError::Verdict(format!(
                "no parsable JSON object in response: {}",
                truncate(trimmed)
            )));
        }
    } else {
        return Err(GradingError::Verdict(format!(
            "no JSON object found in response: {}",
            truncate(trimmed)
        )));
    };

    serde_json::from_str(&raw).map_err(|e| GradingError::VerdictShape(e.to_string()))
}

fn truncate(s: &str) -> String {
    const LIMIT: usize = 120;
    if s.len() <= LIMIT {
        s.to_string()
    } else {
        let mut end = LIMIT;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &s[..end])
    }
}
