//! Manifest parsing for tabular (CSV) and line-delimited (JSONL) corpora
//!
//! Both formats decode into the same [`TestCase`] shape so downstream
//! components never see a format-specific representation. Nested CSV
//! fields are JSON-encoded strings decoded column by column; a malformed
//! column fails that row only, an unreadable manifest fails the load.

use super::error::IngestionError;
use crate::model::{TestCase, TestCaseExpectation, TestCaseInput};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::path::Path;
use tracing::warn;
use uuid::Uuid;

/// A row that failed to parse, with its 1-based row/line number.
#[derive(Debug)]
pub struct RowFailure {
    pub row: usize,
    pub error: IngestionError,
}

/// Outcome of parsing one manifest: the cases that loaded plus the rows
/// that were rejected.
#[derive(Debug, Default)]
pub struct ManifestLoad {
    pub cases: Vec<TestCase>,
    pub rejected: Vec<RowFailure>,
}

impl ManifestLoad {
    fn reject(&mut self, row: usize, error: IngestionError) {
        warn!(row, %error, "rejecting manifest row");
        self.rejected.push(RowFailure { row, error });
    }
}

/// Decode a JSON-encoded CSV column, treating empty cells as absent.
fn parse_json_field<T: DeserializeOwned>(
    raw: Option<&str>,
    field: &str,
    row: usize,
) -> Result<Option<T>, IngestionError> {
    match raw {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => serde_json::from_str(s)
            .map(Some)
            .map_err(|e| IngestionError::Field {
                row,
                field: field.to_string(),
                message: e.to_string(),
            }),
    }
}

fn parse_uuid_field(raw: Option<&str>, field: &str, row: usize) -> Result<Option<Uuid>, IngestionError> {
    match raw {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => Uuid::parse_str(s.trim())
            .map(Some)
            .map_err(|e| IngestionError::Field {
                row,
                field: field.to_string(),
                message: e.to_string(),
            }),
    }
}

/// Load test cases from a tabular manifest.
///
/// Expected columns (nested fields are JSON-encoded strings): `prompt`,
/// `files`, `context`, `tool_outputs`, `expected_text`,
/// `expected_reasoning`, `expected_structure`, `forbidden_content`,
/// `tool_mocks`, plus optional `id`, `corpus_id`, `latency_threshold_ms`
/// and `expected_tone`.
///
/// # Errors
///
/// Fails with [`IngestionError::Manifest`] when the file cannot be read
/// or the CSV structure itself is broken. Row-level problems land in
/// [`ManifestLoad::rejected`].
pub fn load_cases_from_csv(path: impl AsRef<Path>) -> Result<ManifestLoad, IngestionError> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|e| {
        IngestionError::Manifest(format!("cannot open manifest {}: {}", path.display(), e))
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| IngestionError::Manifest(format!("unreadable CSV header: {}", e)))?
        .clone();

    let column = |name: &str| headers.iter().position(|h| h == name);
    let columns: std::collections::HashMap<&str, usize> = [
        "id",
        "corpus_id",
        "prompt",
        "files",
        "context",
        "tool_outputs",
        "expected_text",
        "expected_reasoning",
        "expected_structure",
        "forbidden_content",
        "latency_threshold_ms",
        "expected_tone",
        "tool_mocks",
    ]
    .into_iter()
    .filter_map(|name| column(name).map(|idx| (name, idx)))
    .collect();

    let mut load = ManifestLoad::default();

    for (idx, record) in reader.records().enumerate() {
        let row = idx + 1;
        let record = match record {
            Ok(record) => record,
            // A structurally broken record means the manifest itself is
            // not trustworthy past this point.
            Err(e) => {
                return Err(IngestionError::Manifest(format!(
                    "CSV parse error at row {}: {}",
                    row, e
                )));
            }
        };

        match parse_row(&record, &columns, row) {
            Ok(case) => load.cases.push(case),
            Err(error) => load.reject(row, error),
        }
    }

    Ok(load)
}

fn parse_row(
    record: &csv::StringRecord,
    columns: &std::collections::HashMap<&str, usize>,
    row: usize,
) -> Result<TestCase, IngestionError> {
    let cell = |name: &str| columns.get(name).and_then(|&idx| record.get(idx));

    let inputs = TestCaseInput {
        prompt: cell("prompt").unwrap_or_default().to_string(),
        files: parse_json_field::<Vec<String>>(cell("files"), "files", row)?.unwrap_or_default(),
        context: parse_json_field::<Map<String, Value>>(cell("context"), "context", row)?
            .unwrap_or_default(),
        tool_outputs: parse_json_field::<Map<String, Value>>(
            cell("tool_outputs"),
            "tool_outputs",
            row,
        )?
        .unwrap_or_default(),
    };

    let latency_threshold_ms = match cell("latency_threshold_ms") {
        None => None,
        Some(s) if s.trim().is_empty() => None,
        Some(s) => Some(s.trim().parse::<u64>().map_err(|e| IngestionError::Field {
            row,
            field: "latency_threshold_ms".to_string(),
            message: e.to_string(),
        })?),
    };

    let expectations = TestCaseExpectation {
        text: cell("expected_text")
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        structure: parse_json_field::<Value>(cell("expected_structure"), "expected_structure", row)?,
        reasoning: parse_json_field::<Vec<String>>(
            cell("expected_reasoning"),
            "expected_reasoning",
            row,
        )?
        .unwrap_or_default(),
        forbidden_content: parse_json_field::<Vec<String>>(
            cell("forbidden_content"),
            "forbidden_content",
            row,
        )?
        .unwrap_or_default(),
        latency_threshold_ms,
        tone: cell("expected_tone")
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        tool_mocks: parse_json_field::<Map<String, Value>>(cell("tool_mocks"), "tool_mocks", row)?
            .unwrap_or_default(),
    };

    Ok(TestCase {
        id: parse_uuid_field(cell("id"), "id", row)?.unwrap_or_else(Uuid::new_v4),
        corpus_id: parse_uuid_field(cell("corpus_id"), "corpus_id", row)?.unwrap_or_else(Uuid::nil),
        inputs,
        expectations,
    })
}

/// One line of a line-delimited manifest.
#[derive(Debug, Deserialize)]
struct JsonlRow {
    #[serde(default)]
    id: Option<Uuid>,
    #[serde(default)]
    corpus_id: Option<Uuid>,
    inputs: TestCaseInput,
    #[serde(default)]
    expectations: TestCaseExpectation,
}

/// Load test cases from a line-delimited JSON manifest. Each line holds
/// `inputs` and `expectations` objects; blank lines are skipped and a
/// malformed line fails that row only.
///
/// # Errors
///
/// Fails with [`IngestionError::Manifest`] when the file cannot be read.
pub fn load_cases_from_jsonl(path: impl AsRef<Path>) -> Result<ManifestLoad, IngestionError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| {
        IngestionError::Manifest(format!("cannot open manifest {}: {}", path.display(), e))
    })?;

    let mut load = ManifestLoad::default();

    for (idx, line) in content.lines().enumerate() {
        let row = idx + 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match serde_json::from_str::<JsonlRow>(line) {
            Ok(parsed) => load.cases.push(TestCase {
                id: parsed.id.unwrap_or_else(Uuid::new_v4),
                corpus_id: parsed.corpus_id.unwrap_or_else(Uuid::nil),
                inputs: parsed.inputs,
                expectations: parsed.expectations,
            }),
            Err(e) => load.reject(
                row,
                IngestionError::Row {
                    row,
                    message: format!("invalid JSON line: {}", e),
                },
            ),
        }
    }

    Ok(load)
}
