//! Structural conformance grader
//!
//! Match policy: template keys whose expected value is JSON `null` are
//! optional (absence passes, any present type passes). Every other key is
//! required and its value must match the template type recursively.
//! Arrays compare element types positionally against the template; extra
//! output keys and extra array elements are ignored.

use super::grader::{Grader, GradingError};
use crate::model::{Score, SimulationOutput, TestCase};
use async_trait::async_trait;
use serde_json::Value;

/// Validates the structured payload against the expectation's template.
pub struct SchemaGrader;

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn check(template: &Value, actual: &Value, path: &str, problems: &mut Vec<String>) {
    match template {
        // Null template value marks the slot optional: any type passes.
        Value::Null => {}
        Value::Object(expected) => match actual {
            Value::Object(found) => {
                for (key, expected_value) in expected {
                    let child = if path.is_empty() {
                        key.clone()
                    } else {
                        format!("{}.{}", path, key)
                    };
                    match found.get(key) {
                        Some(actual_value) => {
                            check(expected_value, actual_value, &child, problems)
                        }
                        None if expected_value.is_null() => {}
                        None => problems.push(format!("missing required key '{}'", child)),
                    }
                }
            }
            other => problems.push(format!(
                "'{}': expected object, got {}",
                path,
                type_name(other)
            )),
        },
        Value::Array(expected) => match actual {
            Value::Array(found) => {
                if found.len() < expected.len() {
                    problems.push(format!(
                        "'{}': expected at least {} elements, got {}",
                        path,
                        expected.len(),
                        found.len()
                    ));
                }
                for (idx, (expected_value, actual_value)) in
                    expected.iter().zip(found.iter()).enumerate()
                {
                    check(
                        expected_value,
                        actual_value,
                        &format!("{}[{}]", path, idx),
                        problems,
                    );
                }
            }
            other => problems.push(format!(
                "'{}': expected array, got {}",
                path,
                type_name(other)
            )),
        },
        scalar => {
            if std::mem::discriminant(scalar) != std::mem::discriminant(actual) {
                problems.push(format!(
                    "'{}': expected {}, got {}",
                    path,
                    type_name(scalar),
                    type_name(actual)
                ));
            }
        }
    }
}

#[async_trait]
impl Grader for SchemaGrader {
    fn name(&self) -> &'static str {
        "Schema"
    }

    async fn grade(
        &self,
        output: &SimulationOutput,
        case: &TestCase,
    ) -> Result<Score, GradingError> {
        let Some(template) = &case.expectations.structure else {
            return Ok(Score::passing(self.name(), "No structure expected."));
        };

        let Some(actual) = &output.structured_output else {
            return Ok(Score::failing(self.name(), "No structured output produced."));
        };

        let mut problems = Vec::new();
        check(template, actual, "", &mut problems);

        if problems.is_empty() {
            Ok(Score::passing(
                self.name(),
                "Structured output matches the expected structure.",
            ))
        } else {
            Ok(Score::failing(
                self.name(),
                format!("Structure mismatch: {}", problems.join("; ")),
            ))
        }
    }
}
