//! Forbidden-content grader

use super::grader::{Grader, GradingError};
use crate::model::{Score, SimulationOutput, TestCase};
use async_trait::async_trait;

/// Fails when any forbidden pattern occurs, case-insensitively, as a
/// substring of the output text.
pub struct ForbiddenContentGrader;

#[async_trait]
impl Grader for ForbiddenContentGrader {
    fn name(&self) -> &'static str {
        "ForbiddenContent"
    }

    async fn grade(
        &self,
        output: &SimulationOutput,
        case: &TestCase,
    ) -> Result<Score, GradingError> {
        let forbidden = &case.expectations.forbidden_content;
        if forbidden.is_empty() {
            return Ok(Score::passing(
                self.name(),
                "No forbidden content specified.",
            ));
        }

        let haystack = output.text.as_deref().unwrap_or_default().to_lowercase();
        let found: Vec<&String> = forbidden
            .iter()
            .filter(|term| haystack.contains(&term.to_lowercase()))
            .collect();

        if found.is_empty() {
            Ok(Score::passing(
                self.name(),
                "None of the forbidden terms were found in the output.",
            ))
        } else {
            let listed = found
                .iter()
                .map(|t| format!("'{}'", t))
                .collect::<Vec<_>>()
                .join(", ");
            Ok(Score::failing(
                self.name(),
                format!("Found forbidden content: {}", listed),
            ))
        }
    }
}
