//! Tone grader

use super::grader::{Grader, GradingError};
use super::judge::LLMJudge;
use super::prompts::{TONE_PROMPT, render};
use super::verdict::parse_verdict;
use crate::model::{Score, SimulationOutput, TestCase};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct ToneVerdict {
    matches_tone: bool,
    #[serde(default)]
    reasoning: Option<String>,
    #[serde(default)]
    score: Option<f64>,
}

/// Judge-based grader for the expected response tone.
pub struct ToneGrader {
    judge: Arc<dyn LLMJudge>,
}

impl ToneGrader {
    pub fn new(judge: Arc<dyn LLMJudge>) -> Self {
        Self { judge }
    }
}

#[async_trait]
impl Grader for ToneGrader {
    fn name(&self) -> &'static str {
        "Tone"
    }

    async fn grade(
        &self,
        output: &SimulationOutput,
        case: &TestCase,
    ) -> Result<Score, GradingError> {
        let Some(tone) = &case.expectations.tone else {
            return Ok(Score::passing(self.name(), "No tone expectation provided."));
        };

        let prompt = render(
            TONE_PROMPT,
            &[
                ("__TONE__", tone.as_str()),
                (
                    "__RESPONSE__",
                    output.text.as_deref().unwrap_or("(no output)"),
                ),
            ],
        );

        let response = self
            .judge
            .complete(&prompt)
            .await
            .map_err(|e| GradingError::Judge(e.to_string()))?;
        let verdict: ToneVerdict = parse_verdict(&response)?;

        let value = verdict
            .score
            .unwrap_or(if verdict.matches_tone { 1.0 } else { 0.0 });

        Ok(Score::fractional(
            self.name(),
            value,
            verdict.matches_tone,
            verdict
                .reasoning
                .unwrap_or_else(|| "No reasoning returned by judge.".to_string()),
        ))
    }
}

#[cfg(test)]
mod tone_tests {
    use super::*;
    use crate::grading::judge::testing::ScriptedJudge;
    use crate::model::{SimulationStatus, TestCaseExpectation, TestCaseInput};
    use std::time::Duration;

    fn output(text: &str) -> SimulationOutput {
        SimulationOutput {
            text: Some(text.to_string()),
            structured_output: None,
            trace: None,
            latency: Duration::from_millis(40),
            status: SimulationStatus::Success,
            error: None,
        }
    }

    fn case_expecting_tone(tone: Option<&str>) -> TestCase {
        TestCase::new(
            TestCaseInput::with_prompt("Break the bad news."),
            TestCaseExpectation {
                tone: tone.map(str::to_string),
                ..Default::default()
            },
        )
    }

    #[tokio::test]
    async fn test_no_expectation_passes_without_judge_call() {
        let judge = Arc::new(ScriptedJudge::replying("{}"));
        let grader = ToneGrader::new(judge.clone());

        let score = grader
            .grade(&output("Hello."), &case_expecting_tone(None))
            .await
            .unwrap();

        assert!(score.passed);
        assert!(judge.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_matching_tone_passes() {
        let judge = Arc::new(ScriptedJudge::replying(
            r#"{"matches_tone": true, "reasoning": "Warm and apologetic.", "score": 1.0}"#,
        ));
        let grader = ToneGrader::new(judge);

        let score = grader
            .grade(
                &output("I'm so sorry to share this."),
                &case_expecting_tone(Some("empathetic")),
            )
            .await
            .unwrap();

        assert!(score.passed);
    }

    #[tokio::test]
    async fn test_mismatched_tone_fails() {
        let judge = Arc::new(ScriptedJudge::replying(
            r#"{"matches_tone": false, "reasoning": "Reads as curt.", "score": 0.0}"#,
        ));
        let grader = ToneGrader::new(judge);

        let score = grader
            .grade(&output("Deal with it."), &case_expecting_tone(Some("empathetic")))
            .await
            .unwrap();

        assert!(!score.passed);
        assert!(score.rationale.unwrap().contains("curt"));
    }
}
