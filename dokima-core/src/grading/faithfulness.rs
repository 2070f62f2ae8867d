//! Faithfulness grader
//!
//! Checks that the agent's answer is grounded in the case's injected
//! context and mocked tool data rather than hallucinated.

use super::grader::{Grader, GradingError};
use super::judge::LLMJudge;
use super::prompts::{FAITHFULNESS_PROMPT, render};
use super::verdict::parse_verdict;
use crate::model::{Score, SimulationOutput, TestCase};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct FaithfulnessVerdict {
    faithful: bool,
    #[serde(default)]
    reasoning: Option<String>,
    #[serde(default)]
    score: Option<f64>,
}

/// Judge-based grader for context grounding.
pub struct FaithfulnessGrader {
    judge: Arc<dyn LLMJudge>,
}

impl FaithfulnessGrader {
    pub fn new(judge: Arc<dyn LLMJudge>) -> Self {
        Self { judge }
    }
}

#[async_trait]
impl Grader for FaithfulnessGrader {
    fn name(&self) -> &'static str {
        "Faithfulness"
    }

    async fn grade(
        &self,
        output: &SimulationOutput,
        case: &TestCase,
    ) -> Result<Score, GradingError> {
        // Everything the agent was allowed to ground on: injected context
        // plus the mocked tool data it saw.
        let grounding = serde_json::json!({
            "context": case.inputs.context,
            "tool_outputs": case.inputs.tool_outputs,
        });
        let context_block = serde_json::to_string_pretty(&grounding)
            .unwrap_or_else(|_| "(unrenderable context)".to_string());

        let prompt = render(
            FAITHFULNESS_PROMPT,
            &[
                ("__CONTEXT__", context_block.as_str()),
                ("__ANSWER__", output.text.as_deref().unwrap_or("(no output)")),
            ],
        );

        let response = self
            .judge
            .complete(&prompt)
            .await
            .map_err(|e| GradingError::Judge(e.to_string()))?;
        let verdict: FaithfulnessVerdict = parse_verdict(&response)?;

        let value = verdict
            .score
            .unwrap_or(if verdict.faithful { 1.0 } else { 0.0 });

        Ok(Score::fractional(
            self.name(),
            value,
            verdict.faithful,
            verdict
                .reasoning
                .unwrap_or_else(|| "No reasoning returned by judge.".to_string()),
        ))
    }
}
