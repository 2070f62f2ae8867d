//! Reasoning-alignment grader (glass-box)
//!
//! Walks the expected milestone list against the agent's trace via the
//! judge and awards partial credit: score = milestones found in order /
//! total milestones. A textually correct final answer still scores low
//! when the required intermediate steps are absent.

use super::grader::{Grader, GradingError};
use super::judge::LLMJudge;
use super::prompts::{REASONING_PROMPT, render};
use super::verdict::parse_verdict;
use crate::model::{Score, SimulationOutput, TestCase, TraceStep};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct StepAnalysis {
    step: String,
    found: bool,
    #[serde(default)]
    evidence: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReasoningVerdict {
    steps_analysis: Vec<StepAnalysis>,
}

/// Judge-based grader for required reasoning milestones.
pub struct ReasoningGrader {
    judge: Arc<dyn LLMJudge>,
    pass_threshold: f64,
}

impl ReasoningGrader {
    pub fn new(judge: Arc<dyn LLMJudge>, pass_threshold: f64) -> Self {
        Self {
            judge,
            pass_threshold,
        }
    }

    fn render_trace(trace: Option<&[TraceStep]>) -> String {
        let Some(steps) = trace else {
            return "(no trace captured)".to_string();
        };
        if steps.is_empty() {
            return "(no trace captured)".to_string();
        }

        steps
            .iter()
            .enumerate()
            .map(|(i, step)| {
                let mut line = format!("Step {} [{}]", i + 1, step.id);
                if let Some(thought) = &step.thought {
                    line.push_str(&format!(" thought: {}", thought));
                }
                if let Some(action) = &step.action {
                    line.push_str(&format!(" action: {}", action));
                }
                if let Some(observation) = &step.observation {
                    line.push_str(&format!(" observation: {}", observation));
                }
                line
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[async_trait]
impl Grader for ReasoningGrader {
    fn name(&self) -> &'static str {
        "Reasoning"
    }

    async fn grade(
        &self,
        output: &SimulationOutput,
        case: &TestCase,
    ) -> Result<Score, GradingError> {
        let milestones = &case.expectations.reasoning;
        if milestones.is_empty() {
            return Ok(Score::passing(
                self.name(),
                "No reasoning expectations provided.",
            ));
        }

        let required = milestones
            .iter()
            .enumerate()
            .map(|(i, m)| format!("{}. {}", i + 1, m))
            .collect::<Vec<_>>()
            .join("\n");
        let prompt = render(
            REASONING_PROMPT,
            &[
                ("__REQUIRED_STEPS__", required.as_str()),
                (
                    "__TRACE__",
                    Self::render_trace(output.trace.as_deref()).as_str(),
                ),
                ("__TEXT__", output.text.as_deref().unwrap_or("(no output)")),
            ],
        );

        let response = self
            .judge
            .complete(&prompt)
            .await
            .map_err(|e| GradingError::Judge(e.to_string()))?;
        let verdict: ReasoningVerdict = parse_verdict(&response)?;

        if verdict.steps_analysis.is_empty() {
            return Err(GradingError::VerdictShape(
                "steps_analysis is empty".to_string(),
            ));
        }

        let found = verdict
            .steps_analysis
            .iter()
            .filter(|step| step.found)
            .count()
            .min(milestones.len());
        let score = found as f64 / milestones.len() as f64;
        let passed = score + f64::EPSILON >= self.pass_threshold;

        let breakdown = verdict
            .steps_analysis
            .iter()
            .map(|step| {
                let marker = if step.found { '✓' } else { '✗' };
                match &step.evidence {
                    Some(evidence) => format!("{} {} ({})", marker, step.step, evidence),
                    None => format!("{} {}", marker, step.step),
                }
            })
            .collect::<Vec<_>>()
            .join("\n");

        Ok(Score::fractional(
            self.name(),
            score,
            passed,
            format!(
                "{}/{} required steps found.\n{}",
                found,
                milestones.len(),
                breakdown
            ),
        ))
    }
}
