//! Grader registry
//!
//! Applies every configured grader to a completed case independently.
//! One grader's malfunction is recorded and must never block the others
//! from running on the same case.

use super::forbidden::ForbiddenContentGrader;
use super::grader::Grader;
use super::judge::LLMJudge;
use super::latency::LatencyGrader;
use super::schema::SchemaGrader;
use crate::config::GradingConfig;
use crate::model::{GraderFailure, Score, SimulationOutput, TestCase};
use std::sync::Arc;
use tracing::error;

/// Ordered, shareable set of graders. Safe for concurrent use across
/// cases: graders hold no per-case state.
#[derive(Clone)]
pub struct GraderRegistry {
    graders: Vec<Arc<dyn Grader>>,
}

impl GraderRegistry {
    pub fn new() -> Self {
        Self {
            graders: Vec::new(),
        }
    }

    /// The deterministic set: latency, schema and forbidden content.
    pub fn deterministic(config: &GradingConfig) -> Self {
        Self::new()
            .with_grader(Arc::new(LatencyGrader::new(
                config.default_latency_threshold_ms,
            )))
            .with_grader(Arc::new(SchemaGrader))
            .with_grader(Arc::new(ForbiddenContentGrader))
    }

    /// Add the judge-based graders on top of the current set.
    pub fn with_judge_graders(self, judge: Arc<dyn LLMJudge>, config: &GradingConfig) -> Self {
        self.with_grader(Arc::new(super::reasoning::ReasoningGrader::new(
            Arc::clone(&judge),
            config.reasoning_pass_threshold,
        )))
        .with_grader(Arc::new(super::faithfulness::FaithfulnessGrader::new(
            Arc::clone(&judge),
        )))
        .with_grader(Arc::new(super::tone::ToneGrader::new(judge)))
    }

    pub fn with_grader(mut self, grader: Arc<dyn Grader>) -> Self {
        self.graders.push(grader);
        self
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.graders.iter().map(|g| g.name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.graders.is_empty()
    }

    pub fn len(&self) -> usize {
        self.graders.len()
    }

    /// Run every grader against one completed case. Grader malfunctions
    /// land in the failure list; the remaining graders still run.
    pub async fn grade_all(
        &self,
        output: &SimulationOutput,
        case: &TestCase,
    ) -> (Vec<Score>, Vec<GraderFailure>) {
        let outcomes = futures::future::join_all(
            self.graders
                .iter()
                .map(|grader| async move { (grader.name(), grader.grade(output, case).await) }),
        )
        .await;

        let mut scores = Vec::new();
        let mut failures = Vec::new();
        for (name, outcome) in outcomes {
            match outcome {
                Ok(score) => scores.push(score),
                Err(e) => {
                    error!(grader = name, case_id = %case.id, error = %e, "grader malfunctioned");
                    failures.push(GraderFailure {
                        grader: name.to_string(),
                        message: e.to_string(),
                    });
                }
            }
        }

        (scores, failures)
    }
}

impl Default for GraderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
