//! Latency threshold grader

use super::grader::{Grader, GradingError};
use crate::model::{Score, SimulationOutput, SimulationStatus, TestCase};
use async_trait::async_trait;

/// Passes iff measured latency stays within the case's budget. A
/// timed-out simulation always fails, whatever the threshold says.
pub struct LatencyGrader {
    default_threshold_ms: u64,
}

impl LatencyGrader {
    pub fn new(default_threshold_ms: u64) -> Self {
        Self {
            default_threshold_ms,
        }
    }
}

#[async_trait]
impl Grader for LatencyGrader {
    fn name(&self) -> &'static str {
        "Latency"
    }

    async fn grade(
        &self,
        output: &SimulationOutput,
        case: &TestCase,
    ) -> Result<Score, GradingError> {
        let threshold = case
            .expectations
            .latency_threshold_ms
            .unwrap_or(self.default_threshold_ms);

        if output.status == SimulationStatus::TimedOut {
            return Ok(Score::failing(
                self.name(),
                format!(
                    "Simulation timed out; threshold of {}ms cannot be met.",
                    threshold
                ),
            ));
        }

        let latency = output.latency_ms();
        let passed = latency <= threshold as f64;
        let rationale = format!(
            "Latency {:.2}ms is {} threshold of {}ms.",
            latency,
            if passed { "within" } else { "over" },
            threshold
        );

        Ok(if passed {
            Score::passing(self.name(), rationale)
        } else {
            Score::failing(self.name(), rationale)
        })
    }
}
