//! Per-case execution inside a mocked sandbox
//!
//! `run_case` is infallible by design: an agent failure or a timeout is
//! data on the [`SimulationOutput`], never an error that could disturb
//! sibling cases.

use super::agent::AgentRunner;
use crate::config::SimulationConfig;
use crate::model::{SimulationOutput, SimulationStatus, TestCase};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// The execution harness that runs the agent against single cases.
pub struct Simulator {
    runner: Arc<dyn AgentRunner>,
    config: SimulationConfig,
}

impl Simulator {
    pub fn new(runner: Arc<dyn AgentRunner>, config: SimulationConfig) -> Self {
        Self { runner, config }
    }

    /// Execute one case and capture its output, latency and status.
    ///
    /// Latency is wall-clock from invocation start to completion or
    /// timeout, inclusive of the agent's full internal execution.
    pub async fn run_case(&self, case: &TestCase) -> SimulationOutput {
        debug!(case_id = %case.id, "running test case");

        let start = Instant::now();
        let invocation = self.runner.invoke(
            &case.inputs,
            &case.inputs.context,
            &case.expectations.tool_mocks,
        );

        match tokio::time::timeout(self.config.case_timeout, invocation).await {
            Ok(Ok(output)) => SimulationOutput {
                text: output.text,
                structured_output: output.structured_output,
                trace: output.trace,
                latency: start.elapsed(),
                status: SimulationStatus::Success,
                error: None,
            },
            Ok(Err(e)) => {
                warn!(case_id = %case.id, error = %e, "agent invocation raised");
                SimulationOutput {
                    text: None,
                    structured_output: None,
                    trace: None,
                    latency: start.elapsed(),
                    status: SimulationStatus::Raised,
                    error: Some(format!("Agent invocation failed: {}", e)),
                }
            }
            Err(_) => {
                warn!(case_id = %case.id, timeout = ?self.config.case_timeout, "case timed out");
                SimulationOutput {
                    text: None,
                    structured_output: None,
                    trace: None,
                    latency: start.elapsed(),
                    status: SimulationStatus::TimedOut,
                    error: Some(format!(
                        "Timed out after {:?}",
                        self.config.case_timeout
                    )),
                }
            }
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }
}
