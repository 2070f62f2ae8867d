//! Agent capability contract
//!
//! The harness never embeds a concrete agent. The consuming application
//! provides an [`AgentRunner`] (HTTP adapter, subprocess, direct call)
//! and the simulator drives it case by case.

use crate::model::{TestCaseInput, TraceStep};
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Raw output of one agent invocation, before latency and status are
/// attached by the simulator.
#[derive(Debug, Clone, Default)]
pub struct AgentOutput {
    /// Final text response.
    pub text: Option<String>,

    /// Structured payload, if the agent produced one.
    pub structured_output: Option<Value>,

    /// Ordered execution trace.
    pub trace: Option<Vec<TraceStep>>,
}

impl AgentOutput {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn with_structured(mut self, value: Value) -> Self {
        self.structured_output = Some(value);
        self
    }

    pub fn with_trace(mut self, trace: Vec<TraceStep>) -> Self {
        self.trace = Some(trace);
        self
    }
}

/// Capability contract for running the agent under test.
///
/// `context` is the merged injection context and `tool_mocks` carries the
/// expectation's per-tool substitute responses and injected errors; a
/// compliant runner routes declared tools through these instead of live
/// systems, so forced error paths are deterministic. The invocation may
/// fail or overrun its deadline; both are absorbed by the simulator.
#[async_trait]
pub trait AgentRunner: Send + Sync {
    async fn invoke(
        &self,
        inputs: &TestCaseInput,
        context: &Map<String, Value>,
        tool_mocks: &Map<String, Value>,
    ) -> anyhow::Result<AgentOutput>;
}
