//! Grader capability contract
//!
//! Two families implement the same capability: deterministic graders
//! (pure, never suspend, no I/O) and judge-based graders (network-bound,
//! fallible). The registry awaits both uniformly, so the orchestrator
//! never needs to know which family it is holding.

use crate::model::{Score, SimulationOutput, TestCase};
use async_trait::async_trait;

/// A grader malfunction. Distinct from a failing [`Score`]: a failing
/// score means the agent got it wrong, a `GradingError` means the harness
/// (or its judge) broke on this case.
#[derive(Debug, thiserror::Error)]
pub enum GradingError {
    /// The judging backend could not be invoked.
    #[error("Judge invocation failed: {0}")]
    Judge(String),

    /// The judge responded, but no JSON verdict could be extracted.
    #[error("Unparsable judge verdict: {0}")]
    Verdict(String),

    /// A verdict parsed, but not into the expected shape.
    #[error("Malformed judge verdict: {0}")]
    VerdictShape(String),
}

/// Scores one simulation output against a case's expectations.
///
/// Implementations must be safe for concurrent invocation across cases:
/// no shared mutable accumulator, all state read-only after construction.
#[async_trait]
pub trait Grader: Send + Sync {
    /// Stable name used for the Score and for report aggregation.
    fn name(&self) -> &'static str;

    async fn grade(
        &self,
        output: &SimulationOutput,
        case: &TestCase,
    ) -> Result<Score, GradingError>;
}
