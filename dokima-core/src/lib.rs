//! # Dokima - Run-Verify-Score for AI Agents
//!
//! Dokima (δοκιμή) is an evaluation harness for AI-agent behavior: it
//! ingests a versioned corpus of test cases (golden data), executes an
//! agent against each case inside a controlled, mockable sandbox, scores
//! the output with pluggable deterministic and judge-based graders, and
//! folds everything into a comparable report with drift detection.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dokima_core::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn run(agent: Arc<dyn AgentRunner>, judge: Arc<dyn LLMJudge>) {
//! let config = AssayConfig::default();
//!
//! // Ingest the golden data
//! let load = CorpusLoader::load(
//!     &CorpusSource::Jsonl("golden.jsonl".into()),
//!     CorpusDescriptor {
//!         project_id: "clinical".into(),
//!         name: "contraindications".into(),
//!         version: "1.2.0".into(),
//!         created_by: "qa".into(),
//!     },
//! )
//! .expect("corpus loads");
//!
//! // Run the assay
//! let registry = GraderRegistry::deterministic(&config.grading)
//!     .with_judge_graders(judge, &config.grading);
//! let engine = AssessmentEngine::new(
//!     Simulator::new(agent, config.simulation.clone()),
//!     registry,
//!     config,
//! );
//! let report = engine
//!     .run_assay(Arc::new(load.corpus), "agent-draft-7", None, None)
//!     .await;
//! println!("pass rate: {:.1}%", report.pass_rate * 100.0);
//! # }
//! ```
//!
//! ## Architecture
//!
//! Data flows strictly forward:
//! corpus loader -> simulation harness -> grader registry ->
//! assessment engine -> report builder. Cases execute concurrently under
//! a bounded in-flight cap; each case is one isolated unit whose failure,
//! timeout or grader malfunction is recorded in its own result and never
//! disturbs siblings. The run always ends in a [`model::ReportCard`].

pub mod config;
pub mod corpus;
pub mod engine;
pub mod error;
pub mod grading;
pub mod model;
pub mod report;
pub mod sim;

/// Current library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{AssayConfig, DriftConfig, GradingConfig, SimulationConfig};
    pub use crate::corpus::{
        CorpusDescriptor, CorpusLoad, CorpusLoader, CorpusRegistry, CorpusSource, IngestionError,
    };
    pub use crate::engine::{AssessmentEngine, ProgressEvent, ProgressSink};
    pub use crate::error::{DokimaError, Result};
    pub use crate::grading::{
        FaithfulnessGrader, ForbiddenContentGrader, Grader, GraderRegistry, GradingError,
        LLMJudge, LatencyGrader, ReasoningGrader, SchemaGrader, ToneGrader,
    };
    pub use crate::model::{
        AggregateMetric, DriftMetric, GraderFailure, ReportCard, Score, ScoreValue,
        SimulationOutput, SimulationStatus, TestCase, TestCaseExpectation, TestCaseInput,
        TestCorpus, TestResult, TestRun, TestRunStatus, TraceStep,
    };
    pub use crate::report::{build_report_card, detect_drift};
    pub use crate::sim::{AgentOutput, AgentRunner, Simulator};
}
