//! Core data model for corpora, simulation outputs, scores and reports
//!
//! A [`TestCorpus`] is the versioned golden data a run executes against.
//! Everything downstream of ingestion treats it as read-only: a run holds
//! an `Arc<TestCorpus>` snapshot and changes require a new version.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::time::Duration;
use uuid::Uuid;

/// Simulated input handed to the agent under test.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TestCaseInput {
    /// The user prompt text.
    pub prompt: String,

    /// Referenced asset files (resolved to absolute paths after archive
    /// ingestion), mimicking retrieval documents.
    #[serde(default)]
    pub files: Vec<String>,

    /// Injected context values (user role, date, locale, ...).
    #[serde(default)]
    pub context: Map<String, Value>,

    /// Mocked tool responses keyed by tool name.
    #[serde(default)]
    pub tool_outputs: Map<String, Value>,
}

impl TestCaseInput {
    /// Create an input with just a prompt
    pub fn with_prompt(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }
}

/// Declared ground truth for a test case.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TestCaseExpectation {
    /// Expected final text (fuzzy match string).
    pub text: Option<String>,

    /// Expected structured-output template.
    pub structure: Option<Value>,

    /// Ordered reasoning milestones that must appear in the trace.
    #[serde(default)]
    pub reasoning: Vec<String>,

    /// Substrings that must not appear in the output.
    #[serde(default)]
    pub forbidden_content: Vec<String>,

    /// Per-case latency budget in milliseconds.
    pub latency_threshold_ms: Option<u64>,

    /// Expected tone of the response (judged).
    pub tone: Option<String>,

    /// Tool-name keyed mock configuration, including injected errors.
    #[serde(default)]
    pub tool_mocks: Map<String, Value>,
}

/// A single test case within a corpus. Owned by its corpus and never
/// mutated after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCase {
    /// Unique identifier, unique within the owning corpus.
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,

    /// Owning corpus.
    #[serde(default = "Uuid::nil")]
    pub corpus_id: Uuid,

    pub inputs: TestCaseInput,

    #[serde(default)]
    pub expectations: TestCaseExpectation,
}

impl TestCase {
    /// Create a case with a fresh id
    pub fn new(inputs: TestCaseInput, expectations: TestCaseExpectation) -> Self {
        Self {
            id: Uuid::new_v4(),
            corpus_id: Uuid::nil(),
            inputs,
            expectations,
        }
    }
}

/// A versioned collection of test cases (the golden data).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCorpus {
    pub id: Uuid,
    pub project_id: String,
    pub name: String,
    /// Semantic version. Changing the cases requires a new version.
    pub version: String,
    pub created_by: String,
    pub cases: Vec<TestCase>,
}

impl TestCorpus {
    /// Look up a case by id
    pub fn case(&self, id: Uuid) -> Option<&TestCase> {
        self.cases.iter().find(|c| c.id == id)
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}

/// Lifecycle of a test run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestRunStatus {
    Running,
    Done,
    Failed,
}

/// One execution of a corpus against a specific agent version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestRun {
    pub id: Uuid,
    pub corpus_id: Uuid,
    pub corpus_version: String,
    pub agent_version: String,
    pub status: TestRunStatus,
}

impl TestRun {
    pub fn new(corpus: &TestCorpus, agent_version: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            corpus_id: corpus.id,
            corpus_version: corpus.version.clone(),
            agent_version: agent_version.into(),
            status: TestRunStatus::Running,
        }
    }
}

/// One step of an agent's execution trace.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TraceStep {
    /// Step identifier (tool name, phase label, ...).
    pub id: String,

    /// Inputs the step received.
    #[serde(default)]
    pub inputs: Value,

    /// Intermediate reasoning, if the agent surfaced any.
    pub thought: Option<String>,

    /// Action taken.
    pub action: Option<String>,

    /// Observation returned to the agent.
    pub observation: Option<String>,
}

impl TraceStep {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_thought(mut self, thought: impl Into<String>) -> Self {
        self.thought = Some(thought.into());
        self
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    pub fn with_observation(mut self, observation: impl Into<String>) -> Self {
        self.observation = Some(observation.into());
        self
    }
}

/// How a simulation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationStatus {
    /// The agent returned an output within the deadline.
    Success,
    /// The per-case timeout expired.
    TimedOut,
    /// The agent invocation failed.
    Raised,
}

/// Captured result of executing one case against the agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationOutput {
    /// Final text response.
    pub text: Option<String>,

    /// Structured payload, if the agent produced one.
    pub structured_output: Option<Value>,

    /// Ordered execution trace.
    pub trace: Option<Vec<TraceStep>>,

    /// Wall-clock latency from invocation start to completion or timeout.
    pub latency: Duration,

    pub status: SimulationStatus,

    /// Failure description when `status` is not `Success`.
    pub error: Option<String>,
}

impl SimulationOutput {
    /// Measured latency in milliseconds
    pub fn latency_ms(&self) -> f64 {
        self.latency.as_secs_f64() * 1000.0
    }

    pub fn is_success(&self) -> bool {
        self.status == SimulationStatus::Success
    }
}

/// Score value: either a numeric score in `[0, 1]` or a pass/fail flag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScoreValue {
    Number(f64),
    Flag(bool),
}

impl ScoreValue {
    /// Numeric view; flags map to 0.0 / 1.0
    pub fn as_f64(&self) -> f64 {
        match self {
            ScoreValue::Number(n) => *n,
            ScoreValue::Flag(true) => 1.0,
            ScoreValue::Flag(false) => 0.0,
        }
    }
}

/// A named, bounded score produced by one grader. Immutable once produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Score {
    /// Grader name (e.g. "Latency", "Faithfulness").
    pub name: String,

    pub value: ScoreValue,

    pub passed: bool,

    /// Free-text explanation for the score.
    pub rationale: Option<String>,
}

impl Score {
    pub fn passing(name: impl Into<String>, rationale: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: ScoreValue::Flag(true),
            passed: true,
            rationale: Some(rationale.into()),
        }
    }

    pub fn failing(name: impl Into<String>, rationale: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: ScoreValue::Flag(false),
            passed: false,
            rationale: Some(rationale.into()),
        }
    }

    pub fn fractional(
        name: impl Into<String>,
        value: f64,
        passed: bool,
        rationale: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            value: ScoreValue::Number(value.clamp(0.0, 1.0)),
            passed,
            rationale: Some(rationale.into()),
        }
    }
}

/// A grader that malfunctioned on a case. Distinct from a failing score:
/// this means the harness broke, not the agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraderFailure {
    pub grader: String,
    pub message: String,
}

/// The graded outcome of one (run, case) pair. Created exactly once,
/// superseded only by a new run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    pub id: Uuid,
    pub run_id: Uuid,
    pub case_id: Uuid,
    pub output: SimulationOutput,
    pub scores: Vec<Score>,
    #[serde(default)]
    pub grader_failures: Vec<GraderFailure>,
    pub passed: bool,
}

/// An aggregated metric over a run (average latency, pass rate, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateMetric {
    pub name: String,
    pub value: f64,
    pub unit: Option<String>,
    /// Number of data points behind this aggregate.
    pub samples: usize,
}

/// Delta of one aggregate metric between two runs of the same corpus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriftMetric {
    pub name: String,
    pub unit: Option<String>,
    pub current: f64,
    pub previous: f64,
    /// Signed difference, current minus previous.
    pub delta: f64,
    /// True when the change points in the bad direction and exceeds the
    /// configured threshold.
    pub regressed: bool,
}

/// The immutable summary of one run: aggregates, drift flags and the full
/// result set, addressable by case id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportCard {
    pub id: Uuid,
    pub run_id: Uuid,
    pub corpus_id: Uuid,
    pub corpus_version: String,
    pub agent_version: String,
    pub created_at: DateTime<Utc>,

    pub total_cases: usize,
    pub passed_cases: usize,
    pub failed_cases: usize,
    /// passed / total, 0.0 for an empty run.
    pub pass_rate: f64,

    pub aggregates: Vec<AggregateMetric>,

    /// Per-grader malfunction counts, separate from failing scores.
    #[serde(default)]
    pub grader_errors: BTreeMap<String, usize>,

    /// Cases whose simulation timed out or raised.
    #[serde(default)]
    pub simulation_errors: usize,

    /// Drift versus the reference prior run, empty when none was supplied.
    #[serde(default)]
    pub drift: Vec<DriftMetric>,

    /// All results, keyed by case id.
    pub results: BTreeMap<Uuid, TestResult>,
}

impl ReportCard {
    /// Find an aggregate by name
    pub fn aggregate(&self, name: &str) -> Option<&AggregateMetric> {
        self.aggregates.iter().find(|a| a.name == name)
    }

    /// Result for a specific case
    pub fn result(&self, case_id: Uuid) -> Option<&TestResult> {
        self.results.get(&case_id)
    }
}
