//! Assessment engine: the Run-Verify-Score orchestrator
//!
//! Fans the corpus out over a bounded pool of concurrent units, each one
//! `{simulate -> grade}` for a single case, then folds the completed
//! results into a [`ReportCard`]. Units share nothing but the read-only
//! corpus snapshot; a failing or timing-out case never disturbs its
//! siblings, and the run always produces a report.

use crate::config::AssayConfig;
use crate::grading::GraderRegistry;
use crate::model::{
    ReportCard, SimulationOutput, SimulationStatus, TestCase, TestCorpus, TestResult, TestRun,
    TestRunStatus,
};
use crate::report;
use crate::sim::Simulator;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info};
use uuid::Uuid;

/// Emitted as each case completes, in completion order.
#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub completed: usize,
    pub total: usize,
    pub result: TestResult,
}

/// Callback for streaming consumers.
pub type ProgressSink = Arc<dyn Fn(ProgressEvent) + Send + Sync>;

/// Orchestrates simulation and grading across an entire corpus.
pub struct AssessmentEngine {
    simulator: Arc<Simulator>,
    registry: GraderRegistry,
    config: AssayConfig,
}

impl AssessmentEngine {
    pub fn new(simulator: Simulator, registry: GraderRegistry, config: AssayConfig) -> Self {
        Self {
            simulator: Arc::new(simulator),
            registry,
            config,
        }
    }

    /// Execute the full assay lifecycle: Run -> Grade -> Report.
    ///
    /// Pass a `previous` ReportCard for the same corpus to get drift
    /// flags; pass a `progress` sink to receive each graded result as it
    /// completes (completion order, not corpus order).
    pub async fn run_assay(
        &self,
        corpus: Arc<TestCorpus>,
        agent_version: &str,
        previous: Option<&ReportCard>,
        progress: Option<ProgressSink>,
    ) -> ReportCard {
        let mut run = TestRun::new(&corpus, agent_version);
        let total = corpus.cases.len();
        info!(run_id = %run.id, corpus_id = %corpus.id, cases = total, "starting assay run");

        let semaphore = Arc::new(Semaphore::new(self.config.simulation.max_in_flight));
        let mut join_set: JoinSet<TestResult> = JoinSet::new();

        for case in corpus.cases.iter().cloned() {
            let semaphore = Arc::clone(&semaphore);
            let simulator = Arc::clone(&self.simulator);
            let registry = self.registry.clone();
            let run_id = run.id;

            join_set.spawn(async move {
                // The semaphore is never closed, so acquire cannot fail.
                let _permit = semaphore.acquire_owned().await.expect("semaphore closed");
                let output = simulator.run_case(&case).await;
                grade_case(&registry, run_id, &case, output).await
            });
        }

        let mut results: BTreeMap<Uuid, TestResult> = BTreeMap::new();
        while let Some(joined) = join_set.join_next().await {
            let result = match joined {
                Ok(result) => result,
                Err(e) => {
                    // A panicking unit is the unit's own failure; siblings
                    // keep running and the run still reports.
                    error!(run_id = %run.id, error = %e, "case task aborted");
                    continue;
                }
            };

            let case_id = result.case_id;
            results.insert(case_id, result.clone());

            if let Some(sink) = &progress {
                sink(ProgressEvent {
                    completed: results.len(),
                    total,
                    result,
                });
            }
        }

        run.status = TestRunStatus::Done;
        info!(run_id = %run.id, completed = results.len(), total, "assay run complete");

        report::build_report_card(
            &run,
            &corpus,
            results,
            previous,
            &self.config.drift,
        )
    }
}

/// Grade one simulated case and derive its overall verdict.
async fn grade_case(
    registry: &GraderRegistry,
    run_id: Uuid,
    case: &TestCase,
    output: SimulationOutput,
) -> TestResult {
    let (scores, grader_failures) = registry.grade_all(&output, case).await;

    // A case that never completed its simulation cannot pass, and an
    // unverified case (no scores at all) does not pass either.
    let passed = output.status == SimulationStatus::Success
        && !scores.is_empty()
        && scores.iter().all(|s| s.passed);

    TestResult {
        id: Uuid::new_v4(),
        run_id,
        case_id: case.id,
        output,
        scores,
        grader_failures,
        passed,
    }
}

impl std::fmt::Debug for AssessmentEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssessmentEngine")
            .field("graders", &self.registry.names())
            .field("max_in_flight", &self.config.simulation.max_in_flight)
            .field("case_timeout", &self.config.simulation.case_timeout)
            .finish()
    }
}
