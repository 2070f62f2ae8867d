//! Report building
//!
//! A pure fold over the completed result set: aggregation is invariant to
//! the order results were produced in, and a ReportCard is always built,
//! whatever errored along the way. Grader malfunctions are counted
//! separately from failing scores so operators can tell "the agent got it
//! wrong" from "the harness broke".

mod drift;

pub use drift::detect_drift;

use crate::config::DriftConfig;
use crate::model::{
    AggregateMetric, ReportCard, SimulationStatus, TestCorpus, TestResult, TestRun,
};
use chrono::Utc;
use std::collections::BTreeMap;
use uuid::Uuid;

pub(crate) const LATENCY_METRIC: &str = "Average Execution Latency";

/// Fold the results of one run into an immutable [`ReportCard`].
///
/// Per-grader aggregates are the mean of that grader's numeric score
/// values across the cases where it actually produced a Score; cases
/// where it malfunctioned are excluded from the mean and counted in
/// `grader_errors` instead.
pub fn build_report_card(
    run: &TestRun,
    corpus: &TestCorpus,
    results: BTreeMap<Uuid, TestResult>,
    previous: Option<&ReportCard>,
    drift_config: &DriftConfig,
) -> ReportCard {
    let total_cases = results.len();
    let passed_cases = results.values().filter(|r| r.passed).count();
    let failed_cases = total_cases - passed_cases;
    let pass_rate = if total_cases > 0 {
        passed_cases as f64 / total_cases as f64
    } else {
        0.0
    };

    let mut aggregates = Vec::new();

    // Raw execution latency over every case that ran, whatever its verdict.
    let latencies: Vec<f64> = results.values().map(|r| r.output.latency_ms()).collect();
    if !latencies.is_empty() {
        aggregates.push(AggregateMetric {
            name: LATENCY_METRIC.to_string(),
            value: latencies.iter().sum::<f64>() / latencies.len() as f64,
            unit: Some("ms".to_string()),
            samples: latencies.len(),
        });
    }

    // Scores grouped by grader name. BTreeMap keeps aggregate order
    // independent of result completion order.
    let mut score_groups: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    let mut grader_errors: BTreeMap<String, usize> = BTreeMap::new();

    for result in results.values() {
        for score in &result.scores {
            score_groups
                .entry(score.name.as_str())
                .or_default()
                .push(score.value.as_f64());
        }
        for failure in &result.grader_failures {
            *grader_errors.entry(failure.grader.clone()).or_insert(0) += 1;
        }
    }

    for (name, values) in &score_groups {
        aggregates.push(AggregateMetric {
            name: format!("Average {} Score", name),
            value: values.iter().sum::<f64>() / values.len() as f64,
            unit: Some("score".to_string()),
            samples: values.len(),
        });
    }

    let simulation_errors = results
        .values()
        .filter(|r| r.output.status != SimulationStatus::Success)
        .count();

    let mut card = ReportCard {
        id: Uuid::new_v4(),
        run_id: run.id,
        corpus_id: corpus.id,
        corpus_version: corpus.version.clone(),
        agent_version: run.agent_version.clone(),
        created_at: Utc::now(),
        total_cases,
        passed_cases,
        failed_cases,
        pass_rate,
        aggregates,
        grader_errors,
        simulation_errors,
        drift: Vec::new(),
        results,
    };

    if let Some(previous) = previous {
        card.drift = detect_drift(&card, previous, drift_config);
    }

    card
}

#[cfg(test)]
mod report_tests {
    use super::*;
    use crate::model::{
        GraderFailure, Score, ScoreValue, SimulationOutput, TestCase, TestCaseInput, TestCorpus,
    };
    use std::time::Duration;

    fn corpus() -> TestCorpus {
        TestCorpus {
            id: Uuid::new_v4(),
            project_id: "proj".to_string(),
            name: "golden".to_string(),
            version: "1.0.0".to_string(),
            created_by: "qa".to_string(),
            cases: vec![],
        }
    }

    fn result(
        run: &TestRun,
        latency_ms: u64,
        passed: bool,
        scores: Vec<Score>,
        grader_failures: Vec<GraderFailure>,
    ) -> TestResult {
        TestResult {
            id: Uuid::new_v4(),
            run_id: run.id,
            case_id: Uuid::new_v4(),
            output: SimulationOutput {
                text: None,
                structured_output: None,
                trace: None,
                latency: Duration::from_millis(latency_ms),
                status: SimulationStatus::Success,
                error: None,
            },
            scores,
            grader_failures,
            passed,
        }
    }

    fn collect(results: Vec<TestResult>) -> BTreeMap<Uuid, TestResult> {
        results.into_iter().map(|r| (r.case_id, r)).collect()
    }

    #[test]
    fn test_pass_rate_and_latency_aggregate() {
        let corpus = corpus();
        let run = TestRun::new(&corpus, "v1");
        let results = collect(vec![
            result(&run, 300, true, vec![Score::passing("Latency", "ok")], vec![]),
            result(&run, 500, false, vec![Score::failing("Latency", "slow")], vec![]),
        ]);

        let card = build_report_card(&run, &corpus, results, None, &DriftConfig::default());

        assert_eq!(card.total_cases, 2);
        assert_eq!(card.passed_cases, 1);
        assert_eq!(card.pass_rate, 0.5);
        let latency = card.aggregate(LATENCY_METRIC).unwrap();
        assert_eq!(latency.value, 400.0);
        assert_eq!(latency.samples, 2);
    }

    #[test]
    fn test_grader_mean_excludes_errors_but_counts_them() {
        let corpus = corpus();
        let run = TestRun::new(&corpus, "v1");
        let results = collect(vec![
            result(
                &run,
                100,
                true,
                vec![Score::fractional("Reasoning", 1.0, true, "all steps")],
                vec![],
            ),
            result(
                &run,
                100,
                true,
                vec![Score::fractional("Reasoning", 0.5, false, "half")],
                vec![],
            ),
            result(
                &run,
                100,
                false,
                vec![],
                vec![GraderFailure {
                    grader: "Reasoning".to_string(),
                    message: "judge down".to_string(),
                }],
            ),
        ]);

        let card = build_report_card(&run, &corpus, results, None, &DriftConfig::default());

        let agg = card.aggregate("Average Reasoning Score").unwrap();
        assert_eq!(agg.value, 0.75);
        assert_eq!(agg.samples, 2);
        assert_eq!(card.grader_errors.get("Reasoning"), Some(&1));
    }

    #[test]
    fn test_empty_run_still_reports() {
        let corpus = corpus();
        let run = TestRun::new(&corpus, "v1");

        let card =
            build_report_card(&run, &corpus, BTreeMap::new(), None, &DriftConfig::default());

        assert_eq!(card.total_cases, 0);
        assert_eq!(card.pass_rate, 0.0);
        assert!(card.aggregates.is_empty());
    }

    #[test]
    fn test_aggregation_invariant_to_completion_order() {
        let corpus = corpus();
        let run = TestRun::new(&corpus, "v1");
        let batch = vec![
            result(&run, 100, true, vec![Score::fractional("Faithfulness", 1.0, true, "a")], vec![]),
            result(&run, 200, true, vec![Score::fractional("Faithfulness", 0.0, false, "b")], vec![]),
            result(&run, 600, false, vec![Score::fractional("Faithfulness", 0.5, false, "c")], vec![]),
        ];

        let forward = collect(batch.clone());
        let reversed: BTreeMap<Uuid, TestResult> = batch
            .into_iter()
            .rev()
            .map(|r| (r.case_id, r))
            .collect();

        let card_a = build_report_card(&run, &corpus, forward, None, &DriftConfig::default());
        let card_b = build_report_card(&run, &corpus, reversed, None, &DriftConfig::default());

        assert_eq!(card_a.pass_rate, card_b.pass_rate);
        assert_eq!(
            card_a.aggregate("Average Faithfulness Score").unwrap().value,
            card_b.aggregate("Average Faithfulness Score").unwrap().value
        );
        assert_eq!(
            card_a.aggregate(LATENCY_METRIC).unwrap().value,
            card_b.aggregate(LATENCY_METRIC).unwrap().value
        );
    }

    #[test]
    fn test_flag_scores_average_as_zero_or_one() {
        let corpus = corpus();
        let run = TestRun::new(&corpus, "v1");
        let results = collect(vec![
            result(
                &run,
                10,
                true,
                vec![Score {
                    name: "ForbiddenContent".to_string(),
                    value: ScoreValue::Flag(true),
                    passed: true,
                    rationale: None,
                }],
                vec![],
            ),
            result(
                &run,
                10,
                false,
                vec![Score {
                    name: "ForbiddenContent".to_string(),
                    value: ScoreValue::Flag(false),
                    passed: false,
                    rationale: None,
                }],
                vec![],
            ),
        ]);

        let card = build_report_card(&run, &corpus, results, None, &DriftConfig::default());
        assert_eq!(
            card.aggregate("Average ForbiddenContent Score").unwrap().value,
            0.5
        );
    }
}
