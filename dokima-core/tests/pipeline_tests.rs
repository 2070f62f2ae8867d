//! Integration tests for the full Run-Verify-Score pipeline
//!
//! These tests drive the real component chain end to end: an archived
//! corpus through the loader and registry, concurrent simulation against
//! a mock agent, deterministic and judge-based grading, and report
//! aggregation with drift flags.

use async_trait::async_trait;
use dokima_core::prelude::*;
use serde_json::{Map, Value};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use zip::write::SimpleFileOptions;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

/// Agent that answers from a canned script keyed by prompt substring and
/// honors injected tool errors.
struct ScriptedAgent {
    delay: Duration,
}

#[async_trait]
impl AgentRunner for ScriptedAgent {
    async fn invoke(
        &self,
        inputs: &TestCaseInput,
        _context: &Map<String, Value>,
        tool_mocks: &Map<String, Value>,
    ) -> anyhow::Result<AgentOutput> {
        tokio::time::sleep(self.delay).await;

        if let Some(mock) = tool_mocks.get("drug_db") {
            if mock.get("error").is_some() {
                return Ok(AgentOutput::text(
                    "The drug database is unavailable; unable to verify.",
                ));
            }
        }

        if inputs.prompt.contains("Drug A") {
            Ok(
                AgentOutput::text("No, Drug A is contraindicated for Condition B.").with_trace(
                    vec![
                        TraceStep::new("interaction_check")
                            .with_thought("Check known interactions for Drug A")
                            .with_observation("Condition B listed as contraindication"),
                        TraceStep::new("final_answer").with_action("answer"),
                    ],
                ),
            )
        } else {
            Ok(AgentOutput::text("I cannot help with that."))
        }
    }
}

/// Judge that replies with a fixed response per prompt family.
struct CannedJudge {
    reasoning_reply: String,
}

#[async_trait]
impl LLMJudge for CannedJudge {
    async fn complete(&self, prompt: &str) -> anyhow::Result<String> {
        if prompt.contains("reasoning steps") {
            Ok(self.reasoning_reply.clone())
        } else if prompt.contains("fact-checker") {
            Ok(r#"{"faithful": true, "reasoning": "Grounded in the context.", "score": 1.0}"#
                .to_string())
        } else {
            Ok(r#"{"matches_tone": true, "reasoning": "Tone is fine.", "score": 1.0}"#.to_string())
        }
    }
}

struct UnreachableJudge;

#[async_trait]
impl LLMJudge for UnreachableJudge {
    async fn complete(&self, _prompt: &str) -> anyhow::Result<String> {
        anyhow::bail!("judge endpoint unreachable")
    }
}

fn write_archive(dir: &std::path::Path) -> PathBuf {
    let manifest = concat!(
        r#"{"inputs": {"prompt": "Can I prescribe Drug A for Condition B?", "files": ["protocol.pdf"]}, "expectations": {"text": "contraindicated", "forbidden_content": ["Yes, you can"], "latency_threshold_ms": 2000, "reasoning": ["Check known interactions", "State the contraindication"]}}"#,
        "\n",
        r#"{"inputs": {"prompt": "What is the weather?"}, "expectations": {"forbidden_content": ["sunny"]}}"#,
        "\n",
    );

    let zip_path = dir.join("corpus.zip");
    let file = std::fs::File::create(&zip_path).unwrap();
    let mut writer = zip::ZipWriter::new(file);
    writer
        .start_file("manifest.jsonl", SimpleFileOptions::default())
        .unwrap();
    writer.write_all(manifest.as_bytes()).unwrap();
    writer
        .start_file("protocol.pdf", SimpleFileOptions::default())
        .unwrap();
    writer.write_all(b"%PDF-1.4 prescribing protocol").unwrap();
    writer.finish().unwrap();
    zip_path
}

fn descriptor(version: &str) -> CorpusDescriptor {
    CorpusDescriptor {
        project_id: "clinical".to_string(),
        name: "contraindications".to_string(),
        version: version.to_string(),
        created_by: "qa".to_string(),
    }
}

fn config(max_in_flight: usize) -> AssayConfig {
    let mut config = AssayConfig::default();
    config.simulation.case_timeout = Duration::from_secs(2);
    config.simulation.max_in_flight = max_in_flight;
    config
}

fn engine_with(
    judge: Arc<dyn LLMJudge>,
    delay: Duration,
    max_in_flight: usize,
) -> AssessmentEngine {
    let config = config(max_in_flight);
    let registry =
        GraderRegistry::deterministic(&config.grading).with_judge_graders(judge, &config.grading);
    AssessmentEngine::new(
        Simulator::new(Arc::new(ScriptedAgent { delay }), config.simulation.clone()),
        registry,
        config,
    )
}

#[tokio::test]
async fn test_archive_corpus_runs_to_report_card() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let zip_path = write_archive(dir.path());

    let load = CorpusLoader::load(
        &CorpusSource::Archive {
            path: zip_path,
            extract_root: dir.path().join("extracted"),
        },
        descriptor("1.0.0"),
    )
    .unwrap();
    assert!(load.rejected.is_empty());
    assert_eq!(load.corpus.cases.len(), 2);

    let registry = CorpusRegistry::new();
    let corpus = registry.register(load.corpus).await.unwrap();

    let judge = Arc::new(CannedJudge {
        reasoning_reply: serde_json::json!({
            "steps_analysis": [
                {"step": "Check known interactions", "found": true, "evidence": "interaction_check"},
                {"step": "State the contraindication", "found": true, "evidence": "final answer"}
            ]
        })
        .to_string(),
    });

    let report = engine_with(judge, Duration::from_millis(5), 4)
        .run_assay(Arc::clone(&corpus), "agent-draft-7", None, None)
        .await;

    // One result per case, addressable by case id.
    assert_eq!(report.total_cases, 2);
    for case in &corpus.cases {
        assert!(report.result(case.id).is_some());
    }

    let drug_case = corpus
        .cases
        .iter()
        .find(|c| c.inputs.prompt.contains("Drug A"))
        .unwrap();
    let result = report.result(drug_case.id).unwrap();
    assert!(result.passed);
    assert!(result.scores.iter().any(|s| s.name == "Reasoning" && s.value.as_f64() == 1.0));

    assert_eq!(report.pass_rate, 1.0);
    assert_eq!(report.simulation_errors, 0);
    assert!(report.grader_errors.is_empty());
    assert!(report.aggregate("Average Execution Latency").is_some());
}

#[tokio::test]
async fn test_aggregates_invariant_to_completion_order() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let zip_path = write_archive(dir.path());

    let load = CorpusLoader::load(
        &CorpusSource::Archive {
            path: zip_path,
            extract_root: dir.path().join("extracted"),
        },
        descriptor("1.0.0"),
    )
    .unwrap();
    let corpus = Arc::new(load.corpus);

    let judge = || {
        Arc::new(CannedJudge {
            reasoning_reply: serde_json::json!({
                "steps_analysis": [
                    {"step": "Check known interactions", "found": true},
                    {"step": "State the contraindication", "found": false}
                ]
            })
            .to_string(),
        })
    };

    // Serial execution and wide fan-out complete in different orders but
    // must fold to identical aggregates.
    let serial = engine_with(judge(), Duration::from_millis(2), 1)
        .run_assay(Arc::clone(&corpus), "agent-draft-7", None, None)
        .await;
    let fanned = engine_with(judge(), Duration::from_millis(2), 8)
        .run_assay(Arc::clone(&corpus), "agent-draft-7", None, None)
        .await;

    assert_eq!(serial.pass_rate, fanned.pass_rate);
    assert_eq!(serial.passed_cases, fanned.passed_cases);
    for name in ["Average Reasoning Score", "Average ForbiddenContent Score"] {
        assert_eq!(
            serial.aggregate(name).unwrap().value,
            fanned.aggregate(name).unwrap().value,
            "aggregate {} differs between completion orders",
            name
        );
    }
    // Partial credit carried through: 0.5 for the drug case (1 of 2
    // milestones) averaged with the vacuous pass of the second case.
    assert_eq!(serial.aggregate("Average Reasoning Score").unwrap().value, 0.75);
}

#[tokio::test]
async fn test_broken_judge_surfaces_as_grader_errors_not_failures() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let zip_path = write_archive(dir.path());

    let load = CorpusLoader::load(
        &CorpusSource::Archive {
            path: zip_path,
            extract_root: dir.path().join("extracted"),
        },
        descriptor("1.0.0"),
    )
    .unwrap();
    let corpus = Arc::new(load.corpus);
    let drug_case_id = corpus
        .cases
        .iter()
        .find(|c| c.inputs.prompt.contains("Drug A"))
        .unwrap()
        .id;

    let report = engine_with(Arc::new(UnreachableJudge), Duration::from_millis(2), 4)
        .run_assay(corpus, "agent-draft-8", None, None)
        .await;

    // The run still completes with a full report; the judge outage is
    // visible as per-grader error counts, not as missing results.
    assert_eq!(report.total_cases, 2);
    let result = report.result(drug_case_id).unwrap();
    assert!(result
        .grader_failures
        .iter()
        .any(|f| f.grader == "Reasoning"));
    // Deterministic graders still produced their scores.
    assert!(result.scores.iter().any(|s| s.name == "Latency"));
    assert!(result.scores.iter().any(|s| s.name == "ForbiddenContent"));
    assert_eq!(report.grader_errors.get("Reasoning"), Some(&1));
}

#[tokio::test]
async fn test_reingestion_requires_version_bump() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let zip_path = write_archive(dir.path());

    let source = CorpusSource::Archive {
        path: zip_path,
        extract_root: dir.path().join("extracted"),
    };
    let registry = CorpusRegistry::new();

    let first = CorpusLoader::load(&source, descriptor("1.0.0")).unwrap();
    let snapshot = registry.register(first.corpus).await.unwrap();

    // Same identity, no version bump: rejected, snapshot untouched.
    let second = CorpusLoader::load(&source, descriptor("1.0.0")).unwrap();
    let err = registry.register(second.corpus).await.unwrap_err();
    assert!(matches!(err, IngestionError::VersionConflict { .. }));
    assert_eq!(
        registry
            .get("clinical", "contraindications", "1.0.0")
            .await
            .unwrap()
            .id,
        snapshot.id
    );

    // Bumped version is a new corpus.
    let third = CorpusLoader::load(&source, descriptor("1.1.0")).unwrap();
    assert!(registry.register(third.corpus).await.is_ok());
}
