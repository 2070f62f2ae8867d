//! Drift detection between two runs of the same corpus
//!
//! Direction-aware: a latency increase and a score decrease are both
//! regressions; a latency decrease is never flagged however large. A
//! delta is only flagged once its magnitude exceeds the configured
//! threshold for its metric family.

use crate::config::DriftConfig;
use crate::model::{DriftMetric, ReportCard};
use tracing::warn;

/// Metrics measured in time regress upward; everything else (pass rate,
/// score averages) regresses downward.
fn lower_is_better(unit: Option<&str>) -> bool {
    matches!(
        unit.map(str::to_ascii_lowercase).as_deref(),
        Some("ms") | Some("s") | Some("seconds")
    )
}

fn threshold_for(unit: Option<&str>, config: &DriftConfig) -> f64 {
    if lower_is_better(unit) {
        config.latency_threshold_ms
    } else {
        config.score_threshold
    }
}

fn compare(
    name: &str,
    unit: Option<&str>,
    current: f64,
    previous: f64,
    config: &DriftConfig,
) -> DriftMetric {
    let delta = current - previous;
    let bad_direction = if lower_is_better(unit) {
        delta > 0.0
    } else {
        delta < 0.0
    };
    let regressed = bad_direction && delta.abs() > threshold_for(unit, config);

    if regressed {
        warn!(
            metric = name,
            current, previous, delta, "metric regressed beyond drift threshold"
        );
    }

    DriftMetric {
        name: name.to_string(),
        unit: unit.map(str::to_string),
        current,
        previous,
        delta,
        regressed,
    }
}

/// Compare a report against a prior run of the same corpus and return one
/// drift entry per metric present in both.
pub fn detect_drift(
    current: &ReportCard,
    previous: &ReportCard,
    config: &DriftConfig,
) -> Vec<DriftMetric> {
    let mut drift = Vec::new();

    drift.push(compare(
        "Pass Rate",
        Some("ratio"),
        current.pass_rate,
        previous.pass_rate,
        config,
    ));

    for aggregate in &current.aggregates {
        if let Some(prior) = previous.aggregate(&aggregate.name) {
            drift.push(compare(
                &aggregate.name,
                aggregate.unit.as_deref(),
                aggregate.value,
                prior.value,
                config,
            ));
        }
    }

    drift
}
