//! Configuration types for the Dokima harness

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main configuration for an assay run
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AssayConfig {
    /// Simulation harness configuration
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// Grading configuration
    #[serde(default)]
    pub grading: GradingConfig,

    /// Drift detection configuration
    #[serde(default)]
    pub drift: DriftConfig,
}

/// Simulation harness configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Per-case execution deadline
    #[serde(with = "humantime_serde")]
    pub case_timeout: Duration,

    /// Maximum number of cases simulated concurrently
    pub max_in_flight: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            case_timeout: Duration::from_secs(30),
            max_in_flight: 8,
        }
    }
}

/// Grading configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradingConfig {
    /// Latency budget applied when a case does not declare its own
    pub default_latency_threshold_ms: u64,

    /// Minimum reasoning-alignment score considered passing
    pub reasoning_pass_threshold: f64,
}

impl Default for GradingConfig {
    fn default() -> Self {
        Self {
            default_latency_threshold_ms: 5000,
            reasoning_pass_threshold: 1.0,
        }
    }
}

/// Drift detection thresholds. Deltas at or below the threshold are
/// reported but never flagged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriftConfig {
    /// Absolute delta (ms) beyond which a latency increase is a regression
    pub latency_threshold_ms: f64,

    /// Absolute delta beyond which a score/pass-rate decrease is a regression
    pub score_threshold: f64,
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self {
            latency_threshold_ms: 200.0,
            score_threshold: 0.05,
        }
    }
}

impl AssayConfig {
    /// Load configuration from file and environment variables.
    ///
    /// Loads in this order:
    /// 1. Default configuration
    /// 2. Configuration file (dokima.toml or path from DOKIMA_CONFIG_PATH)
    /// 3. Environment variable overrides
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file is invalid.
    pub fn load() -> crate::error::Result<Self> {
        use figment::{
            Figment,
            providers::{Env, Format, Toml},
        };

        let mut figment = Figment::new()
            .merge(Toml::file("dokima.toml"))
            .merge(Env::prefixed("DOKIMA_").split("_"));

        if let Ok(path) = std::env::var("DOKIMA_CONFIG_PATH") {
            figment = figment.merge(Toml::file(path));
        }

        let config: AssayConfig = figment.extract().map_err(|e| {
            crate::error::DokimaError::Configuration(format!("Failed to load configuration: {}", e))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::error::Result<Self> {
        use figment::{
            Figment,
            providers::{Format, Toml},
        };

        let config: AssayConfig = Figment::new()
            .merge(Toml::file(path))
            .extract()
            .map_err(|e| {
                crate::error::DokimaError::Configuration(format!(
                    "Failed to load configuration file: {}",
                    e
                ))
            })?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> crate::error::Result<()> {
        if self.simulation.max_in_flight == 0 {
            return Err(crate::error::DokimaError::Configuration(
                "simulation.max_in_flight must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.grading.reasoning_pass_threshold) {
            return Err(crate::error::DokimaError::Configuration(
                "grading.reasoning_pass_threshold must be within [0, 1]".to_string(),
            ));
        }
        Ok(())
    }
}
