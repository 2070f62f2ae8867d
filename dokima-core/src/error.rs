//! Error types for Dokima operations

use crate::corpus::IngestionError;
use crate::grading::GradingError;

/// Result type for Dokima operations
pub type Result<T> = std::result::Result<T, DokimaError>;

/// Error types for the Dokima harness
#[derive(Debug, thiserror::Error)]
pub enum DokimaError {
    /// Corpus ingestion failed
    #[error("Ingestion error: {0}")]
    Ingestion(#[from] IngestionError),

    /// A grader malfunctioned
    #[error("Grading error: {0}")]
    Grading(#[from] GradingError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<String> for DokimaError {
    fn from(s: String) -> Self {
        DokimaError::Other(s)
    }
}

impl From<&str> for DokimaError {
    fn from(s: &str) -> Self {
        DokimaError::Other(s.to_string())
    }
}

impl From<anyhow::Error> for DokimaError {
    fn from(err: anyhow::Error) -> Self {
        DokimaError::Other(err.to_string())
    }
}
