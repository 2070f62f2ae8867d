//! Ingestion error taxonomy
//!
//! Structural problems (unreadable archive, unparsable manifest, duplicate
//! ids, path escapes) are fatal to the whole load. Row-level problems are
//! isolated into [`RowFailure`](super::RowFailure) records by the loader.

use uuid::Uuid;

/// Errors raised while ingesting a corpus.
#[derive(Debug, thiserror::Error)]
pub enum IngestionError {
    /// The manifest itself is missing, ambiguous or unparsable.
    #[error("Manifest error: {0}")]
    Manifest(String),

    /// A row failed validation.
    #[error("Row {row}: {message}")]
    Row { row: usize, message: String },

    /// A JSON-encoded column inside a row failed to decode.
    #[error("Row {row}: invalid JSON in field '{field}': {message}")]
    Field {
        row: usize,
        field: String,
        message: String,
    },

    /// An asset path would resolve outside the extraction root. Never
    /// corrected silently; the whole load fails.
    #[error("Security error: path '{path}' escapes the extraction root")]
    PathTraversal { path: String },

    /// A referenced asset was not present after extraction.
    #[error("Case {case_id}: referenced asset not found: {path}")]
    MissingAsset { case_id: Uuid, path: String },

    /// Two cases in one corpus share an id.
    #[error("Duplicate case id: {0}")]
    DuplicateCase(Uuid),

    /// A corpus with this identity is already registered; cases are
    /// immutable once a run references them, so a version bump is required.
    #[error("Corpus '{name}' version {version} is already registered")]
    VersionConflict { name: String, version: String },

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
