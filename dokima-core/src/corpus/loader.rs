//! Corpus construction from a manifest or archive source

use super::archive;
use super::error::IngestionError;
use super::manifest::{self, RowFailure};
use crate::model::TestCorpus;
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::info;
use uuid::Uuid;

/// Where a corpus comes from.
#[derive(Debug, Clone)]
pub enum CorpusSource {
    /// A delimited tabular manifest.
    Csv(PathBuf),
    /// A line-delimited JSON manifest.
    Jsonl(PathBuf),
    /// An archive bundling one manifest plus referenced assets.
    Archive {
        path: PathBuf,
        extract_root: PathBuf,
    },
}

/// Identity of the corpus being created.
#[derive(Debug, Clone)]
pub struct CorpusDescriptor {
    pub project_id: String,
    pub name: String,
    pub version: String,
    pub created_by: String,
}

/// A loaded corpus plus the rows that were rejected during ingestion.
#[derive(Debug)]
pub struct CorpusLoad {
    pub corpus: TestCorpus,
    pub rejected: Vec<RowFailure>,
}

/// Loads and validates test corpora.
pub struct CorpusLoader;

impl CorpusLoader {
    /// Load a corpus from `source`, stamping every case with the new
    /// corpus identity.
    ///
    /// # Errors
    ///
    /// Structural problems (unreadable source, unparsable manifest,
    /// ambiguous archive, path traversal, duplicate case ids) fail the
    /// whole load. Row-level problems are returned in
    /// [`CorpusLoad::rejected`].
    pub fn load(
        source: &CorpusSource,
        descriptor: CorpusDescriptor,
    ) -> Result<CorpusLoad, IngestionError> {
        let load = match source {
            CorpusSource::Csv(path) => manifest::load_cases_from_csv(path)?,
            CorpusSource::Jsonl(path) => manifest::load_cases_from_jsonl(path)?,
            CorpusSource::Archive { path, extract_root } => {
                archive::load_from_archive(path, extract_root)?
            }
        };

        let mut seen = HashSet::with_capacity(load.cases.len());
        for case in &load.cases {
            if !seen.insert(case.id) {
                return Err(IngestionError::DuplicateCase(case.id));
            }
        }

        let mut corpus = TestCorpus {
            id: Uuid::new_v4(),
            project_id: descriptor.project_id,
            name: descriptor.name,
            version: descriptor.version,
            created_by: descriptor.created_by,
            cases: load.cases,
        };
        for case in &mut corpus.cases {
            case.corpus_id = corpus.id;
        }

        info!(
            corpus_id = %corpus.id,
            name = %corpus.name,
            version = %corpus.version,
            cases = corpus.cases.len(),
            rejected = load.rejected.len(),
            "loaded corpus"
        );

        Ok(CorpusLoad {
            corpus,
            rejected: load.rejected,
        })
    }
}

#[cfg(test)]
mod loader_tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_stamps_corpus_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cases.jsonl");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, r#"{{"inputs": {{"prompt": "a"}}}}"#).unwrap();
        writeln!(f, r#"{{"inputs": {{"prompt": "b"}}}}"#).unwrap();

        let load = CorpusLoader::load(
            &CorpusSource::Jsonl(path),
            CorpusDescriptor {
                project_id: "proj".to_string(),
                name: "smoke".to_string(),
                version: "1.0.0".to_string(),
                created_by: "tester".to_string(),
            },
        )
        .unwrap();

        assert_eq!(load.corpus.cases.len(), 2);
        assert!(load.corpus.cases.iter().all(|c| c.corpus_id == load.corpus.id));
    }

    #[test]
    fn test_duplicate_case_id_fails_load() {
        let id = Uuid::new_v4();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cases.jsonl");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, r#"{{"id": "{}", "inputs": {{"prompt": "a"}}}}"#, id).unwrap();
        writeln!(f, r#"{{"id": "{}", "inputs": {{"prompt": "b"}}}}"#, id).unwrap();

        let err = CorpusLoader::load(
            &CorpusSource::Jsonl(path),
            CorpusDescriptor {
                project_id: "proj".to_string(),
                name: "dup".to_string(),
                version: "1.0.0".to_string(),
                created_by: "tester".to_string(),
            },
        )
        .unwrap_err();

        assert!(matches!(err, IngestionError::DuplicateCase(found) if found == id));
    }
}
