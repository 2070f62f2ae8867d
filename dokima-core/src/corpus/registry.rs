//! In-memory corpus registry enforcing the version-immutability invariant
//!
//! A run never holds the mutable source of a corpus, only an `Arc`
//! snapshot handed out here. Registering a second corpus under an
//! identity that already exists is rejected, so in-flight or completed
//! runs can never observe changed golden data without a version bump.

use super::error::IngestionError;
use crate::model::TestCorpus;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
struct CorpusKey {
    project_id: String,
    name: String,
    version: String,
}

impl CorpusKey {
    fn of(corpus: &TestCorpus) -> Self {
        Self {
            project_id: corpus.project_id.clone(),
            name: corpus.name.clone(),
            version: corpus.version.clone(),
        }
    }
}

/// Registry of immutable corpus snapshots keyed by (project, name, version).
pub struct CorpusRegistry {
    corpora: RwLock<HashMap<CorpusKey, Arc<TestCorpus>>>,
}

impl CorpusRegistry {
    pub fn new() -> Self {
        Self {
            corpora: RwLock::new(HashMap::new()),
        }
    }

    /// Register a corpus and return its shared snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`IngestionError::VersionConflict`] when a corpus with the
    /// same project, name and version is already registered.
    pub async fn register(&self, corpus: TestCorpus) -> Result<Arc<TestCorpus>, IngestionError> {
        let key = CorpusKey::of(&corpus);
        let mut corpora = self.corpora.write().await;
        if corpora.contains_key(&key) {
            return Err(IngestionError::VersionConflict {
                name: key.name,
                version: key.version,
            });
        }

        let snapshot = Arc::new(corpus);
        corpora.insert(key, Arc::clone(&snapshot));
        Ok(snapshot)
    }

    /// Fetch the snapshot for a specific corpus version.
    pub async fn get(
        &self,
        project_id: &str,
        name: &str,
        version: &str,
    ) -> Option<Arc<TestCorpus>> {
        let key = CorpusKey {
            project_id: project_id.to_string(),
            name: name.to_string(),
            version: version.to_string(),
        };
        self.corpora.read().await.get(&key).cloned()
    }

    pub async fn len(&self) -> usize {
        self.corpora.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.corpora.read().await.is_empty()
    }
}

impl Default for CorpusRegistry {
    fn default() -> Self {
        Self::new()
    }
}
