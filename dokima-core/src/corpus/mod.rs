//! Corpus ingestion
//!
//! Parses tabular, line-delimited or archived test-case definitions into
//! a validated, immutable [`TestCorpus`](crate::model::TestCorpus):
//! - CSV and JSONL manifests decode into one canonical case shape
//! - Archives are extracted under a fixed root with fail-closed path
//!   containment
//! - Row-level problems are isolated; structural problems fail the load
//!
//! # Example
//!
//! ```rust,no_run
//! use dokima_core::corpus::{CorpusDescriptor, CorpusLoader, CorpusSource};
//!
//! let load = CorpusLoader::load(
//!     &CorpusSource::Archive {
//!         path: "bec.zip".into(),
//!         extract_root: "./data/extracted".into(),
//!     },
//!     CorpusDescriptor {
//!         project_id: "clinical".into(),
//!         name: "contraindications".into(),
//!         version: "1.2.0".into(),
//!         created_by: "qa".into(),
//!     },
//! )?;
//! println!("{} cases, {} rejected", load.corpus.cases.len(), load.rejected.len());
//! # Ok::<(), dokima_core::corpus::IngestionError>(())
//! ```

mod archive;
mod error;
mod loader;
mod manifest;
mod registry;

pub use archive::load_from_archive;
pub use error::IngestionError;
pub use loader::{CorpusDescriptor, CorpusLoad, CorpusLoader, CorpusSource};
pub use manifest::{ManifestLoad, RowFailure, load_cases_from_csv, load_cases_from_jsonl};
pub use registry::CorpusRegistry;
