//! Archive ingestion: safe extraction plus manifest and asset resolution
//!
//! An archive bundles exactly one manifest (tabular or line-delimited) at
//! any depth and zero or more asset files referenced by relative path.
//! Every path is resolved against a fixed extraction root and rejected if
//! it would land outside it. This is fail-closed: a traversal attempt
//! aborts the whole load, it is never clamped back inside the root.

use super::error::IngestionError;
use super::manifest::{self, ManifestLoad};
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};

/// Manifest flavor, detected from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ManifestKind {
    Csv,
    Jsonl,
}

fn manifest_kind(name: &str) -> Option<ManifestKind> {
    let lower = name.to_ascii_lowercase();
    if lower.ends_with(".csv") {
        Some(ManifestKind::Csv)
    } else if lower.ends_with(".jsonl") {
        Some(ManifestKind::Jsonl)
    } else {
        None
    }
}

/// Resolve `reference` against `root`, rejecting anything that would
/// escape it: absolute paths, `..` walking above the root, path prefixes.
fn resolve_within(root: &Path, reference: &Path) -> Result<PathBuf, IngestionError> {
    let traversal = || IngestionError::PathTraversal {
        path: reference.display().to_string(),
    };

    if reference.is_absolute() {
        return Err(traversal());
    }

    let mut resolved = root.to_path_buf();
    let mut depth: usize = 0;
    for component in reference.components() {
        match component {
            Component::Normal(part) => {
                resolved.push(part);
                depth += 1;
            }
            Component::ParentDir => {
                if depth == 0 {
                    return Err(traversal());
                }
                resolved.pop();
                depth -= 1;
            }
            Component::CurDir => {}
            Component::RootDir | Component::Prefix(_) => return Err(traversal()),
        }
    }

    Ok(resolved)
}

/// Extract the archive under `extract_root`, returning the relative path
/// and flavor of the single manifest entry.
fn extract_archive(
    archive_path: &Path,
    extract_root: &Path,
) -> Result<(PathBuf, ManifestKind), IngestionError> {
    let file = std::fs::File::open(archive_path)?;
    let mut archive = zip::ZipArchive::new(file)?;

    std::fs::create_dir_all(extract_root)?;

    let mut manifest_entry: Option<(PathBuf, ManifestKind)> = None;

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        let raw_name = entry.name().to_string();

        // enclosed_name() already refuses `..` and absolute entries; the
        // explicit resolve keeps the failure typed and fail-closed.
        let relative = entry
            .enclosed_name()
            .ok_or_else(|| IngestionError::PathTraversal {
                path: raw_name.clone(),
            })?;
        let destination = resolve_within(extract_root, &relative)?;

        if entry.is_dir() {
            std::fs::create_dir_all(&destination)?;
            continue;
        }

        if let Some(kind) = manifest_kind(&raw_name) {
            match manifest_entry {
                None => manifest_entry = Some((relative.clone(), kind)),
                Some((ref existing, _)) => {
                    return Err(IngestionError::Manifest(format!(
                        "Ambiguous archive content: multiple manifests ({} and {})",
                        existing.display(),
                        raw_name
                    )));
                }
            }
        }

        if let Some(parent) = destination.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut out = std::fs::File::create(&destination)?;
        io::copy(&mut entry, &mut out)?;
        debug!(entry = %raw_name, "extracted archive entry");
    }

    manifest_entry.ok_or_else(|| {
        IngestionError::Manifest("No manifest file (.csv or .jsonl) found in archive".to_string())
    })
}

/// Load test cases from an archive.
///
/// Asset references resolve relative to the manifest's directory inside
/// the archive. A reference that escapes the extraction root fails the
/// whole load with [`IngestionError::PathTraversal`]; a reference to a
/// file the archive did not contain fails only that case with
/// [`IngestionError::MissingAsset`]. Resolved absolute paths are written
/// back into each case's `files` list.
///
/// # Errors
///
/// Fails when the archive is unreadable, contains no manifest or more
/// than one, the manifest is unparsable, or any path escapes the root.
pub fn load_from_archive(
    archive_path: impl AsRef<Path>,
    extract_root: impl AsRef<Path>,
) -> Result<ManifestLoad, IngestionError> {
    let archive_path = archive_path.as_ref();
    let extract_root = extract_root.as_ref();

    let (manifest_rel, kind) = extract_archive(archive_path, extract_root)?;
    let manifest_path = extract_root.join(&manifest_rel);

    let mut load = match kind {
        ManifestKind::Csv => manifest::load_cases_from_csv(&manifest_path)?,
        ManifestKind::Jsonl => manifest::load_cases_from_jsonl(&manifest_path)?,
    };

    // Asset references are relative to the manifest's own directory.
    let manifest_dir = manifest_rel
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    let canonical_root = extract_root.canonicalize()?;

    let cases = std::mem::take(&mut load.cases);
    let mut resolved_cases = Vec::with_capacity(cases.len());
    for (idx, mut case) in cases.into_iter().enumerate() {
        let row = idx + 1;
        let mut resolved_files = Vec::with_capacity(case.inputs.files.len());
        let mut failure: Option<IngestionError> = None;

        for reference in &case.inputs.files {
            let relative = manifest_dir.join(reference);
            let resolved = resolve_within(extract_root, &relative)?;

            if !resolved.is_file() {
                failure = Some(IngestionError::MissingAsset {
                    case_id: case.id,
                    path: reference.clone(),
                });
                break;
            }

            // Existence is not enough: a symlink smuggled into the archive
            // could still point outside the root.
            let canonical = resolved.canonicalize()?;
            if !canonical.starts_with(&canonical_root) {
                return Err(IngestionError::PathTraversal {
                    path: reference.clone(),
                });
            }

            resolved_files.push(canonical.to_string_lossy().into_owned());
        }

        match failure {
            Some(error) => {
                tracing::warn!(case_id = %case.id, %error, "rejecting case");
                load.rejected.push(super::manifest::RowFailure { row, error });
            }
            None => {
                case.inputs.files = resolved_files;
                resolved_cases.push(case);
            }
        }
    }
    load.cases = resolved_cases;

    info!(
        archive = %archive_path.display(),
        cases = load.cases.len(),
        rejected = load.rejected.len(),
        "loaded corpus archive"
    );

    Ok(load)
}

#[cfg(test)]
mod resolve_tests {
    use super::*;

    #[test]
    fn test_resolve_plain_path() {
        let root = Path::new("/data/extract");
        let resolved = resolve_within(root, Path::new("files/doc.pdf")).unwrap();
        assert_eq!(resolved, PathBuf::from("/data/extract/files/doc.pdf"));
    }

    #[test]
    fn test_resolve_parent_inside_root() {
        // `folder/../doc.pdf` stays inside the root and is fine.
        let root = Path::new("/data/extract");
        let resolved = resolve_within(root, Path::new("folder/../doc.pdf")).unwrap();
        assert_eq!(resolved, PathBuf::from("/data/extract/doc.pdf"));
    }

    #[test]
    fn test_resolve_rejects_escape() {
        let root = Path::new("/data/extract");
        let err = resolve_within(root, Path::new("../../outside.pdf")).unwrap_err();
        assert!(matches!(err, IngestionError::PathTraversal { .. }));
    }

    #[test]
    fn test_resolve_rejects_absolute() {
        let root = Path::new("/data/extract");
        let err = resolve_within(root, Path::new("/etc/passwd")).unwrap_err();
        assert!(matches!(err, IngestionError::PathTraversal { .. }));
    }
}
