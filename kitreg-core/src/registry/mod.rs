//! Registry tree conventions and document discovery
//!
//! A registry root contains:
//!
//! ```text
//! <root>/
//!   schema/kit.schema.json   <- the kit metadata schema
//!   kits/<type>/<slug>.json  <- one document per kit
//!   index.json               <- generated aggregate (overwritten each run)
//! ```

mod kit;

pub use kit::{KitMetadata, KitSummary, Stack};

use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

use crate::error::RegistryError;

/// Directory under the registry root holding kit documents.
pub const KITS_DIR: &str = "kits";

/// Schema location relative to the registry root.
pub const SCHEMA_FILE: &str = "schema/kit.schema.json";

/// Generated index location relative to the registry root.
pub const INDEX_FILE: &str = "index.json";

/// Collect kit documents under a target in deterministic (sorted) order.
///
/// The target may be a single document or a directory scanned recursively
/// for `.json` files. A missing target, or a directory with no documents,
/// is fatal: there is nothing meaningful to validate or index.
pub fn find_kit_documents(target: &Path) -> Result<Vec<PathBuf>, RegistryError> {
    if !target.exists() {
        return Err(RegistryError::MissingTarget(target.to_path_buf()));
    }

    if target.is_file() {
        return Ok(vec![target.to_path_buf()]);
    }

    let mut documents = Vec::new();
    for entry in WalkDir::new(target).sort_by_file_name() {
        let entry = entry.map_err(|source| RegistryError::Scan {
            path: target.to_path_buf(),
            source,
        })?;

        if entry.file_type().is_file()
            && entry.path().extension().is_some_and(|ext| ext == "json")
        {
            documents.push(entry.path().to_path_buf());
        }
    }

    if documents.is_empty() {
        return Err(RegistryError::EmptyTarget(target.to_path_buf()));
    }

    debug!("Found {} kit documents under {:?}", documents.len(), target);
    Ok(documents)
}

/// Name of the directory immediately containing a document.
///
/// The `type` field of every kit must equal this name.
pub fn parent_dir_name(path: &Path) -> Option<&str> {
    path.parent()
        .and_then(|p| p.file_name())
        .and_then(|n| n.to_str())
}

#[cfg(test)]
mod registry_tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_find_documents_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let saas = dir.path().join("saas");
        let api = dir.path().join("api");
        fs::create_dir_all(&saas).unwrap();
        fs::create_dir_all(&api).unwrap();
        fs::write(saas.join("zeta.json"), "{}").unwrap();
        fs::write(saas.join("alpha.json"), "{}").unwrap();
        fs::write(api.join("beta.json"), "{}").unwrap();
        fs::write(saas.join("README.md"), "not a document").unwrap();

        let docs = find_kit_documents(dir.path()).unwrap();
        let names: Vec<_> = docs
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["api/beta.json", "saas/alpha.json", "saas/zeta.json"]);
    }

    #[test]
    fn test_missing_target_is_fatal() {
        let err = find_kit_documents(Path::new("/nonexistent/kits")).unwrap_err();
        assert!(matches!(err, RegistryError::MissingTarget(_)));
    }

    #[test]
    fn test_empty_target_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = find_kit_documents(dir.path()).unwrap_err();
        assert!(matches!(err, RegistryError::EmptyTarget(_)));
    }

    #[test]
    fn test_single_file_target() {
        let dir = tempfile::tempdir().unwrap();
        let doc = dir.path().join("one.json");
        fs::write(&doc, "{}").unwrap();

        let docs = find_kit_documents(&doc).unwrap();
        assert_eq!(docs, vec![doc]);
    }

    #[test]
    fn test_parent_dir_name() {
        assert_eq!(parent_dir_name(Path::new("kits/saas/acme.json")), Some("saas"));
        assert_eq!(parent_dir_name(Path::new("acme.json")), None);
    }
}
