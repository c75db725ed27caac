//! Fatal error taxonomy for the registry pipeline
//!
//! These are the configuration-class failures that abort a run immediately:
//! a missing or corrupt schema, a missing or empty target, nothing left to
//! index, or a failed index write. Per-document validation problems are not
//! errors in this sense - they are collected into the validation report.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal conditions that abort a validation or indexing run.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("failed to read schema {}", .path.display())]
    SchemaRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse schema {}", .path.display())]
    SchemaParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("target path does not exist: {}", .0.display())]
    MissingTarget(PathBuf),

    #[error("no kit documents found under {}", .0.display())]
    EmptyTarget(PathBuf),

    #[error("failed to scan {}", .path.display())]
    Scan {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("no valid kit documents to index under {}", .0.display())]
    NoValidDocuments(PathBuf),

    #[error("failed to encode index")]
    IndexEncode(#[source] serde_json::Error),

    #[error("failed to write index {}", .path.display())]
    IndexWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
