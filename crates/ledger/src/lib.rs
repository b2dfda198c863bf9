//! Crash-recoverable rename ledger for in-flight deep repairs.
//!
//! A deep repair temporarily renames an install folder so the Steam client
//! believes the app is gone. The ledger is the durable record of every such
//! rename, persisted as a human-inspectable JSON list inside the library it
//! protects (`steamapps/relink-ledger.json`).
//!
//! The temp-name convention and the ledger are redundant safety nets: the
//! temp name is derived from the original by a fixed suffix, so recovery
//! can reverse a rename from the folder name alone even if the ledger file
//! is lost, and the ledger can reconstruct state even if the process
//! crashed mid-repair.

mod ledger;

pub use ledger::{RenameEntry, RenameLedger};

use std::path::PathBuf;

/// Fixed marker appended to a folder name while its app is mid-repair.
///
/// A configuration constant: recovery relies only on it being a fixed,
/// reversible suffix.
pub const TEMP_SUFFIX: &str = "_temp_rename";

/// Derives the temp folder name for an original folder name.
///
/// Deterministic, never random: a crash-recovered process must be able to
/// reconstruct the mapping without reading the ledger.
pub fn temp_name(original: &str) -> String {
    format!("{original}{TEMP_SUFFIX}")
}

/// Reverses [`temp_name`]. Returns `None` for names not bearing the marker.
pub fn original_name(temp: &str) -> Option<&str> {
    temp.strip_suffix(TEMP_SUFFIX).filter(|s| !s.is_empty())
}

/// Errors for ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("rename already in flight for {original_name:?} in {}", library_path.display())]
    RenameConflict {
        library_path: PathBuf,
        original_name: String,
    },

    #[error("no ledger entry for temp folder {temp_name:?} in {}", library_path.display())]
    EntryNotFound {
        library_path: PathBuf,
        temp_name: String,
    },

    #[error("install folder not found: {}", .0.display())]
    FolderNotFound(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
