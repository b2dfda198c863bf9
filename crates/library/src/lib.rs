//! Steam library layout and installed-app scanning.
//!
//! A *library* is a root directory holding a `steamapps` subdirectory with
//! one `appmanifest_<appid>.acf` file per installed app and a `common`
//! subdirectory with the install folders themselves. This crate resolves
//! that layout, expands extra libraries out of `libraryfolders.vdf`, and
//! scans manifests into [`InstalledApp`] records.
//!
//! Scanning is read-only and deterministic: the same on-disk state always
//! yields the same report. Per-file problems become [`ScanWarning`]s — one
//! bad manifest never hides the rest of the library.

pub mod exclusions;
pub mod paths;
#[cfg(target_os = "linux")]
mod paths_linux;
#[cfg(target_os = "windows")]
mod paths_windows;
pub mod scanner;

pub use exclusions::is_excluded;
pub use paths::{LibraryPaths, client_install_dir, icon_cache_dir};
pub use scanner::{InstalledApp, ScanReport, ScanWarning, expand_libraries, scan_games};

use std::path::PathBuf;

/// Errors for library and scan operations.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("steam client installation not found")]
    ClientNotFound,

    #[error("library path does not exist: {}", .0.display())]
    LibraryNotFound(PathBuf),

    #[error("malformed manifest {}: {reason}", path.display())]
    MalformedManifest { path: PathBuf, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
