//! Library directory layout and Steam client install discovery.

use std::path::{Path, PathBuf};

use crate::ScanError;

/// Resolves the fixed relative layout inside one Steam library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryPaths {
    root: PathBuf,
}

impl LibraryPaths {
    /// Wraps a library root directory (the directory containing `steamapps`).
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the library root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the directory holding `appmanifest_*.acf` files.
    pub fn manifest_dir(&self) -> PathBuf {
        self.root.join("steamapps")
    }

    /// Returns the directory holding the install folders.
    pub fn storage_dir(&self) -> PathBuf {
        self.manifest_dir().join("common")
    }

    /// Returns the path to `libraryfolders.vdf` for this library.
    pub fn library_folders_path(&self) -> PathBuf {
        self.manifest_dir().join("libraryfolders.vdf")
    }

    /// Returns the path of the rename ledger persisted inside this library.
    pub fn ledger_path(&self) -> PathBuf {
        self.manifest_dir().join("relink-ledger.json")
    }

    /// Returns the resolved install directory for a folder name under `common`.
    pub fn app_dir(&self, install_dir: &str) -> PathBuf {
        self.storage_dir().join(install_dir)
    }

    /// Recovers the library that owns a resolved install directory.
    ///
    /// An install directory is always `<root>/steamapps/common/<dir>`, so
    /// apps merged from linked libraries can be traced back to their own
    /// root. Returns `None` for paths not matching that layout.
    pub fn containing_app_dir(app_path: &Path) -> Option<Self> {
        let common = app_path.parent()?;
        if common.file_name()? != "common" {
            return None;
        }
        let steamapps = common.parent()?;
        if steamapps.file_name()? != "steamapps" {
            return None;
        }
        Some(Self::new(steamapps.parent()?))
    }
}

/// Locates the Steam client installation directory.
///
/// Windows checks the default install path and then the registry; Linux
/// checks the usual home-relative locations. Returns
/// [`ScanError::ClientNotFound`] when none exists.
pub fn client_install_dir() -> Result<PathBuf, ScanError> {
    platform_client_dir()
}

/// Returns the client's per-app icon cache directory.
pub fn icon_cache_dir(client_dir: &Path) -> PathBuf {
    client_dir.join("steam").join("games")
}

#[cfg(target_os = "windows")]
fn platform_client_dir() -> Result<PathBuf, ScanError> {
    crate::paths_windows::client_dir()
}

#[cfg(target_os = "linux")]
fn platform_client_dir() -> Result<PathBuf, ScanError> {
    crate::paths_linux::client_dir()
}

#[cfg(not(any(target_os = "windows", target_os = "linux")))]
fn platform_client_dir() -> Result<PathBuf, ScanError> {
    Err(ScanError::ClientNotFound)
}
