//! Ledger store and rename operations.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

use chrono::{DateTime, Utc};
use relink_library::LibraryPaths;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{LedgerError, original_name, temp_name};

/// One in-flight rename, keyed by `(library_path, original_name)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameEntry {
    pub app_id: String,
    pub library_path: PathBuf,
    pub original_name: String,
    pub temp_name: String,
    pub created_at: DateTime<Utc>,
}

/// The rename ledger for one library.
///
/// All mutating operations are serialized by a process-wide per-library
/// lock, and reload the persisted list under that lock, so two ledger
/// handles for the same library never race on the file.
pub struct RenameLedger {
    library: LibraryPaths,
    lock: Arc<Mutex<()>>,
}

impl RenameLedger {
    /// Opens the ledger for a library. The persisted file is created lazily
    /// on the first rename.
    pub fn open(library: LibraryPaths) -> Self {
        let lock = library_lock(library.root());
        Self { library, lock }
    }

    /// Returns the library this ledger protects.
    pub fn library(&self) -> &LibraryPaths {
        &self.library
    }

    /// Returns the current persisted entries.
    pub fn entries(&self) -> Result<Vec<RenameEntry>, LedgerError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        self.load()
    }

    /// Renames an install folder out of the way and records the rename.
    ///
    /// Returns the temp folder name. Fails with
    /// [`LedgerError::RenameConflict`] if an entry is already outstanding
    /// for this folder, or if a directory bearing the computed temp name
    /// exists — at most one in-flight repair per install directory, and an
    /// existing temp folder is never renamed over.
    pub fn begin_rename(&self, app_id: &str, original: &str) -> Result<String, LedgerError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut entries = self.load()?;

        if entries.iter().any(|e| e.original_name == original) {
            return Err(LedgerError::RenameConflict {
                library_path: self.library.root().to_path_buf(),
                original_name: original.to_string(),
            });
        }

        let original_path = self.library.app_dir(original);
        if !original_path.is_dir() {
            return Err(LedgerError::FolderNotFound(original_path));
        }

        let temp = temp_name(original);
        let temp_path = self.library.app_dir(&temp);
        if temp_path.exists() {
            return Err(LedgerError::RenameConflict {
                library_path: self.library.root().to_path_buf(),
                original_name: original.to_string(),
            });
        }

        fs::rename(&original_path, &temp_path)?;

        entries.push(RenameEntry {
            app_id: app_id.to_string(),
            library_path: self.library.root().to_path_buf(),
            original_name: original.to_string(),
            temp_name: temp.clone(),
            created_at: Utc::now(),
        });
        self.persist(&entries)?;

        info!(app_id, original, temp = %temp, "renamed install folder out");
        Ok(temp)
    }

    /// Renames a temp folder back to its recorded original name and drops
    /// the entry.
    ///
    /// Fails with [`LedgerError::EntryNotFound`] if no entry matches the
    /// temp name; that means something outside a repair touched the folder
    /// and is surfaced, not ignored.
    pub fn revert_rename(&self, temp: &str) -> Result<(), LedgerError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut entries = self.load()?;

        let Some(index) = entries.iter().position(|e| e.temp_name == temp) else {
            return Err(LedgerError::EntryNotFound {
                library_path: self.library.root().to_path_buf(),
                temp_name: temp.to_string(),
            });
        };

        let entry = &entries[index];
        let temp_path = self.library.app_dir(&entry.temp_name);
        let original_path = self.library.app_dir(&entry.original_name);
        fs::rename(&temp_path, &original_path)?;

        let entry = entries.remove(index);
        self.persist(&entries)?;

        info!(app_id = %entry.app_id, original = %entry.original_name, "reverted install folder");
        Ok(())
    }

    /// Restores every temp-named folder left behind by an interrupted
    /// repair.
    ///
    /// The naming convention is the authoritative signal: the storage
    /// directory is swept for folders bearing [`crate::TEMP_SUFFIX`]
    /// whether or not the ledger still has an entry for them. Matching
    /// ledger entries are dropped. Returns the restored original folder
    /// names; idempotent, so a second run returns an empty list.
    pub fn cleanup_orphans(&self) -> Result<Vec<String>, LedgerError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut entries = self.load()?;
        let mut restored = Vec::new();

        let storage_dir = self.library.storage_dir();
        if let Ok(dir) = fs::read_dir(&storage_dir) {
            for dir_entry in dir.flatten() {
                let file_name = dir_entry.file_name();
                let Some(name) = file_name.to_str() else {
                    continue;
                };
                let Some(original) = original_name(name) else {
                    continue;
                };
                if !dir_entry.path().is_dir() {
                    continue;
                }

                let original_path = storage_dir.join(original);
                if original_path.exists() {
                    // Both folders present: restoring would clobber one of
                    // them, so leave it for the user to resolve.
                    warn!(temp = name, original, "both temp and original folder exist, not restoring");
                    continue;
                }

                fs::rename(dir_entry.path(), &original_path)?;
                debug!(temp = name, original, "restored orphaned folder");
                restored.push(original.to_string());
            }
        }

        // Drop entries whose temp folder is gone (restored above, or
        // already reverted by other means).
        let before = entries.len();
        entries.retain(|e| self.library.app_dir(&e.temp_name).is_dir());
        if entries.len() != before || !restored.is_empty() {
            self.persist(&entries)?;
        }

        if !restored.is_empty() {
            info!(count = restored.len(), "cleanup restored orphaned folders");
        }
        Ok(restored)
    }

    fn load(&self) -> Result<Vec<RenameEntry>, LedgerError> {
        let path = self.library.ledger_path();
        match fs::read_to_string(&path) {
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Writes the entries as pretty-printed JSON so the file stays
    /// readable as a last line of defense after a crash.
    fn persist(&self, entries: &[RenameEntry]) -> Result<(), LedgerError> {
        let path = self.library.ledger_path();
        if entries.is_empty() {
            if let Err(e) = fs::remove_file(&path)
                && e.kind() != std::io::ErrorKind::NotFound
            {
                return Err(e.into());
            }
            return Ok(());
        }
        let text = serde_json::to_string_pretty(entries)?;
        fs::write(&path, text)?;
        Ok(())
    }
}

/// Returns the process-wide mutation lock for a library root.
fn library_lock(root: &Path) -> Arc<Mutex<()>> {
    static LOCKS: OnceLock<Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>> = OnceLock::new();
    let locks = LOCKS.get_or_init(|| Mutex::new(HashMap::new()));
    let mut map = locks.lock().unwrap_or_else(|e| e.into_inner());
    map.entry(root.to_path_buf()).or_default().clone()
}
