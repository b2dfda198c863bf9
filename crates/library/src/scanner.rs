//! Installed-app scanner built on the manifest parser.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use relink_vdf::VdfNode;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::paths::LibraryPaths;
use crate::{ScanError, exclusions};

/// File name prefix of app manifests inside `steamapps`.
pub const MANIFEST_PREFIX: &str = "appmanifest_";

/// File name extension of app manifests.
pub const MANIFEST_EXT: &str = "acf";

/// One installed app as derived from its manifest.
///
/// Re-derived on every scan; carries no UI state. `path` is the fully
/// resolved install directory, `install_dir` the folder name under `common`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstalledApp {
    pub name: String,
    pub app_id: String,
    pub install_dir: String,
    pub path: PathBuf,
}

/// A per-file problem encountered while scanning. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase", tag = "kind")]
pub enum ScanWarning {
    /// A manifest that could not be read or parsed; the file was skipped.
    MalformedManifest { path: PathBuf, reason: String },
    /// An app whose resolved install directory does not exist on disk.
    MissingInstallDir {
        app_id: String,
        name: String,
        path: PathBuf,
    },
}

/// Result of scanning one library root and its linked libraries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    pub apps: Vec<InstalledApp>,
    pub warnings: Vec<ScanWarning>,
}

/// Scans a library root and every library linked from its
/// `libraryfolders.vdf`.
///
/// Read-only and idempotent: unchanged manifests yield an identical report,
/// sorted by display name. Per-manifest failures are aggregated into
/// [`ScanReport::warnings`]; only a missing root path is an error.
pub fn scan_games(root: &Path) -> Result<ScanReport, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::LibraryNotFound(root.to_path_buf()));
    }

    let libraries = expand_libraries(root);
    debug!(count = libraries.len(), "expanded library folders");

    let mut report = ScanReport::default();
    let mut seen_app_ids = HashSet::new();

    for library in &libraries {
        scan_library(library, &mut report, &mut seen_app_ids);
    }

    report
        .apps
        .sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.app_id.cmp(&b.app_id)));

    debug!(
        apps = report.apps.len(),
        warnings = report.warnings.len(),
        "scan complete"
    );
    Ok(report)
}

/// Returns the root library plus every extra library listed in
/// `libraryfolders.vdf` whose `steamapps` directory exists.
///
/// A missing or malformed `libraryfolders.vdf` yields just the root.
pub fn expand_libraries(root: &Path) -> Vec<LibraryPaths> {
    let primary = LibraryPaths::new(root);
    let folders_path = primary.library_folders_path();
    let mut libraries = vec![primary];

    let Ok(text) = fs::read_to_string(&folders_path) else {
        return libraries;
    };
    let parsed = match relink_vdf::parse(&text) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!(path = %folders_path.display(), error = %e, "skipping malformed libraryfolders.vdf");
            return libraries;
        }
    };

    let Some(VdfNode::Block(entries)) = parsed.get("libraryfolders") else {
        return libraries;
    };
    for entry in entries.values() {
        if let Some(path) = entry.get_str("path") {
            let library = LibraryPaths::new(path);
            if library.manifest_dir().is_dir()
                && !libraries.iter().any(|l| l.root() == library.root())
            {
                libraries.push(library);
            }
        }
    }

    libraries
}

fn scan_library(
    library: &LibraryPaths,
    report: &mut ScanReport,
    seen_app_ids: &mut HashSet<String>,
) {
    let manifest_dir = library.manifest_dir();
    let entries = match fs::read_dir(&manifest_dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!(path = %manifest_dir.display(), error = %e, "skipping unreadable library");
            return;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let Some(file_id) = manifest_file_id(&path) else {
            continue;
        };

        let app = match parse_manifest(library, &path, &file_id) {
            Ok(app) => app,
            Err(ScanError::MalformedManifest { path, reason }) => {
                warn!(path = %path.display(), reason = %reason, "skipping malformed manifest");
                report
                    .warnings
                    .push(ScanWarning::MalformedManifest { path, reason });
                continue;
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping manifest");
                report.warnings.push(ScanWarning::MalformedManifest {
                    path,
                    reason: e.to_string(),
                });
                continue;
            }
        };

        if exclusions::is_excluded(&app.name) {
            debug!(name = %app.name, "excluded non-game entry");
            continue;
        }
        // The same app can be listed by more than one library; keep the first.
        if !seen_app_ids.insert(app.app_id.clone()) {
            continue;
        }

        if app.path.is_dir() {
            report.apps.push(app);
        } else {
            report.warnings.push(ScanWarning::MissingInstallDir {
                app_id: app.app_id,
                name: app.name,
                path: app.path,
            });
        }
    }
}

/// Extracts the app id from an `appmanifest_<appid>.acf` file name.
fn manifest_file_id(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    if path.extension().and_then(|e| e.to_str()) != Some(MANIFEST_EXT) {
        return None;
    }
    let stem = name.strip_suffix(&format!(".{MANIFEST_EXT}"))?;
    let id = stem.strip_prefix(MANIFEST_PREFIX)?;
    if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(id.to_string())
}

fn parse_manifest(
    library: &LibraryPaths,
    path: &Path,
    file_id: &str,
) -> Result<InstalledApp, ScanError> {
    let text = fs::read_to_string(path).map_err(|e| malformed(path, format!("failed to read: {e}")))?;
    let root = relink_vdf::parse(&text).map_err(|e| malformed(path, e.to_string()))?;

    let state = root
        .get("AppState")
        .ok_or_else(|| malformed(path, "missing AppState block".into()))?;
    let app_id = state
        .get_str("appid")
        .ok_or_else(|| malformed(path, "missing appid field".into()))?;
    if app_id != file_id {
        return Err(malformed(
            path,
            format!("app id mismatch: file name says {file_id}, manifest says {app_id}"),
        ));
    }
    let name = state
        .get_str("name")
        .ok_or_else(|| malformed(path, "missing name field".into()))?;
    let install_dir = state
        .get_str("installdir")
        .ok_or_else(|| malformed(path, "missing installdir field".into()))?;

    Ok(InstalledApp {
        name: name.to_string(),
        app_id: app_id.to_string(),
        install_dir: install_dir.to_string(),
        path: library.app_dir(install_dir),
    })
}

fn malformed(path: &Path, reason: String) -> ScanError {
    ScanError::MalformedManifest {
        path: path.to_path_buf(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Writes a library skeleton with one manifest + install dir per app.
    fn write_library(root: &Path, apps: &[(&str, &str, &str)]) {
        let library = LibraryPaths::new(root);
        fs::create_dir_all(library.storage_dir()).unwrap();
        for (app_id, name, install_dir) in apps {
            write_manifest(root, app_id, name, install_dir);
            fs::create_dir_all(library.app_dir(install_dir)).unwrap();
        }
    }

    fn write_manifest(root: &Path, app_id: &str, name: &str, install_dir: &str) {
        let library = LibraryPaths::new(root);
        let text = format!(
            "\"AppState\"\n{{\n\t\"appid\"\t\t\"{app_id}\"\n\t\"name\"\t\t\"{name}\"\n\t\"installdir\"\t\t\"{install_dir}\"\n}}\n"
        );
        fs::write(
            library.manifest_dir().join(format!("appmanifest_{app_id}.acf")),
            text,
        )
        .unwrap();
    }

    #[test]
    fn scan_reports_apps_sorted_by_name() {
        let tmp = tempfile::tempdir().unwrap();
        write_library(
            tmp.path(),
            &[
                ("20", "Zeta Quest", "ZetaQuest"),
                ("10", "Alpha Blast", "AlphaBlast"),
            ],
        );

        let report = scan_games(tmp.path()).unwrap();
        assert!(report.warnings.is_empty());
        let names: Vec<_> = report.apps.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha Blast", "Zeta Quest"]);
        assert_eq!(report.apps[0].app_id, "10");
        assert_eq!(
            report.apps[0].path,
            LibraryPaths::new(tmp.path()).app_dir("AlphaBlast")
        );
    }

    #[test]
    fn corrupt_manifest_becomes_warning_not_failure() {
        let tmp = tempfile::tempdir().unwrap();
        write_library(
            tmp.path(),
            &[("10", "Alpha Blast", "AlphaBlast"), ("20", "Beta Run", "BetaRun")],
        );
        let corrupt = LibraryPaths::new(tmp.path())
            .manifest_dir()
            .join("appmanifest_30.acf");
        fs::write(&corrupt, "\"AppState\"\n{\n\t\"appid\" \"30\n").unwrap();

        let report = scan_games(tmp.path()).unwrap();
        assert_eq!(report.apps.len(), 2);
        assert_eq!(report.warnings.len(), 1);
        match &report.warnings[0] {
            ScanWarning::MalformedManifest { path, .. } => {
                assert!(path.ends_with("appmanifest_30.acf"));
            }
            other => panic!("expected MalformedManifest warning, got {other:?}"),
        }
    }

    #[test]
    fn scan_is_deterministic() {
        let tmp = tempfile::tempdir().unwrap();
        write_library(
            tmp.path(),
            &[
                ("10", "Alpha Blast", "AlphaBlast"),
                ("20", "Beta Run", "BetaRun"),
                ("30", "Gamma Drift", "GammaDrift"),
            ],
        );

        let first = scan_games(tmp.path()).unwrap();
        let second = scan_games(tmp.path()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn excluded_entries_never_appear() {
        let tmp = tempfile::tempdir().unwrap();
        write_library(
            tmp.path(),
            &[
                ("228980", "Steamworks Common Redistributables", "Steamworks Shared"),
                ("10", "Alpha Blast", "AlphaBlast"),
            ],
        );

        let report = scan_games(tmp.path()).unwrap();
        assert_eq!(report.apps.len(), 1);
        assert_eq!(report.apps[0].name, "Alpha Blast");
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn app_id_mismatch_is_malformed() {
        let tmp = tempfile::tempdir().unwrap();
        write_library(tmp.path(), &[]);
        let library = LibraryPaths::new(tmp.path());
        let text = "\"AppState\"\n{\n\t\"appid\"\t\t\"999\"\n\t\"name\"\t\t\"Mismatch\"\n\t\"installdir\"\t\t\"Mismatch\"\n}\n";
        fs::write(library.manifest_dir().join("appmanifest_10.acf"), text).unwrap();

        let report = scan_games(tmp.path()).unwrap();
        assert!(report.apps.is_empty());
        assert_eq!(report.warnings.len(), 1);
        match &report.warnings[0] {
            ScanWarning::MalformedManifest { reason, .. } => {
                assert!(reason.contains("mismatch"));
            }
            other => panic!("unexpected warning {other:?}"),
        }
    }

    #[test]
    fn missing_install_dir_is_reported() {
        let tmp = tempfile::tempdir().unwrap();
        write_library(tmp.path(), &[("10", "Alpha Blast", "AlphaBlast")]);
        write_manifest(tmp.path(), "20", "Ghost Game", "GhostDir");

        let report = scan_games(tmp.path()).unwrap();
        assert_eq!(report.apps.len(), 1);
        assert_eq!(report.warnings.len(), 1);
        match &report.warnings[0] {
            ScanWarning::MissingInstallDir { app_id, name, .. } => {
                assert_eq!(app_id, "20");
                assert_eq!(name, "Ghost Game");
            }
            other => panic!("unexpected warning {other:?}"),
        }
    }

    #[test]
    fn expand_libraries_follows_library_folders() {
        let tmp_a = tempfile::tempdir().unwrap();
        let tmp_b = tempfile::tempdir().unwrap();
        write_library(tmp_a.path(), &[("10", "Alpha Blast", "AlphaBlast")]);
        write_library(tmp_b.path(), &[("20", "Beta Run", "BetaRun")]);

        let folders = format!(
            "\"libraryfolders\"\n{{\n\t\"0\"\n\t{{\n\t\t\"path\"\t\t\"{}\"\n\t}}\n\t\"1\"\n\t{{\n\t\t\"path\"\t\t\"{}\"\n\t}}\n}}\n",
            tmp_a.path().display().to_string().replace('\\', "\\\\"),
            tmp_b.path().display().to_string().replace('\\', "\\\\"),
        );
        fs::write(
            LibraryPaths::new(tmp_a.path()).library_folders_path(),
            folders,
        )
        .unwrap();

        let libraries = expand_libraries(tmp_a.path());
        assert_eq!(libraries.len(), 2);

        let report = scan_games(tmp_a.path()).unwrap();
        let ids: Vec<_> = report.apps.iter().map(|a| a.app_id.as_str()).collect();
        assert_eq!(ids, vec!["10", "20"]);
    }

    #[test]
    fn manifest_file_id_convention() {
        assert_eq!(
            manifest_file_id(Path::new("/lib/steamapps/appmanifest_440.acf")),
            Some("440".into())
        );
        assert_eq!(manifest_file_id(Path::new("/lib/steamapps/appmanifest_.acf")), None);
        assert_eq!(manifest_file_id(Path::new("/lib/steamapps/appmanifest_x1.acf")), None);
        assert_eq!(manifest_file_id(Path::new("/lib/steamapps/other_440.acf")), None);
        assert_eq!(manifest_file_id(Path::new("/lib/steamapps/appmanifest_440.txt")), None);
    }

    #[test]
    fn missing_root_is_an_error() {
        let err = scan_games(Path::new("/nonexistent/library")).unwrap_err();
        assert!(matches!(err, ScanError::LibraryNotFound(_)));
    }
}
