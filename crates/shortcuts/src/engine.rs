//! The quick-fix engine: examine shortcuts, resolve icons, rewrite in place.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use relink_library::{InstalledApp, exclusions};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::locations::ShortcutLocations;
use crate::{ShortcutError, icons, url_file};

/// Outcome of examining one client shortcut. Purely transient, one per
/// shortcut file; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortcutFixResult {
    pub name: String,
    pub game_id: String,
    pub icon_url: String,
    pub location: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Repairs the icon reference of every client shortcut found in the
/// provided locations.
///
/// `apps` is the current scan output, used for the app-id to display-name
/// mapping and the exclusion re-filter. Shortcuts that do not target the
/// client's run-by-id scheme are skipped without a result; per-shortcut
/// failures are reported in their result and never abort the batch. The
/// shortcut file itself is never deleted or moved.
pub fn quick_fix_shortcuts(
    locations: &dyn ShortcutLocations,
    icon_cache: &Path,
    apps: &[InstalledApp],
) -> Vec<ShortcutFixResult> {
    let names: HashMap<&str, &str> = apps
        .iter()
        .map(|app| (app.app_id.as_str(), app.name.as_str()))
        .collect();

    let mut results = Vec::new();
    for dir in locations.candidates() {
        if !dir.is_dir() {
            continue;
        }
        let location = dir
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("unknown")
            .to_string();

        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(path = %dir.display(), error = %e, "skipping unreadable shortcut location");
                continue;
            }
        };

        let mut files: Vec<PathBuf> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| is_url_file(path))
            .collect();
        files.sort();

        for path in files {
            if let Some(result) = fix_one(&path, icon_cache, &names, &location) {
                results.push(result);
            }
        }
    }

    info!(
        examined = results.len(),
        fixed = results.iter().filter(|r| r.success).count(),
        "quick fix complete"
    );
    results
}

fn is_url_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("url"))
}

/// Examines one shortcut file. Returns `None` for files that are not
/// client shortcuts or belong to excluded entries.
fn fix_one(
    path: &Path,
    icon_cache: &Path,
    names: &HashMap<&str, &str>,
    location: &str,
) -> Option<ShortcutFixResult> {
    let stem = path
        .file_stem()
        .and_then(|name| name.to_str())
        .unwrap_or("unknown")
        .to_string();

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            return Some(failure(
                stem,
                String::new(),
                location,
                format!("failed to read shortcut: {e}"),
            ));
        }
    };

    let game_id = match url_file::run_game_id(&content) {
        Ok(Some(id)) => id,
        Ok(None) => {
            debug!(path = %path.display(), "not a client shortcut, skipping");
            return None;
        }
        Err(e) => return Some(failure(stem, String::new(), location, e.to_string())),
    };

    let display_name = names
        .get(game_id.as_str())
        .copied()
        .unwrap_or(stem.as_str())
        .to_string();
    if exclusions::is_excluded(&display_name) {
        debug!(name = %display_name, "excluded entry, skipping shortcut");
        return None;
    }

    let Some(icon_path) = icons::resolve_icon(icon_cache, &game_id) else {
        let error = ShortcutError::UnresolvedIcon(game_id.clone()).to_string();
        return Some(failure(display_name, game_id, location, error));
    };
    let icon = icon_path.to_string_lossy().into_owned();

    if url_file::icon_file(&content) == Some(icon.as_str()) {
        // Already correct counts as success; nothing is written.
        return Some(success(display_name, game_id, icon, location));
    }

    let updated = url_file::with_icon_file(&content, &icon);
    if let Err(e) = fs::write(path, updated) {
        return Some(failure(
            display_name,
            game_id,
            location,
            format!("failed to rewrite shortcut: {e}"),
        ));
    }

    debug!(path = %path.display(), icon = %icon, "rewrote shortcut icon reference");
    Some(success(display_name, game_id, icon, location))
}

fn success(name: String, game_id: String, icon: String, location: &str) -> ShortcutFixResult {
    ShortcutFixResult {
        name,
        game_id,
        icon_url: icon,
        location: location.to_string(),
        success: true,
        error: None,
    }
}

fn failure(name: String, game_id: String, location: &str, error: String) -> ShortcutFixResult {
    ShortcutFixResult {
        name,
        game_id,
        icon_url: String::new(),
        location: location.to_string(),
        success: false,
        error: Some(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app(app_id: &str, name: &str) -> InstalledApp {
        InstalledApp {
            name: name.to_string(),
            app_id: app_id.to_string(),
            install_dir: name.replace(' ', ""),
            path: PathBuf::from("/lib/steamapps/common").join(name.replace(' ', "")),
        }
    }

    fn write_shortcut(dir: &Path, file: &str, game_id: &str, icon: &str) {
        let content = format!(
            "[InternetShortcut]\r\nURL=steam://rungameid/{game_id}\r\nIconFile={icon}\r\nIconIndex=0\r\n"
        );
        fs::write(dir.join(file), content).unwrap();
    }

    #[test]
    fn fixes_client_shortcuts_and_skips_others() {
        let desktop = tempfile::tempdir().unwrap();
        let cache = tempfile::tempdir().unwrap();
        fs::write(cache.path().join("10_icon.ico"), "icon").unwrap();
        fs::write(cache.path().join("20.ico"), "icon").unwrap();

        write_shortcut(desktop.path(), "Alpha Blast.url", "10", "C:\\stale\\10.ico");
        write_shortcut(desktop.path(), "Beta Run.url", "20", "C:\\stale\\20.ico");
        fs::write(
            desktop.path().join("Website.url"),
            "[InternetShortcut]\r\nURL=https://example.com/\r\n",
        )
        .unwrap();

        let apps = [app("10", "Alpha Blast"), app("20", "Beta Run")];
        let locations = vec![desktop.path().to_path_buf()];
        let results = quick_fix_shortcuts(&locations, cache.path(), &apps);

        // The non-client shortcut is omitted entirely.
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.success));
        assert_eq!(results[0].name, "Alpha Blast");
        assert_eq!(results[0].game_id, "10");
        assert_eq!(
            results[0].icon_url,
            cache.path().join("10_icon.ico").to_string_lossy()
        );

        // The rewrite touched only the icon line.
        let content = fs::read_to_string(desktop.path().join("Alpha Blast.url")).unwrap();
        assert!(content.starts_with("[InternetShortcut]\r\nURL=steam://rungameid/10\r\n"));
        assert!(content.contains(&format!(
            "IconFile={}\r\n",
            cache.path().join("10_icon.ico").display()
        )));
        assert!(content.ends_with("IconIndex=0\r\n"));

        // The non-client shortcut was not modified.
        let untouched = fs::read_to_string(desktop.path().join("Website.url")).unwrap();
        assert_eq!(untouched, "[InternetShortcut]\r\nURL=https://example.com/\r\n");
    }

    #[test]
    fn already_correct_is_a_successful_noop() {
        let desktop = tempfile::tempdir().unwrap();
        let cache = tempfile::tempdir().unwrap();
        fs::write(cache.path().join("10_icon.ico"), "icon").unwrap();
        let icon = cache.path().join("10_icon.ico").display().to_string();
        write_shortcut(desktop.path(), "Alpha.url", "10", &icon);
        let before = fs::read_to_string(desktop.path().join("Alpha.url")).unwrap();

        let locations = vec![desktop.path().to_path_buf()];
        let results = quick_fix_shortcuts(&locations, cache.path(), &[app("10", "Alpha Blast")]);

        assert_eq!(results.len(), 1);
        assert!(results[0].success);
        let after = fs::read_to_string(desktop.path().join("Alpha.url")).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn unresolved_icon_is_reported_not_fatal() {
        let desktop = tempfile::tempdir().unwrap();
        let cache = tempfile::tempdir().unwrap();
        fs::write(cache.path().join("10_icon.ico"), "icon").unwrap();
        write_shortcut(desktop.path(), "Alpha.url", "10", "stale.ico");
        write_shortcut(desktop.path(), "Ghost.url", "30", "stale.ico");

        let locations = vec![desktop.path().to_path_buf()];
        let results = quick_fix_shortcuts(&locations, cache.path(), &[app("10", "Alpha Blast")]);

        assert_eq!(results.len(), 2);
        let ghost = results.iter().find(|r| r.game_id == "30").unwrap();
        assert!(!ghost.success);
        assert!(ghost.error.as_deref().unwrap().contains("icon"));
        // The other shortcut was still fixed.
        assert!(results.iter().any(|r| r.game_id == "10" && r.success));
    }

    #[test]
    fn malformed_run_id_is_reported() {
        let desktop = tempfile::tempdir().unwrap();
        let cache = tempfile::tempdir().unwrap();
        fs::write(
            desktop.path().join("Broken.url"),
            "URL=steam://rungameid/oops\n",
        )
        .unwrap();

        let locations = vec![desktop.path().to_path_buf()];
        let results = quick_fix_shortcuts(&locations, cache.path(), &[]);

        assert_eq!(results.len(), 1);
        assert!(!results[0].success);
        assert_eq!(results[0].name, "Broken");
    }

    #[test]
    fn unreadable_shortcut_is_reported() {
        let desktop = tempfile::tempdir().unwrap();
        let cache = tempfile::tempdir().unwrap();
        // Invalid UTF-8 makes the file unreadable as text.
        fs::write(desktop.path().join("Bad.url"), [0xff, 0xfe, 0x00, 0xd8]).unwrap();

        let locations = vec![desktop.path().to_path_buf()];
        let results = quick_fix_shortcuts(&locations, cache.path(), &[]);

        assert_eq!(results.len(), 1);
        assert!(!results[0].success);
        assert!(results[0].error.as_deref().unwrap().contains("read"));
    }

    #[test]
    fn excluded_entries_never_appear_in_output() {
        let desktop = tempfile::tempdir().unwrap();
        let cache = tempfile::tempdir().unwrap();
        fs::write(cache.path().join("1493710_icon.ico"), "icon").unwrap();
        write_shortcut(desktop.path(), "Proton.url", "1493710", "stale.ico");

        let apps = [app("1493710", "Proton Experimental")];
        let locations = vec![desktop.path().to_path_buf()];
        let results = quick_fix_shortcuts(&locations, cache.path(), &apps);

        assert!(results.is_empty());
    }

    #[test]
    fn absent_locations_are_not_an_error() {
        let cache = tempfile::tempdir().unwrap();
        let locations = vec![PathBuf::from("/nonexistent/Desktop")];
        let results = quick_fix_shortcuts(&locations, cache.path(), &[]);
        assert!(results.is_empty());
    }
}
