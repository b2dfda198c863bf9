//! Cached icon resolution.
//!
//! The client keeps per-app icons under `<client>/steam/games` with a
//! handful of naming conventions that changed across client versions. The
//! candidate order below is configuration, not contract: the engine's
//! guarantee is only that candidates are tried in this fixed order and the
//! first existing file wins.

use std::path::{Path, PathBuf};

/// Extensions tried per base name, in priority order.
pub const ICON_EXTENSIONS: &[&str] = &["ico", "png", "jpg"];

/// Returns the candidate icon file names for an app id, in priority order.
pub fn icon_candidates(app_id: &str) -> Vec<String> {
    let bases = [format!("{app_id}_icon"), app_id.to_string()];
    let mut names = Vec::with_capacity(bases.len() * ICON_EXTENSIONS.len());
    for base in &bases {
        for ext in ICON_EXTENSIONS {
            names.push(format!("{base}.{ext}"));
        }
    }
    names
}

/// Returns the first existing candidate icon in the cache directory.
pub fn resolve_icon(cache_dir: &Path, app_id: &str) -> Option<PathBuf> {
    icon_candidates(app_id)
        .into_iter()
        .map(|name| cache_dir.join(name))
        .find(|path| path.is_file())
}
