//! Shortcut location providers.

use std::path::PathBuf;

/// Supplies candidate directories that may hold shortcuts.
///
/// Absence of a location is not an error; the engine skips directories
/// that do not exist.
pub trait ShortcutLocations {
    fn candidates(&self) -> Vec<PathBuf>;
}

impl ShortcutLocations for Vec<PathBuf> {
    fn candidates(&self) -> Vec<PathBuf> {
        self.clone()
    }
}

/// The well-known shortcut locations: desktop, the cloud-synced desktop
/// mirror, and the start-menu programs directory, resolved from the
/// environment.
pub struct KnownLocations;

impl ShortcutLocations for KnownLocations {
    fn candidates(&self) -> Vec<PathBuf> {
        let mut dirs = Vec::new();

        if let Some(profile) = std::env::var_os("USERPROFILE").map(PathBuf::from) {
            dirs.push(profile.join("Desktop"));
            dirs.push(profile.join("OneDrive").join("Desktop"));
        }
        if let Some(appdata) = std::env::var_os("APPDATA").map(PathBuf::from) {
            dirs.push(
                appdata
                    .join("Microsoft")
                    .join("Windows")
                    .join("Start Menu")
                    .join("Programs"),
            );
        }
        if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
            dirs.push(home.join("Desktop"));
        }

        dirs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vec_provider_passes_through() {
        let dirs = vec![PathBuf::from("/a"), PathBuf::from("/b")];
        assert_eq!(dirs.candidates(), dirs);
    }
}
