//! Shortcut icon repair ("quick fix").
//!
//! Windows `.url` shortcuts created by the Steam client point their
//! `IconFile` field into the client's per-app icon cache. When the cache
//! moves or the reference rots, the shortcut shows a blank icon even
//! though the app still launches. The quick fix walks the well-known
//! shortcut locations, finds shortcuts whose target uses the client's
//! run-by-id launch scheme, resolves the correct cached icon for each app
//! id, and rewrites only the icon reference in place.
//!
//! This is a targeted repair, not a shortcut linter: files that do not
//! belong to the client are skipped without a result.

pub mod engine;
pub mod icons;
pub mod locations;
pub mod url_file;

pub use engine::{ShortcutFixResult, quick_fix_shortcuts};
pub use icons::{ICON_EXTENSIONS, icon_candidates, resolve_icon};
pub use locations::{KnownLocations, ShortcutLocations};

/// Errors for a single shortcut repair. Reported per file, never fatal to
/// the batch.
#[derive(Debug, thiserror::Error)]
pub enum ShortcutError {
    #[error("malformed run id {0:?} in shortcut target")]
    MalformedRunId(String),

    #[error("no cached icon candidate exists for app {0}")]
    UnresolvedIcon(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
