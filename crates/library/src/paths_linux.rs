use std::path::PathBuf;

use crate::ScanError;

/// Returns the Steam client directory on Linux systems.
pub(crate) fn client_dir() -> Result<PathBuf, ScanError> {
    let home = std::env::var_os("HOME")
        .map(PathBuf::from)
        .ok_or(ScanError::ClientNotFound)?;

    // Primary location: ~/.steam/steam
    let dir = home.join(".steam").join("steam");
    if dir.exists() {
        return Ok(dir);
    }

    // Fallback: ~/.local/share/Steam
    let dir = home.join(".local").join("share").join("Steam");
    if dir.exists() {
        return Ok(dir);
    }

    // Flatpak location
    let dir = home
        .join(".var")
        .join("app")
        .join("com.valvesoftware.Steam")
        .join(".steam")
        .join("steam");
    if dir.exists() {
        return Ok(dir);
    }

    Err(ScanError::ClientNotFound)
}
