use std::path::PathBuf;

use crate::ScanError;

/// Returns the Steam client directory on Windows.
///
/// Checks the default install path first, then the per-user registry key.
pub(crate) fn client_dir() -> Result<PathBuf, ScanError> {
    let default = PathBuf::from(r"C:\Program Files (x86)\Steam");
    if default.join("steam.exe").exists() {
        return Ok(default);
    }

    if let Ok(path) = read_steam_registry(r"SOFTWARE\Valve\Steam")
        && path.join("steam.exe").exists()
    {
        return Ok(path);
    }

    Err(ScanError::ClientNotFound)
}

fn read_steam_registry(subkey: &str) -> Result<PathBuf, ScanError> {
    use winreg::RegKey;
    use winreg::enums::HKEY_CURRENT_USER;

    let hkcu = RegKey::predef(HKEY_CURRENT_USER);
    let key = hkcu
        .open_subkey(subkey)
        .map_err(|_| ScanError::ClientNotFound)?;
    let install_path: String = key
        .get_value("SteamPath")
        .map_err(|_| ScanError::ClientNotFound)?;
    Ok(PathBuf::from(install_path))
}
