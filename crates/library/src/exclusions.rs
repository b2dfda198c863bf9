//! Exclusion rules filtering non-game entries out of scans and repairs.

/// Name substrings identifying shared runtimes and redistributable packages.
///
/// Applied to scan results, icon-repair candidates and the deep-repair
/// guard: an entry matching one of these must never reach the repair state
/// machine.
pub const EXCLUDED_NAME_PARTS: &[&str] = &[
    "Steamworks Common Redistributables",
    "Steam Linux Runtime",
    "SteamVR",
    "Proton",
];

/// Returns true if a display name matches the exclusion set.
pub fn is_excluded(name: &str) -> bool {
    EXCLUDED_NAME_PARTS.iter().any(|part| name.contains(part))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redistributables_excluded() {
        assert!(is_excluded("Steamworks Common Redistributables"));
        assert!(is_excluded("Proton 9.0 (Beta)"));
        assert!(is_excluded("Steam Linux Runtime 3.0 (sniper)"));
    }

    #[test]
    fn games_not_excluded() {
        assert!(!is_excluded("Half-Life 2"));
        assert!(!is_excluded("Photon Racer"));
    }
}
