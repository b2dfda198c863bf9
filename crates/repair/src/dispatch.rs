//! Fire-and-forget dispatch of client protocol actions.

use std::process::Command;

use tracing::debug;

use crate::RepairError;

/// Client actions reachable through the `steam://` URL scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExternalAction {
    Uninstall,
    Install,
}

impl ExternalAction {
    /// Returns the protocol URL for an app id.
    pub fn url(&self, app_id: &str) -> String {
        match self {
            ExternalAction::Uninstall => format!("steam://uninstall/{app_id}"),
            ExternalAction::Install => format!("steam://install/{app_id}"),
        }
    }
}

/// Hands an action to the external client.
///
/// Dispatch is fire-and-forget: the client never reports whether the
/// action ran or succeeded, so implementations only fail when the request
/// itself could not be handed off.
pub trait ProtocolDispatcher: Send + Sync {
    fn open_action(&self, action: ExternalAction, app_id: &str) -> Result<(), RepairError>;
}

/// Dispatches `steam://` URLs through the platform's default opener.
pub struct SteamUrlDispatcher;

impl ProtocolDispatcher for SteamUrlDispatcher {
    fn open_action(&self, action: ExternalAction, app_id: &str) -> Result<(), RepairError> {
        let url = action.url(app_id);
        debug!(url = %url, "dispatching client action");
        open_url(&url).map_err(|e| RepairError::Dispatch(format!("failed to open {url}: {e}")))
    }
}

#[cfg(target_os = "windows")]
fn open_url(url: &str) -> std::io::Result<()> {
    Command::new("cmd").args(["/C", "start", "", url]).spawn()?;
    Ok(())
}

#[cfg(target_os = "macos")]
fn open_url(url: &str) -> std::io::Result<()> {
    Command::new("open").arg(url).spawn()?;
    Ok(())
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn open_url(url: &str) -> std::io::Result<()> {
    Command::new("xdg-open").arg(url).spawn()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_urls() {
        assert_eq!(
            ExternalAction::Uninstall.url("440"),
            "steam://uninstall/440"
        );
        assert_eq!(ExternalAction::Install.url("440"), "steam://install/440");
    }
}
