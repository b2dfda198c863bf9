//! State machine and event types for the deep-repair pipeline.

use serde::Serialize;

/// States of one app's deep-repair pipeline, in order.
///
/// `Error` is reachable from every non-terminal state; the two `Awaiting*`
/// states suspend until the host delivers a confirmation signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RepairState {
    Ready,
    RenamingOut,
    UninstallTriggered,
    AwaitingUninstallConfirm,
    RenamingBack,
    InstallTriggered,
    AwaitingInstallConfirm,
    Complete,
    Error,
}

impl RepairState {
    /// Progress milestone (percent) reported when this state is entered.
    pub fn progress(&self) -> u8 {
        match self {
            RepairState::Ready => 0,
            RepairState::RenamingOut => 20,
            RepairState::UninstallTriggered | RepairState::AwaitingUninstallConfirm => 40,
            RepairState::RenamingBack => 60,
            RepairState::InstallTriggered | RepairState::AwaitingInstallConfirm => 80,
            RepairState::Complete => 100,
            RepairState::Error => 0,
        }
    }
}

/// Progress event emitted while a repair runs.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase", tag = "kind")]
pub enum RepairEvent {
    /// An app entered a new pipeline state.
    StateChanged {
        app_id: String,
        state: RepairState,
        progress: u8,
    },
    /// The pipeline is suspended until the host confirms.
    AwaitingConfirmation { app_id: String, state: RepairState },
    /// The app's repair finished successfully.
    Completed { app_id: String },
    /// The app's repair entered `Error` and was aborted.
    Failed { app_id: String, error: String },
}

/// Final outcome of one app's repair.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepairResult {
    pub app_id: String,
    pub name: String,
    pub success: bool,
    pub error: Option<String>,
}
