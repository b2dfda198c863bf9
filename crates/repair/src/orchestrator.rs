//! Per-app sequential repair orchestrator.
//!
//! Apps run one at a time in selection order: every pipeline pauses on a
//! single shared confirmation channel, so parallelism across apps would
//! make the confirmations ambiguous. One app's failure never blocks the
//! rest.

use relink_ledger::RenameLedger;
use relink_library::{InstalledApp, LibraryPaths, exclusions};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::dispatch::{ExternalAction, ProtocolDispatcher};
use crate::types::{RepairEvent, RepairResult, RepairState};
use crate::RepairError;

/// Handle used by the host to resume a suspended repair.
///
/// The signal carries no payload: it is a human attestation that the
/// external client finished its current action.
#[derive(Clone)]
pub struct Confirmer {
    tx: mpsc::Sender<()>,
}

impl Confirmer {
    /// Delivers one confirmation signal. Returns false if no repair run is
    /// listening anymore.
    pub async fn confirm(&self) -> bool {
        self.tx.send(()).await.is_ok()
    }
}

/// Drives deep repairs for a selection of apps.
pub struct RepairOrchestrator {
    events_tx: mpsc::Sender<RepairEvent>,
    events_rx: Option<mpsc::Receiver<RepairEvent>>,
    confirm_tx: mpsc::Sender<()>,
    confirm_rx: mpsc::Receiver<()>,
    cancel: CancellationToken,
}

impl Default for RepairOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl RepairOrchestrator {
    /// Creates a new orchestrator.
    pub fn new() -> Self {
        let (events_tx, events_rx) = mpsc::channel(256);
        let (confirm_tx, confirm_rx) = mpsc::channel(16);
        Self {
            events_tx,
            events_rx: Some(events_rx),
            confirm_tx,
            confirm_rx,
            cancel: CancellationToken::new(),
        }
    }

    /// Takes the event receiver. Can only be called once.
    pub fn take_events(&mut self) -> Option<mpsc::Receiver<RepairEvent>> {
        self.events_rx.take()
    }

    /// Returns a handle for delivering confirmation signals.
    pub fn confirmer(&self) -> Confirmer {
        Confirmer {
            tx: self.confirm_tx.clone(),
        }
    }

    /// Returns the cancellation token for abandoning a run.
    ///
    /// Cancelling while a pipeline is suspended leaves the filesystem in
    /// the last consistent state reached; a renamed-out folder stays
    /// recoverable through the ledger's `cleanup_orphans`.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Repairs the selected apps strictly sequentially, returning one
    /// result per processed app.
    ///
    /// The scan merges apps across linked libraries, so each app's ledger
    /// is opened in the library its install path belongs to; `library` is
    /// the fallback for paths outside the expected layout.
    pub async fn run(
        &mut self,
        library: LibraryPaths,
        apps: &[InstalledApp],
        dispatcher: &dyn ProtocolDispatcher,
    ) -> Vec<RepairResult> {
        let mut results = Vec::with_capacity(apps.len());

        for app in apps {
            let app_library =
                LibraryPaths::containing_app_dir(&app.path).unwrap_or_else(|| library.clone());
            let ledger = RenameLedger::open(app_library);
            match self.repair_app(&ledger, app, dispatcher).await {
                Ok(()) => {
                    info!(app_id = %app.app_id, name = %app.name, "deep repair complete");
                    self.emit(RepairEvent::Completed {
                        app_id: app.app_id.clone(),
                    })
                    .await;
                    results.push(RepairResult {
                        app_id: app.app_id.clone(),
                        name: app.name.clone(),
                        success: true,
                        error: None,
                    });
                }
                Err(RepairError::Cancelled) => {
                    warn!(app_id = %app.app_id, "repair run abandoned");
                    results.push(RepairResult {
                        app_id: app.app_id.clone(),
                        name: app.name.clone(),
                        success: false,
                        error: Some(RepairError::Cancelled.to_string()),
                    });
                    // No further confirmations are coming; stop here.
                    break;
                }
                Err(e) => {
                    let message = e.to_string();
                    error!(app_id = %app.app_id, error = %message, "deep repair failed");
                    self.emit(RepairEvent::Failed {
                        app_id: app.app_id.clone(),
                        error: message.clone(),
                    })
                    .await;
                    results.push(RepairResult {
                        app_id: app.app_id.clone(),
                        name: app.name.clone(),
                        success: false,
                        error: Some(message),
                    });
                }
            }
        }

        results
    }

    /// Runs one app's pipeline: rename out, uninstall, confirm, rename
    /// back, install, confirm.
    async fn repair_app(
        &mut self,
        ledger: &RenameLedger,
        app: &InstalledApp,
        dispatcher: &dyn ProtocolDispatcher,
    ) -> Result<(), RepairError> {
        // Exclusion guard: runtime entries must never enter the pipeline.
        if exclusions::is_excluded(&app.name) {
            return Err(RepairError::Excluded(app.name.clone()));
        }

        self.emit_state(app, RepairState::RenamingOut).await;
        let temp = ledger.begin_rename(&app.app_id, &app.install_dir)?;

        self.emit_state(app, RepairState::UninstallTriggered).await;
        dispatcher.open_action(ExternalAction::Uninstall, &app.app_id)?;

        self.await_confirmation(app, RepairState::AwaitingUninstallConfirm)
            .await?;

        self.emit_state(app, RepairState::RenamingBack).await;
        ledger.revert_rename(&temp)?;

        self.emit_state(app, RepairState::InstallTriggered).await;
        dispatcher.open_action(ExternalAction::Install, &app.app_id)?;

        self.await_confirmation(app, RepairState::AwaitingInstallConfirm)
            .await?;

        self.emit_state(app, RepairState::Complete).await;
        Ok(())
    }

    /// Suspends until the host confirms or the run is cancelled. No
    /// timeout: the external client's completion cannot be observed.
    async fn await_confirmation(
        &mut self,
        app: &InstalledApp,
        state: RepairState,
    ) -> Result<(), RepairError> {
        self.emit(RepairEvent::AwaitingConfirmation {
            app_id: app.app_id.clone(),
            state,
        })
        .await;

        tokio::select! {
            _ = self.cancel.cancelled() => Err(RepairError::Cancelled),
            signal = self.confirm_rx.recv() => match signal {
                Some(()) => Ok(()),
                None => Err(RepairError::ConfirmChannelClosed),
            },
        }
    }

    async fn emit_state(&self, app: &InstalledApp, state: RepairState) {
        self.emit(RepairEvent::StateChanged {
            app_id: app.app_id.clone(),
            state,
            progress: state.progress(),
        })
        .await;
    }

    async fn emit(&self, event: RepairEvent) {
        let _ = self.events_tx.send(event).await;
    }
}
