//! Deep-repair orchestration.
//!
//! When an app's shortcuts are missing entirely, the only reliable way to
//! make the Steam client regenerate them is a full uninstall/install cycle.
//! The deep repair keeps that cycle non-destructive: the install folder is
//! renamed out of the way first (so the client's uninstall deletes
//! nothing), then renamed back before the reinstall, which finds the files
//! already present and rebuilds only the client-side records — shortcuts
//! included.
//!
//! The client gives no programmatic completion signal for either action,
//! so the pipeline suspends twice and waits for an explicit, human-attested
//! confirmation delivered through [`Confirmer`]. There is no timeout; a
//! suspended repair can sit for as long as the user needs.

mod dispatch;
mod orchestrator;
mod types;

pub use dispatch::{ExternalAction, ProtocolDispatcher, SteamUrlDispatcher};
pub use orchestrator::{Confirmer, RepairOrchestrator};
pub use types::{RepairEvent, RepairResult, RepairState};

/// Errors for deep-repair operations.
#[derive(Debug, thiserror::Error)]
pub enum RepairError {
    #[error("ledger error: {0}")]
    Ledger(#[from] relink_ledger::LedgerError),

    #[error("dispatch error: {0}")]
    Dispatch(String),

    #[error("excluded entry {0:?} cannot be repaired")]
    Excluded(String),

    #[error("repair abandoned by the host")]
    Cancelled,

    #[error("confirmation channel closed")]
    ConfirmChannelClosed,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
