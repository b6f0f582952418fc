//! Cloud-print account reconciliation
//!
//! Core library tracking the cloud-print accounts signed in to a print
//! preview dialog: the deduplicated user list, the active user, and when a
//! destination search must be issued on the cloud-print channel.

pub mod accounts;
pub mod channel;
pub mod error;
pub mod signals;

// Re-export main types
pub use accounts::{AccountId, AccountList, AccountReconciler, ActiveUser, ReconcilerSnapshot};
pub use channel::{CloudPrintChannel, PrinterProbe};
pub use error::{Error, Result};
pub use signals::{AccountSignal, SignalDispatcher, SignalSender};

/// Reconciler configuration
///
/// `sync_available` and `cloud_print_enabled` are runtime state owned by the
/// reconciler and are never read from configuration sources.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ReconcilerConfig {
    #[serde(skip)]
    pub sync_available: bool,
    #[serde(skip)]
    pub cloud_print_enabled: bool,
    /// Reload destinations from the channel when the active user changes
    #[serde(default)]
    pub reload_on_active_user_change: bool,
}
