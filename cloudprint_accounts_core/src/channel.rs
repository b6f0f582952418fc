//! Cloud-print channel abstraction
//!
//! The reconciler never talks to the network itself. It triggers searches and
//! printer probes through this trait, which the embedding application (or a
//! test double) implements.

use crate::accounts::AccountId;
use crate::error::Result;
use async_trait::async_trait;

/// Outcome of probing the cloud printer for a signed-in account
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrinterProbe {
    /// The probe found a cloud printer owned by this account
    SignedIn(AccountId),
    /// Nobody is signed in to cloud print
    SignedOut,
}

impl PrinterProbe {
    pub fn into_account(self) -> Option<AccountId> {
        match self {
            Self::SignedIn(account) => Some(account),
            Self::SignedOut => None,
        }
    }
}

/// Remote account-listing capability used by the reconciler
#[async_trait]
pub trait CloudPrintChannel: Send + Sync {
    /// Start a destination search for `account`
    ///
    /// Fire-and-forget: implementations must return without waiting for the
    /// search to complete. The reconciler has already committed its state
    /// when this is called.
    fn search(&self, account: Option<&AccountId>);

    /// Probe the cloud printer for a signed-in account
    ///
    /// Used only when push-based account sync is unavailable.
    async fn query_printer(&self) -> Result<PrinterProbe>;
}
