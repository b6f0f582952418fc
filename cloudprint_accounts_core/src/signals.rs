//! Typed account signals and their delivery to the reconciler
//!
//! The browser announces account changes through named listener events.
//! Here they are an enum, routed to the matching reconciler operation either
//! one at a time ([`dispatch`]) or from a queue ([`SignalDispatcher::run`]).

use crate::accounts::{AccountId, AccountReconciler};
use crate::error::{ChannelError, Result, ValidationError};
use log::{debug, warn};
use tokio::sync::mpsc;

/// Listener event carrying the full list of signed-in accounts
pub const ACCOUNTS_UPDATED: &str = "user-accounts-updated";

/// Listener event asking for the printer to be probed again
pub const CHECK_FOR_ACCOUNT_UPDATE: &str = "check-for-account-update";

/// A signal delivered by the event source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountSignal {
    /// Full current list of signed-in accounts (sync available)
    AccountsUpdated(Vec<AccountId>),
    /// Re-derive accounts from printer presence (sync unavailable)
    CheckForAccountUpdate,
}

impl AccountSignal {
    /// Listener event name of this signal
    pub fn name(&self) -> &'static str {
        match self {
            Self::AccountsUpdated(_) => ACCOUNTS_UPDATED,
            Self::CheckForAccountUpdate => CHECK_FOR_ACCOUNT_UPDATE,
        }
    }

    /// Build a signal from a listener event name and its payload
    pub fn from_event(name: &str, accounts: &[&str]) -> Result<Self> {
        match name {
            ACCOUNTS_UPDATED => {
                let accounts = accounts
                    .iter()
                    .map(|account| AccountId::new(*account))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Self::AccountsUpdated(accounts))
            }
            CHECK_FOR_ACCOUNT_UPDATE => Ok(Self::CheckForAccountUpdate),
            other => {
                let reason = format!("unknown listener event '{other}'");
                Err(ValidationError::invalid_parameter("event", &reason).into())
            }
        }
    }
}

/// Cloneable handle that publishes signals to a dispatcher
#[derive(Clone)]
pub struct SignalSender {
    tx: mpsc::Sender<AccountSignal>,
}

impl SignalSender {
    /// Queue a signal, waiting for capacity
    pub async fn send(&self, signal: AccountSignal) -> Result<()> {
        self.tx
            .send(signal)
            .await
            .map_err(|_| ChannelError::Disconnected.into())
    }
}

/// Create a bounded signal queue
pub fn channel(capacity: usize) -> Result<(SignalSender, SignalDispatcher)> {
    if capacity == 0 {
        return Err(ValidationError::invalid_parameter("capacity", "must be positive").into());
    }
    let (tx, rx) = mpsc::channel(capacity);
    Ok((SignalSender { tx }, SignalDispatcher { rx }))
}

/// Apply one signal to the reconciler
pub async fn dispatch(reconciler: &mut AccountReconciler, signal: AccountSignal) -> Result<()> {
    debug!("Dispatching '{}'", signal.name());
    match signal {
        AccountSignal::AccountsUpdated(accounts) => reconciler.on_accounts_updated(accounts),
        AccountSignal::CheckForAccountUpdate => reconciler.on_check_for_account_update().await,
    }
}

/// Receiving end of a signal queue
pub struct SignalDispatcher {
    rx: mpsc::Receiver<AccountSignal>,
}

impl SignalDispatcher {
    /// Apply queued signals in arrival order until every sender is dropped
    ///
    /// Stops at the first failing signal and returns its error; signals
    /// still queued at that point are not applied. Returns the number of
    /// signals applied.
    pub async fn run(mut self, reconciler: &mut AccountReconciler) -> Result<usize> {
        let mut applied = 0;
        while let Some(signal) = self.rx.recv().await {
            let name = signal.name();
            if let Err(e) = dispatch(reconciler, signal).await {
                warn!("Signal '{name}' failed after {applied} applied: {e}");
                return Err(e);
            }
            applied += 1;
        }
        debug!("Signal queue closed after {applied} signal(s)");
        Ok(applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_names() {
        assert_eq!(
            AccountSignal::AccountsUpdated(vec![]).name(),
            "user-accounts-updated"
        );
        assert_eq!(
            AccountSignal::CheckForAccountUpdate.name(),
            "check-for-account-update"
        );
    }

    #[test]
    fn test_from_event_parses_accounts() {
        let signal =
            AccountSignal::from_event(ACCOUNTS_UPDATED, &["foo@chromium.org", "bar@chromium.org"])
                .unwrap();

        match signal {
            AccountSignal::AccountsUpdated(accounts) => assert_eq!(accounts.len(), 2),
            other => panic!("Expected AccountsUpdated, got {other:?}"),
        }
    }

    #[test]
    fn test_from_event_rejects_unknown_event() {
        assert!(AccountSignal::from_event("printer-added", &[]).is_err());
    }

    #[test]
    fn test_from_event_rejects_blank_account() {
        assert!(AccountSignal::from_event(ACCOUNTS_UPDATED, &[""]).is_err());
    }

    #[test]
    fn test_zero_capacity_rejected() {
        assert!(channel(0).is_err());
    }
}
