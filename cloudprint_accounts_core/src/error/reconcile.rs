//! Reconciler contract violations

use thiserror::Error;

/// Errors raised when the reconciler is driven out of contract
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReconcileError {
    /// An update operation arrived before `initialize`
    #[error("Account reconciler not initialized: '{operation}' requires initialize() first")]
    NotInitialized { operation: String },

    /// `initialize` was called a second time
    #[error("Account reconciler is already initialized")]
    AlreadyInitialized,

    /// The account is not a member of the current user list
    #[error("Account '{account}' is not signed in")]
    InvalidAccount { account: String },

    /// A signal arrived that does not match the sync mode chosen at initialization
    #[error("Signal '{signal}' is not expected when sync availability is {sync_available}")]
    UnexpectedSignal {
        signal: String,
        sync_available: bool,
    },
}

impl ReconcileError {
    /// Create a not-initialized error for the named operation
    pub fn not_initialized(operation: &str) -> Self {
        Self::NotInitialized {
            operation: operation.to_string(),
        }
    }

    /// Create an invalid account error
    pub fn invalid_account(account: &str) -> Self {
        Self::InvalidAccount {
            account: account.to_string(),
        }
    }

    /// Create an unexpected signal error
    pub fn unexpected_signal(signal: &str, sync_available: bool) -> Self {
        Self::UnexpectedSignal {
            signal: signal.to_string(),
            sync_available,
        }
    }
}
