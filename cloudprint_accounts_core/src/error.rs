//! Error types for the cloud-print account reconciliation library
//!
//! Errors are grouped by where the contract was broken: the caller wiring
//! the reconciler, the values handed to it, or the cloud-print channel.

use thiserror::Error;

pub mod channel;
pub mod reconcile;
pub mod validation;

pub use self::channel::ChannelError;
pub use self::reconcile::ReconcileError;
pub use self::validation::ValidationError;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the library
///
/// - Reconcile errors: an operation was invoked out of order or with an
///   account the reconciler does not know
/// - Validation errors: malformed input values
/// - Channel errors: the cloud-print channel failed to answer a probe
#[derive(Error, Debug)]
pub enum Error {
    /// Reconciler contract violations
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    /// Input validation errors
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Cloud-print channel failures
    #[error(transparent)]
    Channel(#[from] ChannelError),
}

impl Error {
    /// True when the error reports a wiring bug in the caller rather than bad
    /// data or a channel failure
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, Self::Reconcile(_))
    }
}
