//! Signed-in account tracking
//!
//! This module holds the account types and the reconciler that keeps the user
//! list and active user in step with browser signals.

pub mod reconciler;
pub mod state;
pub mod types;

pub use reconciler::{AccountReconciler, ReconcilerSnapshot};
pub use state::LifecycleState;
pub use types::{AccountId, AccountList, ActiveUser};
