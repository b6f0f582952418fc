//! Reconciler lifecycle
//!
//! The reconciler starts uninitialized and moves to initialized exactly once.
//! The sync mode chosen at that point decides which signal is accepted.

use crate::error::{ReconcileError, Result};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecycleState {
    #[default]
    Uninitialized,
    Initialized { sync_available: bool },
}

impl LifecycleState {
    pub fn is_initialized(&self) -> bool {
        matches!(self, Self::Initialized { .. })
    }

    /// Sync availability, if initialized
    pub fn sync_available(&self) -> Option<bool> {
        match self {
            Self::Uninitialized => None,
            Self::Initialized { sync_available } => Some(*sync_available),
        }
    }

    /// Fail if already initialized
    pub fn require_uninitialized(&self) -> Result<()> {
        if self.is_initialized() {
            return Err(ReconcileError::AlreadyInitialized.into());
        }
        Ok(())
    }

    /// Move to initialized. Re-initialization is rejected.
    pub fn initialize(&mut self, sync_available: bool) -> Result<()> {
        self.require_uninitialized()?;
        *self = Self::Initialized { sync_available };
        Ok(())
    }

    /// Fail unless initialized; returns the sync mode
    pub fn require_initialized(&self, operation: &str) -> Result<bool> {
        self.sync_available()
            .ok_or_else(|| ReconcileError::not_initialized(operation).into())
    }

    /// Fail unless initialized in the sync mode `signal` is delivered in
    pub fn require_sync_mode(&self, signal: &str, sync_required: bool) -> Result<()> {
        let sync_available = self.require_initialized(signal)?;
        if sync_required != sync_available {
            return Err(ReconcileError::unexpected_signal(signal, sync_available).into());
        }
        Ok(())
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uninitialized => write!(f, "Uninitialized"),
            Self::Initialized {
                sync_available: true,
            } => write!(f, "Initialized (sync)"),
            Self::Initialized {
                sync_available: false,
            } => write!(f, "Initialized (no sync)"),
        }
    }
}
