//! Fixtures and builders for reconciler test scenarios

use crate::mocks::RecordingChannel;
use cloudprint_accounts_core::{AccountId, AccountReconciler, ReconcilerConfig, Result};
use std::sync::Arc;

/// First test account
pub fn account1() -> AccountId {
    account("foo@chromium.org")
}

/// Second test account
pub fn account2() -> AccountId {
    account("bar@chromium.org")
}

/// Account identifier from a literal; panics on blank input
pub fn account(value: &str) -> AccountId {
    AccountId::new(value).expect("test account identifiers must not be blank")
}

/// Builder for a reconciler wired to a [`RecordingChannel`]
pub struct ReconcilerBuilder {
    config: ReconcilerConfig,
    channel: Option<Arc<RecordingChannel>>,
    printers: Vec<AccountId>,
    initial: Option<(Vec<AccountId>, bool)>,
}

impl ReconcilerBuilder {
    /// Start from the default configuration with cloud print enabled
    pub fn new() -> Self {
        Self {
            config: ReconcilerConfig::default(),
            channel: Some(Arc::new(RecordingChannel::new())),
            printers: Vec::new(),
            initial: None,
        }
    }

    /// Leave cloud print disabled (no channel attached)
    pub fn without_cloud_print(mut self) -> Self {
        self.channel = None;
        self
    }

    /// Reload destinations on active user changes
    pub fn with_reload(mut self, reload: bool) -> Self {
        self.config.reload_on_active_user_change = reload;
        self
    }

    /// Register a cloud printer for `account` before initialization
    pub fn with_printer(mut self, account: AccountId) -> Self {
        self.printers.push(account);
        self
    }

    /// Initialize the reconciler during `build`
    pub fn initialized(mut self, accounts: &[AccountId], sync_available: bool) -> Self {
        self.initial = Some((accounts.to_vec(), sync_available));
        self
    }

    /// Build the reconciler and return it with its channel, if enabled
    pub async fn build(self) -> Result<(AccountReconciler, Option<Arc<RecordingChannel>>)> {
        let mut reconciler = AccountReconciler::new(self.config);

        if let Some(channel) = &self.channel {
            for printer in self.printers {
                channel.set_printer(printer);
            }
            reconciler.enable(channel.clone());
        }

        if let Some((accounts, sync_available)) = self.initial {
            reconciler.initialize(accounts, sync_available).await?;
        }

        Ok((reconciler, self.channel))
    }
}

impl Default for ReconcilerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
