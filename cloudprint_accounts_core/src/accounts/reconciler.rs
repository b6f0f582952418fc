//! Account reconciliation policy
//!
//! Keeps the signed-in user list and the active user consistent with the
//! signals delivered by the browser, and decides when a destination search
//! has to be issued on the cloud-print channel.

use crate::ReconcilerConfig;
use crate::accounts::state::LifecycleState;
use crate::accounts::types::{AccountId, AccountList, ActiveUser};
use crate::channel::CloudPrintChannel;
use crate::error::{ReconcileError, Result};
use crate::signals::{ACCOUNTS_UPDATED, CHECK_FOR_ACCOUNT_UPDATE};
use log::{debug, warn};
use serde::Serialize;
use std::sync::Arc;

/// Serializable view of the reconciler state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconcilerSnapshot {
    pub initialized: bool,
    pub sync_available: bool,
    pub cloud_print_enabled: bool,
    pub reload_on_active_user_change: bool,
    pub active_user: ActiveUser,
    pub users: AccountList,
}

/// Tracks signed-in cloud-print accounts for print preview
pub struct AccountReconciler {
    config: ReconcilerConfig,
    lifecycle: LifecycleState,
    users: AccountList,
    active_user: ActiveUser,
    channel: Option<Arc<dyn CloudPrintChannel>>,
}

impl AccountReconciler {
    /// Create an uninitialized reconciler with cloud print disabled
    ///
    /// Only `reload_on_active_user_change` is taken from `config`; sync
    /// availability and cloud print enablement are runtime state.
    pub fn new(config: ReconcilerConfig) -> Self {
        Self {
            config: ReconcilerConfig {
                sync_available: false,
                cloud_print_enabled: false,
                ..config
            },
            lifecycle: LifecycleState::default(),
            users: AccountList::new(),
            active_user: ActiveUser::Unset,
            channel: None,
        }
    }

    /// Attach the cloud-print channel. Does not trigger a search.
    pub fn enable(&mut self, channel: Arc<dyn CloudPrintChannel>) {
        debug!("Cloud print enabled for account reconciler");
        self.channel = Some(channel);
        self.config.cloud_print_enabled = true;
    }

    /// Initialize the user list
    ///
    /// With sync available the initial accounts are adopted without a search.
    /// Without sync the printer is probed once for a signed-in account. A
    /// failed probe leaves the reconciler uninitialized.
    pub async fn initialize<I>(&mut self, initial_accounts: I, sync_available: bool) -> Result<()>
    where
        I: IntoIterator<Item = AccountId>,
    {
        self.lifecycle.require_uninitialized()?;

        if sync_available {
            self.lifecycle.initialize(true)?;
            self.config.sync_available = true;
            self.users = AccountList::from_accounts(initial_accounts);
            self.active_user = ActiveUser::first_of(&self.users);
            debug!(
                "Initialized with {} synced account(s), active user '{}'",
                self.users.len(),
                self.active_user
            );
            return Ok(());
        }

        debug!("Initializing without account sync, probing cloud printer");
        let probed = self.probe_printer().await?;
        self.lifecycle.initialize(false)?;
        self.config.sync_available = false;
        self.adopt_probed_account(probed);
        Ok(())
    }

    /// Handle the `user-accounts-updated` signal
    ///
    /// Always issues one search when cloud print is enabled, even if neither
    /// the list nor the active user changed.
    pub fn on_accounts_updated<I>(&mut self, accounts: I) -> Result<()>
    where
        I: IntoIterator<Item = AccountId>,
    {
        self.lifecycle.require_sync_mode(ACCOUNTS_UPDATED, true)?;

        self.users = AccountList::from_accounts(accounts);
        let retained = self
            .active_user
            .account()
            .is_some_and(|active| self.users.contains(active));
        if !retained {
            self.active_user = ActiveUser::first_of(&self.users);
        }
        debug!(
            "Accounts updated: {} user(s), active user '{}'",
            self.users.len(),
            self.active_user
        );

        self.request_search();
        Ok(())
    }

    /// Handle the `check-for-account-update` signal by probing the printer
    pub async fn on_check_for_account_update(&mut self) -> Result<()> {
        self.lifecycle
            .require_sync_mode(CHECK_FOR_ACCOUNT_UPDATE, false)?;
        let probed = self.probe_printer().await?;
        self.adopt_probed_account(probed);
        Ok(())
    }

    /// Switch the active user to a signed-in account
    pub fn update_active_user(&mut self, account: &AccountId) -> Result<()> {
        self.lifecycle.require_initialized("update_active_user")?;
        if !self.users.contains(account) {
            warn!("Rejected active user change to unknown account '{account}'");
            return Err(ReconcileError::invalid_account(account.as_str()).into());
        }

        self.active_user = ActiveUser::Account(account.clone());
        if self.config.reload_on_active_user_change {
            self.request_search();
        } else {
            debug!("Active user changed to '{account}' without reload");
        }
        Ok(())
    }

    /// Set whether an active user change reloads destinations
    pub fn set_reload_on_active_user_change(&mut self, reload: bool) {
        self.config.reload_on_active_user_change = reload;
    }

    pub fn active_user(&self) -> &ActiveUser {
        &self.active_user
    }

    pub fn users(&self) -> &AccountList {
        &self.users
    }

    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    pub fn is_initialized(&self) -> bool {
        self.lifecycle.is_initialized()
    }

    pub fn is_cloud_print_disabled(&self) -> bool {
        !self.config.cloud_print_enabled
    }

    /// The active user is vacant or a member of the user list
    pub fn is_consistent(&self) -> bool {
        self.active_user
            .account()
            .is_none_or(|active| self.users.contains(active))
    }

    pub fn snapshot(&self) -> ReconcilerSnapshot {
        ReconcilerSnapshot {
            initialized: self.is_initialized(),
            sync_available: self.config.sync_available,
            cloud_print_enabled: self.config.cloud_print_enabled,
            reload_on_active_user_change: self.config.reload_on_active_user_change,
            active_user: self.active_user.clone(),
            users: self.users.clone(),
        }
    }

    /// Ask the printer for a signed-in account without touching state
    async fn probe_printer(&self) -> Result<Option<AccountId>> {
        let Some(channel) = &self.channel else {
            debug!("Cloud print disabled, skipping printer probe");
            return Ok(None);
        };

        let account = channel.query_printer().await?.into_account();
        if account.is_none() {
            debug!("Printer probe found no signed-in account");
        }
        Ok(account)
    }

    /// Append a newly revealed account and reload destinations
    fn adopt_probed_account(&mut self, probed: Option<AccountId>) {
        let Some(account) = probed else {
            return;
        };

        if !self.users.push_unique(account.clone()) {
            debug!("Printer probe found known account '{account}'");
            return;
        }

        if self.active_user.is_vacant() {
            self.active_user = ActiveUser::Account(account.clone());
        }
        debug!(
            "Printer probe found new account '{account}', {} user(s)",
            self.users.len()
        );

        self.request_search();
    }

    fn request_search(&self) {
        match &self.channel {
            Some(channel) => channel.search(self.active_user.account()),
            None => debug!("Cloud print disabled, skipping search"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::PrinterProbe;
    use crate::error::Error;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct CountingChannel {
        searches: Mutex<Vec<Option<AccountId>>>,
        probes: Mutex<usize>,
        signed_in: Mutex<Option<AccountId>>,
    }

    impl CountingChannel {
        fn search_count(&self) -> usize {
            self.searches.lock().unwrap().len()
        }

        fn probe_count(&self) -> usize {
            *self.probes.lock().unwrap()
        }

        fn sign_in(&self, account: &str) {
            *self.signed_in.lock().unwrap() = Some(id(account));
        }
    }

    #[async_trait]
    impl CloudPrintChannel for CountingChannel {
        fn search(&self, account: Option<&AccountId>) {
            self.searches.lock().unwrap().push(account.cloned());
        }

        async fn query_printer(&self) -> Result<PrinterProbe> {
            *self.probes.lock().unwrap() += 1;
            Ok(match self.signed_in.lock().unwrap().clone() {
                Some(account) => PrinterProbe::SignedIn(account),
                None => PrinterProbe::SignedOut,
            })
        }
    }

    fn id(value: &str) -> AccountId {
        AccountId::new(value).unwrap()
    }

    fn enabled_reconciler() -> (AccountReconciler, Arc<CountingChannel>) {
        let channel = Arc::new(CountingChannel::default());
        let mut reconciler = AccountReconciler::new(ReconcilerConfig::default());
        reconciler.enable(channel.clone());
        (reconciler, channel)
    }

    #[test]
    fn test_new_reconciler_is_uninitialized_and_disabled() {
        let reconciler = AccountReconciler::new(ReconcilerConfig::default());

        assert!(!reconciler.is_initialized());
        assert!(reconciler.is_cloud_print_disabled());
        assert_eq!(reconciler.active_user(), &ActiveUser::Unset);
        assert!(reconciler.users().is_empty());
    }

    #[test]
    fn test_runtime_flags_not_taken_from_config() {
        let reconciler = AccountReconciler::new(ReconcilerConfig {
            sync_available: true,
            cloud_print_enabled: true,
            reload_on_active_user_change: true,
        });

        assert!(!reconciler.config().sync_available);
        assert!(!reconciler.config().cloud_print_enabled);
        assert!(reconciler.config().reload_on_active_user_change);
    }

    #[tokio::test]
    async fn test_enable_does_not_search() {
        let (reconciler, channel) = enabled_reconciler();

        assert!(!reconciler.is_cloud_print_disabled());
        assert_eq!(channel.search_count(), 0);
        assert_eq!(channel.probe_count(), 0);
    }

    #[tokio::test]
    async fn test_initialize_with_sync_dedupes_and_does_not_search() {
        let (mut reconciler, channel) = enabled_reconciler();

        reconciler
            .initialize([id("a"), id("b"), id("a")], true)
            .await
            .unwrap();

        assert_eq!(reconciler.users().len(), 2);
        assert_eq!(reconciler.active_user(), &ActiveUser::Account(id("a")));
        assert_eq!(channel.search_count(), 0);
        assert_eq!(channel.probe_count(), 0);
    }

    #[tokio::test]
    async fn test_initialize_without_sync_adopts_probed_account() {
        let (mut reconciler, channel) = enabled_reconciler();
        channel.sign_in("a");

        reconciler.initialize([], false).await.unwrap();

        assert_eq!(channel.probe_count(), 1);
        assert_eq!(reconciler.active_user(), &ActiveUser::Account(id("a")));
        assert_eq!(channel.search_count(), 1);
    }

    #[tokio::test]
    async fn test_initialize_without_channel_skips_probe() {
        let mut reconciler = AccountReconciler::new(ReconcilerConfig::default());

        reconciler.initialize([], false).await.unwrap();

        assert!(reconciler.is_initialized());
        assert_eq!(reconciler.active_user(), &ActiveUser::Unset);
    }

    #[test]
    fn test_accounts_updated_before_initialize_fails() {
        let (mut reconciler, channel) = enabled_reconciler();

        let err = reconciler.on_accounts_updated([id("a")]).unwrap_err();

        assert!(matches!(
            err,
            Error::Reconcile(ReconcileError::NotInitialized { .. })
        ));
        assert!(reconciler.users().is_empty());
        assert_eq!(channel.search_count(), 0);
    }

    #[tokio::test]
    async fn test_accounts_updated_rejected_without_sync() {
        let (mut reconciler, channel) = enabled_reconciler();
        reconciler.initialize([], false).await.unwrap();

        let err = reconciler.on_accounts_updated([id("a")]).unwrap_err();

        assert!(matches!(
            err,
            Error::Reconcile(ReconcileError::UnexpectedSignal { .. })
        ));
        assert!(reconciler.users().is_empty());
        assert_eq!(channel.search_count(), 0);
    }

    #[tokio::test]
    async fn test_accounts_updated_searches_with_active_user() {
        let (mut reconciler, channel) = enabled_reconciler();
        reconciler.initialize([], true).await.unwrap();

        reconciler.on_accounts_updated([id("a"), id("b")]).unwrap();
        reconciler.on_accounts_updated([id("b")]).unwrap();

        let searches = channel.searches.lock().unwrap().clone();
        assert_eq!(searches, vec![Some(id("a")), Some(id("b"))]);
    }

    #[tokio::test]
    async fn test_accounts_updated_without_channel_keeps_state_consistent() {
        let mut reconciler = AccountReconciler::new(ReconcilerConfig::default());
        reconciler.initialize([], true).await.unwrap();

        reconciler.on_accounts_updated([id("a")]).unwrap();

        assert_eq!(reconciler.active_user(), &ActiveUser::Account(id("a")));
        assert!(reconciler.is_consistent());
    }

    #[tokio::test]
    async fn test_update_active_user_unknown_account_leaves_state() {
        let (mut reconciler, channel) = enabled_reconciler();
        reconciler.set_reload_on_active_user_change(true);
        reconciler.initialize([id("a")], true).await.unwrap();

        let err = reconciler.update_active_user(&id("z")).unwrap_err();

        assert!(matches!(
            err,
            Error::Reconcile(ReconcileError::InvalidAccount { .. })
        ));
        assert_eq!(reconciler.active_user(), &ActiveUser::Account(id("a")));
        assert_eq!(channel.search_count(), 0);
    }

    #[tokio::test]
    async fn test_second_initialize_rejected() {
        let (mut reconciler, _channel) = enabled_reconciler();
        reconciler.initialize([id("a")], true).await.unwrap();

        let err = reconciler.initialize([id("b")], true).await.unwrap_err();

        assert!(matches!(
            err,
            Error::Reconcile(ReconcileError::AlreadyInitialized)
        ));
        assert_eq!(reconciler.active_user(), &ActiveUser::Account(id("a")));
    }

    #[tokio::test]
    async fn test_snapshot_serializes_state() {
        let (mut reconciler, _channel) = enabled_reconciler();
        reconciler.initialize([id("a")], true).await.unwrap();

        let json = serde_json::to_value(reconciler.snapshot()).unwrap();

        assert_eq!(json["users"], serde_json::json!(["a"]));
        assert_eq!(json["active_user"]["state"], "account");
        assert_eq!(json["active_user"]["account"], "a");
        assert_eq!(json["cloud_print_enabled"], true);
    }
}
