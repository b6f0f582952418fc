//! Recording implementation of CloudPrintChannel for testing

use async_trait::async_trait;
use cloudprint_accounts_core::error::ChannelError;
use cloudprint_accounts_core::{AccountId, CloudPrintChannel, PrinterProbe, Result};
use std::sync::Mutex;
use tokio::sync::Notify;

/// Channel methods the reconciler can invoke
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelMethod {
    Search,
    QueryPrinter,
}

/// One recorded channel invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelCall {
    Search { account: Option<AccountId> },
    QueryPrinter,
}

impl ChannelCall {
    pub fn method(&self) -> ChannelMethod {
        match self {
            Self::Search { .. } => ChannelMethod::Search,
            Self::QueryPrinter => ChannelMethod::QueryPrinter,
        }
    }
}

/// Cloud-print channel double that records every call
///
/// Printers registered with [`RecordingChannel::set_printer`] stand in for
/// signed-in accounts. Each printer probe reveals the next registered account
/// that has not been reported yet; once all are reported the probe keeps
/// returning the most recent one.
///
/// # Examples
///
/// ```rust
/// use cloudprint_test_utils::{ChannelMethod, RecordingChannel, account1};
/// use cloudprint_accounts_core::{AccountReconciler, ReconcilerConfig};
/// use std::sync::Arc;
///
/// # async fn example() -> cloudprint_accounts_core::Result<()> {
/// let channel = Arc::new(RecordingChannel::new());
/// let mut reconciler = AccountReconciler::new(ReconcilerConfig::default());
/// reconciler.enable(channel.clone());
///
/// reconciler.initialize([], true).await?;
/// reconciler.on_accounts_updated([account1()])?;
///
/// assert_eq!(channel.call_count(ChannelMethod::Search), 1);
/// # Ok(())
/// # }
/// ```
pub struct RecordingChannel {
    state: Mutex<RecordingState>,
    called: Notify,
}

#[derive(Debug, Default)]
struct RecordingState {
    calls: Vec<ChannelCall>,
    printers: Vec<AccountId>,
    revealed: usize,
    probe_failure: Option<ChannelError>,
}

impl RecordingChannel {
    /// Create a channel with no printers and no recorded calls
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RecordingState::default()),
            called: Notify::new(),
        }
    }

    /// Register a cloud printer owned by `account`
    pub fn set_printer(&self, account: AccountId) {
        let mut state = self.state.lock().unwrap();
        if !state.printers.contains(&account) {
            state.printers.push(account);
        }
    }

    /// Make the next printer probe fail
    pub fn expect_probe_error(&self, message: &str) {
        self.state.lock().unwrap().probe_failure = Some(ChannelError::probe_failed(message));
    }

    /// Number of times `method` was invoked
    pub fn call_count(&self, method: ChannelMethod) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|call| call.method() == method)
            .count()
    }

    /// Accounts passed to each search, in call order
    pub fn search_calls(&self) -> Vec<Option<AccountId>> {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter_map(|call| match call {
                ChannelCall::Search { account } => Some(account.clone()),
                ChannelCall::QueryPrinter => None,
            })
            .collect()
    }

    /// Every recorded call, in call order
    pub fn calls(&self) -> Vec<ChannelCall> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Forget recorded calls. Registered printers are kept.
    pub fn reset(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    /// Wait until `method` has been invoked, returning its most recent call
    pub async fn when_called(&self, method: ChannelMethod) -> ChannelCall {
        loop {
            let notified = self.called.notified();
            if let Some(call) = self.last_call(method) {
                return call;
            }
            notified.await;
        }
    }

    fn last_call(&self, method: ChannelMethod) -> Option<ChannelCall> {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .rev()
            .find(|call| call.method() == method)
            .cloned()
    }

    fn record(&self, call: ChannelCall) {
        self.state.lock().unwrap().calls.push(call);
        self.called.notify_waiters();
    }

    fn next_probe(&self) -> Result<PrinterProbe> {
        let mut state = self.state.lock().unwrap();
        if let Some(failure) = state.probe_failure.take() {
            return Err(failure.into());
        }
        if state.revealed < state.printers.len() {
            state.revealed += 1;
        }
        Ok(match state.revealed {
            0 => PrinterProbe::SignedOut,
            n => PrinterProbe::SignedIn(state.printers[n - 1].clone()),
        })
    }
}

impl Default for RecordingChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CloudPrintChannel for RecordingChannel {
    fn search(&self, account: Option<&AccountId>) {
        self.record(ChannelCall::Search {
            account: account.cloned(),
        });
    }

    async fn query_printer(&self) -> Result<PrinterProbe> {
        self.record(ChannelCall::QueryPrinter);
        self.next_probe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::{account1, account2};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_probe_reveals_printers_in_registration_order() {
        let channel = RecordingChannel::new();
        assert_eq!(channel.query_printer().await.unwrap(), PrinterProbe::SignedOut);

        channel.set_printer(account1());
        channel.set_printer(account2());

        assert_eq!(
            channel.query_printer().await.unwrap(),
            PrinterProbe::SignedIn(account1())
        );
        assert_eq!(
            channel.query_printer().await.unwrap(),
            PrinterProbe::SignedIn(account2())
        );
        assert_eq!(
            channel.query_printer().await.unwrap(),
            PrinterProbe::SignedIn(account2())
        );
        assert_eq!(channel.call_count(ChannelMethod::QueryPrinter), 4);
    }

    #[tokio::test]
    async fn test_probe_error_is_one_shot() {
        let channel = RecordingChannel::new();
        channel.expect_probe_error("offline");

        assert!(channel.query_printer().await.is_err());
        assert!(channel.query_printer().await.is_ok());
    }

    #[tokio::test]
    async fn test_when_called_waits_for_search() {
        let channel = Arc::new(RecordingChannel::new());

        let searcher = {
            let channel = channel.clone();
            tokio::spawn(async move {
                tokio::task::yield_now().await;
                channel.search(Some(&account1()));
            })
        };

        let call = channel.when_called(ChannelMethod::Search).await;
        searcher.await.unwrap();

        assert_eq!(
            call,
            ChannelCall::Search {
                account: Some(account1())
            }
        );
    }

    #[test]
    fn test_reset_clears_calls_only() {
        let channel = RecordingChannel::new();
        channel.set_printer(account1());
        channel.search(None);

        channel.reset();

        assert!(channel.calls().is_empty());
        assert_eq!(channel.search_calls(), Vec::<Option<AccountId>>::new());
    }
}
