//! Scripted sign-in sessions
//!
//! A session file describes how the reconciler is initialized and the
//! sequence of browser signals and user actions to replay against it.

use crate::channel::ScriptedChannel;
use anyhow::{Context, Result};
use cloudprint_accounts_core::signals::dispatch;
use cloudprint_accounts_core::{
    AccountId, AccountReconciler, AccountSignal, ReconcilerConfig, ReconcilerSnapshot,
};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

fn default_true() -> bool {
    true
}

/// A scripted session
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Session {
    /// Whether account sync pushes the account list
    pub sync_available: bool,

    /// Attach a cloud-print channel before initialization
    #[serde(default = "default_true")]
    pub cloud_print: bool,

    /// Accounts passed to initialization
    #[serde(default)]
    pub initial_accounts: Vec<AccountId>,

    /// Accounts already signed in to cloud print before initialization
    #[serde(default)]
    pub signed_in: Vec<AccountId>,

    /// Overrides the configured reload policy for this session
    #[serde(default)]
    pub reload_on_active_user_change: Option<bool>,

    #[serde(default)]
    pub steps: Vec<Step>,
}

/// One scripted action
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// Deliver `user-accounts-updated`
    AccountsUpdated { accounts: Vec<AccountId> },
    /// Deliver `check-for-account-update`
    CheckForAccountUpdate,
    /// Sign an account in to cloud print so the next probe finds it
    SignIn { account: AccountId },
    /// Switch the active user
    UpdateActiveUser { account: AccountId },
    /// Toggle whether active user changes reload destinations
    SetReload { enabled: bool },
}

impl Step {
    pub fn action(&self) -> &'static str {
        match self {
            Self::AccountsUpdated { .. } => "accounts_updated",
            Self::CheckForAccountUpdate => "check_for_account_update",
            Self::SignIn { .. } => "sign_in",
            Self::UpdateActiveUser { .. } => "update_active_user",
            Self::SetReload { .. } => "set_reload",
        }
    }
}

impl Session {
    /// Load a session from a `.toml` or `.json` file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read session file {}", path.display()))?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => serde_json::from_str(&content)
                .with_context(|| format!("Invalid JSON session {}", path.display())),
            Some("toml") => toml::from_str(&content)
                .with_context(|| format!("Invalid TOML session {}", path.display())),
            _ => anyhow::bail!(
                "Unsupported session file {}: expected .toml or .json",
                path.display()
            ),
        }
    }
}

/// State after one replayed step
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    /// 0 for initialization, then 1-based step number
    pub step: usize,
    pub action: String,
    pub searches: usize,
    pub probes: usize,
    pub state: ReconcilerSnapshot,
}

/// A step that was rejected, ending the replay
#[derive(Debug, Clone, Serialize)]
pub struct StepFailure {
    pub step: usize,
    pub action: String,
    pub message: String,
}

/// Outcome of replaying a session
#[derive(Debug, Clone, Serialize)]
pub struct Replay {
    pub reports: Vec<StepReport>,
    pub failure: Option<StepFailure>,
}

struct Replayer {
    reconciler: AccountReconciler,
    channel: Arc<ScriptedChannel>,
    reports: Vec<StepReport>,
}

impl Replayer {
    fn report(&mut self, step: usize, action: &str) {
        self.reports.push(StepReport {
            step,
            action: action.to_string(),
            searches: self.channel.search_count(),
            probes: self.channel.probe_count(),
            state: self.reconciler.snapshot(),
        });
    }

    async fn apply(&mut self, step: &Step) -> cloudprint_accounts_core::Result<()> {
        match step {
            Step::AccountsUpdated { accounts } => {
                let signal = AccountSignal::AccountsUpdated(accounts.clone());
                dispatch(&mut self.reconciler, signal).await
            }
            Step::CheckForAccountUpdate => {
                dispatch(&mut self.reconciler, AccountSignal::CheckForAccountUpdate).await
            }
            Step::SignIn { account } => {
                self.channel.sign_in(account.clone());
                Ok(())
            }
            Step::UpdateActiveUser { account } => self.reconciler.update_active_user(account),
            Step::SetReload { enabled } => {
                self.reconciler.set_reload_on_active_user_change(*enabled);
                Ok(())
            }
        }
    }
}

/// Replay `session` against a fresh reconciler
///
/// A rejected step stops the replay; the reports up to that point are kept
/// and the failure is recorded in the outcome.
pub async fn replay(session: &Session, config: &ReconcilerConfig) -> Replay {
    let mut config = config.clone();
    if let Some(reload) = session.reload_on_active_user_change {
        config.reload_on_active_user_change = reload;
    }

    let channel = Arc::new(ScriptedChannel::new());
    for account in &session.signed_in {
        channel.sign_in(account.clone());
    }

    let mut reconciler = AccountReconciler::new(config);
    if session.cloud_print {
        reconciler.enable(channel.clone());
    }

    let mut replayer = Replayer {
        reconciler,
        channel,
        reports: Vec::new(),
    };

    let initialized = replayer
        .reconciler
        .initialize(session.initial_accounts.clone(), session.sync_available)
        .await;
    if let Err(e) = initialized {
        warn!("Session initialization failed: {e}");
        return Replay {
            reports: replayer.reports,
            failure: Some(StepFailure {
                step: 0,
                action: "initialize".to_string(),
                message: e.to_string(),
            }),
        };
    }
    replayer.report(0, "initialize");

    for (index, step) in session.steps.iter().enumerate() {
        let number = index + 1;
        debug!("Replaying step {number}: {}", step.action());
        if let Err(e) = replayer.apply(step).await {
            warn!("Step {number} ({}) rejected: {e}", step.action());
            return Replay {
                reports: replayer.reports,
                failure: Some(StepFailure {
                    step: number,
                    action: step.action().to_string(),
                    message: e.to_string(),
                }),
            };
        }
        replayer.report(number, step.action());
    }

    Replay {
        reports: replayer.reports,
        failure: None,
    }
}
