//! Simulated cloud-print channel driven by a session script
//!
//! There is no destination backend behind a search. Each search is counted
//! when it is issued, and a spawned task stands in for the in-flight request;
//! that task only logs its completion. Outside a tokio runtime the search is
//! counted and logged inline.

use async_trait::async_trait;
use cloudprint_accounts_core::{AccountId, CloudPrintChannel, PrinterProbe, Result};
use log::debug;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::runtime::Handle;

/// Channel whose printer probe answers from accounts signed in by the script
#[derive(Default)]
pub struct ScriptedChannel {
    printers: Mutex<Printers>,
    searches: AtomicUsize,
    probes: AtomicUsize,
}

#[derive(Default)]
struct Printers {
    signed_in: Vec<AccountId>,
    revealed: usize,
}

impl ScriptedChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sign `account` in to cloud print; the next probe reveals it
    pub fn sign_in(&self, account: AccountId) {
        let mut printers = self.printers.lock().unwrap_or_else(|e| e.into_inner());
        if !printers.signed_in.contains(&account) {
            printers.signed_in.push(account);
        }
    }

    /// Searches issued so far
    pub fn search_count(&self) -> usize {
        self.searches.load(Ordering::SeqCst)
    }

    /// Printer probes issued so far
    pub fn probe_count(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CloudPrintChannel for ScriptedChannel {
    fn search(&self, account: Option<&AccountId>) {
        let issued = self.searches.fetch_add(1, Ordering::SeqCst) + 1;
        let account = account.map_or_else(String::new, AccountId::to_string);

        match Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    debug!("Search #{issued} for '{account}' completed");
                });
            }
            Err(_) => debug!("Search #{issued} for '{account}' issued outside a runtime"),
        }
    }

    async fn query_printer(&self) -> Result<PrinterProbe> {
        self.probes.fetch_add(1, Ordering::SeqCst);

        let mut printers = self.printers.lock().unwrap_or_else(|e| e.into_inner());
        printers.revealed = (printers.revealed + 1).min(printers.signed_in.len());

        Ok(match printers.revealed {
            0 => PrinterProbe::SignedOut,
            n => PrinterProbe::SignedIn(printers.signed_in[n - 1].clone()),
        })
    }
}
