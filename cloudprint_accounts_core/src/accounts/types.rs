//! Account identifiers, the signed-in user list and the active user

use crate::error::{Result, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a signed-in cloud-print account (typically an email address)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountId(String);

impl AccountId {
    /// Create an account identifier, rejecting blank values
    ///
    /// The empty string is how the "no active user" state is rendered, so it
    /// can never name an account.
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(ValidationError::invalid_account_id(&value, "must not be blank").into());
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for AccountId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for AccountId {
    type Error = crate::error::Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<AccountId> for String {
    fn from(id: AccountId) -> Self {
        id.0
    }
}

/// Ordered list of unique signed-in accounts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountList {
    accounts: Vec<AccountId>,
}

impl AccountList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a list from a signal payload, keeping the first occurrence of
    /// each account and the payload order
    pub fn from_accounts<I>(accounts: I) -> Self
    where
        I: IntoIterator<Item = AccountId>,
    {
        let mut list = Self::new();
        for account in accounts {
            list.push_unique(account);
        }
        list
    }

    /// Append an account unless it is already present. Returns true when the
    /// list grew.
    pub fn push_unique(&mut self, account: AccountId) -> bool {
        if self.contains(&account) {
            return false;
        }
        self.accounts.push(account);
        true
    }

    pub fn contains(&self, account: &AccountId) -> bool {
        self.accounts.contains(account)
    }

    pub fn first(&self) -> Option<&AccountId> {
        self.accounts.first()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AccountId> {
        self.accounts.iter()
    }

    pub fn as_slice(&self) -> &[AccountId] {
        &self.accounts
    }
}

impl<'a> IntoIterator for &'a AccountList {
    type Item = &'a AccountId;
    type IntoIter = std::slice::Iter<'a, AccountId>;

    fn into_iter(self) -> Self::IntoIter {
        self.accounts.iter()
    }
}

/// The account selected as context for cloud-print operations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "account", rename_all = "snake_case")]
pub enum ActiveUser {
    /// Never assigned: before initialization, or after a sync-less
    /// initialization that found nobody signed in
    #[default]
    Unset,
    /// Explicitly no user
    None,
    /// A member of the current user list
    Account(AccountId),
}

impl ActiveUser {
    /// First account of the list, or `None` for an empty list
    pub fn first_of(accounts: &AccountList) -> Self {
        accounts.first().cloned().map_or(Self::None, Self::Account)
    }

    pub fn account(&self) -> Option<&AccountId> {
        match self {
            Self::Account(account) => Some(account),
            Self::Unset | Self::None => None,
        }
    }

    /// True for `Unset` and `None`
    pub fn is_vacant(&self) -> bool {
        self.account().is_none()
    }
}

impl fmt::Display for ActiveUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unset => write!(f, "<unset>"),
            Self::None => Ok(()),
            Self::Account(account) => write!(f, "{account}"),
        }
    }
}
