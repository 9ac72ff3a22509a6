//! Chart of accounts domain types.

use contabil_shared::types::{AccountId, Money};
use serde::{Deserialize, Serialize};

use super::balance::Nature;

/// Which aggregate statement an account rolls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// Asset account.
    Asset,
    /// Liability account.
    Liability,
    /// Equity account.
    Equity,
    /// Revenue account.
    Revenue,
    /// Expense account.
    Expense,
}

impl AccountType {
    /// All account types in statement order.
    pub const ALL: [Self; 5] = [
        Self::Asset,
        Self::Liability,
        Self::Equity,
        Self::Revenue,
        Self::Expense,
    ];

    /// The conventional nature of accounts of this type.
    #[must_use]
    pub const fn normal_nature(self) -> Nature {
        match self {
            Self::Asset | Self::Expense => Nature::DebitNormal,
            Self::Liability | Self::Equity | Self::Revenue => Nature::CreditNormal,
        }
    }

    /// Lowercase name as used on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asset => "asset",
            Self::Liability => "liability",
            Self::Equity => "equity",
            Self::Revenue => "revenue",
            Self::Expense => "expense",
        }
    }
}

/// A node in the chart of accounts.
///
/// `balance` is derived state: it starts at zero and only the poster moves it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier.
    pub id: AccountId,
    /// Unique, lexically sortable code (e.g. "1.1.01").
    pub code: String,
    /// Display name.
    pub name: String,
    /// Statement classification.
    #[serde(rename = "type")]
    pub account_type: AccountType,
    /// Sign convention for balance updates.
    pub nature: Nature,
    /// Parent account, `None` for a root.
    pub parent_id: Option<AccountId>,
    /// Whether entry lines may reference this account directly.
    pub posting_allowed: bool,
    /// Running signed balance.
    pub balance: Money,
}

impl Account {
    /// Returns true if this account has no parent.
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// An account as handed over by the chart-of-accounts management flow.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAccount {
    /// Unique identifier (owned by the caller so parents can be referenced).
    pub id: AccountId,
    /// Unique code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Statement classification.
    #[serde(rename = "type")]
    pub account_type: AccountType,
    /// Explicit nature; defaults to the type's normal nature.
    #[serde(default)]
    pub nature: Option<Nature>,
    /// Parent account.
    #[serde(default)]
    pub parent_id: Option<AccountId>,
    /// Whether entry lines may reference this account directly.
    pub posting_allowed: bool,
}

impl NewAccount {
    /// A posting-allowed account with the type's normal nature.
    #[must_use]
    pub fn leaf(
        code: impl Into<String>,
        name: impl Into<String>,
        account_type: AccountType,
        parent_id: Option<AccountId>,
    ) -> Self {
        Self {
            id: AccountId::generate(),
            code: code.into(),
            name: name.into(),
            account_type,
            nature: None,
            parent_id,
            posting_allowed: true,
        }
    }

    /// An aggregation-only account with the type's normal nature.
    #[must_use]
    pub fn group(
        code: impl Into<String>,
        name: impl Into<String>,
        account_type: AccountType,
        parent_id: Option<AccountId>,
    ) -> Self {
        Self {
            posting_allowed: false,
            ..Self::leaf(code, name, account_type, parent_id)
        }
    }

    pub(crate) fn into_account(self) -> Account {
        Account {
            id: self.id,
            code: self.code,
            name: self.name,
            account_type: self.account_type,
            nature: self.nature.unwrap_or(self.account_type.normal_nature()),
            parent_id: self.parent_id,
            posting_allowed: self.posting_allowed,
            balance: Money::ZERO,
        }
    }
}
