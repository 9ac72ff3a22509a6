//! Journal entry domain types.

use chrono::NaiveDate;
use contabil_shared::types::{AccountId, JournalEntryId, Money};
use serde::{Deserialize, Serialize};

/// Side of a posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Debit posting.
    Debit,
    /// Credit posting.
    Credit,
}

impl Side {
    /// The other side.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Debit => Self::Credit,
            Self::Credit => Self::Debit,
        }
    }
}

/// One posting within an entry.
///
/// The amount is always positive; direction lives in `side`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryLine {
    /// Target account (must allow posting).
    pub account_id: AccountId,
    /// Debit or credit.
    pub side: Side,
    /// Strictly positive amount.
    pub amount: Money,
}

impl EntryLine {
    /// A debit line.
    #[must_use]
    pub fn debit(account_id: AccountId, amount: impl Into<Money>) -> Self {
        Self {
            account_id,
            side: Side::Debit,
            amount: amount.into(),
        }
    }

    /// A credit line.
    #[must_use]
    pub fn credit(account_id: AccountId, amount: impl Into<Money>) -> Self {
        Self {
            account_id,
            side: Side::Credit,
            amount: amount.into(),
        }
    }
}

/// An entry proposed by a caller, not yet validated or numbered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateEntry {
    /// Accounting date.
    pub date: NaiveDate,
    /// Required free text.
    pub narrative: String,
    /// Optional notes.
    #[serde(default)]
    pub notes: Option<String>,
    /// Ordered postings.
    pub lines: Vec<EntryLine>,
}

/// Lifecycle status of a journal entry. Only posted entries exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    /// Committed to the ledger; immutable.
    Posted,
}

/// A committed, immutable journal entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Unique identifier.
    pub id: JournalEntryId,
    /// Sequential human-readable reference.
    pub number: u64,
    /// Accounting date.
    pub date: NaiveDate,
    /// Free text.
    pub narrative: String,
    /// Optional notes.
    pub notes: Option<String>,
    /// Ordered postings.
    pub lines: Vec<EntryLine>,
    /// Always `Posted`.
    pub status: EntryStatus,
}

impl JournalEntry {
    /// Sum of all debit lines, or `None` if it is not representable.
    #[must_use]
    pub fn total_debit(&self) -> Option<Money> {
        self.side_total(Side::Debit)
    }

    /// Sum of all credit lines, or `None` if it is not representable.
    #[must_use]
    pub fn total_credit(&self) -> Option<Money> {
        self.side_total(Side::Credit)
    }

    /// Debit and credit totals of the lines that hit `account_id`.
    #[must_use]
    pub fn totals_for(&self, account_id: AccountId) -> Option<(Money, Money)> {
        self.lines
            .iter()
            .filter(|line| line.account_id == account_id)
            .try_fold((Money::ZERO, Money::ZERO), |(debit, credit), line| match line.side {
                Side::Debit => Some((debit.checked_add(line.amount)?, credit)),
                Side::Credit => Some((debit, credit.checked_add(line.amount)?)),
            })
    }

    /// Returns true if any line hits `account_id`.
    #[must_use]
    pub fn touches(&self, account_id: AccountId) -> bool {
        self.lines.iter().any(|line| line.account_id == account_id)
    }

    fn side_total(&self, side: Side) -> Option<Money> {
        Money::checked_sum(
            self.lines
                .iter()
                .filter(|line| line.side == side)
                .map(|line| line.amount),
        )
    }
}
