//! Ledger error types.
//!
//! `LedgerError` covers posting and querying; `ChartError` covers loading the
//! chart of accounts. Validation failures are structured so a caller can point
//! at the offending lines.

use chrono::NaiveDate;
use contabil_shared::types::{AccountId, JournalEntryId, Money};
use thiserror::Error;

/// Result type alias using `LedgerError`.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// What was wrong with a candidate entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationKind {
    /// Fewer than two lines.
    InsufficientLines,
    /// One or more lines carry a zero or negative amount.
    NonPositiveAmount,
    /// Narrative is empty or whitespace.
    EmptyNarrative,
    /// Date is not a valid calendar date.
    InvalidDate,
    /// Date is after today and the book rejects future dates.
    FutureDate,
    /// Summing the lines overflowed the decimal range.
    AmountOverflow,
    /// Debits and credits differ.
    Unbalanced {
        /// Total debits.
        debit: Money,
        /// Total credits.
        credit: Money,
    },
}

impl ValidationKind {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InsufficientLines => "INSUFFICIENT_LINES",
            Self::NonPositiveAmount => "NON_POSITIVE_AMOUNT",
            Self::EmptyNarrative => "EMPTY_NARRATIVE",
            Self::InvalidDate => "INVALID_DATE",
            Self::FutureDate => "FUTURE_DATE",
            Self::AmountOverflow => "AMOUNT_OVERFLOW",
            Self::Unbalanced { .. } => "UNBALANCED_ENTRY",
        }
    }
}

/// A rejected candidate entry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", describe(.kind, .lines))]
pub struct ValidationError {
    /// Which check failed.
    pub kind: ValidationKind,
    /// Zero-based indices of the offending lines, empty for entry-level faults.
    pub lines: Vec<usize>,
}

impl ValidationError {
    /// An entry-level fault.
    #[must_use]
    pub const fn entry(kind: ValidationKind) -> Self {
        Self {
            kind,
            lines: Vec::new(),
        }
    }

    /// A fault on specific lines.
    #[must_use]
    pub fn at_lines(kind: ValidationKind, lines: Vec<usize>) -> Self {
        Self { kind, lines }
    }
}

fn describe(kind: &ValidationKind, lines: &[usize]) -> String {
    let message = match kind {
        ValidationKind::InsufficientLines => "Entry must have at least 2 lines".to_string(),
        ValidationKind::NonPositiveAmount => "Line amounts must be greater than zero".to_string(),
        ValidationKind::EmptyNarrative => "Entry narrative is required".to_string(),
        ValidationKind::InvalidDate => "Entry date is not a valid calendar date".to_string(),
        ValidationKind::FutureDate => "Entry date is in the future".to_string(),
        ValidationKind::AmountOverflow => "Entry amounts exceed the supported range".to_string(),
        ValidationKind::Unbalanced { debit, credit } => {
            format!("Entry is not balanced. Debit: {debit}, Credit: {credit}")
        }
    };
    if lines.is_empty() {
        message
    } else {
        format!("{message} (lines {lines:?})")
    }
}

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Candidate Errors ==========
    /// Candidate entry failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A line targets an aggregation-only or unknown account.
    #[error("Posting not allowed on accounts {accounts:?}")]
    PostingNotAllowed {
        /// Offending accounts, in line order, without duplicates.
        accounts: Vec<AccountId>,
        /// Offending line indices, empty outside entry validation.
        lines: Vec<usize>,
    },

    // ========== Lookup Errors ==========
    /// Account does not exist.
    #[error("Account not found: {0}")]
    UnknownAccount(AccountId),

    /// Journal entry does not exist.
    #[error("Journal entry not found: {0}")]
    EntryNotFound(JournalEntryId),

    /// Query range is inverted.
    #[error("Invalid date range: from {from} is after to {to}")]
    InvalidRange {
        /// Range start.
        from: NaiveDate,
        /// Range end.
        to: NaiveDate,
    },

    // ========== Integrity Errors ==========
    /// A cycle was found in the account hierarchy.
    #[error("Corrupt account hierarchy: cycle through account {0}")]
    CorruptHierarchy(AccountId),

    /// Applying a delta would overflow an account balance.
    #[error("Balance overflow on account {0}")]
    BalanceOverflow(AccountId),

    // ========== Storage Errors ==========
    /// The entry store refused a record.
    #[error("Storage conflict: {0}")]
    StorageConflict(String),

    /// The backing store cannot be reached.
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// The operation did not get hold of the book before its deadline.
    #[error("Ledger operation timed out")]
    Timeout,
}

impl LedgerError {
    /// Posting-eligibility failure for a single account outside entry validation.
    #[must_use]
    pub fn posting_not_allowed(account_id: AccountId) -> Self {
        Self::PostingNotAllowed {
            accounts: vec![account_id],
            lines: Vec::new(),
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(err) => err.kind.code(),
            Self::PostingNotAllowed { .. } => "POSTING_NOT_ALLOWED",
            Self::UnknownAccount(_) => "UNKNOWN_ACCOUNT",
            Self::EntryNotFound(_) => "ENTRY_NOT_FOUND",
            Self::InvalidRange { .. } => "INVALID_RANGE",
            Self::CorruptHierarchy(_) => "CORRUPT_HIERARCHY",
            Self::BalanceOverflow(_) => "BALANCE_OVERFLOW",
            Self::StorageConflict(_) => "STORAGE_CONFLICT",
            Self::StorageUnavailable(_) => "STORAGE_UNAVAILABLE",
            Self::Timeout => "TIMEOUT",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - the caller can correct the input
            Self::Validation(_) | Self::PostingNotAllowed { .. } | Self::InvalidRange { .. } => 400,

            // 404 Not Found
            Self::UnknownAccount(_) | Self::EntryNotFound(_) => 404,

            // 409 Conflict
            Self::StorageConflict(_) => 409,

            // 422 Unprocessable - the entry is valid but cannot be applied
            Self::BalanceOverflow(_) => 422,

            // 500 Internal Server Error
            Self::CorruptHierarchy(_) => 500,

            // 503/504 - retry with backoff
            Self::StorageUnavailable(_) => 503,
            Self::Timeout => 504,
        }
    }

    /// Returns true if the caller should retry with backoff.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout | Self::StorageUnavailable(_))
    }

    /// Offending line indices, if the error points at lines.
    #[must_use]
    pub fn line_indices(&self) -> &[usize] {
        match self {
            Self::Validation(err) => &err.lines,
            Self::PostingNotAllowed { lines, .. } => lines,
            _ => &[],
        }
    }
}

/// Errors raised while loading or extending the chart of accounts.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChartError {
    /// Two accounts share an id.
    #[error("Duplicate account id: {0}")]
    DuplicateAccountId(AccountId),

    /// Two accounts share a code.
    #[error("Duplicate account code: {0}")]
    DuplicateCode(String),

    /// A parent reference does not resolve.
    #[error("Parent account not found: {0}")]
    ParentNotFound(AccountId),

    /// Parent links form a cycle through this account.
    #[error("Account hierarchy cycle through account {0}")]
    CycleDetected(AccountId),

    /// Account code is blank.
    #[error("Account {0} has an empty code")]
    EmptyCode(AccountId),

    /// Account name is blank.
    #[error("Account {0} has an empty name")]
    EmptyName(AccountId),
}
