//! Double-entry ledger engine.
//!
//! - Chart of accounts and balance conventions
//! - Candidate validation and atomic posting
//! - Movement, rollup and trial balance queries
//! - The lock-guarded book tying them together

pub mod account;
pub mod balance;
pub mod book;
pub mod entry;
pub mod error;
pub mod poster;
pub mod query;
pub mod registry;
pub mod store;
pub mod validation;

#[cfg(test)]
mod poster_props;
#[cfg(test)]
mod query_props;
#[cfg(test)]
mod validation_props;

pub use account::{Account, AccountType, NewAccount};
pub use balance::{Nature, RunningBalance};
pub use book::{BookStats, LedgerBook};
pub use entry::{CandidateEntry, EntryLine, EntryStatus, JournalEntry, Side};
pub use error::{ChartError, LedgerError, LedgerResult, ValidationError, ValidationKind};
pub use poster::LedgerPoster;
pub use query::{
    AccountStatement, AsOf, LedgerQueryEngine, Movement, SubtreeTotal, TrialBalance,
    TrialBalanceRow,
};
pub use registry::{AccountRegistry, InMemoryAccountRegistry};
pub use store::{EntryStore, InMemoryEntryStore};
pub use validation::{EntryValidator, ValidationOptions};
