//! Lock-guarded ledger book.
//!
//! One writer or many readers at a time. Waiting for the lock is the only
//! suspension point, and it is bounded by the operation timeout. Once the
//! lock is held a post runs to completion without yielding, so dropping or
//! timing out the future can never leave an entry half applied.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::NaiveDate;
use contabil_shared::LedgerConfig;
use contabil_shared::types::{AccountId, JournalEntryId, Money};
use serde::Serialize;
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::warn;

use super::account::{Account, AccountType};
use super::entry::{CandidateEntry, JournalEntry};
use super::error::{LedgerError, LedgerResult};
use super::poster::LedgerPoster;
use super::query::{AccountStatement, AsOf, LedgerQueryEngine, Movement, SubtreeTotal, TrialBalance};
use super::registry::{AccountRegistry, InMemoryAccountRegistry};
use super::store::{EntryStore, InMemoryEntryStore};
use super::validation::{EntryValidator, ValidationOptions};

/// Chart of accounts and entries, guarded together.
#[derive(Debug)]
struct BookState<R, S> {
    registry: R,
    store: S,
}

/// Size of a book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BookStats {
    /// Accounts in the chart.
    pub accounts: usize,
    /// Posted entries.
    pub entries: usize,
}

/// A single-currency ledger book shared between tasks.
#[derive(Debug)]
pub struct LedgerBook<R = InMemoryAccountRegistry, S = InMemoryEntryStore> {
    state: RwLock<BookState<R, S>>,
    poster: LedgerPoster,
    operation_timeout: Duration,
}

impl<R, S> LedgerBook<R, S>
where
    R: AccountRegistry + Send + Sync,
    S: EntryStore + Send + Sync,
{
    /// Creates a book over a registry and a store.
    #[must_use]
    pub fn new(registry: R, store: S, poster: LedgerPoster, operation_timeout: Duration) -> Self {
        Self {
            state: RwLock::new(BookState { registry, store }),
            poster,
            operation_timeout,
        }
    }

    /// Creates a book configured from the `ledger` config section.
    #[must_use]
    pub fn from_config(registry: R, store: S, config: &LedgerConfig) -> Self {
        let validator = EntryValidator::new(ValidationOptions {
            reject_future_dates: config.reject_future_dates,
            today: None,
        });
        Self::new(registry, store, LedgerPoster::new(validator), config.operation_timeout())
    }

    /// How long an operation waits for the book.
    #[must_use]
    pub const fn operation_timeout(&self) -> Duration {
        self.operation_timeout
    }

    /// Posts a candidate entry. See [`LedgerPoster::post`].
    ///
    /// # Errors
    ///
    /// `Timeout` if the book stays locked past the operation timeout, plus
    /// everything [`LedgerPoster::post`] returns.
    pub async fn post(&self, candidate: CandidateEntry) -> LedgerResult<JournalEntry> {
        let mut state = self.write().await?;
        let BookState { registry, store } = &mut *state;
        self.poster.post(candidate, registry, store)
    }

    /// Looks up one account with its current balance.
    ///
    /// # Errors
    ///
    /// `Timeout` or `UnknownAccount`.
    pub async fn account(&self, id: AccountId) -> LedgerResult<Account> {
        self.read().await?.registry.get(id)
    }

    /// The whole chart, ordered by code.
    ///
    /// # Errors
    ///
    /// `Timeout`.
    pub async fn accounts(&self) -> LedgerResult<Vec<Account>> {
        Ok(self.read().await?.registry.all())
    }

    /// Counts accounts and entries.
    ///
    /// # Errors
    ///
    /// `Timeout`.
    pub async fn stats(&self) -> LedgerResult<BookStats> {
        let state = self.read().await?;
        Ok(BookStats {
            accounts: state.registry.count(),
            entries: state.store.count(),
        })
    }

    /// Looks up one posted entry.
    ///
    /// # Errors
    ///
    /// `Timeout` or `EntryNotFound`.
    pub async fn entry(&self, id: JournalEntryId) -> LedgerResult<JournalEntry> {
        self.read()
            .await?
            .store
            .get(id)?
            .ok_or(LedgerError::EntryNotFound(id))
    }

    /// See [`LedgerQueryEngine::movements`].
    ///
    /// # Errors
    ///
    /// `Timeout`, plus the query's own errors.
    pub async fn movements(
        &self,
        id: AccountId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> LedgerResult<Vec<Movement>> {
        let state = self.read().await?;
        engine(&state).movements(id, from, to)
    }

    /// See [`LedgerQueryEngine::account_statement`].
    ///
    /// # Errors
    ///
    /// `Timeout`, plus the query's own errors.
    pub async fn account_statement(
        &self,
        id: AccountId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> LedgerResult<AccountStatement> {
        let state = self.read().await?;
        engine(&state).account_statement(id, from, to)
    }

    /// See [`LedgerQueryEngine::subtree_movement_total`].
    ///
    /// # Errors
    ///
    /// `Timeout`, plus the query's own errors.
    pub async fn subtree_movement_total(
        &self,
        id: AccountId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> LedgerResult<SubtreeTotal> {
        let state = self.read().await?;
        engine(&state).subtree_movement_total(id, from, to)
    }

    /// See [`LedgerQueryEngine::subtree_total`].
    ///
    /// # Errors
    ///
    /// `Timeout`, plus the query's own errors.
    pub async fn subtree_total(&self, id: AccountId, as_of: AsOf) -> LedgerResult<Money> {
        let state = self.read().await?;
        engine(&state).subtree_total(id, as_of)
    }

    /// Statement totals over every root of the chart.
    ///
    /// # Errors
    ///
    /// `Timeout`, plus the query's own errors.
    pub async fn statement_totals(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> LedgerResult<BTreeMap<AccountType, Money>> {
        let state = self.read().await?;
        let roots: Vec<AccountId> = state.registry.roots().iter().map(|a| a.id).collect();
        engine(&state).statement_totals(&roots, from, to)
    }

    /// See [`LedgerQueryEngine::trial_balance`].
    ///
    /// # Errors
    ///
    /// `Timeout`, plus the query's own errors.
    pub async fn trial_balance(&self, from: NaiveDate, to: NaiveDate) -> LedgerResult<TrialBalance> {
        let state = self.read().await?;
        engine(&state).trial_balance(from, to)
    }

    async fn read(&self) -> LedgerResult<RwLockReadGuard<'_, BookState<R, S>>> {
        tokio::time::timeout(self.operation_timeout, self.state.read())
            .await
            .map_err(|_| {
                warn!(timeout = ?self.operation_timeout, "Timed out waiting to read the ledger book");
                LedgerError::Timeout
            })
    }

    async fn write(&self) -> LedgerResult<RwLockWriteGuard<'_, BookState<R, S>>> {
        tokio::time::timeout(self.operation_timeout, self.state.write())
            .await
            .map_err(|_| {
                warn!(timeout = ?self.operation_timeout, "Timed out waiting to write the ledger book");
                LedgerError::Timeout
            })
    }
}

fn engine<R, S>(state: &BookState<R, S>) -> LedgerQueryEngine<'_, R, S>
where
    R: AccountRegistry,
    S: EntryStore,
{
    LedgerQueryEngine::new(&state.registry, &state.store)
}
