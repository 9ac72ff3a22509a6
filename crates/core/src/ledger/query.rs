//! Read-only views over committed entries.
//!
//! Every view is recomputed from the entry store; account balances held by
//! the registry are only read by [`AsOf::Snapshot`].

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use contabil_shared::types::{AccountId, JournalEntryId, Money};
use serde::Serialize;

use super::account::{Account, AccountType};
use super::balance::RunningBalance;
use super::error::{LedgerError, LedgerResult};
use super::registry::AccountRegistry;
use super::store::EntryStore;

/// One entry's effect on one account, in statement order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Movement {
    /// Entry date.
    pub date: NaiveDate,
    /// Entry id.
    pub entry_id: JournalEntryId,
    /// Entry number.
    pub entry_number: u64,
    /// Entry narrative.
    pub narrative: String,
    /// Debits the entry put on the account.
    pub debit: Money,
    /// Credits the entry put on the account.
    pub credit: Money,
    /// Account balance after this movement.
    pub running_balance: Money,
}

/// Movements of one account over a date range, with its framing balances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountStatement {
    /// The account, with its current balance.
    pub account: Account,
    /// Range start, inclusive.
    pub from: NaiveDate,
    /// Range end, inclusive.
    pub to: NaiveDate,
    /// Balance immediately before `from`.
    pub opening_balance: Money,
    /// Balance at the end of `to`.
    pub closing_balance: Money,
    /// Debits in range.
    pub total_debit: Money,
    /// Credits in range.
    pub total_credit: Money,
    /// Movements in range, ordered by `(date, entry_number)`.
    pub movements: Vec<Movement>,
}

/// Movement totals of an account and its posting descendants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SubtreeTotal {
    /// Root of the subtree.
    pub account_id: AccountId,
    /// Debits in range across the subtree.
    pub total_debit: Money,
    /// Credits in range across the subtree.
    pub total_credit: Money,
    /// Sum of the accounts' balances immediately before the range.
    pub opening_balance: Money,
    /// Sum of the accounts' balances at the end of the range.
    pub closing_balance: Money,
}

/// Point of view for [`LedgerQueryEngine::subtree_total`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AsOf {
    /// Current balances held by the registry.
    Snapshot,
    /// Closing balance recomputed from entries dated up to `to`.
    Range {
        /// Range start, inclusive.
        from: NaiveDate,
        /// Range end, inclusive.
        to: NaiveDate,
    },
}

/// One posting account in a trial balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrialBalanceRow {
    /// Account id.
    pub account_id: AccountId,
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Account type.
    #[serde(rename = "type")]
    pub account_type: AccountType,
    /// Debits in range.
    pub total_debit: Money,
    /// Credits in range.
    pub total_credit: Money,
    /// Balance at the end of the range.
    pub closing_balance: Money,
}

/// Trial balance over a date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrialBalance {
    /// Range start, inclusive.
    pub from: NaiveDate,
    /// Range end, inclusive.
    pub to: NaiveDate,
    /// Accounts with activity or a non-zero balance, ordered by code.
    pub rows: Vec<TrialBalanceRow>,
    /// Debits in range across all rows.
    pub total_debit: Money,
    /// Credits in range across all rows.
    pub total_credit: Money,
    /// True when debits equal credits exactly.
    pub is_balanced: bool,
}

/// Everything one account did up to the end of a range.
struct Window {
    opening: Money,
    total_debit: Money,
    total_credit: Money,
    closing: Money,
    movements: Vec<Movement>,
}

/// Derived views over a registry and an entry store.
pub struct LedgerQueryEngine<'a, R: ?Sized, S: ?Sized> {
    registry: &'a R,
    store: &'a S,
}

impl<'a, R, S> LedgerQueryEngine<'a, R, S>
where
    R: AccountRegistry + ?Sized,
    S: EntryStore + ?Sized,
{
    /// Creates a query engine over borrowed state.
    #[must_use]
    pub const fn new(registry: &'a R, store: &'a S) -> Self {
        Self { registry, store }
    }

    /// Movements of one account in `[from, to]`.
    ///
    /// The running balance starts from the balance implied by every entry
    /// dated before `from`.
    ///
    /// # Errors
    ///
    /// `InvalidRange` if `from > to`, `UnknownAccount` for an unknown id.
    pub fn movements(
        &self,
        account_id: AccountId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> LedgerResult<Vec<Movement>> {
        check_range(from, to)?;
        let account = self.registry.get(account_id)?;
        Ok(self.window(&account, from, to)?.movements)
    }

    /// Movements of one account in `[from, to]` with opening and closing balances.
    ///
    /// # Errors
    ///
    /// Same as [`Self::movements`].
    pub fn account_statement(
        &self,
        account_id: AccountId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> LedgerResult<AccountStatement> {
        check_range(from, to)?;
        let account = self.registry.get(account_id)?;
        let window = self.window(&account, from, to)?;

        Ok(AccountStatement {
            account,
            from,
            to,
            opening_balance: window.opening,
            closing_balance: window.closing,
            total_debit: window.total_debit,
            total_credit: window.total_credit,
            movements: window.movements,
        })
    }

    /// Aggregates an account and every posting-allowed descendant over `[from, to]`.
    ///
    /// Aggregation-only accounts hold no postings and are skipped, so nothing
    /// is counted twice. Balances are summed as-is, so a subtree is expected
    /// to share one nature.
    ///
    /// # Errors
    ///
    /// `InvalidRange`, `UnknownAccount`, or `CorruptHierarchy` if the
    /// hierarchy loops.
    pub fn subtree_movement_total(
        &self,
        account_id: AccountId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> LedgerResult<SubtreeTotal> {
        check_range(from, to)?;
        let root = self.registry.get(account_id)?;
        let descendants = self.registry.descendants(account_id)?;

        let mut total = SubtreeTotal {
            account_id,
            total_debit: Money::ZERO,
            total_credit: Money::ZERO,
            opening_balance: Money::ZERO,
            closing_balance: Money::ZERO,
        };

        for account in std::iter::once(&root)
            .chain(&descendants)
            .filter(|a| a.posting_allowed)
        {
            let window = self.window(account, from, to)?;
            total.total_debit = add(total.total_debit, window.total_debit, account.id)?;
            total.total_credit = add(total.total_credit, window.total_credit, account.id)?;
            total.opening_balance = add(total.opening_balance, window.opening, account.id)?;
            total.closing_balance = add(total.closing_balance, window.closing, account.id)?;
        }

        Ok(total)
    }

    /// Balance of an account and all its descendants.
    ///
    /// # Errors
    ///
    /// Same as [`Self::subtree_movement_total`].
    pub fn subtree_total(&self, account_id: AccountId, as_of: AsOf) -> LedgerResult<Money> {
        match as_of {
            AsOf::Snapshot => self.registry.subtree_balance(account_id),
            AsOf::Range { from, to } => Ok(self
                .subtree_movement_total(account_id, from, to)?
                .closing_balance),
        }
    }

    /// Closing balances of the selected accounts' subtrees, grouped by type.
    ///
    /// Only the topmost accounts of the selection count: an account whose
    /// ancestor is also selected is already included in that ancestor's
    /// subtree. Every type is present in the result, zero if unused.
    ///
    /// # Errors
    ///
    /// Same as [`Self::subtree_movement_total`].
    pub fn statement_totals(
        &self,
        accounts: &[AccountId],
        from: NaiveDate,
        to: NaiveDate,
    ) -> LedgerResult<BTreeMap<AccountType, Money>> {
        check_range(from, to)?;

        let selected: HashSet<AccountId> = accounts.iter().copied().collect();
        let mut seen = HashSet::with_capacity(selected.len());
        let mut totals: BTreeMap<AccountType, Money> =
            AccountType::ALL.iter().map(|t| (*t, Money::ZERO)).collect();

        for &id in accounts {
            if !seen.insert(id) {
                continue;
            }
            let covered = self
                .registry
                .ancestors(id)?
                .iter()
                .any(|a| selected.contains(&a.id));
            if covered {
                continue;
            }

            let account_type = self.registry.get(id)?.account_type;
            let closing = self.subtree_movement_total(id, from, to)?.closing_balance;
            let slot = totals.entry(account_type).or_default();
            *slot = add(*slot, closing, id)?;
        }

        Ok(totals)
    }

    /// Trial balance of every posting account over `[from, to]`.
    ///
    /// Accounts with neither activity in range nor a closing balance are left out.
    ///
    /// # Errors
    ///
    /// `InvalidRange` if `from > to`.
    pub fn trial_balance(&self, from: NaiveDate, to: NaiveDate) -> LedgerResult<TrialBalance> {
        check_range(from, to)?;

        let mut rows = Vec::new();
        let mut total_debit = Money::ZERO;
        let mut total_credit = Money::ZERO;

        for account in self.registry.all().into_iter().filter(|a| a.posting_allowed) {
            let window = self.window(&account, from, to)?;
            if window.total_debit.is_zero()
                && window.total_credit.is_zero()
                && window.closing.is_zero()
            {
                continue;
            }

            total_debit = add(total_debit, window.total_debit, account.id)?;
            total_credit = add(total_credit, window.total_credit, account.id)?;
            rows.push(TrialBalanceRow {
                account_id: account.id,
                code: account.code,
                name: account.name,
                account_type: account.account_type,
                total_debit: window.total_debit,
                total_credit: window.total_credit,
                closing_balance: window.closing,
            });
        }

        Ok(TrialBalance {
            from,
            to,
            rows,
            total_debit,
            total_credit,
            is_balanced: total_debit == total_credit,
        })
    }

    fn window(&self, account: &Account, from: NaiveDate, to: NaiveDate) -> LedgerResult<Window> {
        let mut opening = Money::ZERO;
        let mut running: Option<RunningBalance> = None;
        let mut total_debit = Money::ZERO;
        let mut total_credit = Money::ZERO;
        let mut movements = Vec::new();

        // entries arrive ordered by (date, number)
        for entry in self.store.entries_for_account(account.id)? {
            if entry.date > to {
                break;
            }
            let (debit, credit) = entry
                .totals_for(account.id)
                .ok_or(LedgerError::BalanceOverflow(account.id))?;
            let change = account
                .nature
                .balance_change(debit, credit)
                .ok_or(LedgerError::BalanceOverflow(account.id))?;

            if entry.date < from {
                opening = add(opening, change, account.id)?;
                continue;
            }

            let next = running
                .unwrap_or_else(|| RunningBalance::opening(opening))
                .next(change)
                .ok_or(LedgerError::BalanceOverflow(account.id))?;
            total_debit = add(total_debit, debit, account.id)?;
            total_credit = add(total_credit, credit, account.id)?;
            movements.push(Movement {
                date: entry.date,
                entry_id: entry.id,
                entry_number: entry.number,
                narrative: entry.narrative,
                debit,
                credit,
                running_balance: next.current_balance,
            });
            running = Some(next);
        }

        Ok(Window {
            opening,
            total_debit,
            total_credit,
            closing: running.map_or(opening, |r| r.current_balance),
            movements,
        })
    }
}

fn check_range(from: NaiveDate, to: NaiveDate) -> LedgerResult<()> {
    if from > to {
        return Err(LedgerError::InvalidRange { from, to });
    }
    Ok(())
}

fn add(a: Money, b: Money, account_id: AccountId) -> LedgerResult<Money> {
    a.checked_add(b).ok_or(LedgerError::BalanceOverflow(account_id))
}
