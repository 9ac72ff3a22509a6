//! Chart of accounts registry.
//!
//! The registry is the source of truth for the account hierarchy and the only
//! place an account balance changes. Traversal methods carry their own cycle
//! guard even though loading already rejects cycles.

use std::collections::{BTreeSet, HashMap, HashSet};

use contabil_shared::types::{AccountId, Money};

use super::account::{Account, NewAccount};
use super::entry::Side;
use super::error::{ChartError, LedgerError, LedgerResult};

/// Read/write access to the chart of accounts.
pub trait AccountRegistry {
    /// Looks up one account.
    fn get(&self, id: AccountId) -> LedgerResult<Account>;

    /// Direct children of an account, ordered by code.
    fn children(&self, id: AccountId) -> LedgerResult<Vec<Account>>;

    /// Parentless accounts, ordered by code.
    fn roots(&self) -> Vec<Account>;

    /// Every account, ordered by code.
    fn all(&self) -> Vec<Account>;

    /// Number of accounts in the chart.
    fn count(&self) -> usize;

    /// Moves an account balance by one posting, using the account's nature.
    ///
    /// Fails with `UnknownAccount` for an unknown id and `PostingNotAllowed`
    /// for an aggregation-only account. On failure the balance is untouched.
    fn apply_delta(&mut self, id: AccountId, side: Side, amount: Money) -> LedgerResult<()>;

    /// All descendants of an account in pre-order, code-ordered at each level.
    ///
    /// Fails with `CorruptHierarchy` if an account is reached twice.
    fn descendants(&self, id: AccountId) -> LedgerResult<Vec<Account>> {
        let mut visited = HashSet::from([id]);
        let mut stack: Vec<Account> = self.children(id)?.into_iter().rev().collect();
        let mut out = Vec::new();

        while let Some(account) = stack.pop() {
            if !visited.insert(account.id) {
                return Err(LedgerError::CorruptHierarchy(account.id));
            }
            stack.extend(self.children(account.id)?.into_iter().rev());
            out.push(account);
        }

        Ok(out)
    }

    /// Ancestors of an account, nearest first.
    ///
    /// Fails with `CorruptHierarchy` if the parent chain loops.
    fn ancestors(&self, id: AccountId) -> LedgerResult<Vec<Account>> {
        let mut visited = HashSet::from([id]);
        let mut out = Vec::new();
        let mut next = self.get(id)?.parent_id;

        while let Some(parent_id) = next {
            if !visited.insert(parent_id) {
                return Err(LedgerError::CorruptHierarchy(parent_id));
            }
            let parent = self.get(parent_id)?;
            next = parent.parent_id;
            out.push(parent);
        }

        Ok(out)
    }

    /// Sum of the current balances of an account and all its descendants.
    ///
    /// Fails with `BalanceOverflow` if the sum is not representable.
    fn subtree_balance(&self, id: AccountId) -> LedgerResult<Money> {
        let own = self.get(id)?.balance;
        self.descendants(id)?
            .iter()
            .try_fold(own, |total, account| total.checked_add(account.balance))
            .ok_or(LedgerError::BalanceOverflow(id))
    }
}

/// In-memory chart of accounts.
#[derive(Debug, Default, Clone)]
pub struct InMemoryAccountRegistry {
    accounts: HashMap<AccountId, Account>,
    codes: HashMap<String, AccountId>,
    /// Children by parent, `None` holding the roots. Keyed by code for ordering.
    children: HashMap<Option<AccountId>, BTreeSet<(String, AccountId)>>,
}

impl InMemoryAccountRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a complete chart. Accounts may come in any order.
    ///
    /// # Errors
    ///
    /// Rejects blank codes or names, duplicate ids or codes, unknown parents,
    /// and parent cycles.
    pub fn from_chart(chart: Vec<NewAccount>) -> Result<Self, ChartError> {
        let mut parents: HashMap<AccountId, Option<AccountId>> = HashMap::with_capacity(chart.len());
        let mut codes = HashSet::with_capacity(chart.len());

        for input in &chart {
            check_labels(input)?;
            if parents.insert(input.id, input.parent_id).is_some() {
                return Err(ChartError::DuplicateAccountId(input.id));
            }
            if !codes.insert(input.code.as_str()) {
                return Err(ChartError::DuplicateCode(input.code.clone()));
            }
        }

        for parent_id in parents.values().flatten() {
            if !parents.contains_key(parent_id) {
                return Err(ChartError::ParentNotFound(*parent_id));
            }
        }

        detect_cycles(&parents)?;

        let mut registry = Self::new();
        for input in chart {
            registry.index(input.into_account());
        }
        Ok(registry)
    }

    /// Adds one account under an existing parent.
    ///
    /// # Errors
    ///
    /// Same rules as [`Self::from_chart`].
    pub fn insert(&mut self, input: NewAccount) -> Result<Account, ChartError> {
        check_labels(&input)?;
        if input.parent_id == Some(input.id) {
            return Err(ChartError::CycleDetected(input.id));
        }
        if self.accounts.contains_key(&input.id) {
            return Err(ChartError::DuplicateAccountId(input.id));
        }
        if self.codes.contains_key(&input.code) {
            return Err(ChartError::DuplicateCode(input.code));
        }
        if let Some(parent_id) = input.parent_id
            && !self.accounts.contains_key(&parent_id)
        {
            return Err(ChartError::ParentNotFound(parent_id));
        }

        let account = input.into_account();
        self.index(account.clone());
        Ok(account)
    }

    /// Number of accounts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Returns true if the chart is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    fn index(&mut self, account: Account) {
        self.codes.insert(account.code.clone(), account.id);
        self.children
            .entry(account.parent_id)
            .or_default()
            .insert((account.code.clone(), account.id));
        self.accounts.insert(account.id, account);
    }

    fn collect(&self, key: Option<AccountId>) -> Vec<Account> {
        self.children
            .get(&key)
            .into_iter()
            .flatten()
            .filter_map(|(_, id)| self.accounts.get(id).cloned())
            .collect()
    }

    /// Rewires a parent link without any checks, to simulate a corrupted store.
    #[cfg(test)]
    pub(crate) fn force_parent(&mut self, id: AccountId, parent_id: Option<AccountId>) {
        let Some(account) = self.accounts.get_mut(&id) else {
            return;
        };
        let key = (account.code.clone(), id);
        if let Some(siblings) = self.children.get_mut(&account.parent_id) {
            siblings.remove(&key);
        }
        account.parent_id = parent_id;
        self.children.entry(parent_id).or_default().insert(key);
    }
}

impl AccountRegistry for InMemoryAccountRegistry {
    fn get(&self, id: AccountId) -> LedgerResult<Account> {
        self.accounts
            .get(&id)
            .cloned()
            .ok_or(LedgerError::UnknownAccount(id))
    }

    fn children(&self, id: AccountId) -> LedgerResult<Vec<Account>> {
        if !self.accounts.contains_key(&id) {
            return Err(LedgerError::UnknownAccount(id));
        }
        Ok(self.collect(Some(id)))
    }

    fn roots(&self) -> Vec<Account> {
        self.collect(None)
    }

    fn all(&self) -> Vec<Account> {
        let mut accounts: Vec<Account> = self.accounts.values().cloned().collect();
        accounts.sort_by(|a, b| a.code.cmp(&b.code));
        accounts
    }

    fn count(&self) -> usize {
        self.accounts.len()
    }

    fn apply_delta(&mut self, id: AccountId, side: Side, amount: Money) -> LedgerResult<()> {
        let account = self
            .accounts
            .get_mut(&id)
            .ok_or(LedgerError::UnknownAccount(id))?;
        if !account.posting_allowed {
            return Err(LedgerError::posting_not_allowed(id));
        }
        account.balance = account
            .balance
            .checked_add(account.nature.delta(side, amount))
            .ok_or(LedgerError::BalanceOverflow(id))?;
        Ok(())
    }
}

fn check_labels(input: &NewAccount) -> Result<(), ChartError> {
    if input.code.trim().is_empty() {
        return Err(ChartError::EmptyCode(input.id));
    }
    if input.name.trim().is_empty() {
        return Err(ChartError::EmptyName(input.id));
    }
    Ok(())
}

/// Walks every parent chain once, remembering finished nodes.
fn detect_cycles(parents: &HashMap<AccountId, Option<AccountId>>) -> Result<(), ChartError> {
    let mut finished: HashSet<AccountId> = HashSet::with_capacity(parents.len());

    for &start in parents.keys() {
        let mut path = HashSet::new();
        let mut current = Some(start);

        while let Some(id) = current {
            if finished.contains(&id) {
                break;
            }
            if !path.insert(id) {
                return Err(ChartError::CycleDetected(id));
            }
            current = parents.get(&id).copied().flatten();
        }

        finished.extend(path);
    }

    Ok(())
}
