//! Journal entry storage.

use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDate;
use contabil_shared::types::{AccountId, JournalEntryId};

use super::entry::JournalEntry;
use super::error::{LedgerError, LedgerResult};

/// Append-only record store for posted entries.
///
/// `remove` exists only so the poster can undo an insert it made moments
/// earlier inside the same critical section.
pub trait EntryStore {
    /// Hands out the next entry number. Numbers are never handed out twice.
    fn allocate_number(&mut self) -> LedgerResult<u64>;

    /// Persists an entry. Fails with `StorageConflict` on a duplicate id or number.
    fn insert(&mut self, entry: JournalEntry) -> LedgerResult<()>;

    /// Removes an entry, returning it if it existed.
    fn remove(&mut self, id: JournalEntryId) -> Option<JournalEntry>;

    /// Looks up one entry.
    fn get(&self, id: JournalEntryId) -> LedgerResult<Option<JournalEntry>>;

    /// Every entry with at least one line on the account, ordered by
    /// `(date, number)`.
    fn entries_for_account(&self, account_id: AccountId) -> LedgerResult<Vec<JournalEntry>>;

    /// Number of stored entries.
    fn count(&self) -> usize;
}

type EntryKey = (NaiveDate, u64, JournalEntryId);

/// In-memory entry store.
#[derive(Debug, Clone)]
pub struct InMemoryEntryStore {
    entries: HashMap<JournalEntryId, JournalEntry>,
    numbers: HashMap<u64, JournalEntryId>,
    by_account: HashMap<AccountId, BTreeSet<EntryKey>>,
    next_number: u64,
}

impl Default for InMemoryEntryStore {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            numbers: HashMap::new(),
            by_account: HashMap::new(),
            next_number: 1,
        }
    }
}

impl InMemoryEntryStore {
    /// Creates an empty store whose first entry number is 1.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl EntryStore for InMemoryEntryStore {
    fn allocate_number(&mut self) -> LedgerResult<u64> {
        let number = self.next_number;
        self.next_number = number
            .checked_add(1)
            .ok_or_else(|| LedgerError::StorageConflict("entry numbers exhausted".to_string()))?;
        Ok(number)
    }

    fn insert(&mut self, entry: JournalEntry) -> LedgerResult<()> {
        if self.entries.contains_key(&entry.id) {
            return Err(LedgerError::StorageConflict(format!(
                "entry {} already exists",
                entry.id
            )));
        }
        if self.numbers.contains_key(&entry.number) {
            return Err(LedgerError::StorageConflict(format!(
                "entry number {} already taken",
                entry.number
            )));
        }

        let key = (entry.date, entry.number, entry.id);
        for line in &entry.lines {
            self.by_account.entry(line.account_id).or_default().insert(key);
        }
        self.numbers.insert(entry.number, entry.id);
        self.entries.insert(entry.id, entry);
        Ok(())
    }

    fn remove(&mut self, id: JournalEntryId) -> Option<JournalEntry> {
        let entry = self.entries.remove(&id)?;
        self.numbers.remove(&entry.number);
        let key = (entry.date, entry.number, entry.id);
        for line in &entry.lines {
            if let Some(keys) = self.by_account.get_mut(&line.account_id) {
                keys.remove(&key);
                if keys.is_empty() {
                    self.by_account.remove(&line.account_id);
                }
            }
        }
        Some(entry)
    }

    fn get(&self, id: JournalEntryId) -> LedgerResult<Option<JournalEntry>> {
        Ok(self.entries.get(&id).cloned())
    }

    fn entries_for_account(&self, account_id: AccountId) -> LedgerResult<Vec<JournalEntry>> {
        Ok(self
            .by_account
            .get(&account_id)
            .into_iter()
            .flatten()
            .filter_map(|(_, _, id)| self.entries.get(id).cloned())
            .collect())
    }

    fn count(&self) -> usize {
        self.entries.len()
    }
}
