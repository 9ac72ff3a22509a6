//! Atomic posting of validated entries.
//!
//! A post either lands completely (entry stored, every line applied to its
//! account) or leaves no trace. The caller must hold exclusive access to both
//! the registry and the store for the duration of [`LedgerPoster::post`].

use contabil_shared::types::JournalEntryId;
use tracing::{error, info, warn};

use super::entry::{CandidateEntry, EntryLine, EntryStatus, JournalEntry};
use super::error::LedgerResult;
use super::registry::AccountRegistry;
use super::store::EntryStore;
use super::validation::EntryValidator;

/// Validates, numbers, persists and applies journal entries.
#[derive(Debug, Clone, Copy, Default)]
pub struct LedgerPoster {
    validator: EntryValidator,
}

impl LedgerPoster {
    /// Creates a poster around a validator.
    #[must_use]
    pub const fn new(validator: EntryValidator) -> Self {
        Self { validator }
    }

    /// The validator run before every post.
    #[must_use]
    pub const fn validator(&self) -> &EntryValidator {
        &self.validator
    }

    /// Posts a candidate entry.
    ///
    /// On success the returned entry carries a fresh id and the next entry
    /// number, and every line has moved its account balance. On any failure
    /// the registry and the store are as they were before the call. A
    /// number allocated to a failed post is not reused.
    ///
    /// # Errors
    ///
    /// Validation errors from [`EntryValidator::validate`], storage errors
    /// from the store, and `BalanceOverflow` from the registry.
    pub fn post<R, S>(
        &self,
        candidate: CandidateEntry,
        registry: &mut R,
        store: &mut S,
    ) -> LedgerResult<JournalEntry>
    where
        R: AccountRegistry + ?Sized,
        S: EntryStore + ?Sized,
    {
        if let Err(e) = self.validator.validate(&candidate, &*registry) {
            warn!(
                error_code = e.error_code(),
                lines = ?e.line_indices(),
                error = %e,
                "Journal entry rejected"
            );
            return Err(e);
        }

        let number = store.allocate_number()?;
        let entry = JournalEntry {
            id: JournalEntryId::generate(),
            number,
            date: candidate.date,
            narrative: candidate.narrative,
            notes: candidate.notes,
            lines: candidate.lines,
            status: EntryStatus::Posted,
        };

        if let Err(e) = store.insert(entry.clone()) {
            warn!(entry_number = number, error = %e, "Entry store refused journal entry");
            return Err(e);
        }

        for (applied, line) in entry.lines.iter().enumerate() {
            if let Err(e) = registry.apply_delta(line.account_id, line.side, line.amount) {
                warn!(
                    entry_id = %entry.id,
                    entry_number = number,
                    line = applied,
                    error = %e,
                    "Applying journal entry failed, rolling back"
                );
                Self::roll_back(&entry, &entry.lines[..applied], registry, store);
                return Err(e);
            }
        }

        info!(
            entry_id = %entry.id,
            entry_number = entry.number,
            date = %entry.date,
            lines = entry.lines.len(),
            total = %entry.total_debit().unwrap_or_default(),
            "Journal entry posted"
        );

        Ok(entry)
    }

    /// Undoes the applied lines in reverse order, then drops the stored entry.
    fn roll_back<R, S>(entry: &JournalEntry, applied: &[EntryLine], registry: &mut R, store: &mut S)
    where
        R: AccountRegistry + ?Sized,
        S: EntryStore + ?Sized,
    {
        for line in applied.iter().rev() {
            if let Err(e) = registry.apply_delta(line.account_id, line.side.opposite(), line.amount)
            {
                error!(
                    entry_id = %entry.id,
                    account_id = %line.account_id,
                    error = %e,
                    "Rollback failed to restore account balance"
                );
            }
        }

        if store.remove(entry.id).is_none() {
            error!(entry_id = %entry.id, "Rollback could not find stored journal entry");
        }
    }
}
