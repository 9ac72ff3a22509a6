//! Candidate entry validation.
//!
//! Checks run in a fixed order and stop at the first failing check. Within a
//! line-level check every offending line is reported.

use chrono::{NaiveDate, Utc};
use contabil_shared::types::{AccountId, Money};

use super::entry::{CandidateEntry, Side};
use super::error::{LedgerError, LedgerResult, ValidationError, ValidationKind};
use super::registry::AccountRegistry;

/// Caller-supplied validation policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidationOptions {
    /// Reject entries dated after today.
    pub reject_future_dates: bool,
    /// Fixed "today" instead of the UTC clock.
    pub today: Option<NaiveDate>,
}

/// Gatekeeper in front of the poster.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntryValidator {
    options: ValidationOptions,
}

impl EntryValidator {
    /// Creates a validator with the given policy.
    #[must_use]
    pub const fn new(options: ValidationOptions) -> Self {
        Self { options }
    }

    /// The active policy.
    #[must_use]
    pub const fn options(&self) -> ValidationOptions {
        self.options
    }

    /// Validates a candidate against the chart of accounts.
    ///
    /// Order: line count, amounts, posting eligibility, narrative, date,
    /// balance. The balance comparison is exact decimal equality.
    pub fn validate<R>(&self, candidate: &CandidateEntry, registry: &R) -> LedgerResult<()>
    where
        R: AccountRegistry + ?Sized,
    {
        // 1. A single line cannot balance
        if candidate.lines.len() < 2 {
            return Err(ValidationError::entry(ValidationKind::InsufficientLines).into());
        }

        // 2. Direction lives in the side, never in the sign
        let non_positive: Vec<usize> = candidate
            .lines
            .iter()
            .enumerate()
            .filter(|(_, line)| !line.amount.is_positive())
            .map(|(i, _)| i)
            .collect();
        if !non_positive.is_empty() {
            return Err(
                ValidationError::at_lines(ValidationKind::NonPositiveAmount, non_positive).into(),
            );
        }

        // 3. Only posting-allowed accounts may appear on a line
        Self::check_posting_eligibility(candidate, registry)?;

        // 4. Narrative
        if candidate.narrative.trim().is_empty() {
            return Err(ValidationError::entry(ValidationKind::EmptyNarrative).into());
        }

        // 5. Date policy
        if self.options.reject_future_dates && candidate.date > self.today() {
            return Err(ValidationError::entry(ValidationKind::FutureDate).into());
        }

        // 6. Balance
        let (debit, credit) = Self::totals(candidate)?;
        if debit != credit {
            return Err(ValidationError::entry(ValidationKind::Unbalanced { debit, credit }).into());
        }

        Ok(())
    }

    fn check_posting_eligibility<R>(candidate: &CandidateEntry, registry: &R) -> LedgerResult<()>
    where
        R: AccountRegistry + ?Sized,
    {
        let mut lines = Vec::new();
        let mut accounts: Vec<AccountId> = Vec::new();

        for (i, line) in candidate.lines.iter().enumerate() {
            let eligible = match registry.get(line.account_id) {
                Ok(account) => account.posting_allowed,
                Err(LedgerError::UnknownAccount(_)) => false,
                Err(other) => return Err(other),
            };
            if !eligible {
                lines.push(i);
                if !accounts.contains(&line.account_id) {
                    accounts.push(line.account_id);
                }
            }
        }

        if lines.is_empty() {
            Ok(())
        } else {
            Err(LedgerError::PostingNotAllowed { accounts, lines })
        }
    }

    fn totals(candidate: &CandidateEntry) -> LedgerResult<(Money, Money)> {
        let mut debit = Money::ZERO;
        let mut credit = Money::ZERO;

        for (i, line) in candidate.lines.iter().enumerate() {
            let total = match line.side {
                Side::Debit => &mut debit,
                Side::Credit => &mut credit,
            };
            *total = total.checked_add(line.amount).ok_or_else(|| {
                ValidationError::at_lines(ValidationKind::AmountOverflow, vec![i])
            })?;
        }

        Ok((debit, credit))
    }

    fn today(&self) -> NaiveDate {
        self.options.today.unwrap_or_else(|| Utc::now().date_naive())
    }
}
