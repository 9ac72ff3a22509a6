//! Balance sign conventions and running balances.
//!
//! - Debit-normal (asset, expense): balance += debit - credit
//! - Credit-normal (liability, equity, revenue): balance += credit - debit

use contabil_shared::types::Money;
use serde::{Deserialize, Serialize};

use super::entry::Side;

/// Sign convention of an account's balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Nature {
    /// A debit increases the balance, a credit decreases it.
    DebitNormal,
    /// A credit increases the balance, a debit decreases it.
    CreditNormal,
}

impl Nature {
    /// Returns the side that increases a balance of this nature.
    #[must_use]
    pub const fn increasing_side(self) -> Side {
        match self {
            Self::DebitNormal => Side::Debit,
            Self::CreditNormal => Side::Credit,
        }
    }

    /// Converts one posting into a signed balance delta.
    #[must_use]
    pub fn delta(self, side: Side, amount: Money) -> Money {
        if side == self.increasing_side() {
            amount
        } else {
            -amount
        }
    }

    /// Net balance change for a pair of debit and credit totals, or `None` if
    /// it is not representable.
    #[must_use]
    pub fn balance_change(self, debit: Money, credit: Money) -> Option<Money> {
        match self {
            Self::DebitNormal => debit.checked_sub(credit),
            Self::CreditNormal => credit.checked_sub(debit),
        }
    }
}

/// Balance before and after one movement on an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunningBalance {
    /// Balance before this movement.
    pub previous_balance: Money,
    /// Balance after this movement.
    pub current_balance: Money,
}

impl RunningBalance {
    /// Starts a chain at an opening balance.
    #[must_use]
    pub const fn opening(balance: Money) -> Self {
        Self {
            previous_balance: balance,
            current_balance: balance,
        }
    }

    /// Advances the chain by one movement, or `None` if the balance overflows.
    ///
    /// `previous_balance[N] == current_balance[N-1]` always holds.
    #[must_use]
    pub fn next(&self, change: Money) -> Option<Self> {
        Some(Self {
            previous_balance: self.current_balance,
            current_balance: self.current_balance.checked_add(change)?,
        })
    }
}
