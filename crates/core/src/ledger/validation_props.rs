//! Property-based tests for entry validation.
//!
//! - Exact balance: any non-zero difference between debits and credits is rejected
//! - Non-leaf protection: a line on an aggregation-only account always fails
//! - Amount sign: a non-positive amount is reported on its own line index
//! - Precision limit: totals that would need rounding are refused, never rounded

use chrono::NaiveDate;
use contabil_shared::types::{AccountId, Money};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::account::{AccountType, NewAccount};
use super::entry::{CandidateEntry, EntryLine};
use super::error::{LedgerError, ValidationKind};
use super::registry::InMemoryAccountRegistry;
use super::validation::EntryValidator;

/// Strategy for positive amounts with up to four decimal places (0.0001 to 100,000.0000).
fn positive_amount() -> impl Strategy<Value = Money> {
    (1i64..1_000_000_000i64).prop_map(|units| Money::from_minor_units(units, 4))
}

/// Strategy for a split of one total into 1..6 positive parts.
fn split_amount() -> impl Strategy<Value = Vec<Money>> {
    prop::collection::vec(1i64..1_000_000i64, 1..6)
        .prop_map(|parts| parts.into_iter().map(|p| Money::from_minor_units(p, 2)).collect())
}

/// Strategy for amounts of 21 to 28 significant digits with up to two decimal places.
fn large_amount() -> impl Strategy<Value = Money> {
    (10i128.pow(20)..10i128.pow(28), 0u32..=2)
        .prop_map(|(mantissa, scale)| Money::new(Decimal::from_i128_with_scale(mantissa, scale)))
}

/// Strategy for tiny amounts with two to six decimal places.
fn tiny_amount() -> impl Strategy<Value = Money> {
    (1i64..1_000i64, 2u32..=6).prop_map(|(units, scale)| Money::from_minor_units(units, scale))
}

struct Chart {
    registry: InMemoryAccountRegistry,
    group: AccountId,
    cash: AccountId,
    capital: AccountId,
}

fn chart() -> Chart {
    let group = NewAccount::group("1", "Ativo", AccountType::Asset, None);
    let cash = NewAccount::leaf("1.1", "Caixa", AccountType::Asset, Some(group.id));
    let capital = NewAccount::leaf("2.1", "Capital", AccountType::Equity, None);
    let ids = (group.id, cash.id, capital.id);
    Chart {
        registry: InMemoryAccountRegistry::from_chart(vec![group, cash, capital]).unwrap(),
        group: ids.0,
        cash: ids.1,
        capital: ids.2,
    }
}

fn candidate(lines: Vec<EntryLine>) -> CandidateEntry {
    CandidateEntry {
        date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        narrative: "Lançamento".to_string(),
        notes: None,
        lines,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Debits split across several lines against one credit of the same total pass.
    #[test]
    fn prop_split_balanced_entries_pass(parts in split_amount()) {
        let c = chart();
        let total = Money::checked_sum(parts.iter().copied()).unwrap();
        let mut lines: Vec<EntryLine> = parts.iter().map(|p| EntryLine::debit(c.cash, *p)).collect();
        lines.push(EntryLine::credit(c.capital, total));

        prop_assert!(EntryValidator::default().validate(&candidate(lines), &c.registry).is_ok());
    }

    /// Nudging one side by any amount, however small, makes the entry unbalanced.
    #[test]
    fn prop_any_difference_is_rejected(amount in positive_amount(), nudge in 1i64..10_000i64) {
        let c = chart();
        let credit = amount.checked_add(Money::from_minor_units(nudge, 6)).unwrap();
        let lines = vec![EntryLine::debit(c.cash, amount), EntryLine::credit(c.capital, credit)];

        match EntryValidator::default().validate(&candidate(lines), &c.registry) {
            Err(LedgerError::Validation(err)) => {
                prop_assert_eq!(err.kind, ValidationKind::Unbalanced { debit: amount, credit });
            }
            other => prop_assert!(false, "expected Unbalanced, got {:?}", other),
        }
    }

    /// A line on a group account fails even when the entry balances.
    #[test]
    fn prop_group_account_never_postable(amount in positive_amount(), position in 0usize..3) {
        let c = chart();
        let mut lines = vec![
            EntryLine::debit(c.cash, amount),
            EntryLine::credit(c.capital, amount),
        ];
        lines.insert(position, EntryLine::debit(c.group, amount));
        lines.push(EntryLine::credit(c.capital, amount));

        match EntryValidator::default().validate(&candidate(lines), &c.registry) {
            Err(LedgerError::PostingNotAllowed { accounts, lines }) => {
                prop_assert_eq!(accounts, vec![c.group]);
                prop_assert_eq!(lines, vec![position]);
            }
            other => prop_assert!(false, "expected PostingNotAllowed, got {:?}", other),
        }
    }

    /// A zero or negative amount is reported at its index.
    #[test]
    fn prop_non_positive_amount_reported(units in -1_000_000i64..=0i64, position in 0usize..2) {
        let c = chart();
        let mut lines = vec![
            EntryLine::debit(c.cash, Money::from(10)),
            EntryLine::credit(c.capital, Money::from(10)),
        ];
        lines[position].amount = Money::from_minor_units(units, 2);

        match EntryValidator::default().validate(&candidate(lines), &c.registry) {
            Err(LedgerError::Validation(err)) => {
                prop_assert_eq!(err.kind, ValidationKind::NonPositiveAmount);
                prop_assert_eq!(err.lines, vec![position]);
            }
            other => prop_assert!(false, "expected NonPositiveAmount, got {:?}", other),
        }
    }

    /// Near the precision limit an off-by-a-little entry is still never accepted.
    #[test]
    fn prop_large_unbalanced_entry_never_passes(big in large_amount(), tiny in tiny_amount()) {
        let c = chart();
        let lines = vec![
            EntryLine::debit(c.cash, big),
            EntryLine::debit(c.cash, tiny),
            EntryLine::credit(c.capital, big),
        ];

        match EntryValidator::default().validate(&candidate(lines), &c.registry) {
            Err(LedgerError::Validation(err)) => prop_assert!(matches!(
                err.kind,
                ValidationKind::AmountOverflow | ValidationKind::Unbalanced { .. }
            ), "unexpected validation kind: {:?}", err.kind),
            other => prop_assert!(false, "expected a validation error, got {:?}", other),
        }
    }

    /// A large balanced entry passes when its totals are exact and is refused otherwise.
    #[test]
    fn prop_large_balanced_entry_exact_or_refused(big in large_amount(), tiny in tiny_amount()) {
        let c = chart();
        let lines = vec![
            EntryLine::debit(c.cash, big),
            EntryLine::debit(c.cash, tiny),
            EntryLine::credit(c.capital, big),
            EntryLine::credit(c.capital, tiny),
        ];
        let result = EntryValidator::default().validate(&candidate(lines), &c.registry);

        if big.checked_add(tiny).is_some() {
            prop_assert!(result.is_ok(), "expected exact totals to pass, got {:?}", result);
        } else {
            match result {
                Err(LedgerError::Validation(err)) => {
                    prop_assert_eq!(err.kind, ValidationKind::AmountOverflow);
                    prop_assert_eq!(err.lines, vec![1]);
                }
                other => prop_assert!(false, "expected AmountOverflow, got {:?}", other),
            }
        }
    }
}
