//! Property-based tests for LedgerPoster.
//!
//! - Atomicity: a successful post moves each account by exactly its expected
//!   delta; a failed post changes no balance and stores nothing
//! - Numbering: entry numbers are unique and increasing

use std::collections::HashMap;

use chrono::NaiveDate;
use contabil_shared::types::{AccountId, Money};
use proptest::prelude::*;

use super::account::{AccountType, NewAccount};
use super::entry::{CandidateEntry, EntryLine, Side};
use super::registry::{AccountRegistry, InMemoryAccountRegistry};
use super::poster::LedgerPoster;
use super::store::{EntryStore, InMemoryEntryStore};

/// One generated line: account slot, side, amount in cents (may be non-positive).
type LinePlan = (usize, bool, i64);

fn line_plan() -> impl Strategy<Value = LinePlan> {
    (0usize..5, any::<bool>(), -50i64..100_000i64)
}

/// Entries that are often valid: a balanced pair plus a few random extra lines.
fn entry_plan() -> impl Strategy<Value = (usize, usize, i64, Vec<LinePlan>)> {
    (
        0usize..5,
        0usize..5,
        1i64..100_000i64,
        prop::collection::vec(line_plan(), 0..3),
    )
}

struct Book {
    registry: InMemoryAccountRegistry,
    store: InMemoryEntryStore,
    /// Four leaves and one group.
    slots: [AccountId; 5],
}

fn book() -> Book {
    let group = NewAccount::group("1", "Ativo", AccountType::Asset, None);
    let cash = NewAccount::leaf("1.1", "Caixa", AccountType::Asset, Some(group.id));
    let bank = NewAccount::leaf("1.2", "Banco", AccountType::Asset, Some(group.id));
    let loan = NewAccount::leaf("2.1", "Empréstimos", AccountType::Liability, None);
    let rent = NewAccount::leaf("4.1", "Aluguel", AccountType::Expense, None);
    let slots = [cash.id, bank.id, loan.id, rent.id, group.id];
    Book {
        registry: InMemoryAccountRegistry::from_chart(vec![group, cash, bank, loan, rent]).unwrap(),
        store: InMemoryEntryStore::new(),
        slots,
    }
}

fn build(slots: &[AccountId; 5], plan: &(usize, usize, i64, Vec<LinePlan>)) -> CandidateEntry {
    let (debit_slot, credit_slot, cents, extra) = plan;
    let amount = Money::from_minor_units(*cents, 2);
    let mut lines = vec![
        EntryLine::debit(slots[*debit_slot], amount),
        EntryLine::credit(slots[*credit_slot], amount),
    ];
    for (slot, is_debit, cents) in extra {
        let amount = Money::from_minor_units(*cents, 2);
        lines.push(if *is_debit {
            EntryLine::debit(slots[*slot], amount)
        } else {
            EntryLine::credit(slots[*slot], amount)
        });
    }
    CandidateEntry {
        date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        narrative: "Lançamento".to_string(),
        notes: None,
        lines,
    }
}

fn snapshot(registry: &InMemoryAccountRegistry) -> HashMap<AccountId, Money> {
    registry.all().into_iter().map(|a| (a.id, a.balance)).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_post_is_all_or_nothing(plans in prop::collection::vec(entry_plan(), 1..12)) {
        let mut b = book();
        let poster = LedgerPoster::default();
        let mut last_number = 0;

        for plan in &plans {
            let candidate = build(&b.slots, plan);
            let before = snapshot(&b.registry);
            let stored_before = b.store.count();

            match poster.post(candidate.clone(), &mut b.registry, &mut b.store) {
                Ok(entry) => {
                    prop_assert_eq!(entry.total_debit(), entry.total_credit());
                    prop_assert!(entry.number > last_number);
                    last_number = entry.number;
                    prop_assert_eq!(b.store.count(), stored_before + 1);

                    let mut expected = before.clone();
                    for line in &candidate.lines {
                        let account = b.registry.get(line.account_id).unwrap();
                        let slot = expected.get_mut(&line.account_id).unwrap();
                        *slot = slot.checked_add(account.nature.delta(line.side, line.amount)).unwrap();
                    }
                    prop_assert_eq!(snapshot(&b.registry), expected);
                }
                Err(_) => {
                    prop_assert_eq!(snapshot(&b.registry), before);
                    prop_assert_eq!(b.store.count(), stored_before);
                }
            }
        }
    }

    /// Any line on the group account sinks the whole entry.
    #[test]
    fn prop_group_line_always_rejected(plan in entry_plan(), side in any::<bool>()) {
        let mut b = book();
        let mut candidate = build(&b.slots, &plan);
        let amount = candidate.lines[0].amount;
        let side = if side { Side::Debit } else { Side::Credit };
        candidate.lines.push(EntryLine { account_id: b.slots[4], side, amount });

        let before = snapshot(&b.registry);
        let result = LedgerPoster::default().post(candidate, &mut b.registry, &mut b.store);
        prop_assert!(result.is_err());
        prop_assert_eq!(snapshot(&b.registry), before);
        prop_assert_eq!(b.store.count(), 0);
    }
}
