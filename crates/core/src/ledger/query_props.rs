//! Property-based tests for LedgerQueryEngine.
//!
//! - Running balance: the last movement of an account equals its registry balance
//! - Rollup: a parent's closing balance is the sum of its children's
//! - Continuity: opening balance plus range movements equals closing balance

use chrono::{Days, NaiveDate};
use contabil_shared::types::{AccountId, Money};
use proptest::prelude::*;

use super::account::{AccountType, NewAccount};
use super::entry::{CandidateEntry, EntryLine};
use super::poster::LedgerPoster;
use super::query::LedgerQueryEngine;
use super::registry::{AccountRegistry, InMemoryAccountRegistry};
use super::store::InMemoryEntryStore;

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

/// (day offset, debit leaf, credit leaf, cents)
fn posting() -> impl Strategy<Value = (u64, usize, usize, i64)> {
    (0u64..90, 0usize..4, 0usize..4, 1i64..1_000_000i64)
}

struct Book {
    registry: InMemoryAccountRegistry,
    store: InMemoryEntryStore,
    assets: AccountId,
    current: AccountId,
    leaves: [AccountId; 4],
}

/// assets > current > {cash, bank}, assets > {receivables}, plus a revenue leaf.
fn book(postings: &[(u64, usize, usize, i64)]) -> Book {
    let assets = NewAccount::group("1", "Ativo", AccountType::Asset, None);
    let current = NewAccount::group("1.1", "Disponível", AccountType::Asset, Some(assets.id));
    let cash = NewAccount::leaf("1.1.01", "Caixa", AccountType::Asset, Some(current.id));
    let bank = NewAccount::leaf("1.1.02", "Banco", AccountType::Asset, Some(current.id));
    let receivables = NewAccount::leaf("1.2", "Clientes", AccountType::Asset, Some(assets.id));
    let sales = NewAccount::leaf("3.1", "Vendas", AccountType::Revenue, None);

    let (assets_id, current_id) = (assets.id, current.id);
    let leaves = [cash.id, bank.id, receivables.id, sales.id];
    let mut registry =
        InMemoryAccountRegistry::from_chart(vec![assets, current, cash, bank, receivables, sales])
            .unwrap();
    let mut store = InMemoryEntryStore::new();

    let poster = LedgerPoster::default();
    for (offset, debit, credit, cents) in postings {
        let amount = Money::from_minor_units(*cents, 2);
        let candidate = CandidateEntry {
            date: base_date() + Days::new(*offset),
            narrative: "Lançamento".to_string(),
            notes: None,
            lines: vec![
                EntryLine::debit(leaves[*debit], amount),
                EntryLine::credit(leaves[*credit], amount),
            ],
        };
        poster.post(candidate, &mut registry, &mut store).unwrap();
    }

    Book {
        registry,
        store,
        assets: assets_id,
        current: current_id,
        leaves,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_last_running_balance_matches_registry(
        postings in prop::collection::vec(posting(), 1..25),
    ) {
        let b = book(&postings);
        let engine = LedgerQueryEngine::new(&b.registry, &b.store);
        let end = base_date() + Days::new(365);

        for id in b.leaves {
            let movements = engine.movements(id, base_date(), end).unwrap();
            let last = movements.last().map_or(Money::ZERO, |m| m.running_balance);
            prop_assert_eq!(last, b.registry.get(id).unwrap().balance);
        }
    }

    #[test]
    fn prop_parent_closing_is_sum_of_children(
        postings in prop::collection::vec(posting(), 0..25),
        start in 0u64..90,
        len in 0u64..60,
    ) {
        let b = book(&postings);
        let engine = LedgerQueryEngine::new(&b.registry, &b.store);
        let from = base_date() + Days::new(start);
        let to = from + Days::new(len);

        for parent in [b.assets, b.current] {
            let total = engine.subtree_movement_total(parent, from, to).unwrap();
            let children = Money::checked_sum(
                b.registry
                    .children(parent)
                    .unwrap()
                    .iter()
                    .map(|child| engine.subtree_movement_total(child.id, from, to).unwrap().closing_balance),
            )
            .unwrap();
            prop_assert_eq!(total.closing_balance, children);
        }
    }

    #[test]
    fn prop_opening_plus_movements_is_closing(
        postings in prop::collection::vec(posting(), 0..25),
        start in 0u64..90,
        len in 0u64..60,
    ) {
        let b = book(&postings);
        let engine = LedgerQueryEngine::new(&b.registry, &b.store);
        let from = base_date() + Days::new(start);
        let to = from + Days::new(len);

        for id in b.leaves {
            let statement = engine.account_statement(id, from, to).unwrap();
            let nature = statement.account.nature;
            let change = nature
                .balance_change(statement.total_debit, statement.total_credit)
                .unwrap();
            let expected = statement.opening_balance.checked_add(change).unwrap();
            prop_assert_eq!(statement.closing_balance, expected);
            for pair in statement.movements.windows(2) {
                prop_assert!((pair[0].date, pair[0].entry_number) < (pair[1].date, pair[1].entry_number));
            }
        }
    }
}
