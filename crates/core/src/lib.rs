//! Core ledger logic for Contabil.
//!
//! This crate contains the double-entry engine with ZERO web dependencies:
//! domain types, validation rules, posting and derived views all live here.
//! Storage sits behind the `AccountRegistry` and `EntryStore` traits.
//!
//! # Modules
//!
//! - `ledger` - Chart of accounts, posting and queries

pub mod ledger;
