// src/persistence/mod.rs
pub mod ledger_store;

pub use ledger_store::{JsonLedgerStore, LedgerStore, LedgerWriter};
