//! Banking ledger: account balances across branches with deposits,
//! withdrawals, transfers and migration of each branch's richest client
//! into a private branch.
//!
//! The [`engine::LedgerEngine`] enforces the balance rules on top of any
//! [`storage::AccountRepository`]; the `io` and `streaming` modules drive it
//! from CSV files.

pub mod app;
pub mod domain;
pub mod engine;
pub mod io;
pub mod prelude;
pub mod storage;
pub mod streaming;
