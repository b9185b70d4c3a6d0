pub mod config;
pub mod error;
pub mod ledger;
pub mod report;

// Re-export commonly used types
pub use config::{
    DEFAULT_MAX_RETRIES, DEFAULT_REPOSITORY_TIMEOUT, LedgerConfig, MigrationMode, PRIVATE_BRANCH,
};
pub use error::LedgerError;
pub use ledger::LedgerEngine;
pub use report::{AccountBalance, BranchBalance, ClosedAccount, Outcome, TransferReceipt};
