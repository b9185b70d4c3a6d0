//! Prelude module for convenient imports
//!
//! Import everything you need with: `use bankledger::prelude::*;`

// Domain types
pub use crate::domain::{
    Account, AccountId, AmountType, DomainError, FeeSchedule, FixedPoint, NewAccount, Operation,
    Query,
};

// Storage types
pub use crate::storage::{
    AccountFilter, AccountRepository, ConcurrentAccountRepository, Extremum, SortOrder,
    StorageError,
};

// Engine types
pub use crate::engine::{
    AccountBalance, BranchBalance, ClosedAccount, LedgerConfig, LedgerEngine, LedgerError,
    MigrationMode, Outcome, PRIVATE_BRANCH, TransferReceipt,
};

// IO types
pub use crate::io::{
    CsvAccountStream, CsvOperationStream, IoError, load_accounts, load_accounts_from_file,
    write_snapshot,
};

// Streaming types
pub use crate::streaming::{
    AbortOnError, ErrorPolicy, ProcessingSession, SessionStats, SilentSkip, SkipErrors,
};

// App types
pub use crate::app::{AppError, CliApp};
