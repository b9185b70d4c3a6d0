pub mod account;
pub mod amount;
pub mod error;
pub mod fees;
pub mod operation;
pub mod operations;

// Re-export commonly used types
pub use account::{Account, AccountId, NewAccount};
pub use amount::{AmountType, FixedPoint};
pub use error::DomainError;
pub use fees::FeeSchedule;
pub use operation::{Operation, Query};
pub use operations::{
    TransferPlan, apply_deposit, apply_migration, apply_withdrawal, ensure_positive,
    plan_transfer, richest_first, select_richest,
};
