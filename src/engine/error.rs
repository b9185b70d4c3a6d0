use thiserror::Error;

use crate::domain::DomainError;
use crate::storage::StorageError;

/// Ledger-level errors reported to callers
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Amount must be greater than zero, got {0}")]
    InvalidAmount(String),

    #[error("Account not found: branch {branch}, number {number}")]
    AccountNotFound { branch: u32, number: u32 },

    #[error("Source account {0} does not exist")]
    SourceNotFound(u32),

    #[error("Destination account {0} does not exist")]
    DestinationNotFound(u32),

    #[error("Source account {from} and destination account {to} do not exist")]
    BothAccountsNotFound { from: u32, to: u32 },

    #[error("Account number {0} exists in more than one branch")]
    AmbiguousAccount(u32),

    #[error("Cannot transfer from account {0} to itself")]
    SameAccount(u32),

    #[error("Account {number} has insufficient funds (fee: {fee}, available balance: {available})")]
    InsufficientFunds {
        number: u32,
        fee: String,
        available: String,
    },

    #[error("Branch {0} has no accounts")]
    BranchNotFound(u32),

    #[error("Transfer from {from} to {to} failed: {reason}")]
    TransferFailed { from: u32, to: u32, reason: String },

    #[error("Account {0} kept changing concurrently; giving up")]
    ConcurrentModification(u32),

    #[error("Domain error: {0}")]
    Domain(DomainError),

    #[error("Repository error: {0}")]
    RepositoryError(#[from] StorageError),
}

impl From<DomainError> for LedgerError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::InvalidAmount(amount) => Self::InvalidAmount(amount),
            DomainError::InsufficientFunds {
                number,
                fee,
                available,
            } => Self::InsufficientFunds {
                number,
                fee,
                available,
            },
            other => Self::Domain(other),
        }
    }
}

impl LedgerError {
    /// Business-rule rejections, as opposed to infrastructure failures
    pub fn is_rejection(&self) -> bool {
        !matches!(
            self,
            Self::RepositoryError(_) | Self::TransferFailed { .. } | Self::ConcurrentModification(_)
        )
    }
}
