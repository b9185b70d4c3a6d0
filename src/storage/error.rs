use std::time::Duration;

use thiserror::Error;

use crate::domain::{AccountId, DomainError};

/// Storage-level errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Entity not found")]
    NotFound,

    #[error("Account {id} was modified concurrently (expected version {expected}, found {actual})")]
    VersionConflict {
        id: AccountId,
        expected: u64,
        actual: u64,
    },

    #[error("Account number {number} matches {matches} accounts")]
    Ambiguous { number: u32, matches: usize },

    #[error("Account {number} already exists in branch {branch}")]
    Duplicate { branch: u32, number: u32 },

    #[error("Repository call timed out after {0:?}")]
    Timeout(Duration),

    #[error("Repository unavailable: {0}")]
    Unavailable(String),

    #[error("Domain error: {0}")]
    DomainError(#[from] DomainError),
}
