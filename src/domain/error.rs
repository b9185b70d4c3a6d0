use thiserror::Error;

/// Domain-level errors representing business rule violations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid amount: {0} (must be a positive decimal with at most 4 places)")]
    InvalidAmount(String),

    #[error(
        "Account {number} has insufficient funds (fee: {fee}, available balance: {available})"
    )]
    InsufficientFunds {
        number: u32,
        fee: String,
        available: String,
    },

    #[error("Balance cannot be negative: {0}")]
    NegativeBalance(String),

    #[error("Arithmetic overflow")]
    Overflow,
}
