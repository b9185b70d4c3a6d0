use serde::Deserialize;

use super::error::IoError;
use crate::domain::{AmountType, NewAccount, Operation, Query};

/// Raw seed record as read from the accounts file
#[derive(Debug, Deserialize)]
pub struct RawAccountRecord {
    pub branch: u32,
    pub number: u32,
    pub name: String,
    pub balance: String,
}

impl RawAccountRecord {
    /// Parse this raw record into an account ready for insertion
    pub fn parse<A: AmountType>(self) -> Result<NewAccount<A>, IoError> {
        let balance = A::from_decimal_str(&self.balance)
            .map_err(|_| IoError::InvalidAmount(self.balance.clone()))?;
        Ok(NewAccount::new(
            self.branch,
            self.number,
            self.name.trim(),
            balance,
        )?)
    }
}

/// Raw CSV record as read from the operations file
#[derive(Debug, Deserialize)]
pub struct RawOperationRecord {
    pub op: String,
    pub branch: Option<u32>,
    pub number: Option<u32>,
    pub target: Option<u32>,
    pub amount: Option<String>,
    /// Only read by `lowest` and `highest`; files may omit the column
    #[serde(default)]
    pub limit: Option<usize>,
}

impl RawOperationRecord {
    /// Parse this raw record into a strongly-typed Operation
    pub fn parse<A: AmountType>(self) -> Result<Operation<A>, IoError> {
        let op = self.op.trim().to_lowercase();

        match op.as_str() {
            "deposit" => Ok(Operation::Deposit {
                branch: required(self.branch, "branch required for deposit")?,
                number: required(self.number, "number required for deposit")?,
                amount: parse_amount(self.amount, "amount required for deposit")?,
            }),
            "withdraw" | "withdrawal" => Ok(Operation::Withdraw {
                branch: required(self.branch, "branch required for withdraw")?,
                number: required(self.number, "number required for withdraw")?,
                amount: parse_amount(self.amount, "amount required for withdraw")?,
            }),
            "transfer" => Ok(Operation::Transfer {
                source: required(self.number, "source number required for transfer")?,
                destination: required(self.target, "target number required for transfer")?,
                amount: parse_amount(self.amount, "amount required for transfer")?,
            }),
            "migrate" => Ok(Operation::MigrateToPrivateBranch),
            "close" => Ok(Operation::Close {
                branch: required(self.branch, "branch required for close")?,
                number: required(self.number, "number required for close")?,
            }),
            "list" => Ok(Operation::Query(match self.branch {
                Some(branch) => Query::ListBranch(branch),
                None => Query::ListAccounts,
            })),
            "balance" => Ok(Operation::Query(Query::Balance {
                branch: required(self.branch, "branch required for balance")?,
                number: required(self.number, "number required for balance")?,
            })),
            "lowest" => Ok(Operation::Query(Query::Lowest {
                limit: self.limit.unwrap_or(0),
            })),
            "highest" => Ok(Operation::Query(Query::Highest {
                limit: self.limit.unwrap_or(0),
            })),
            "average" => Ok(Operation::Query(Query::Average {
                branch: self.branch,
            })),
            "min_balance" => Ok(Operation::Query(Query::MinPerBranch)),
            "max_balance" => Ok(Operation::Query(Query::MaxPerBranch)),
            _ => Err(IoError::InvalidOperationType(self.op)),
        }
    }
}

fn required<T>(value: Option<T>, what: &str) -> Result<T, IoError> {
    value.ok_or_else(|| IoError::MissingField(what.to_string()))
}

fn parse_amount<A: AmountType>(raw: Option<String>, what: &str) -> Result<A, IoError> {
    let raw = required(raw, what)?;
    A::from_decimal_str(&raw).map_err(|_| IoError::InvalidAmount(raw))
}
