use std::fmt;

use super::amount::AmountType;
use super::error::DomainError;

/// Opaque storage identity of an account, assigned by the repository
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AccountId(u64);

impl AccountId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Account data before the repository assigns an identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount<A: AmountType> {
    pub branch: u32,
    pub number: u32,
    pub holder_name: String,
    pub balance: A,
}

impl<A: AmountType> NewAccount<A> {
    /// Build a new account, rejecting a negative opening balance
    pub fn new(
        branch: u32,
        number: u32,
        holder_name: impl Into<String>,
        balance: A,
    ) -> Result<Self, DomainError> {
        if balance < A::zero() {
            return Err(DomainError::NegativeBalance(balance.to_decimal_string()));
        }
        Ok(Self {
            branch,
            number,
            holder_name: holder_name.into(),
            balance,
        })
    }
}

/// Bank account with private fields enforcing invariants
///
/// `version` is bumped by the repository on every committed update and is
/// the compare-and-swap token for optimistic concurrency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account<A: AmountType> {
    id: AccountId,
    branch: u32,
    number: u32,
    holder_name: String,
    balance: A,
    version: u64,
    migrated_from: Option<u32>,
}

impl<A: AmountType> Account<A> {
    /// Materialize a stored account at version 0
    pub fn new(id: AccountId, new: NewAccount<A>) -> Self {
        Self {
            id,
            branch: new.branch,
            number: new.number,
            holder_name: new.holder_name,
            balance: new.balance,
            version: 0,
            migrated_from: None,
        }
    }

    pub fn id(&self) -> AccountId {
        self.id
    }

    /// Branch ("agência") the account currently belongs to
    pub fn branch(&self) -> u32 {
        self.branch
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn holder_name(&self) -> &str {
        &self.holder_name
    }

    pub fn balance(&self) -> A {
        self.balance
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Branch this account left when it was moved into the private branch
    pub fn migrated_from(&self) -> Option<u32> {
        self.migrated_from
    }

    // Internal mutation methods for use by operations module and storage
    pub(crate) fn set_balance(&mut self, amount: A) {
        self.balance = amount;
    }

    pub(crate) fn move_to_branch(&mut self, branch: u32) {
        self.migrated_from = Some(self.branch);
        self.branch = branch;
    }

    pub(crate) fn set_version(&mut self, version: u64) {
        self.version = version;
    }
}
