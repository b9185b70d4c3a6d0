use std::cmp::Ordering;

use crate::domain::{Account, AmountType, richest_first};

/// Selection of accounts for `find_many`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccountFilter {
    pub branch: Option<u32>,
    pub number: Option<u32>,
}

impl AccountFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn branch(branch: u32) -> Self {
        Self {
            branch: Some(branch),
            number: None,
        }
    }

    pub fn number(number: u32) -> Self {
        Self {
            branch: None,
            number: Some(number),
        }
    }

    pub fn matches<A: AmountType>(&self, account: &Account<A>) -> bool {
        self.branch.is_none_or(|b| account.branch() == b)
            && self.number.is_none_or(|n| account.number() == n)
    }
}

/// Result ordering for `find_many`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Lowest balance first
    BalanceAscending,
    /// Highest balance first, ties by holder name
    BalanceDescending,
    /// Branch, then account number
    BranchAndNumber,
}

impl SortOrder {
    pub fn compare<A: AmountType>(&self, a: &Account<A>, b: &Account<A>) -> Ordering {
        match self {
            Self::BalanceAscending => a.balance().cmp(&b.balance()).then(a.id().cmp(&b.id())),
            Self::BalanceDescending => richest_first(a, b),
            Self::BranchAndNumber => (a.branch(), a.number(), a.id()).cmp(&(
                b.branch(),
                b.number(),
                b.id(),
            )),
        }
    }
}

/// Which balance extreme to aggregate per branch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extremum {
    Min,
    Max,
}
