use super::amount::AmountType;

/// Ledger operations with separate variants for type safety
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation<A: AmountType> {
    Deposit {
        branch: u32,
        number: u32,
        amount: A,
    },
    Withdraw {
        branch: u32,
        number: u32,
        amount: A,
    },
    /// Accounts are addressed by number only
    Transfer {
        source: u32,
        destination: u32,
        amount: A,
    },
    MigrateToPrivateBranch,
    Close {
        branch: u32,
        number: u32,
    },
    /// Read-only; never changes the ledger
    Query(Query),
}

/// Read-only ledger queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Query {
    ListAccounts,
    ListBranch(u32),
    Balance { branch: u32, number: u32 },
    /// Zero means no limit
    Lowest { limit: usize },
    /// Zero means no limit
    Highest { limit: usize },
    /// Every branch when `branch` is `None`
    Average { branch: Option<u32> },
    MinPerBranch,
    MaxPerBranch,
}

impl<A: AmountType> Operation<A> {
    /// Short name used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Deposit { .. } => "deposit",
            Self::Withdraw { .. } => "withdraw",
            Self::Transfer { .. } => "transfer",
            Self::MigrateToPrivateBranch => "migrate",
            Self::Close { .. } => "close",
            Self::Query(query) => query.kind(),
        }
    }

    pub fn is_query(&self) -> bool {
        matches!(self, Self::Query(_))
    }
}

impl Query {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ListAccounts | Self::ListBranch(_) => "list",
            Self::Balance { .. } => "balance",
            Self::Lowest { .. } => "lowest",
            Self::Highest { .. } => "highest",
            Self::Average { .. } => "average",
            Self::MinPerBranch => "min_balance",
            Self::MaxPerBranch => "max_balance",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::amount::FixedPoint;

    #[test]
    fn kind_names() {
        let deposit = Operation::Deposit {
            branch: 1,
            number: 2,
            amount: FixedPoint::from_units(3),
        };
        let migrate = Operation::<FixedPoint>::MigrateToPrivateBranch;
        let lowest = Operation::<FixedPoint>::Query(Query::Lowest { limit: 3 });

        assert_eq!(deposit.kind(), "deposit");
        assert_eq!(migrate.kind(), "migrate");
        assert_eq!(lowest.kind(), "lowest");
        assert_eq!(Query::ListBranch(4).kind(), "list");
    }

    #[test]
    fn only_queries_are_read_only() {
        assert!(Operation::<FixedPoint>::Query(Query::MaxPerBranch).is_query());
        assert!(!Operation::<FixedPoint>::MigrateToPrivateBranch.is_query());
    }
}
