use crate::domain::{Account, AmountType};

/// Account projection without holder name or storage identity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountBalance<A: AmountType> {
    pub branch: u32,
    pub number: u32,
    pub balance: A,
}

impl<A: AmountType> From<&Account<A>> for AccountBalance<A> {
    fn from(account: &Account<A>) -> Self {
        Self {
            branch: account.branch(),
            number: account.number(),
            balance: account.balance(),
        }
    }
}

/// Outcome of a committed transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferReceipt<A: AmountType> {
    pub source: AccountBalance<A>,
    pub destination: AccountBalance<A>,
    /// Zero for transfers within a branch
    pub fee: A,
}

/// One value per branch (average, minimum or maximum balance)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BranchBalance<A: AmountType> {
    pub branch: u32,
    pub balance: A,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClosedAccount {
    pub branch: u32,
    pub number: u32,
    /// Accounts left in the branch after closing
    pub remaining_in_branch: usize,
}

/// Result of executing a single `Operation`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<A: AmountType> {
    Account(Account<A>),
    Transfer(TransferReceipt<A>),
    Migrated(Vec<Account<A>>),
    Closed(ClosedAccount),
    Accounts(Vec<Account<A>>),
    Balances(Vec<AccountBalance<A>>),
    BranchBalances(Vec<BranchBalance<A>>),
}
