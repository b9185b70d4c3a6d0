use std::time::Duration;

use crate::domain::{AmountType, FeeSchedule};

/// Branch receiving each branch's richest client during migration
pub const PRIVATE_BRANCH: u32 = 99;

pub const DEFAULT_MAX_RETRIES: usize = 16;

pub const DEFAULT_REPOSITORY_TIMEOUT: Duration = Duration::from_secs(5);

/// How repeated private-branch migrations behave
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MigrationMode {
    /// A branch that already sent a client to the private branch is skipped
    #[default]
    Idempotent,
    /// Every run moves the current richest client of every branch
    Cumulative,
}

/// Ledger engine configuration
#[derive(Debug, Clone)]
pub struct LedgerConfig<A: AmountType> {
    pub fees: FeeSchedule<A>,
    pub private_branch: u32,
    pub migration_mode: MigrationMode,
    /// Compare-and-swap attempts before giving up with `ConcurrentModification`
    pub max_retries: usize,
    /// Upper bound for every repository call
    pub repository_timeout: Duration,
}

impl<A: AmountType> LedgerConfig<A> {
    pub fn with_fees(mut self, fees: FeeSchedule<A>) -> Self {
        self.fees = fees;
        self
    }

    pub fn with_private_branch(mut self, branch: u32) -> Self {
        self.private_branch = branch;
        self
    }

    pub fn with_migration_mode(mut self, mode: MigrationMode) -> Self {
        self.migration_mode = mode;
        self
    }

    pub fn with_max_retries(mut self, retries: usize) -> Self {
        self.max_retries = retries.max(1);
        self
    }

    pub fn with_repository_timeout(mut self, timeout: Duration) -> Self {
        self.repository_timeout = timeout;
        self
    }
}

impl<A: AmountType> Default for LedgerConfig<A> {
    fn default() -> Self {
        Self {
            fees: FeeSchedule::default(),
            private_branch: PRIVATE_BRANCH,
            migration_mode: MigrationMode::default(),
            max_retries: DEFAULT_MAX_RETRIES,
            repository_timeout: DEFAULT_REPOSITORY_TIMEOUT,
        }
    }
}
