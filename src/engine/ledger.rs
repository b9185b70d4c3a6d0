use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

use dashmap::DashMap;
use futures::future::join_all;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use super::config::{LedgerConfig, MigrationMode};
use super::error::LedgerError;
use super::report::{AccountBalance, BranchBalance, ClosedAccount, Outcome, TransferReceipt};
use crate::domain::{
    Account, AmountType, DomainError, Operation, Query, TransferPlan, apply_deposit, apply_migration,
    apply_withdrawal, ensure_positive, plan_transfer, select_richest,
};
use crate::storage::{AccountFilter, AccountRepository, Extremum, SortOrder, StorageError};

/// Ledger engine applying balance rules to accounts held in a repository
///
/// Cloning is cheap and clones share the repository and the migration lock
/// table, so one engine can serve many concurrent tasks.
pub struct LedgerEngine<A, R>
where
    A: AmountType,
    R: AccountRepository<A>,
{
    inner: Arc<EngineInner<A, R>>,
}

struct EngineInner<A: AmountType, R> {
    repository: R,
    config: LedgerConfig<A>,
    branch_locks: DashMap<u32, Arc<Mutex<()>>>,
}

impl<A, R> Clone for LedgerEngine<A, R>
where
    A: AmountType,
    R: AccountRepository<A>,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A, R> LedgerEngine<A, R>
where
    A: AmountType,
    R: AccountRepository<A> + 'static,
{
    /// Create an engine with the default fees and private branch
    pub fn new(repository: R) -> Self {
        Self::with_config(repository, LedgerConfig::default())
    }

    pub fn with_config(repository: R, config: LedgerConfig<A>) -> Self {
        Self {
            inner: Arc::new(EngineInner {
                repository,
                config,
                branch_locks: DashMap::new(),
            }),
        }
    }

    pub fn repository(&self) -> &R {
        &self.inner.repository
    }

    pub fn config(&self) -> &LedgerConfig<A> {
        &self.inner.config
    }

    /// Execute a single operation
    pub async fn execute(&self, operation: Operation<A>) -> Result<Outcome<A>, LedgerError> {
        match operation {
            Operation::Deposit {
                branch,
                number,
                amount,
            } => self.deposit(branch, number, amount).await.map(Outcome::Account),
            Operation::Withdraw {
                branch,
                number,
                amount,
            } => self.withdraw(branch, number, amount).await.map(Outcome::Account),
            Operation::Transfer {
                source,
                destination,
                amount,
            } => self
                .transfer(source, destination, amount)
                .await
                .map(Outcome::Transfer),
            Operation::MigrateToPrivateBranch => {
                self.migrate_to_private_branch().await.map(Outcome::Migrated)
            }
            Operation::Close { branch, number } => {
                self.close_account(branch, number).await.map(Outcome::Closed)
            }
            Operation::Query(query) => self.query(query).await,
        }
    }

    /// Run a read-only query
    pub async fn query(&self, query: Query) -> Result<Outcome<A>, LedgerError> {
        match query {
            Query::ListAccounts => self.list_accounts().await.map(Outcome::Accounts),
            Query::ListBranch(branch) => self.list_branch(branch).await.map(Outcome::Accounts),
            Query::Balance { branch, number } => {
                self.balance(branch, number).await.map(Outcome::Account)
            }
            Query::Lowest { limit } => self.lowest_balances(limit).await.map(Outcome::Balances),
            Query::Highest { limit } => self.highest_balances(limit).await.map(Outcome::Accounts),
            Query::Average { branch } => self
                .average_balance(branch)
                .await
                .map(Outcome::BranchBalances),
            Query::MinPerBranch => self
                .min_balance_per_branch()
                .await
                .map(Outcome::BranchBalances),
            Query::MaxPerBranch => self
                .max_balance_per_branch()
                .await
                .map(Outcome::BranchBalances),
        }
    }

    pub async fn deposit(
        &self,
        branch: u32,
        number: u32,
        amount: A,
    ) -> Result<Account<A>, LedgerError> {
        debug!(branch, number, %amount, "Processing deposit");
        ensure_positive(amount)?;
        self.mutate(branch, number, |account| apply_deposit(account, amount))
            .await
    }

    /// Withdraw `amount`, charging the configured withdrawal fee on top
    pub async fn withdraw(
        &self,
        branch: u32,
        number: u32,
        amount: A,
    ) -> Result<Account<A>, LedgerError> {
        debug!(branch, number, %amount, "Processing withdrawal");
        ensure_positive(amount)?;
        let fee = self.inner.config.fees.withdrawal;
        self.mutate(branch, number, |account| {
            apply_withdrawal(account, amount, fee)
        })
        .await
    }

    /// Transfer between two accounts addressed by number
    ///
    /// The source debit is committed first and the destination credit second;
    /// when the credit cannot be committed the debit is reverted and
    /// `TransferFailed` is returned. The commit phase runs in its own task, so
    /// dropping the returned future never leaves a debit without its credit
    /// or its reversal.
    pub async fn transfer(
        &self,
        source: u32,
        destination: u32,
        amount: A,
    ) -> Result<TransferReceipt<A>, LedgerError> {
        debug!(source, destination, %amount, "Processing transfer");
        ensure_positive(amount)?;
        if source == destination {
            return Err(LedgerError::SameAccount(source));
        }

        let engine = self.clone();
        tokio::spawn(async move { engine.run_transfer(source, destination, amount).await })
            .await
            .map_err(|err| LedgerError::TransferFailed {
                from: source,
                to: destination,
                reason: err.to_string(),
            })?
    }

    /// Move the richest client of every branch into the private branch
    ///
    /// Branches are processed concurrently, each under its own lock. Returns
    /// every account in the private branch afterwards.
    pub async fn migrate_to_private_branch(&self) -> Result<Vec<Account<A>>, LedgerError> {
        let private = self.inner.config.private_branch;
        let branches = self
            .call(self.repository().distinct_branches(Some(private)))
            .await?;
        info!(
            branches = branches.len(),
            private_branch = private,
            "Migrating richest clients"
        );

        let results = join_all(branches.into_iter().map(|b| self.migrate_branch(b))).await;

        let mut first_error = None;
        for result in results {
            if let Err(err) = result {
                warn!(error = %err, "Branch migration failed");
                if first_error.is_none() {
                    first_error = Some(err);
                }
            }
        }
        if let Some(err) = first_error {
            return Err(err);
        }

        self.list_branch(private).await
    }

    pub async fn close_account(
        &self,
        branch: u32,
        number: u32,
    ) -> Result<ClosedAccount, LedgerError> {
        debug!(branch, number, "Closing account");
        let removed = self
            .call(self.repository().delete(branch, number))
            .await
            .map_err(lookup_error)?;
        let remaining_in_branch = self.call(self.repository().count_by_branch(branch)).await?;

        match removed {
            Some(_) => Ok(ClosedAccount {
                branch,
                number,
                remaining_in_branch,
            }),
            None => Err(LedgerError::AccountNotFound { branch, number }),
        }
    }

    pub async fn list_accounts(&self) -> Result<Vec<Account<A>>, LedgerError> {
        Ok(self
            .call(self.repository().find_many(AccountFilter::all(), None, None))
            .await?)
    }

    pub async fn list_branch(&self, branch: u32) -> Result<Vec<Account<A>>, LedgerError> {
        Ok(self
            .call(
                self.repository()
                    .find_many(AccountFilter::branch(branch), None, None),
            )
            .await?)
    }

    /// Current state of one account
    pub async fn balance(&self, branch: u32, number: u32) -> Result<Account<A>, LedgerError> {
        self.find_account(branch, number).await
    }

    /// Poorest accounts first; a `limit` of zero means no limit
    pub async fn lowest_balances(
        &self,
        limit: usize,
    ) -> Result<Vec<AccountBalance<A>>, LedgerError> {
        let accounts = self
            .call(self.repository().find_many(
                AccountFilter::all(),
                Some(SortOrder::BalanceAscending),
                non_zero(limit),
            ))
            .await?;
        Ok(accounts.iter().map(AccountBalance::from).collect())
    }

    /// Richest accounts first, ties by holder name; a `limit` of zero means no limit
    pub async fn highest_balances(&self, limit: usize) -> Result<Vec<Account<A>>, LedgerError> {
        Ok(self
            .call(self.repository().find_many(
                AccountFilter::all(),
                Some(SortOrder::BalanceDescending),
                non_zero(limit),
            ))
            .await?)
    }

    /// Average balance of every branch, or of one branch
    pub async fn average_balance(
        &self,
        branch: Option<u32>,
    ) -> Result<Vec<BranchBalance<A>>, LedgerError> {
        if let Some(branch) = branch {
            let count = self.call(self.repository().count_by_branch(branch)).await?;
            if count == 0 {
                return Err(LedgerError::BranchNotFound(branch));
            }
        }
        let averages = self
            .call(self.repository().aggregate_average_balance(branch))
            .await?;
        Ok(per_branch(averages))
    }

    pub async fn min_balance_per_branch(&self) -> Result<Vec<BranchBalance<A>>, LedgerError> {
        let minimums = self
            .call(self.repository().aggregate_balance(Extremum::Min))
            .await?;
        Ok(per_branch(minimums))
    }

    pub async fn max_balance_per_branch(&self) -> Result<Vec<BranchBalance<A>>, LedgerError> {
        let maximums = self
            .call(self.repository().aggregate_balance(Extremum::Max))
            .await?;
        Ok(per_branch(maximums))
    }

    /// Compare-and-swap attempts per operation, never fewer than one
    fn max_attempts(&self) -> usize {
        self.inner.config.max_retries.max(1)
    }

    /// Bound a repository call by the configured timeout
    async fn call<T>(
        &self,
        request: impl Future<Output = Result<T, StorageError>>,
    ) -> Result<T, StorageError> {
        let limit = self.inner.config.repository_timeout;
        tokio::time::timeout(limit, request)
            .await
            .map_err(|_| StorageError::Timeout(limit))?
    }

    async fn find_account(&self, branch: u32, number: u32) -> Result<Account<A>, LedgerError> {
        self.call(self.repository().find_one(Some(branch), number))
            .await
            .map_err(lookup_error)?
            .ok_or(LedgerError::AccountNotFound { branch, number })
    }

    async fn find_by_number(&self, number: u32) -> Result<Option<Account<A>>, LedgerError> {
        self.call(self.repository().find_one(None, number))
            .await
            .map_err(lookup_error)
    }

    /// Optimistic read-modify-write of a single account
    async fn mutate<F>(&self, branch: u32, number: u32, apply: F) -> Result<Account<A>, LedgerError>
    where
        F: Fn(&mut Account<A>) -> Result<(), DomainError> + Send + Sync,
    {
        for attempt in 0..self.max_attempts() {
            let current = self.find_account(branch, number).await?;
            let mut next = current.clone();
            apply(&mut next)?;

            match self
                .call(self.repository().update(current.id(), current.version(), next))
                .await
            {
                Ok(committed) => return Ok(committed),
                Err(StorageError::VersionConflict { .. }) => {
                    debug!(branch, number, attempt, "Account changed concurrently, retrying");
                }
                Err(StorageError::NotFound) => {
                    return Err(LedgerError::AccountNotFound { branch, number });
                }
                Err(err) => return Err(err.into()),
            }
        }
        Err(LedgerError::ConcurrentModification(number))
    }

    /// Re-read by identity and apply until the compare-and-swap succeeds
    async fn apply_by_id<F>(&self, start: Account<A>, apply: F) -> Result<Account<A>, LedgerError>
    where
        F: Fn(&mut Account<A>) -> Result<(), DomainError> + Send + Sync,
    {
        let mut current = start;
        for _ in 0..self.max_attempts() {
            let mut next = current.clone();
            apply(&mut next)?;

            match self
                .call(self.repository().update(current.id(), current.version(), next))
                .await
            {
                Ok(committed) => return Ok(committed),
                Err(StorageError::VersionConflict { .. }) => {
                    current = self
                        .call(self.repository().find_by_id(current.id()))
                        .await?
                        .ok_or(LedgerError::AccountNotFound {
                            branch: current.branch(),
                            number: current.number(),
                        })?;
                }
                Err(StorageError::NotFound) => {
                    return Err(LedgerError::AccountNotFound {
                        branch: current.branch(),
                        number: current.number(),
                    });
                }
                Err(err) => return Err(err.into()),
            }
        }
        Err(LedgerError::ConcurrentModification(current.number()))
    }

    async fn resolve_pair(
        &self,
        source: u32,
        destination: u32,
    ) -> Result<(Account<A>, Account<A>), LedgerError> {
        let (from, to) = tokio::try_join!(
            self.find_by_number(source),
            self.find_by_number(destination)
        )?;

        match (from, to) {
            (Some(from), Some(to)) => Ok((from, to)),
            (None, None) => Err(LedgerError::BothAccountsNotFound {
                from: source,
                to: destination,
            }),
            (None, Some(_)) => Err(LedgerError::SourceNotFound(source)),
            (Some(_), None) => Err(LedgerError::DestinationNotFound(destination)),
        }
    }

    async fn run_transfer(
        &self,
        source: u32,
        destination: u32,
        amount: A,
    ) -> Result<TransferReceipt<A>, LedgerError> {
        for attempt in 0..self.max_attempts() {
            let (from, to) = self.resolve_pair(source, destination).await?;
            let plan = plan_transfer(&from, &to, amount, &self.inner.config.fees)?;

            let mut debited = from.clone();
            plan.apply_to_source(&mut debited)?;
            let committed_source = match self
                .call(self.repository().update(from.id(), from.version(), debited))
                .await
            {
                Ok(account) => account,
                Err(StorageError::VersionConflict { .. }) => {
                    debug!(source, attempt, "Source changed during transfer, retrying");
                    continue;
                }
                Err(StorageError::NotFound) => return Err(LedgerError::SourceNotFound(source)),
                Err(err) => return Err(err.into()),
            };

            return match self
                .apply_by_id(to, |account| plan.apply_to_destination(account))
                .await
            {
                Ok(committed_destination) => {
                    info!(source, destination, %amount, fee = %plan.fee, "Transfer committed");
                    Ok(TransferReceipt {
                        source: AccountBalance::from(&committed_source),
                        destination: AccountBalance::from(&committed_destination),
                        fee: plan.fee,
                    })
                }
                Err(err) => Err(self
                    .roll_back(committed_source, &plan, source, destination, err)
                    .await),
            };
        }
        Err(LedgerError::ConcurrentModification(source))
    }

    async fn roll_back(
        &self,
        committed_source: Account<A>,
        plan: &TransferPlan<A>,
        source: u32,
        destination: u32,
        cause: LedgerError,
    ) -> LedgerError {
        warn!(
            source,
            destination,
            error = %cause,
            "Destination credit failed, reverting source debit"
        );

        let reason = match self
            .apply_by_id(committed_source, |account| plan.revert_source(account))
            .await
        {
            Ok(_) => format!("destination not credited ({cause}); source debit reverted"),
            Err(revert_err) => {
                error!(
                    source,
                    destination,
                    error = %revert_err,
                    "Source debit could not be reverted"
                );
                format!("destination not credited ({cause}); source reversal failed ({revert_err})")
            }
        };

        LedgerError::TransferFailed {
            from: source,
            to: destination,
            reason,
        }
    }

    async fn migrate_branch(&self, branch: u32) -> Result<Option<Account<A>>, LedgerError> {
        let lock = self.inner.branch_locks.entry(branch).or_default().clone();
        let _guard = lock.lock().await;
        let private = self.inner.config.private_branch;

        if self.inner.config.migration_mode == MigrationMode::Idempotent
            && self.has_migrant_from(branch).await?
        {
            debug!(branch, "Branch already has a client in the private branch, skipping");
            return Ok(None);
        }

        let mut last_number = 0;
        for attempt in 0..self.max_attempts() {
            let accounts = self.list_branch(branch).await?;
            let Some(richest) = select_richest(&accounts) else {
                return Ok(None);
            };
            last_number = richest.number();

            let mut moved = richest.clone();
            apply_migration(&mut moved, private);
            match self
                .call(self.repository().update(richest.id(), richest.version(), moved))
                .await
            {
                Ok(account) => {
                    info!(
                        branch,
                        number = account.number(),
                        balance = %account.balance(),
                        "Moved richest client to private branch"
                    );
                    return Ok(Some(account));
                }
                Err(StorageError::VersionConflict { .. } | StorageError::NotFound) => {
                    debug!(branch, attempt, "Branch changed during migration, reselecting");
                }
                Err(StorageError::Duplicate { number, .. }) => {
                    warn!(
                        branch,
                        number,
                        private_branch = private,
                        "Account number already taken in the private branch, skipping branch"
                    );
                    return Ok(None);
                }
                Err(err) => return Err(err.into()),
            }
        }
        Err(LedgerError::ConcurrentModification(last_number))
    }

    async fn has_migrant_from(&self, branch: u32) -> Result<bool, LedgerError> {
        let private = self.list_branch(self.inner.config.private_branch).await?;
        Ok(private.iter().any(|a| a.migrated_from() == Some(branch)))
    }
}

fn lookup_error(err: StorageError) -> LedgerError {
    match err {
        StorageError::Ambiguous { number, .. } => LedgerError::AmbiguousAccount(number),
        other => other.into(),
    }
}

fn non_zero(limit: usize) -> Option<usize> {
    (limit > 0).then_some(limit)
}

fn per_branch<A: AmountType>(values: BTreeMap<u32, A>) -> Vec<BranchBalance<A>> {
    values
        .into_iter()
        .map(|(branch, balance)| BranchBalance { branch, balance })
        .collect()
}
