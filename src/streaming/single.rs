use futures::{Stream, StreamExt};
use tracing::{debug, info};

use super::error::ErrorPolicy;
use crate::domain::{AmountType, Operation};
use crate::engine::{LedgerEngine, Outcome};
use crate::io::IoError;
use crate::storage::AccountRepository;

/// Counters for one processed stream
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub applied: usize,
    pub rejected: usize,
    pub malformed: usize,
}

/// Applies a stream of operations to a ledger, one at a time in stream order
pub struct ProcessingSession<A, R, P>
where
    A: AmountType,
    R: AccountRepository<A> + 'static,
    P: ErrorPolicy,
{
    engine: LedgerEngine<A, R>,
    error_policy: P,
    stats: SessionStats,
}

impl<A, R, P> ProcessingSession<A, R, P>
where
    A: AmountType,
    R: AccountRepository<A> + 'static,
    P: ErrorPolicy,
{
    pub fn new(engine: LedgerEngine<A, R>, error_policy: P) -> Self {
        Self {
            engine,
            error_policy,
            stats: SessionStats::default(),
        }
    }

    /// Process a stream of operations
    /// Returns true if the whole stream was consumed (errors skipped per policy)
    /// Returns false if processing was aborted due to error policy
    pub async fn process_stream<S>(&mut self, mut stream: S) -> bool
    where
        S: Stream<Item = Result<Operation<A>, IoError>> + Unpin,
    {
        while let Some(result) = stream.next().await {
            match result {
                Ok(operation) => {
                    let kind = operation.kind();
                    let is_query = operation.is_query();
                    match self.engine.execute(operation).await {
                        Ok(outcome) => {
                            if is_query {
                                log_query_result(kind, &outcome);
                            } else {
                                debug!(operation = kind, "Operation applied");
                            }
                            self.stats.applied += 1;
                        }
                        Err(e) => {
                            self.stats.rejected += 1;
                            if !self.error_policy.handle_ledger_error(e) {
                                return false;
                            }
                        }
                    }
                }
                Err(e) => {
                    self.stats.malformed += 1;
                    if !self.error_policy.handle_io_error(e) {
                        return false;
                    }
                }
            }
        }

        true
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn engine(&self) -> &LedgerEngine<A, R> {
        &self.engine
    }

    /// Consume the session and return the engine
    pub fn into_engine(self) -> LedgerEngine<A, R> {
        self.engine
    }
}

/// Query results go to the log; stdout only carries the final snapshot
fn log_query_result<A: AmountType>(query: &str, outcome: &Outcome<A>) {
    match outcome {
        Outcome::Account(account) => info!(
            query,
            branch = account.branch(),
            number = account.number(),
            holder = %account.holder_name(),
            balance = %account.balance(),
            "Account"
        ),
        Outcome::Accounts(accounts) => {
            info!(query, count = accounts.len(), "Query result");
            for account in accounts {
                info!(
                    query,
                    branch = account.branch(),
                    number = account.number(),
                    holder = %account.holder_name(),
                    balance = %account.balance(),
                    "Account"
                );
            }
        }
        Outcome::Balances(balances) => {
            info!(query, count = balances.len(), "Query result");
            for entry in balances {
                info!(
                    query,
                    branch = entry.branch,
                    number = entry.number,
                    balance = %entry.balance,
                    "Account"
                );
            }
        }
        Outcome::BranchBalances(balances) => {
            for entry in balances {
                info!(query, branch = entry.branch, balance = %entry.balance, "Branch balance");
            }
        }
        Outcome::Transfer(_) | Outcome::Migrated(_) | Outcome::Closed(_) => {}
    }
}
