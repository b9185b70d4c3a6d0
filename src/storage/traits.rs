use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;

use super::error::StorageError;
use super::query::{AccountFilter, Extremum, SortOrder};
use crate::domain::{Account, AccountId, AmountType, NewAccount};

/// Document-store contract consumed by the ledger engine
///
/// Implementations must make `update` a compare-and-swap on the account
/// version: the new state is stored only when the stored version still equals
/// `expected_version`, and the stored version is then incremented.
#[async_trait]
pub trait AccountRepository<A: AmountType>: Send + Sync {
    /// Find one account by number, optionally restricted to a branch.
    /// More than one match is `StorageError::Ambiguous`.
    async fn find_one(
        &self,
        branch: Option<u32>,
        number: u32,
    ) -> Result<Option<Account<A>>, StorageError>;

    /// Fetch an account by storage identity
    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account<A>>, StorageError>;

    async fn find_many(
        &self,
        filter: AccountFilter,
        sort: Option<SortOrder>,
        limit: Option<usize>,
    ) -> Result<Vec<Account<A>>, StorageError>;

    /// Compare-and-swap update, returns the committed state
    async fn update(
        &self,
        id: AccountId,
        expected_version: u64,
        new_state: Account<A>,
    ) -> Result<Account<A>, StorageError>;

    async fn insert(&self, account: NewAccount<A>) -> Result<Account<A>, StorageError>;

    /// Remove an account, returning it if it existed
    async fn delete(&self, branch: u32, number: u32) -> Result<Option<Account<A>>, StorageError>;

    /// Average balance per branch (only `branch` when given)
    async fn aggregate_average_balance(
        &self,
        branch: Option<u32>,
    ) -> Result<BTreeMap<u32, A>, StorageError>;

    /// Lowest or highest balance per branch
    async fn aggregate_balance(&self, kind: Extremum) -> Result<BTreeMap<u32, A>, StorageError>;

    async fn count_by_branch(&self, branch: u32) -> Result<usize, StorageError>;

    async fn distinct_branches(&self, excluding: Option<u32>)
    -> Result<BTreeSet<u32>, StorageError>;
}

// Shared repositories behave like the repository they wrap
#[async_trait]
impl<A, R> AccountRepository<A> for Arc<R>
where
    A: AmountType,
    R: AccountRepository<A> + ?Sized,
{
    async fn find_one(
        &self,
        branch: Option<u32>,
        number: u32,
    ) -> Result<Option<Account<A>>, StorageError> {
        (**self).find_one(branch, number).await
    }

    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account<A>>, StorageError> {
        (**self).find_by_id(id).await
    }

    async fn find_many(
        &self,
        filter: AccountFilter,
        sort: Option<SortOrder>,
        limit: Option<usize>,
    ) -> Result<Vec<Account<A>>, StorageError> {
        (**self).find_many(filter, sort, limit).await
    }

    async fn update(
        &self,
        id: AccountId,
        expected_version: u64,
        new_state: Account<A>,
    ) -> Result<Account<A>, StorageError> {
        (**self).update(id, expected_version, new_state).await
    }

    async fn insert(&self, account: NewAccount<A>) -> Result<Account<A>, StorageError> {
        (**self).insert(account).await
    }

    async fn delete(&self, branch: u32, number: u32) -> Result<Option<Account<A>>, StorageError> {
        (**self).delete(branch, number).await
    }

    async fn aggregate_average_balance(
        &self,
        branch: Option<u32>,
    ) -> Result<BTreeMap<u32, A>, StorageError> {
        (**self).aggregate_average_balance(branch).await
    }

    async fn aggregate_balance(&self, kind: Extremum) -> Result<BTreeMap<u32, A>, StorageError> {
        (**self).aggregate_balance(kind).await
    }

    async fn count_by_branch(&self, branch: u32) -> Result<usize, StorageError> {
        (**self).count_by_branch(branch).await
    }

    async fn distinct_branches(
        &self,
        excluding: Option<u32>,
    ) -> Result<BTreeSet<u32>, StorageError> {
        (**self).distinct_branches(excluding).await
    }
}
