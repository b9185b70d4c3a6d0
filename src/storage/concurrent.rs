use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use super::error::StorageError;
use super::query::{AccountFilter, Extremum, SortOrder};
use super::traits::AccountRepository;
use crate::domain::{Account, AccountId, AmountType, DomainError, NewAccount};

/// Concurrent in-memory account repository using DashMap
///
/// Accounts are keyed by storage identity so a branch change (migration)
/// never moves an entry between keys. `update` holds the entry's shard lock
/// while comparing versions, which makes it an atomic compare-and-swap.
/// Branch+number uniqueness is enforced through `keys`: a pair is reserved
/// there before any account takes it, by insert or by a branch change.
pub struct ConcurrentAccountRepository<A: AmountType> {
    accounts: DashMap<AccountId, Account<A>>,
    keys: DashMap<(u32, u32), AccountId>,
    next_id: AtomicU64,
}

impl<A: AmountType> ConcurrentAccountRepository<A> {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self {
            accounts: DashMap::new(),
            keys: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Number of stored accounts
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Claim `key` for `id`; fails when another account holds it
    fn reserve(&self, key: (u32, u32), id: AccountId) -> Result<(), StorageError> {
        match self.keys.entry(key) {
            Entry::Occupied(held) if *held.get() != id => Err(StorageError::Duplicate {
                branch: key.0,
                number: key.1,
            }),
            Entry::Occupied(_) => Ok(()),
            Entry::Vacant(slot) => {
                slot.insert(id);
                Ok(())
            }
        }
    }

    fn release(&self, key: (u32, u32), id: AccountId) {
        self.keys.remove_if(&key, |_, holder| *holder == id);
    }

    fn matching(&self, filter: AccountFilter) -> Vec<Account<A>> {
        self.accounts
            .iter()
            .filter(|entry| filter.matches(entry.value()))
            .map(|entry| entry.value().clone())
            .collect()
    }

    fn balances_by_branch(&self, branch: Option<u32>) -> BTreeMap<u32, Vec<A>> {
        let mut grouped: BTreeMap<u32, Vec<A>> = BTreeMap::new();
        for entry in self.accounts.iter() {
            let account = entry.value();
            if branch.is_none_or(|b| account.branch() == b) {
                grouped
                    .entry(account.branch())
                    .or_default()
                    .push(account.balance());
            }
        }
        grouped
    }
}

impl<A: AmountType> Default for ConcurrentAccountRepository<A> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<A: AmountType> AccountRepository<A> for ConcurrentAccountRepository<A> {
    async fn find_one(
        &self,
        branch: Option<u32>,
        number: u32,
    ) -> Result<Option<Account<A>>, StorageError> {
        let mut found = self.matching(AccountFilter { branch, number: Some(number) });
        match found.len() {
            0 => Ok(None),
            1 => Ok(found.pop()),
            matches => Err(StorageError::Ambiguous { number, matches }),
        }
    }

    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account<A>>, StorageError> {
        Ok(self.accounts.get(&id).map(|r| r.value().clone()))
    }

    async fn find_many(
        &self,
        filter: AccountFilter,
        sort: Option<SortOrder>,
        limit: Option<usize>,
    ) -> Result<Vec<Account<A>>, StorageError> {
        let mut accounts = self.matching(filter);
        match sort {
            Some(order) => accounts.sort_by(|a, b| order.compare(a, b)),
            // Natural order is insertion order, like a document collection
            None => accounts.sort_by_key(|a| a.id()),
        }
        if let Some(limit) = limit {
            accounts.truncate(limit);
        }
        Ok(accounts)
    }

    async fn update(
        &self,
        id: AccountId,
        expected_version: u64,
        mut new_state: Account<A>,
    ) -> Result<Account<A>, StorageError> {
        if new_state.balance() < A::zero() {
            return Err(DomainError::NegativeBalance(new_state.balance().to_decimal_string()).into());
        }

        let new_key = (new_state.branch(), new_state.number());
        self.reserve(new_key, id)?;

        let Some(mut entry) = self.accounts.get_mut(&id) else {
            self.release(new_key, id);
            return Err(StorageError::NotFound);
        };
        let stored = entry.value_mut();
        let old_key = (stored.branch(), stored.number());

        if stored.version() != expected_version {
            let actual = stored.version();
            drop(entry);
            if new_key != old_key {
                self.release(new_key, id);
            }
            return Err(StorageError::VersionConflict {
                id,
                expected: expected_version,
                actual,
            });
        }

        new_state.set_version(expected_version + 1);
        *stored = new_state.clone();
        drop(entry);
        if new_key != old_key {
            self.release(old_key, id);
        }
        Ok(new_state)
    }

    async fn insert(&self, account: NewAccount<A>) -> Result<Account<A>, StorageError> {
        let id = AccountId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.reserve((account.branch, account.number), id)?;
        let stored = Account::new(id, account);
        self.accounts.insert(id, stored.clone());
        Ok(stored)
    }

    async fn delete(&self, branch: u32, number: u32) -> Result<Option<Account<A>>, StorageError> {
        let Some(target) = self.find_one(Some(branch), number).await? else {
            return Ok(None);
        };
        let removed = self
            .accounts
            .remove_if(&target.id(), |_, a| a.branch() == branch && a.number() == number)
            .map(|(_, account)| account);
        if removed.is_some() {
            self.release((branch, number), target.id());
        }
        Ok(removed)
    }

    async fn aggregate_average_balance(
        &self,
        branch: Option<u32>,
    ) -> Result<BTreeMap<u32, A>, StorageError> {
        let mut averages = BTreeMap::new();
        for (branch, balances) in self.balances_by_branch(branch) {
            let total = balances
                .iter()
                .try_fold(A::zero(), |sum, b| sum.checked_add(*b))
                .ok_or(DomainError::Overflow)?;
            let average = total
                .checked_div_count(balances.len())
                .ok_or(DomainError::Overflow)?;
            averages.insert(branch, average);
        }
        Ok(averages)
    }

    async fn aggregate_balance(&self, kind: Extremum) -> Result<BTreeMap<u32, A>, StorageError> {
        Ok(self
            .balances_by_branch(None)
            .into_iter()
            .filter_map(|(branch, balances)| {
                let value = match kind {
                    Extremum::Min => balances.into_iter().min(),
                    Extremum::Max => balances.into_iter().max(),
                };
                value.map(|v| (branch, v))
            })
            .collect())
    }

    async fn count_by_branch(&self, branch: u32) -> Result<usize, StorageError> {
        Ok(self
            .accounts
            .iter()
            .filter(|e| e.value().branch() == branch)
            .count())
    }

    async fn distinct_branches(
        &self,
        excluding: Option<u32>,
    ) -> Result<BTreeSet<u32>, StorageError> {
        Ok(self
            .accounts
            .iter()
            .map(|e| e.value().branch())
            .filter(|b| Some(*b) != excluding)
            .collect())
    }
}
