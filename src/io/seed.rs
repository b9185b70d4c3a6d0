use std::path::Path;

use futures::{Stream, StreamExt};
use tracing::{debug, info};

use super::csv_reader::CsvAccountStream;
use super::error::IoError;
use crate::domain::{AmountType, NewAccount};
use crate::storage::AccountRepository;

/// Insert every seed account into the repository
///
/// Stops at the first malformed row or duplicate branch+number pair and
/// returns the number of accounts inserted.
pub async fn load_accounts<A, R, S>(accounts: S, repository: &R) -> Result<usize, IoError>
where
    A: AmountType,
    R: AccountRepository<A> + ?Sized,
    S: Stream<Item = Result<NewAccount<A>, IoError>>,
{
    futures::pin_mut!(accounts);

    let mut loaded = 0;
    while let Some(account) = accounts.next().await {
        let stored = repository.insert(account?).await?;
        debug!(branch = stored.branch(), number = stored.number(), "Seeded account");
        loaded += 1;
    }
    info!(accounts = loaded, "Seed accounts loaded");
    Ok(loaded)
}

/// Open an accounts file and load it into the repository
pub async fn load_accounts_from_file<A, R>(
    path: impl AsRef<Path>,
    repository: &R,
) -> Result<usize, IoError>
where
    A: AmountType + Unpin,
    R: AccountRepository<A> + ?Sized,
{
    let accounts = CsvAccountStream::<A>::from_file(path).await?;
    load_accounts(accounts, repository).await
}
