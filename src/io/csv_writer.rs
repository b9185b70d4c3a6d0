use serde::Serialize;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use super::error::IoError;
use crate::domain::{Account, AmountType};
use crate::storage::{AccountFilter, AccountRepository, SortOrder};

#[derive(Debug, Serialize)]
struct SnapshotRecord<'a> {
    branch: u32,
    number: u32,
    name: &'a str,
    balance: String,
}

impl<'a, A: AmountType> From<&'a Account<A>> for SnapshotRecord<'a> {
    fn from(account: &'a Account<A>) -> Self {
        Self {
            branch: account.branch(),
            number: account.number(),
            name: account.holder_name(),
            balance: account.balance().to_decimal_string(),
        }
    }
}

/// Write every account as CSV, ordered by branch then number
pub async fn write_snapshot<A, R, W>(repository: &R, mut writer: W) -> Result<(), IoError>
where
    A: AmountType,
    R: AccountRepository<A> + ?Sized,
    W: AsyncWrite + Unpin + Send,
{
    let accounts = repository
        .find_many(AccountFilter::all(), Some(SortOrder::BranchAndNumber), None)
        .await?;

    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    csv_writer.write_record(["branch", "number", "name", "balance"])?;
    for account in &accounts {
        csv_writer.serialize(SnapshotRecord::from(account))?;
    }
    let buffer = csv_writer
        .into_inner()
        .map_err(|err| IoError::Io(err.into_error()))?;

    writer.write_all(&buffer).await?;
    writer.flush().await?;
    Ok(())
}
