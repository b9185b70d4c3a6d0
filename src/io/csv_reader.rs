use std::path::Path;
use std::pin::Pin;
use std::task::{Context, Poll};

use csv_async::{AsyncDeserializer, AsyncReaderBuilder};
use futures::io::AsyncRead;
use futures::{Stream, StreamExt};
use tokio::fs::File;
use tokio_util::compat::TokioAsyncReadCompatExt;

use super::error::IoError;
use super::parse::{RawAccountRecord, RawOperationRecord};
use crate::domain::{AmountType, NewAccount, Operation};

type BoxedStream<T> = Pin<Box<dyn Stream<Item = Result<T, IoError>> + Send>>;

// Both input files share the same lenient reader setup
fn deserializer<R>(reader: R) -> AsyncDeserializer<R>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    AsyncReaderBuilder::new()
        .trim(csv_async::Trim::All)
        .flexible(true)
        .create_deserializer(reader)
}

/// Async stream of ledger operations from CSV input
pub struct CsvOperationStream<A>
where
    A: AmountType + Unpin,
{
    inner: BoxedStream<Operation<A>>,
}

impl<A> CsvOperationStream<A>
where
    A: AmountType + Unpin,
{
    /// Create a new operation stream from an async reader
    pub fn new<R>(reader: R) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let stream = deserializer(reader)
            .into_deserialize::<RawOperationRecord>()
            .map(|result| {
                result
                    .map_err(IoError::from)
                    .and_then(|raw| raw.parse::<A>())
            });

        Self {
            inner: Box::pin(stream),
        }
    }

    /// Open an operations file
    ///
    /// ```rust,ignore
    /// let stream = CsvOperationStream::<FixedPoint>::from_file("operations.csv").await?;
    /// ```
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, IoError> {
        let file = File::open(path.as_ref()).await?;
        Ok(Self::new(file.compat()))
    }
}

impl<A> Stream for CsvOperationStream<A>
where
    A: AmountType + Unpin,
{
    type Item = Result<Operation<A>, IoError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

/// Async stream of seed accounts from CSV input
pub struct CsvAccountStream<A>
where
    A: AmountType + Unpin,
{
    inner: BoxedStream<NewAccount<A>>,
}

impl<A> CsvAccountStream<A>
where
    A: AmountType + Unpin,
{
    pub fn new<R>(reader: R) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let stream = deserializer(reader)
            .into_deserialize::<RawAccountRecord>()
            .map(|result| {
                result
                    .map_err(IoError::from)
                    .and_then(|raw| raw.parse::<A>())
            });

        Self {
            inner: Box::pin(stream),
        }
    }

    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, IoError> {
        let file = File::open(path.as_ref()).await?;
        Ok(Self::new(file.compat()))
    }
}

impl<A> Stream for CsvAccountStream<A>
where
    A: AmountType + Unpin,
{
    type Item = Result<NewAccount<A>, IoError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}
