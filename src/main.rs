use std::sync::Arc;

use bankledger::prelude::*;
use tokio::io::{BufWriter, Stdout};
use tracing::info;

#[tokio::main]
async fn main() {
    CliApp::new("bankledger").run(run_ledger).await
}

/// Positional arguments: seed accounts file, then operations file
fn parse_args(args: Vec<String>) -> Result<(String, String), AppError> {
    match <[String; 3]>::try_from(args) {
        Ok([_, accounts, operations]) => Ok((accounts, operations)),
        Err(_) => Err(AppError::InvalidArguments(
            "Usage: bankledger <accounts.csv> <operations.csv>".to_string(),
        )),
    }
}

/// Seed the ledger, apply every operation in file order, print the final accounts
async fn run_ledger(mut stdout: BufWriter<Stdout>) -> Result<(), AppError> {
    let (accounts_file, operations_file) = parse_args(std::env::args().collect())?;

    let repository = Arc::new(ConcurrentAccountRepository::<FixedPoint>::new());
    load_accounts_from_file(&accounts_file, repository.as_ref()).await?;

    let operations = CsvOperationStream::<FixedPoint>::from_file(&operations_file).await?;
    let engine = LedgerEngine::new(Arc::clone(&repository));
    let mut session = ProcessingSession::new(engine, SkipErrors);

    let completed = session.process_stream(operations).await;
    let stats = session.stats();
    info!(
        applied = stats.applied,
        rejected = stats.rejected,
        malformed = stats.malformed,
        "Operations processed"
    );
    if !completed {
        return Err(AppError::Aborted(stats.applied));
    }

    write_snapshot(repository.as_ref(), &mut stdout).await?;
    Ok(())
}
