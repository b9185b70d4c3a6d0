use std::sync::Arc;

use bankledger::prelude::*;
use criterion::{BatchSize, BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use futures::io::Cursor;
use tokio::runtime::Runtime;

type Engine = LedgerEngine<FixedPoint, Arc<ConcurrentAccountRepository<FixedPoint>>>;

/// Ledger with `branches` branches of `per_branch` accounts each
fn seeded_engine(rt: &Runtime, branches: u32, per_branch: u32) -> Engine {
    rt.block_on(async {
        let repository = Arc::new(ConcurrentAccountRepository::new());
        for branch in 1..=branches {
            for i in 0..per_branch {
                let number = branch * 100_000 + i;
                let account = NewAccount::new(
                    branch,
                    number,
                    format!("Holder {number}"),
                    FixedPoint::from_units(1_000 + i64::from(i)),
                )
                .unwrap();
                repository.insert(account).await.unwrap();
            }
        }
        LedgerEngine::new(repository)
    })
}

fn generate_operations(count: usize, branches: u32, per_branch: u32) -> String {
    let mut csv = String::from("op,branch,number,target,amount\n");
    for i in 0..count {
        let branch = (i as u32 % branches) + 1;
        let number = branch * 100_000 + (i as u32 % per_branch);
        match i % 3 {
            0 => csv.push_str(&format!("deposit,{branch},{number},,{}.25\n", i % 50 + 1)),
            1 => csv.push_str(&format!("withdraw,{branch},{number},,{}\n", i % 20 + 1)),
            _ => {
                let target = ((branch % branches) + 1) * 100_000 + (i as u32 % per_branch);
                csv.push_str(&format!("transfer,,{number},{target},1\n"));
            }
        }
    }
    csv
}

/// Benchmark single-account mutations against a warm repository
fn bench_single_account_operations(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let engine = seeded_engine(&rt, 4, 1_000);
    let mut group = c.benchmark_group("single_account");

    group.bench_function("deposit", |b| {
        b.to_async(&rt)
            .iter(|| async { black_box(engine.deposit(1, 100_000, FixedPoint::from_units(1)).await) })
    });
    group.bench_function("transfer_same_branch", |b| {
        b.to_async(&rt).iter(|| async {
            black_box(
                engine
                    .transfer(200_000, 200_001, FixedPoint::from_raw(1))
                    .await,
            )
        })
    });

    group.finish();
}

/// Benchmark stream processing of generated operation files
fn bench_operation_stream(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("operation_stream");

    for count in [1_000, 10_000] {
        let csv = generate_operations(count, 8, 100);
        group.bench_with_input(BenchmarkId::from_parameter(count), &csv, |b, csv| {
            b.to_async(&rt).iter_batched(
                || (seeded_engine_blocking(8, 100), csv.clone()),
                |(engine, csv)| async move {
                    let stream = CsvOperationStream::<FixedPoint>::new(Cursor::new(csv.into_bytes()));
                    let mut session = ProcessingSession::new(engine, SilentSkip);
                    black_box(session.process_stream(stream).await)
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

/// Benchmark private-branch migration across many branches
fn bench_migration(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("migration");

    for branches in [10, 100] {
        group.bench_with_input(
            BenchmarkId::from_parameter(branches),
            &branches,
            |b, &branches| {
                b.to_async(&rt).iter_batched(
                    || seeded_engine_blocking(branches, 50),
                    |engine| async move { black_box(engine.migrate_to_private_branch().await) },
                    BatchSize::SmallInput,
                );
            },
        );
    }

    group.finish();
}

// Setup closures run inside the async executor, so seeding uses its own runtime
fn seeded_engine_blocking(branches: u32, per_branch: u32) -> Engine {
    std::thread::spawn(move || {
        let rt = Runtime::new().unwrap();
        seeded_engine(&rt, branches, per_branch)
    })
    .join()
    .unwrap()
}

criterion_group!(
    benches,
    bench_single_account_operations,
    bench_operation_stream,
    bench_migration
);
criterion_main!(benches);
