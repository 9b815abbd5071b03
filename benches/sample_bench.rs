use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use tripbench::bench::{WriteMode, WritePayload};
use tripbench::source::SamplePool;
use tripbench::testutil::generate_records;

const POOL_SIZE: usize = 200_000;

fn bench_draw(c: &mut Criterion) {
    let pool = SamplePool::from(generate_records(POOL_SIZE));
    let mut group = c.benchmark_group("draw");
    for n in [1_000, 10_000, 100_000] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| black_box(pool.draw(n, &mut rand::thread_rng()).unwrap()))
        });
    }
    group.finish();
}

fn bench_payload(c: &mut Criterion) {
    let pool = SamplePool::from(generate_records(POOL_SIZE));
    let batch = pool.draw_seeded(10_000, 1).unwrap();
    c.bench_function("payload_insert_10k", |b| {
        b.iter(|| black_box(WritePayload::build("bench", &batch, WriteMode::Insert, "Bike ID").unwrap()))
    });
    c.bench_function("payload_upsert_10k", |b| {
        b.iter(|| black_box(WritePayload::build("bench", &batch, WriteMode::Upsert, "Bike ID").unwrap()))
    });
}

criterion_group!(benches, bench_draw, bench_payload);
criterion_main!(benches);
