use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use ferric_crr::instruments::OptionContract;
use ferric_crr::pricing::{price_lattice, price_lattice_many};
use rayon::ThreadPoolBuilder;
use std::hint::black_box;

fn benchmark_contract() -> OptionContract {
    OptionContract::new(15_673.64, 15_100.0, -0.00513, 0.1862, 0.5, 0.01)
        .expect("benchmark contract should be valid")
}

fn bench_step_sweep(c: &mut Criterion) {
    let contract = benchmark_contract();
    let steps: Vec<usize> = (1..=40).map(|k| k * 50).collect();
    let mut group = c.benchmark_group("crr_sweep_50_to_2000");
    group.sample_size(10);

    group.bench_function("single_thread", |b| {
        b.iter(|| {
            let prices: Vec<_> = steps
                .iter()
                .map(|&n| price_lattice(black_box(&contract), n))
                .collect();
            black_box(prices)
        })
    });

    for threads in [2_usize, 4, 8] {
        group.bench_with_input(
            BenchmarkId::new("rayon_threads", threads),
            &threads,
            |b, &threads| {
                let pool = ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()
                    .expect("thread pool should build");
                b.iter(|| {
                    pool.install(|| black_box(price_lattice_many(black_box(&contract), &steps)))
                })
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_step_sweep);
criterion_main!(benches);
