//! Benchmarks for metric resolution and per-frame mapping

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use mindtwin::{Animator, Drivers, MetricResolver, RawMetrics, Rotation, VisualMapper};
use rand::{rngs::StdRng, Rng, SeedableRng};

fn generate_drivers(count: usize) -> Vec<Drivers> {
    let mut rng = StdRng::seed_from_u64(42);
    (0..count)
        .map(|_| Drivers::new(rng.gen(), rng.gen(), rng.gen(), rng.gen()))
        .collect()
}

fn generate_documents(count: usize) -> Vec<RawMetrics> {
    let mut rng = StdRng::seed_from_u64(7);
    (0..count)
        .map(|i| {
            let mut raw = RawMetrics::new().with("averageStress", rng.gen_range(0.0..10.0));
            if i % 2 == 0 {
                raw = raw.with("emotionalBalance", rng.gen_range(0.0..10.0));
            }
            if i % 3 == 0 {
                raw = raw.with_sequence("energyTrend", &[rng.gen_range(0.0..10.0), 5.0]);
            }
            raw
        })
        .collect()
}

fn bench_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve");

    let docs = generate_documents(1000);
    let resolver = MetricResolver::new();

    group.throughput(Throughput::Elements(1000));

    group.bench_function("resolve_1000_documents", |b| {
        b.iter(|| {
            for raw in &docs {
                black_box(resolver.resolve(raw));
            }
        })
    });

    group.finish();
}

fn bench_frames(c: &mut Criterion) {
    let mut group = c.benchmark_group("frames");

    let drivers = generate_drivers(1000);
    let mapper = VisualMapper::new();

    group.throughput(Throughput::Elements(1000));

    group.bench_function("map_1000_frames", |b| {
        b.iter(|| {
            let mut rotation = Rotation::ZERO;
            for (i, d) in drivers.iter().enumerate() {
                let params = mapper.map_frame(d, i as f64 / 60.0, 1.0 / 60.0, rotation);
                rotation = params.rotation;
                black_box(params);
            }
        })
    });

    group.bench_function("animator_1000_ticks", |b| {
        b.iter(|| {
            let mut animator = Animator::default();
            for d in &drivers {
                black_box(animator.tick(d, 1.0 / 60.0));
            }
        })
    });

    group.finish();
}

criterion_group!(benches, bench_resolve, bench_frames);
criterion_main!(benches);
