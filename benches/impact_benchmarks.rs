use adverse_impact::contingency::{chi2_contingency, fisher_exact};
use adverse_impact::{compute, compute_many, ContingencyTable, ImpactConfig};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

pub fn impact_benchmarks(c: &mut Criterion) {
    let small = ContingencyTable::new(9., 3., 4., 6.).unwrap();
    let large = ContingencyTable::new(4000., 6000., 1800., 3200.).unwrap();

    c.bench_function("compute small table", |b| b.iter(|| compute(black_box(&small))));
    c.bench_function("compute large table", |b| b.iter(|| compute(black_box(&large))));
    c.bench_function("fisher exact large table", |b| b.iter(|| fisher_exact(black_box(&large))));
    c.bench_function("chi2 contingency", |b| b.iter(|| chi2_contingency(black_box(&large))));

    let tables: Vec<ContingencyTable> = (1..1000)
        .map(|i| ContingencyTable::new(100., 50., (i % 90) as f64 + 1., 60.).unwrap())
        .collect();
    let cfg = ImpactConfig::default();
    let mut group = c.benchmark_group("compute_many");
    group.bench_function("serial", |b| b.iter(|| compute_many(black_box(&tables), &cfg, false)));
    group.bench_function("parallel", |b| b.iter(|| compute_many(black_box(&tables), &cfg, true)));
    group.finish();
}

criterion_group!(benches, impact_benchmarks);
criterion_main!(benches);
