use availability_engine::{structure, Instant, OffsetMinutes};
use chrono::{Duration, TimeZone, Utc};
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

fn half_hour_week() -> Vec<Instant> {
    let monday = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    (0..7 * 48)
        .map(|i| monday + Duration::minutes(30 * i))
        .collect()
}

fn bench_structure(c: &mut Criterion) {
    let slots = half_hour_week();
    c.bench_function("structure_full_week", |b| {
        b.iter(|| structure(black_box(slots.iter().copied()), OffsetMinutes(300)).unwrap())
    });
}

criterion_group!(benches, bench_structure);
criterion_main!(benches);
