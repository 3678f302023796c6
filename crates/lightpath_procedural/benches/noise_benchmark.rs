//! Benchmark for the per-frame procedural services.
//!
//! A full strip samples noise once per light per frame and every
//! connection render evaluates one easing curve, so both must stay cheap.
//!
//! Run with: cargo bench --package lightpath_procedural --bench noise_benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use lightpath_procedural::{Ease, NoiseField, NoiseSeed, Random};

fn benchmark_single_sample(c: &mut Criterion) {
    let noise = NoiseField::new(NoiseSeed::new(42));

    c.bench_function("single_noise_value", |b| {
        let mut x = 0.0f64;
        b.iter(|| {
            x += 0.1;
            black_box(noise.value(black_box(x), black_box(x * 0.7)))
        });
    });
}

fn benchmark_frame_of_lights(c: &mut Criterion) {
    let noise = NoiseField::new(NoiseSeed::new(42));

    let mut group = c.benchmark_group("frame_of_lights");
    group.throughput(Throughput::Elements(2_000));

    group.bench_function("2000_light_brightness_samples", |b| {
        let mut now = 0.0f64;
        b.iter(|| {
            now += 16.0;
            for i in 0..2_000u32 {
                black_box(noise.value(f64::from(i) * 10.0, now * 0.001));
            }
        });
    });

    group.finish();
}

fn benchmark_easing_curves(c: &mut Criterion) {
    c.bench_function("ease_all_curves", |b| {
        let mut t = 0.0f32;
        b.iter(|| {
            t = (t + 0.013) % 1.0;
            for ease in Ease::ALL {
                black_box(ease.map(black_box(t * 30.0), 0.0, 30.0, 0.0, 30.0));
            }
        });
    });
}

fn benchmark_random_draws(c: &mut Criterion) {
    let mut random = Random::with_seed(42);

    c.bench_function("random_speed_draw", |b| {
        b.iter(|| black_box(random.random_speed()));
    });
}

criterion_group!(
    benches,
    benchmark_single_sample,
    benchmark_frame_of_lights,
    benchmark_easing_curves,
    benchmark_random_draws,
);
criterion_main!(benches);
