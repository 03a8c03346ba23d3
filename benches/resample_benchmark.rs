use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use strava_mirror::models::StreamType;
use strava_mirror::services::resample::resample_values;
use strava_mirror::services::streams::{cumulative_power, gear_ratio};

/// A two-hour ride sampled once a second: distance climbing unevenly,
/// power and cadence with occasional coasting.
fn synthetic_ride(samples: usize) -> (Vec<f64>, Vec<f64>, Vec<f64>, Vec<f64>) {
    let time: Vec<f64> = (0..samples).map(|i| i as f64).collect();
    let mut distance = Vec::with_capacity(samples);
    let mut total = 0.0;
    for i in 0..samples {
        total += 6.0 + (i as f64 / 45.0).sin() * 3.0;
        distance.push(total);
    }
    let watts: Vec<f64> = (0..samples)
        .map(|i| if i % 97 < 8 { 0.0 } else { 180.0 + (i % 40) as f64 })
        .collect();
    let cadence: Vec<f64> = watts.iter().map(|&w| if w == 0.0 { 0.0 } else { 85.0 }).collect();
    (time, distance, watts, cadence)
}

fn benchmark_resample(c: &mut Criterion) {
    let (time, distance, watts, cadence) = synthetic_ride(7200);
    let speed: Vec<f64> = time.iter().map(|_| 8.5).collect();

    let mut group = c.benchmark_group("streams");

    group.bench_function("resample_watts_per_10m", |b| {
        b.iter(|| {
            resample_values(
                StreamType::Watts,
                black_box(&watts),
                black_box(&distance),
                10.0,
            )
        })
    });

    group.bench_function("resample_watts_per_1m", |b| {
        b.iter(|| resample_values(StreamType::Watts, black_box(&watts), black_box(&distance), 1.0))
    });

    group.bench_function("derive_cumulative_power", |b| {
        b.iter(|| cumulative_power(black_box(&watts), black_box(&time)))
    });

    group.bench_function("derive_gear_ratio", |b| {
        b.iter(|| gear_ratio(black_box(&speed), black_box(&cadence)))
    });

    group.finish();
}

criterion_group!(benches, benchmark_resample);
criterion_main!(benches);
