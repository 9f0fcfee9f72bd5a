//! Benchmarks for grid sampling, scatter interpolation and reprojection.
//!
//! Run with: cargo bench --package grid-engine --bench interpolation_benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use geo_common::{Crs, GridSpec};
use grid_engine::scatter::{cressman, idw_neighbors, idw_radius};
use grid_engine::{resample, GridSampler, InterpolationMethod, PointSet, ReprojectionResampler, ScalarField};
use projection::Projector;
use rand::Rng;

const MISSING: f64 = -9999.0;

/// Global geographic field at the given resolution with a smooth pattern.
fn generate_global_field(step: f64) -> ScalarField {
    let nx = (360.0 / step) as usize;
    let ny = (180.0 / step) as usize + 1;
    let lon: Vec<f64> = (0..nx).map(|i| i as f64 * step).collect();
    let lat: Vec<f64> = (0..ny).map(|j| -90.0 + j as f64 * step).collect();

    let mut values = Vec::with_capacity(nx * ny);
    for &y in &lat {
        for &x in &lon {
            values.push(280.0 + 20.0 * y.to_radians().cos() + 5.0 * (2.0 * x.to_radians()).sin());
        }
    }
    ScalarField::new(lon, lat, values, MISSING).expect("valid global field")
}

/// Random stations over a 100 x 100 domain.
fn generate_stations(count: usize) -> PointSet {
    let mut rng = rand::thread_rng();
    let mut points = PointSet::with_capacity(count, MISSING);
    for i in 0..count {
        let x = rng.gen_range(0.0..100.0);
        let y = rng.gen_range(0.0..100.0);
        let value = 15.0 + (x * 0.1).sin() * 8.0 - y * 0.05 + rng.gen_range(-1.0..1.0);
        points.append(format!("S{:04}", i), x, y, value);
    }
    points
}

fn target_axes(n: usize) -> (Vec<f64>, Vec<f64>) {
    let spec = GridSpec::new(0.0, 100.0, 0.0, 100.0, n, n).expect("valid grid spec");
    (spec.x_axis(), spec.y_axis())
}

// =============================================================================
// GRID SAMPLING BENCHMARKS
// =============================================================================

fn bench_value_at(c: &mut Criterion) {
    let mut group = c.benchmark_group("value_at");

    let field = generate_global_field(0.25);
    let grid = GridSampler::new(&field).expect("sampler");
    let mut rng = rand::thread_rng();
    let queries: Vec<(f64, f64)> = (0..10_000)
        .map(|_| (rng.gen_range(0.0..359.0), rng.gen_range(-90.0..90.0)))
        .collect();

    group.throughput(Throughput::Elements(queries.len() as u64));
    group.bench_function("bilinear_10k", |b| {
        b.iter(|| {
            for &(x, y) in &queries {
                black_box(grid.value_at(x, y));
            }
        });
    });
    group.bench_function("nearest_10k", |b| {
        b.iter(|| {
            for &(x, y) in &queries {
                black_box(grid.nearest_at(x, y));
            }
        });
    });

    group.finish();
}

fn bench_resample(c: &mut Criterion) {
    let mut group = c.benchmark_group("resample");
    group.sample_size(20);

    let field = generate_global_field(1.0);
    for (step, name) in [(2.0, "coarsen_2deg"), (0.5, "refine_half_deg"), (0.25, "refine_quarter_deg")] {
        let lon: Vec<f64> = (0..(359.0 / step) as usize).map(|i| i as f64 * step).collect();
        let lat: Vec<f64> = (0..=(180.0 / step) as usize).map(|j| -90.0 + j as f64 * step).collect();
        group.throughput(Throughput::Elements((lon.len() * lat.len()) as u64));

        group.bench_with_input(BenchmarkId::new("bilinear", name), &(lon, lat), |b, (lon, lat)| {
            b.iter(|| resample(black_box(&field), lon, lat, &InterpolationMethod::Bilinear));
        });
    }

    group.finish();
}

// =============================================================================
// SCATTER INTERPOLATION BENCHMARKS
// =============================================================================

fn bench_idw(c: &mut Criterion) {
    let mut group = c.benchmark_group("idw");
    group.sample_size(20);

    let (x, y) = target_axes(101);
    for count in [100, 1_000, 5_000] {
        let points = generate_stations(count);

        group.bench_with_input(BenchmarkId::new("radius", count), &points, |b, points| {
            b.iter(|| idw_radius(black_box(points), &x, &y, 1, 10.0, MISSING));
        });
        group.bench_with_input(BenchmarkId::new("neighbors_8", count), &points, |b, points| {
            b.iter(|| idw_neighbors(black_box(points), &x, &y, 8, MISSING));
        });
    }

    group.finish();
}

fn bench_cressman(c: &mut Criterion) {
    let mut group = c.benchmark_group("cressman");
    group.sample_size(10);

    let (x, y) = target_axes(101);
    let points = generate_stations(1_000);
    let schedules: [(&[f64], &str); 3] = [
        (&[10.0], "single_pass"),
        (&[10.0, 4.0, 1.0], "three_pass"),
        (&[10.0, 7.0, 4.0, 2.0, 1.0], "default_five_pass"),
    ];

    for (radii, name) in schedules {
        group.bench_with_input(BenchmarkId::new("passes", name), &radii, |b, radii| {
            b.iter(|| cressman(black_box(&points), &x, &y, radii, MISSING));
        });
    }

    group.finish();
}

// =============================================================================
// REPROJECTION BENCHMARKS
// =============================================================================

fn bench_reproject_field(c: &mut Criterion) {
    let mut group = c.benchmark_group("reproject_field");
    group.sample_size(10);

    let resampler = ReprojectionResampler::new(Projector::new());
    let field = generate_global_field(1.0);
    group.throughput(Throughput::Elements(field.len() as u64));

    group.bench_function("global_1deg_to_web_mercator", |b| {
        b.iter(|| {
            resampler.reproject_field(
                black_box(&field),
                &Crs::wgs84(),
                &Crs::web_mercator(),
                &InterpolationMethod::Bilinear,
            )
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_value_at,
    bench_resample,
    bench_idw,
    bench_cressman,
    bench_reproject_field,
);
criterion_main!(benches);
