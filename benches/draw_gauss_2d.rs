//! Benchmarks for the dyadic refinement driver across grid sizes and
//! pattern-richness flavours.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use dyadic_gauss::{draw_gauss_2d, DrawRequest, Flavour, Variant};

fn request(nx: usize, ny: usize, flavour: Flavour) -> DrawRequest {
    DrawRequest {
        nx,
        ny,
        xsize: (nx - 1) as f64,
        ysize: (ny - 1) as f64,
        variant: Variant::Gaussian,
        seed: 12345,
        r1: (nx as f64) / 8.0,
        r2: (ny as f64) / 8.0,
        angle_deg: 30.0,
        power: 1.0,
        flavour,
        debug: false,
    }
}

fn bench_draw_gauss_2d(c: &mut Criterion) {
    let mut group = c.benchmark_group("draw_gauss_2d");

    for &side in &[17usize, 33, 65, 129, 257] {
        for flavour in [Flavour::Simple, Flavour::Standard, Flavour::Detailed] {
            let req = request(side, side, flavour);
            group.bench_with_input(
                BenchmarkId::from_parameter(format!("{side}x{side}/{flavour:?}")),
                &req,
                |b, req| {
                    b.iter(|| {
                        black_box(draw_gauss_2d(req).unwrap());
                    });
                },
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_draw_gauss_2d);
criterion_main!(benches);
