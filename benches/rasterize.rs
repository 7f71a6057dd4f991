use criterion::{black_box, criterion_group, criterion_main, Criterion};
use digit_sketch::basics::PointD;
use digit_sketch::feature_map::FeatureMap;
use digit_sketch::preset::digit_two;
use digit_sketch::visualizer::{feature_map_to_image, render_grid};
use digit_sketch::StrokeRasterizer;

fn bench_stroke(c: &mut Criterion) {
    c.bench_function("diagonal_stroke", |b| {
        b.iter(|| {
            let mut r = StrokeRasterizer::new();
            r.begin_stroke(PointD::new(5.0, 5.0));
            r.continue_stroke(black_box(PointD::new(275.0, 275.0)));
            r.end_stroke();
            r.into_grid()
        })
    });
}

fn bench_render(c: &mut Criterion) {
    let grid = digit_two();
    c.bench_function("render_grid", |b| b.iter(|| render_grid(black_box(&grid))));

    let rows: Vec<Vec<f64>> = (0..26)
        .map(|y| (0..26).map(|x| ((x * y) % 17) as f64 - 8.0).collect())
        .collect();
    let map = FeatureMap::from_rows(&rows).unwrap();
    c.bench_function("feature_map_to_image", |b| {
        b.iter(|| feature_map_to_image(black_box(&map)))
    });
}

criterion_group!(benches, bench_stroke, bench_render);
criterion_main!(benches);
