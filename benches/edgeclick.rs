use criterion::{criterion_group, criterion_main, Criterion};
use edgeclick::{edge_map_dynamic, EdgeParams, MatchConfig, Matcher, TargetSelector, TemplateStore};
use image::{DynamicImage, GrayImage, Luma};
use std::hint::black_box;

fn make_screen(width: u32, height: u32) -> GrayImage {
    GrayImage::from_fn(width, height, |x, y| {
        let block = ((x / 24) * 7 + (y / 18) * 13) % 5;
        Luma([180 + (block as u8) * 12])
    })
}

fn make_button(width: u32, height: u32) -> GrayImage {
    GrayImage::from_fn(width, height, |x, y| {
        let body = x >= 3 && y >= 3 && x < width - 3 && y < height - 3;
        let label_x = x >= width / 4 && x < 3 * width / 4;
        let label = label_x && y >= height / 2 - 1 && y < height / 2 + 2;
        Luma([if label {
            240
        } else if body {
            50
        } else {
            240
        }])
    })
}

fn paste(screen: &mut GrayImage, patch: &GrayImage, x0: u32, y0: u32) {
    for (x, y, px) in patch.enumerate_pixels() {
        screen.put_pixel(x0 + x, y0 + y, *px);
    }
}

fn bench_pipeline(c: &mut Criterion) {
    let mut screen = make_screen(960, 540);
    let button = make_button(44, 22);
    paste(&mut screen, &button, 410, 260);
    let screen = DynamicImage::ImageLuma8(screen);

    let store = TemplateStore::from_images(
        [
            ("OK", DynamicImage::ImageLuma8(button)),
            ("WIDE", DynamicImage::ImageLuma8(make_button(80, 24))),
        ],
        EdgeParams::default(),
    )
    .unwrap();

    c.bench_function("screen_edge_map", |b| {
        b.iter(|| black_box(edge_map_dynamic(&screen, EdgeParams::default()).unwrap()));
    });

    let edges = edge_map_dynamic(&screen, EdgeParams::default()).unwrap();
    let matcher = Matcher::new(MatchConfig::default());
    let plans: Vec<_> = store.iter().map(|t| t.plan()).collect();
    c.bench_function("scale_sweep_two_targets", |b| {
        b.iter(|| black_box(matcher.match_many(edges.view(), &plans).unwrap()));
    });

    let selector = TargetSelector::new(MatchConfig::default());
    c.bench_function("select_best_full_cycle", |b| {
        b.iter(|| black_box(selector.select_best(&screen, &store).unwrap()));
    });
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
