use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tubegrab::extractor::StreamInfo;
use tubegrab::selector::{self, height_label, parse_height};
use tubegrab::utils::sanitize_filename;

const HEIGHTS: [u32; 8] = [144, 240, 360, 480, 720, 1080, 1440, 2160];

fn random_streams(count: usize, seed: u64) -> Vec<StreamInfo> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|i| {
            let height = HEIGHTS[rng.gen_range(0..HEIGHTS.len())];
            let kind = rng.gen_range(0..3);
            let (has_video, has_audio) = match kind {
                0 => (true, true),
                1 => (true, false),
                _ => (false, true),
            };
            StreamInfo {
                itag: i.to_string(),
                resolution: has_video.then(|| height_label(height)),
                height: has_video.then_some(height),
                has_video,
                has_audio,
                container: "mp4".to_string(),
                mime_type: "video/mp4".to_string(),
                approximate_size_bytes: Some(rng.gen_range(1_000..500_000_000)),
                audio_bitrate_kbps: (!has_video).then(|| rng.gen_range(48.0..320.0)),
                fps: None,
            }
        })
        .collect()
}

fn benchmark_select(c: &mut Criterion) {
    let mut group = c.benchmark_group("Stream Selection");

    for count in [10, 40, 200] {
        let streams = random_streams(count, 7);
        let criteria = [
            ("best", selector::Criterion::BestAvailable),
            ("highest", selector::Criterion::Highest),
            ("audio", selector::Criterion::AudioOnly),
            ("1080p", selector::Criterion::Resolution("1080p".to_string())),
        ];
        for (name, criterion) in criteria {
            group.bench_function(format!("{}/{}", name, count), |b| {
                b.iter(|| selector::select(black_box(&streams), black_box(&criterion)))
            });
        }
    }

    let streams = random_streams(40, 11);
    group.bench_function("available_resolutions/40", |b| {
        b.iter(|| selector::available_resolutions(black_box(&streams)))
    });

    group.finish();
}

fn benchmark_parse_height(c: &mut Criterion) {
    let mut group = c.benchmark_group("Resolution Labels");

    for label in ["1080p", "720p60", "1920x1080", "4K", "garbage"] {
        group.bench_function(label, |b| b.iter(|| parse_height(black_box(label))));
    }

    group.finish();
}

fn benchmark_sanitize_filename(c: &mut Criterion) {
    let mut group = c.benchmark_group("Filename Sanitization");

    group.bench_function("title", |b| {
        b.iter(|| sanitize_filename(black_box("Live: Best Of (2024) | Official Video")))
    });

    let long_title = "\u{1F3B5}".repeat(120);
    group.bench_function("long", |b| {
        b.iter(|| sanitize_filename(black_box(&long_title)))
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_select,
    benchmark_parse_height,
    benchmark_sanitize_filename
);
criterion_main!(benches);
