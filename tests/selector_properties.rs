//! Property checks for stream selection over arbitrary stream lists

use proptest::prelude::*;
use tubegrab::extractor::StreamInfo;
use tubegrab::selector::{available_resolutions, height_label, select, Criterion};
use tubegrab::TubegrabError;

const HEIGHTS: [u32; 8] = [144, 240, 360, 480, 720, 1080, 1440, 2160];

fn arb_stream() -> impl Strategy<Value = StreamInfo> {
    (
        0..1000u32,
        prop::option::weighted(0.85, prop::sample::select(HEIGHTS.to_vec())),
        0..3u8,
        prop::option::of(32.0f32..320.0),
    )
        .prop_map(|(id, height, kind, abr)| {
            let (has_video, has_audio) = match kind {
                0 => (true, true),
                1 => (true, false),
                _ => (false, true),
            };
            StreamInfo {
                itag: id.to_string(),
                // Video streams may come without a known height
                resolution: height.filter(|_| has_video).map(height_label),
                height: height.filter(|_| has_video),
                has_video,
                has_audio,
                container: if has_video { "mp4" } else { "m4a" }.to_string(),
                mime_type: String::new(),
                approximate_size_bytes: None,
                audio_bitrate_kbps: if has_video { None } else { abr },
                fps: None,
            }
        })
}

fn arb_streams() -> impl Strategy<Value = Vec<StreamInfo>> {
    prop::collection::vec(arb_stream(), 0..12)
}

proptest! {
    #[test]
    fn resolution_never_upgrades(streams in arb_streams(), target in prop::sample::select(HEIGHTS.to_vec())) {
        let criterion = Criterion::Resolution(height_label(target));
        match select(&streams, &criterion) {
            Ok(chosen) => {
                prop_assert!(chosen.has_video);
                prop_assert!(chosen.height.map_or(false, |h| h <= target));
                // Nothing closer to the target was passed over
                let best = streams
                    .iter()
                    .filter(|s| s.has_video)
                    .filter_map(|s| s.height)
                    .filter(|h| *h <= target)
                    .max();
                prop_assert_eq!(chosen.height, best);
            }
            Err(TubegrabError::NoMatchingStream(_)) => {
                prop_assert!(!streams
                    .iter()
                    .any(|s| s.has_video && s.height.map_or(false, |h| h <= target)));
            }
            Err(other) => prop_assert!(false, "unexpected error {:?}", other),
        }
    }

    #[test]
    fn selection_is_deterministic(streams in arb_streams()) {
        for criterion in [Criterion::BestAvailable, Criterion::Highest, Criterion::AudioOnly] {
            let first = select(&streams, &criterion).ok();
            let second = select(&streams, &criterion).ok();
            prop_assert_eq!(first, second);
        }
    }

    #[test]
    fn highest_matches_top_resolution(streams in arb_streams()) {
        let resolutions = available_resolutions(&streams);
        match select(&streams, &Criterion::Highest) {
            Ok(chosen) => prop_assert_eq!(chosen.resolution.as_ref(), resolutions.first()),
            Err(_) => prop_assert!(resolutions.is_empty()),
        }
    }

    #[test]
    fn audio_only_never_returns_video(streams in arb_streams()) {
        if let Ok(chosen) = select(&streams, &Criterion::AudioOnly) {
            prop_assert!(chosen.is_audio_only());
        }
    }
}
