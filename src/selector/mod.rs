//! Stream selection policy
//!
//! Selection is deterministic: when several streams rank equally the one that
//! appears first in provider order wins.

pub mod criterion;

pub use criterion::{height_label, parse_height, Criterion};

use crate::extractor::models::StreamInfo;
use crate::utils::error::{Result, TubegrabError};
use tracing::debug;

/// Tunables for [`select_with`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionPolicy {
    /// Combined streams larger than this are skipped by "best available".
    /// Streams of unknown size are always acceptable.
    pub max_combined_size: Option<u64>,
}

impl SelectionPolicy {
    fn acceptable_size(&self, stream: &StreamInfo) -> bool {
        match (self.max_combined_size, stream.approximate_size_bytes) {
            (Some(limit), Some(size)) => size <= limit,
            _ => true,
        }
    }
}

/// Select with the default policy
pub fn select(streams: &[StreamInfo], criterion: &Criterion) -> Result<StreamInfo> {
    select_with(streams, criterion, &SelectionPolicy::default())
}

/// Pick the stream satisfying `criterion`
pub fn select_with(
    streams: &[StreamInfo],
    criterion: &Criterion,
    policy: &SelectionPolicy,
) -> Result<StreamInfo> {
    let chosen = match criterion {
        Criterion::BestAvailable => {
            let combined = first_max(
                streams
                    .iter()
                    .filter(|s| s.is_combined() && policy.acceptable_size(s)),
                video_height,
            );
            combined
                .or_else(|| first_max(streams.iter().filter(|s| s.is_video_only()), video_height))
                .ok_or_else(|| no_match(criterion, "no video streams available"))?
        }
        Criterion::Highest => first_max(streams.iter().filter(|s| s.has_video), |s| {
            (video_height(s), s.has_audio)
        })
        .ok_or_else(|| no_match(criterion, "no video streams available"))?,
        Criterion::AudioOnly => first_max(streams.iter().filter(|s| s.is_audio_only()), |s| {
            s.audio_bitrate_kbps.unwrap_or(-1.0)
        })
        .ok_or_else(|| no_match(criterion, "no audio-only stream available"))?,
        Criterion::Resolution(label) => {
            let target = criterion
                .target_height()
                .ok_or_else(|| TubegrabError::InvalidQuality(label.clone()))?;
            // Never upgrade: only streams known to be at or below the requested height qualify
            first_max(
                streams
                    .iter()
                    .filter(|s| s.has_video && s.height.map_or(false, |h| h <= target)),
                |s| (video_height(s), s.has_audio),
            )
            .ok_or_else(|| no_match(criterion, "nothing at or below that resolution"))?
        }
    };

    debug!(
        "Selected itag {} ({}) for {}",
        chosen.itag,
        chosen.describe(),
        criterion
    );
    Ok(chosen.clone())
}

/// Distinct resolution labels, highest first
pub fn available_resolutions(streams: &[StreamInfo]) -> Vec<String> {
    let mut heights: Vec<u32> = streams
        .iter()
        .filter(|s| s.has_video)
        .filter_map(|s| s.height)
        .collect();
    heights.sort_unstable_by(|a, b| b.cmp(a));
    heights.dedup();
    heights.into_iter().map(height_label).collect()
}

fn video_height(stream: &StreamInfo) -> u32 {
    stream.height.unwrap_or(0)
}

fn no_match(criterion: &Criterion, reason: &str) -> TubegrabError {
    TubegrabError::NoMatchingStream(format!("{}: {}", criterion, reason))
}

/// First element with the greatest key; later equal keys never replace it
fn first_max<'a, K: PartialOrd>(
    candidates: impl Iterator<Item = &'a StreamInfo>,
    key: impl Fn(&StreamInfo) -> K,
) -> Option<&'a StreamInfo> {
    let mut best: Option<(&'a StreamInfo, K)> = None;
    for stream in candidates {
        let k = key(stream);
        let replace = match &best {
            Some((_, best_key)) => k > *best_key,
            None => true,
        };
        if replace {
            best = Some((stream, k));
        }
    }
    best.map(|(stream, _)| stream)
}
