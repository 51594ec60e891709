//! Data structures for video and stream information
//!
//! `RawVideo` / `RawFormat` mirror the subset of yt-dlp's `--dump-json` output we
//! read. They are converted into [`VideoDetails`] / [`StreamInfo`] on ingress so
//! nothing past the extractor depends on yt-dlp's field conventions.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// A single downloadable media track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamInfo {
    /// Provider identifier (yt-dlp format_id / YouTube itag)
    pub itag: String,
    /// Label such as "1080p"; `None` for audio-only streams
    pub resolution: Option<String>,
    pub height: Option<u32>,
    pub has_video: bool,
    pub has_audio: bool,
    /// File extension of the container ("mp4", "webm", "m4a")
    pub container: String,
    pub mime_type: String,
    pub approximate_size_bytes: Option<u64>,
    pub audio_bitrate_kbps: Option<f32>,
    pub fps: Option<f32>,
}

impl StreamInfo {
    pub fn is_audio_only(&self) -> bool {
        self.has_audio && !self.has_video
    }

    pub fn is_video_only(&self) -> bool {
        self.has_video && !self.has_audio
    }

    pub fn is_combined(&self) -> bool {
        self.has_video && self.has_audio
    }

    /// One-line description for listings
    pub fn describe(&self) -> String {
        let kind = match (self.has_video, self.has_audio) {
            (true, true) => "video+audio",
            (true, false) => "video only",
            _ => "audio only",
        };
        let label = match (&self.resolution, self.audio_bitrate_kbps) {
            (Some(res), _) => res.clone(),
            (None, Some(abr)) => format!("{:.0}kbps", abr),
            (None, None) => "audio".to_string(),
        };
        let size = self
            .approximate_size_bytes
            .map(|bytes| format!(", {:.1} MB", bytes as f64 / 1024.0 / 1024.0))
            .unwrap_or_default();

        format!("{} {} ({}{})", label, self.container, kind, size)
    }
}

/// Video-level information plus its streams in provider order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoDetails {
    pub id: String,
    pub title: String,
    pub webpage_url: String,
    pub uploader: Option<String>,
    pub duration_secs: Option<u64>,
    pub view_count: Option<u64>,
    pub thumbnail: Option<String>,
    pub streams: Vec<StreamInfo>,
}

impl VideoDetails {
    /// "m:ss" or "h:mm:ss"
    pub fn duration_label(&self) -> Option<String> {
        self.duration_secs.map(|total| {
            let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
            if h > 0 {
                format!("{}:{:02}:{:02}", h, m, s)
            } else {
                format!("{}:{:02}", m, s)
            }
        })
    }
}

/// yt-dlp video record
#[derive(Debug, Clone, Deserialize)]
pub struct RawVideo {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub webpage_url: Option<String>,
    #[serde(default)]
    pub uploader: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub view_count: Option<u64>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub formats: Vec<RawFormat>,
}

/// yt-dlp format record
#[derive(Debug, Clone, Deserialize)]
pub struct RawFormat {
    #[serde(default)]
    pub format_id: String,
    #[serde(default)]
    pub ext: String,
    pub vcodec: Option<String>,
    pub acodec: Option<String>,
    pub height: Option<u32>,
    pub fps: Option<f32>,
    pub abr: Option<f32>,
    pub filesize: Option<u64>,
    pub filesize_approx: Option<f64>,
}

impl RawFormat {
    fn has_video(&self) -> bool {
        match self.vcodec.as_deref() {
            Some("none") => false,
            Some(_) => true,
            None => self.height.is_some(),
        }
    }

    fn has_audio(&self) -> bool {
        match self.acodec.as_deref() {
            Some("none") => false,
            Some(_) => true,
            None => self.abr.is_some(),
        }
    }

    /// Convert into a [`StreamInfo`], dropping records that carry no media
    pub fn into_stream(self) -> Option<StreamInfo> {
        let has_video = self.has_video();
        let has_audio = self.has_audio();

        if !has_video && !has_audio {
            debug!("Skipping format {} without audio or video", self.format_id);
            return None;
        }
        if self.format_id.trim().is_empty() {
            debug!("Skipping format without an identifier");
            return None;
        }

        let height = if has_video { self.height } else { None };
        let approximate_size_bytes = self
            .filesize
            .or_else(|| self.filesize_approx.map(|size| size.max(0.0) as u64));

        Some(StreamInfo {
            mime_type: mime_for(&self.ext, has_video),
            resolution: height.map(|h| format!("{}p", h)),
            height,
            has_video,
            has_audio,
            container: self.ext,
            approximate_size_bytes,
            audio_bitrate_kbps: if has_audio { self.abr } else { None },
            fps: if has_video { self.fps } else { None },
            itag: self.format_id,
        })
    }
}

impl From<RawVideo> for VideoDetails {
    fn from(raw: RawVideo) -> Self {
        let streams: Vec<StreamInfo> = raw
            .formats
            .into_iter()
            .filter_map(RawFormat::into_stream)
            .collect();

        Self {
            title: raw
                .title
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| raw.id.clone()),
            webpage_url: raw.webpage_url.unwrap_or_default(),
            uploader: raw.uploader,
            duration_secs: raw.duration.map(|d| d.max(0.0).round() as u64),
            view_count: raw.view_count,
            thumbnail: raw.thumbnail,
            id: raw.id,
            streams,
        }
    }
}

/// MIME type for a container extension
pub fn mime_for(ext: &str, has_video: bool) -> String {
    match (ext, has_video) {
        ("mp4", true) => "video/mp4",
        ("mp4" | "m4a", false) => "audio/mp4",
        ("webm", true) => "video/webm",
        ("webm", false) => "audio/webm",
        ("3gp", _) => "video/3gpp",
        ("mp3", _) => "audio/mpeg",
        ("opus" | "ogg", _) => "audio/ogg",
        _ => "application/octet-stream",
    }
    .to_string()
}
