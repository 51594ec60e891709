//! Download orchestration: resolve, select, transfer, merge, publish

use crate::cache::{StreamCache, SystemClock};
use crate::downloader::fetcher::{HttpFetcher, MediaFetcher};
use crate::downloader::merger::{cleanup_files, FfmpegMerger, MergeTool};
use crate::downloader::progress::{DownloadStatus, ProgressReporter};
use crate::extractor::models::{StreamInfo, VideoDetails};
use crate::extractor::ytdlp::YtDlpProvider;
use crate::selector::{self, Criterion, SelectionPolicy};
use crate::utils::config::AppSettings;
use crate::utils::error::{Result, TubegrabError};
use crate::utils::filename::sanitize_filename;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// How the selected stream is written out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// A file with both picture and sound, merging when needed
    #[default]
    Combined,
    /// Keep a video-only stream as is
    VideoOnly,
}

/// One user-initiated download
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub video_url: String,
    pub criterion: Criterion,
    pub destination: PathBuf,
    pub output: OutputMode,
}

/// Download configuration
#[derive(Debug, Clone)]
pub struct DownloaderConfig {
    /// Container extension for merged output
    pub merge_container: String,
    pub policy: SelectionPolicy,
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        Self {
            merge_container: "mp4".to_string(),
            policy: SelectionPolicy::default(),
        }
    }
}

/// What a request resolved to before any bytes move
#[derive(Debug, Clone)]
pub struct DownloadPlan {
    pub video: Arc<VideoDetails>,
    pub primary: StreamInfo,
    /// Audio stream to merge with `primary`
    pub audio: Option<StreamInfo>,
    pub final_path: PathBuf,
}

/// Drives a download from URL to finished file
pub struct Downloader {
    cache: Arc<StreamCache>,
    fetcher: Arc<dyn MediaFetcher>,
    merger: Arc<dyn MergeTool>,
    config: DownloaderConfig,
}

impl Downloader {
    pub fn new(
        cache: Arc<StreamCache>,
        fetcher: Arc<dyn MediaFetcher>,
        merger: Arc<dyn MergeTool>,
        config: DownloaderConfig,
    ) -> Self {
        Self {
            cache,
            fetcher,
            merger,
            config,
        }
    }

    /// Wire the production yt-dlp, HTTP and ffmpeg pieces
    pub fn from_settings(settings: &AppSettings) -> Result<Self> {
        let provider = Arc::new(YtDlpProvider::from_settings(settings));
        let cache = Arc::new(StreamCache::new(
            provider,
            settings.cache_ttl(),
            Arc::new(SystemClock),
        ));
        let fetcher = Arc::new(HttpFetcher::new(settings.fetch_timeout())?);
        let merger = Arc::new(FfmpegMerger::from_settings(settings));
        let config = DownloaderConfig {
            merge_container: settings.merge_container.clone(),
            policy: SelectionPolicy {
                max_combined_size: settings.max_combined_size,
            },
        };
        Ok(Self::new(cache, fetcher, merger, config))
    }

    pub fn cache(&self) -> &Arc<StreamCache> {
        &self.cache
    }

    pub fn merge_available(&self) -> bool {
        self.merger.is_available()
    }

    /// Video details through the cache
    pub async fn video(&self, video_url: &str) -> Result<Arc<VideoDetails>> {
        self.cache.get_video(video_url).await
    }

    /// Stream list through the cache
    pub async fn fetch_streams(&self, video_url: &str) -> Result<Vec<StreamInfo>> {
        self.cache.get_streams(video_url).await
    }

    /// Stream the configured policy picks for `criterion`
    pub fn select(&self, streams: &[StreamInfo], criterion: &Criterion) -> Result<StreamInfo> {
        selector::select_with(streams, criterion, &self.config.policy)
    }

    /// Resolve and select without transferring anything
    ///
    /// Fails with `DestinationExists` or `MergeUnavailable` exactly as
    /// [`Downloader::download`] would before its first transfer.
    pub async fn plan(&self, request: &DownloadRequest) -> Result<DownloadPlan> {
        let video = self.cache.get_video(&request.video_url).await?;
        let primary = self.select(&video.streams, &request.criterion)?;

        let audio = if primary.is_video_only() && request.output == OutputMode::Combined {
            let audio = self.select(&video.streams, &Criterion::AudioOnly)?;
            if !self.merger.is_available() {
                return Err(TubegrabError::MergeUnavailable(format!(
                    "stream {} has no audio and ffmpeg is not available",
                    primary.itag
                )));
            }
            Some(audio)
        } else {
            None
        };

        let extension = if audio.is_some() {
            self.config.merge_container.as_str()
        } else {
            primary.container.as_str()
        };
        let stem = sanitize_filename(&video.title)
            .or_else(|| sanitize_filename(&video.id))
            .unwrap_or_else(|| "video".to_string());
        let final_path = request
            .destination
            .join(format!("{}.{}", stem, extension));

        if tokio::fs::try_exists(&final_path).await? {
            return Err(TubegrabError::DestinationExists(final_path));
        }

        Ok(DownloadPlan {
            video,
            primary,
            audio,
            final_path,
        })
    }

    /// Download a video and return the path of the finished file
    pub async fn download(
        &self,
        request: &DownloadRequest,
        progress: &ProgressReporter,
    ) -> Result<PathBuf> {
        info!(
            "Download requested: {} ({}, {:?})",
            request.video_url, request.criterion, request.output
        );
        progress.status(DownloadStatus::Resolving).await;

        let result = self.run(request, progress).await;
        match &result {
            Ok(path) => {
                let mut done = progress.snapshot(0);
                done.complete();
                progress.send(done).await;
                info!("Saved {}", path.display());
            }
            Err(e) => {
                error!("Download of {} failed: {}", request.video_url, e);
                let mut failed = progress.snapshot(0);
                failed.failed(e.user_message());
                progress.send(failed).await;
            }
        }
        result
    }

    async fn run(&self, request: &DownloadRequest, progress: &ProgressReporter) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&request.destination).await?;
        let plan = self.plan(request).await?;
        let job = Uuid::new_v4();

        match &plan.audio {
            Some(audio) => {
                let video_tmp = temp_path(&request.destination, job, "video", &plan.primary.container);
                let audio_tmp = temp_path(&request.destination, job, "audio", &audio.container);
                let merged_tmp = request
                    .destination
                    .join(format!(".{}.merged.{}", job, self.config.merge_container));
                let temporaries = [video_tmp.clone(), audio_tmp.clone(), merged_tmp.clone()];

                let result = async {
                    self.transfer(request, &plan.primary, &video_tmp, &progress.for_part(0, 2))
                        .await?;
                    self.transfer(request, audio, &audio_tmp, &progress.for_part(1, 2))
                        .await?;

                    progress.for_part(1, 2).status(DownloadStatus::Merging).await;
                    self.merger.merge(&video_tmp, &audio_tmp, &merged_tmp).await?;
                    publish(&merged_tmp, &plan.final_path).await
                }
                .await;

                cleanup_files(&temporaries).await;
                result.map(|()| plan.final_path)
            }
            None => {
                let tmp = temp_path(&request.destination, job, "media", &plan.primary.container);
                let result = async {
                    self.transfer(request, &plan.primary, &tmp, &progress.for_part(0, 1))
                        .await?;
                    publish(&tmp, &plan.final_path).await
                }
                .await;

                cleanup_files(&[tmp]).await;
                result.map(|()| plan.final_path)
            }
        }
    }

    async fn transfer(
        &self,
        request: &DownloadRequest,
        stream: &StreamInfo,
        dest: &Path,
        progress: &ProgressReporter,
    ) -> Result<u64> {
        let media_url = self
            .cache
            .provider()
            .resolve_url(&request.video_url, &stream.itag)
            .await?;
        debug!("Transferring itag {} ({})", stream.itag, stream.describe());
        self.fetcher.fetch(&media_url, dest, progress).await
    }
}

fn temp_path(dir: &Path, job: Uuid, part: &str, container: &str) -> PathBuf {
    dir.join(format!(".{}.{}.{}.part", job, part, container))
}

/// Move `tmp` to `dest` without ever replacing an existing file
async fn publish(tmp: &Path, dest: &Path) -> Result<()> {
    match tokio::fs::hard_link(tmp, dest).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
            Err(TubegrabError::DestinationExists(dest.to_path_buf()))
        }
        Err(e) => {
            // Filesystems without hard links
            warn!("Hard link into place failed ({}), renaming instead", e);
            if tokio::fs::try_exists(dest).await? {
                return Err(TubegrabError::DestinationExists(dest.to_path_buf()));
            }
            tokio::fs::rename(tmp, dest).await?;
            Ok(())
        }
    }
}
