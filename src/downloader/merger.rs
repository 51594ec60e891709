//! Video and audio merging through ffmpeg

use crate::utils::config::AppSettings;
use crate::utils::error::{Result, TubegrabError};
use crate::utils::platform::find_tool;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command as AsyncCommand;
use tracing::{debug, info, warn};

/// Combines a video-only file and an audio-only file into one container
#[async_trait]
pub trait MergeTool: Send + Sync {
    /// Whether a merge can run at all
    fn is_available(&self) -> bool;

    /// Merge `video` and `audio` into `output`
    async fn merge(&self, video: &Path, audio: &Path, output: &Path) -> Result<()>;
}

/// ffmpeg stream-copy merger
pub struct FfmpegMerger {
    ffmpeg_path: Option<PathBuf>,
}

impl FfmpegMerger {
    pub fn from_settings(settings: &AppSettings) -> Self {
        let ffmpeg_path = find_tool("ffmpeg", settings.ffmpeg_path.as_deref());
        match &ffmpeg_path {
            Some(path) => info!("Found ffmpeg at: {}", path.display()),
            None => warn!("ffmpeg not found; only single-stream downloads will work"),
        }
        Self { ffmpeg_path }
    }

    /// Use a specific binary, or none at all
    pub fn with_path(ffmpeg_path: Option<PathBuf>) -> Self {
        Self { ffmpeg_path }
    }
}

#[async_trait]
impl MergeTool for FfmpegMerger {
    fn is_available(&self) -> bool {
        self.ffmpeg_path.is_some()
    }

    async fn merge(&self, video: &Path, audio: &Path, output: &Path) -> Result<()> {
        let ffmpeg = self
            .ffmpeg_path
            .as_ref()
            .ok_or_else(|| TubegrabError::MergeUnavailable("ffmpeg not found".to_string()))?;

        debug!(
            "Merging {} and {} into {}",
            video.display(),
            audio.display(),
            output.display()
        );

        let output_status = AsyncCommand::new(ffmpeg)
            .args(["-y", "-loglevel", "error", "-i"])
            .arg(video)
            .arg("-i")
            .arg(audio)
            .args(["-map", "0:v:0", "-map", "1:a:0", "-c", "copy"])
            .arg(output)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| TubegrabError::MergeUnavailable(format!("failed to run ffmpeg: {}", e)))?;

        if !output_status.status.success() {
            let stderr = String::from_utf8_lossy(&output_status.stderr)
                .trim()
                .to_string();
            return Err(TubegrabError::MergeUnavailable(format!(
                "ffmpeg exited with {}: {}",
                output_status.status, stderr
            )));
        }

        let size = tokio::fs::metadata(output).await.map(|m| m.len()).unwrap_or(0);
        if size == 0 {
            return Err(TubegrabError::MergeUnavailable(
                "ffmpeg produced no output".to_string(),
            ));
        }

        info!("Merged {} bytes into {}", size, output.display());
        Ok(())
    }
}

/// Remove temporary files, logging instead of failing
pub async fn cleanup_files(paths: &[PathBuf]) {
    for path in paths {
        match tokio::fs::remove_file(path).await {
            Ok(()) => debug!("Removed temporary file: {}", path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove temporary file {}: {}", path.display(), e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[cfg(unix)]
    fn script(dir: &Path, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("fake-ffmpeg");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[tokio::test]
    async fn test_missing_ffmpeg_is_merge_unavailable() {
        let temp = TempDir::new().unwrap();
        let merger = FfmpegMerger::with_path(None);
        assert!(!merger.is_available());

        let err = merger
            .merge(
                &temp.path().join("v"),
                &temp.path().join("a"),
                &temp.path().join("out.mp4"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, TubegrabError::MergeUnavailable(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_merge_writes_last_argument() {
        let temp = TempDir::new().unwrap();
        let ffmpeg = script(temp.path(), "for last; do :; done\necho merged > \"$last\"");
        let merger = FfmpegMerger::with_path(Some(ffmpeg));
        let output = temp.path().join("out.mp4");

        merger
            .merge(&temp.path().join("v"), &temp.path().join("a"), &output)
            .await
            .unwrap();
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "merged\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_nonzero_exit_fails() {
        let temp = TempDir::new().unwrap();
        let ffmpeg = script(temp.path(), "echo 'Invalid data' >&2\nexit 1");
        let merger = FfmpegMerger::with_path(Some(ffmpeg));

        let err = merger
            .merge(
                &temp.path().join("v"),
                &temp.path().join("a"),
                &temp.path().join("out.mp4"),
            )
            .await
            .unwrap_err();
        match err {
            TubegrabError::MergeUnavailable(msg) => assert!(msg.contains("Invalid data")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_empty_output_fails() {
        let temp = TempDir::new().unwrap();
        let ffmpeg = script(temp.path(), "for last; do :; done\n: > \"$last\"");
        let merger = FfmpegMerger::with_path(Some(ffmpeg));

        let result = merger
            .merge(
                &temp.path().join("v"),
                &temp.path().join("a"),
                &temp.path().join("out.mp4"),
            )
            .await;
        assert!(matches!(result, Err(TubegrabError::MergeUnavailable(_))));
    }

    #[tokio::test]
    async fn test_cleanup_files_ignores_missing() {
        let temp = TempDir::new().unwrap();
        let present = temp.path().join("a.part");
        std::fs::write(&present, b"x").unwrap();

        cleanup_files(&[present.clone(), temp.path().join("missing.part")]).await;
        assert!(!present.exists());
    }
}
