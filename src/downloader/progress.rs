//! Progress tracking for downloads

use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

/// Progress snapshot sent to frontends
#[derive(Debug, Clone)]
pub struct DownloadProgress {
    pub status: DownloadStatus,
    /// Size of the current transfer, 0 when unknown
    pub total_bytes: u64,
    pub downloaded_bytes: u64,
    pub speed: f64, // bytes per second
    pub eta: Option<Duration>,
    /// Index of the current transfer (video, then audio when merging)
    pub part: usize,
    pub parts: usize,
}

impl DownloadProgress {
    /// Create a new progress tracker
    pub fn new(total_bytes: u64, parts: usize) -> Self {
        Self {
            status: DownloadStatus::Resolving,
            total_bytes,
            downloaded_bytes: 0,
            speed: 0.0,
            eta: None,
            part: 0,
            parts: parts.max(1),
        }
    }

    /// Update progress with new data
    pub fn update(&mut self, downloaded_bytes: u64, speed: f64) {
        self.downloaded_bytes = downloaded_bytes;
        self.speed = speed;

        // Calculate ETA if we have a speed
        if speed > 0.0 && self.downloaded_bytes < self.total_bytes {
            let remaining = self.total_bytes - self.downloaded_bytes;
            self.eta = Some(Duration::from_secs_f64((remaining as f64) / speed));
        } else if self.total_bytes > 0 && self.downloaded_bytes >= self.total_bytes {
            self.eta = Some(Duration::from_secs(0));
        } else {
            self.eta = None;
        }
    }

    /// Mark as completed
    pub fn complete(&mut self) {
        self.status = DownloadStatus::Completed;
        self.downloaded_bytes = self.total_bytes;
        self.part = self.parts - 1;
        self.eta = Some(Duration::from_secs(0));
    }

    /// Mark as failed
    pub fn failed(&mut self, error: String) {
        self.status = DownloadStatus::Failed(error);
    }

    /// Fraction of the current transfer (0.0 to 1.0)
    pub fn percentage(&self) -> f64 {
        if self.total_bytes == 0 {
            return 0.0;
        }
        (self.downloaded_bytes as f64 / self.total_bytes as f64).min(1.0)
    }

    /// Fraction of the whole job across all transfers (0.0 to 1.0)
    pub fn overall(&self) -> f64 {
        match self.status {
            DownloadStatus::Completed => 1.0,
            DownloadStatus::Merging => 1.0,
            DownloadStatus::Resolving => 0.0,
            _ => ((self.part as f64 + self.percentage()) / self.parts as f64).min(1.0),
        }
    }
}

/// Download status
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DownloadStatus {
    #[default]
    Resolving,
    Downloading,
    Merging,
    Completed,
    Failed(String),
}

impl DownloadStatus {
    pub fn label(&self) -> &str {
        match self {
            DownloadStatus::Resolving => "Fetching video information",
            DownloadStatus::Downloading => "Downloading",
            DownloadStatus::Merging => "Merging video and audio",
            DownloadStatus::Completed => "Completed",
            DownloadStatus::Failed(reason) => reason,
        }
    }
}

/// Best-effort sender of progress snapshots
///
/// Dropped receivers never fail a download.
#[derive(Debug, Clone, Default)]
pub struct ProgressReporter {
    tx: Option<mpsc::Sender<DownloadProgress>>,
    part: usize,
    parts: usize,
}

impl ProgressReporter {
    pub fn new(tx: mpsc::Sender<DownloadProgress>) -> Self {
        Self {
            tx: Some(tx),
            part: 0,
            parts: 1,
        }
    }

    /// Reporter that discards everything
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Reporter for transfer `part` of `parts`
    pub fn for_part(&self, part: usize, parts: usize) -> Self {
        Self {
            tx: self.tx.clone(),
            part,
            parts: parts.max(1),
        }
    }

    /// Fresh snapshot stamped with this reporter's part
    pub fn snapshot(&self, total_bytes: u64) -> DownloadProgress {
        let mut progress = DownloadProgress::new(total_bytes, self.parts);
        progress.part = self.part;
        progress
    }

    pub async fn send(&self, progress: DownloadProgress) {
        if let Some(tx) = &self.tx {
            if let Err(e) = tx.send(progress).await {
                debug!("Progress receiver gone: {}", e);
            }
        }
    }

    /// Announce a status change with no byte counts
    pub async fn status(&self, status: DownloadStatus) {
        let mut progress = self.snapshot(0);
        progress.status = status;
        self.send(progress).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_progress_new() {
        let progress = DownloadProgress::new(1000, 2);

        assert_eq!(progress.total_bytes, 1000);
        assert_eq!(progress.downloaded_bytes, 0);
        assert_eq!(progress.eta, None);
        assert_eq!(progress.status, DownloadStatus::Resolving);
        assert_eq!(progress.parts, 2);
        assert_eq!(DownloadProgress::new(0, 0).parts, 1);
    }

    #[test]
    fn test_progress_update_basic() {
        let mut progress = DownloadProgress::new(1000, 1);
        progress.update(500, 100.0);

        assert_eq!(progress.downloaded_bytes, 500);
        assert_eq!(
            progress.eta.map(|eta| eta.as_secs()),
            Some(5),
            "500 bytes remaining at 100 B/s"
        );
    }

    #[test]
    fn test_progress_update_zero_speed() {
        let mut progress = DownloadProgress::new(1000, 1);
        progress.update(100, 0.0);
        assert_eq!(progress.eta, None, "ETA should be None with zero speed");
    }

    #[test]
    fn test_unknown_total_has_no_eta() {
        let mut progress = DownloadProgress::new(0, 1);
        progress.update(4096, 1024.0);
        assert_eq!(progress.eta, None);
        assert_eq!(progress.percentage(), 0.0);
    }

    #[test]
    fn test_percentage_is_clamped() {
        let mut progress = DownloadProgress::new(1000, 1);
        progress.update(1500, 10.0);
        assert_eq!(progress.percentage(), 1.0);
    }

    #[test]
    fn test_overall_spans_parts() {
        let mut progress = DownloadProgress::new(1000, 2);
        progress.status = DownloadStatus::Downloading;
        progress.part = 1;
        progress.update(500, 10.0);
        assert!((progress.overall() - 0.75).abs() < f64::EPSILON);

        progress.status = DownloadStatus::Merging;
        assert_eq!(progress.overall(), 1.0);
    }

    #[test]
    fn test_complete_and_failed() {
        let mut progress = DownloadProgress::new(1000, 2);
        progress.complete();
        assert_eq!(progress.status, DownloadStatus::Completed);
        assert_eq!(progress.downloaded_bytes, 1000);
        assert_eq!(progress.part, 1);

        progress.failed("boom".to_string());
        assert_eq!(progress.status.label(), "boom");
    }

    #[tokio::test]
    async fn test_reporter_stamps_part() {
        let (tx, mut rx) = mpsc::channel(4);
        let reporter = ProgressReporter::new(tx).for_part(1, 2);

        reporter.status(DownloadStatus::Downloading).await;
        let received = rx.recv().await.unwrap();
        assert_eq!(received.part, 1);
        assert_eq!(received.parts, 2);
        assert_eq!(received.status, DownloadStatus::Downloading);
    }

    #[tokio::test]
    async fn test_reporter_survives_dropped_receiver() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        ProgressReporter::new(tx).status(DownloadStatus::Merging).await;
        ProgressReporter::disabled().status(DownloadStatus::Merging).await;
    }
}
