use crate::extractor::models::{StreamInfo, VideoDetails};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Boundary to the stream extraction backend
///
/// Implementations return fully converted [`VideoDetails`]; the rest of the
/// crate never sees the backend's own types.
#[async_trait]
pub trait StreamProvider: Send + Sync {
    /// Returns a unique identifier for this provider (e.g., "yt-dlp")
    fn id(&self) -> &'static str;

    /// Fetch video details and the available streams, in provider order
    async fn fetch_video(&self, url: &str) -> Result<VideoDetails>;

    /// Gets available streams (calls fetch_video internally)
    async fn fetch_streams(&self, url: &str) -> Result<Vec<StreamInfo>> {
        let details = self.fetch_video(url).await?;
        Ok(details.streams)
    }

    /// Resolves the direct media URL for one stream
    async fn resolve_url(&self, url: &str, itag: &str) -> Result<String>;
}
