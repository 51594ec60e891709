pub mod models;
pub mod traits;
pub mod ytdlp;

pub use models::{StreamInfo, VideoDetails};
pub use traits::StreamProvider;
pub use ytdlp::{validate_url, YtDlpProvider};
