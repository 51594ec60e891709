//! Main GUI application

use crate::downloader::progress::{DownloadProgress, ProgressReporter};
use crate::downloader::{DownloadRequest, Downloader, OutputMode};
use crate::extractor::models::VideoDetails;
use crate::gui::clipboard;
use crate::gui::theme;
use crate::gui::views::{main_view, MainViewState};
use crate::selector::{available_resolutions, Criterion};
use crate::utils::config::AppSettings;
use iced::widget::container;
use iced::{Application, Command, Element, Length, Subscription, Theme};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

pub const BEST_AVAILABLE: &str = "Best Available";
pub const HIGHEST: &str = "Highest";
pub const AUDIO_ONLY: &str = "Audio Only";

/// Startup data handed to the application by `main`
pub struct GuiFlags {
    pub downloader: Arc<Downloader>,
    pub settings: AppSettings,
    pub settings_path: PathBuf,
}

/// Main application state
pub struct TubegrabApp {
    downloader: Arc<Downloader>,
    settings: AppSettings,
    settings_path: PathBuf,

    url_input: String,
    url_error: Option<String>,
    /// URL the shown video was fetched with, the cache key for the download
    video_url: String,
    video: Option<Arc<VideoDetails>>,
    qualities: Vec<String>,
    quality: Option<String>,
    video_only: bool,
    destination: String,

    progress: Option<DownloadProgress>,
    progress_rx: Option<mpsc::Receiver<DownloadProgress>>,
    last_saved: Option<PathBuf>,
    status_message: String,

    is_fetching: bool,
    is_downloading: bool,
}

/// Application messages
#[derive(Debug, Clone)]
pub enum Message {
    // Input events
    UrlInputChanged(String),
    PasteFromClipboard,
    ClearUrlInput,

    FetchPressed,
    VideoFetched(String, Result<Arc<VideoDetails>, String>),

    QualitySelected(String),
    VideoOnlyToggled(bool),
    DestinationChanged(String),
    BrowseDestination,

    DownloadPressed,
    DownloadFinished(Result<PathBuf, String>),
    OpenFolder,

    // Drains download progress while a download runs
    Tick,
}

impl Application for TubegrabApp {
    type Executor = iced::executor::Default;
    type Message = Message;
    type Theme = Theme;
    type Flags = GuiFlags;

    fn new(flags: Self::Flags) -> (Self, Command<Message>) {
        let destination = flags.settings.download_location.to_string_lossy().to_string();
        let app = Self {
            downloader: flags.downloader,
            settings: flags.settings,
            settings_path: flags.settings_path,
            url_input: String::new(),
            url_error: None,
            video_url: String::new(),
            video: None,
            qualities: Vec::new(),
            quality: None,
            video_only: false,
            destination,
            progress: None,
            progress_rx: None,
            last_saved: None,
            status_message: "Ready".to_string(),
            is_fetching: false,
            is_downloading: false,
        };
        (app, Command::none())
    }

    fn title(&self) -> String {
        match &self.video {
            Some(video) => format!("tubegrab - {}", video.title),
            None => String::from("tubegrab - YouTube Downloader"),
        }
    }

    fn update(&mut self, message: Message) -> Command<Message> {
        match message {
            Message::UrlInputChanged(url) => {
                self.url_input = url;
                self.url_error = None;
                Command::none()
            }

            Message::PasteFromClipboard => {
                match clipboard::get_clipboard_content() {
                    Ok(content) => {
                        self.url_input = content;
                        self.url_error = None;
                        self.status_message = "URL pasted from clipboard".to_string();
                    }
                    Err(e) => {
                        self.status_message = e;
                    }
                }
                Command::none()
            }

            Message::ClearUrlInput => {
                self.url_input.clear();
                self.url_error = None;
                self.video = None;
                self.qualities.clear();
                self.quality = None;
                self.progress = None;
                Command::none()
            }

            Message::FetchPressed => {
                let url = self.url_input.trim().to_string();
                if url.is_empty() || self.is_fetching || self.is_downloading {
                    return Command::none();
                }
                self.is_fetching = true;
                self.url_error = None;
                self.progress = None;
                self.status_message = "Fetching video information...".to_string();

                let downloader = Arc::clone(&self.downloader);
                Command::perform(
                    async move {
                        let result = downloader.video(&url).await.map_err(|e| e.user_message());
                        (url, result)
                    },
                    |(url, result)| Message::VideoFetched(url, result),
                )
            }

            Message::VideoFetched(url, result) => {
                self.is_fetching = false;
                match result {
                    Ok(video) => {
                        self.video_url = url;
                        self.qualities = quality_options(&video);
                        self.quality = Some(initial_quality(
                            &self.qualities,
                            &self.settings.preferred_quality,
                        ));
                        self.status_message = format!("Found \"{}\"", video.title);
                        self.video = Some(video);
                    }
                    Err(e) => {
                        self.video = None;
                        self.url_error = Some(e);
                        self.status_message = "Ready".to_string();
                    }
                }
                Command::none()
            }

            Message::QualitySelected(quality) => {
                self.quality = Some(quality);
                Command::none()
            }

            Message::VideoOnlyToggled(value) => {
                self.video_only = value;
                Command::none()
            }

            Message::DestinationChanged(location) => {
                self.destination = location;
                Command::none()
            }

            Message::BrowseDestination => {
                if let Some(path) = rfd::FileDialog::new()
                    .set_directory(&self.destination)
                    .pick_folder()
                {
                    self.destination = path.to_string_lossy().to_string();
                }
                Command::none()
            }

            Message::DownloadPressed => self.start_download(),

            Message::DownloadFinished(result) => {
                self.drain_progress();
                self.progress_rx = None;
                self.is_downloading = false;
                match result {
                    Ok(path) => {
                        self.status_message = format!("Saved {}", path.display());
                        self.last_saved = Some(path);
                    }
                    Err(e) => {
                        self.status_message = format!("Download failed: {}", e);
                    }
                }
                Command::none()
            }

            Message::OpenFolder => {
                let folder = self
                    .last_saved
                    .as_ref()
                    .and_then(|path| path.parent().map(PathBuf::from))
                    .unwrap_or_else(|| PathBuf::from(&self.destination));
                if let Err(e) = open::that(&folder) {
                    warn!("Failed to open folder {}: {}", folder.display(), e);
                    self.status_message = format!("Could not open {}", folder.display());
                }
                Command::none()
            }

            Message::Tick => {
                self.drain_progress();
                Command::none()
            }
        }
    }

    fn view(&self) -> Element<'_, Message> {
        let content = main_view(MainViewState {
            url: &self.url_input,
            url_error: self.url_error.as_deref(),
            video: self.video.as_deref(),
            qualities: &self.qualities,
            quality: self.quality.as_ref(),
            video_only: self.video_only,
            destination: &self.destination,
            progress: self.progress.as_ref(),
            status_message: &self.status_message,
            is_fetching: self.is_fetching,
            is_downloading: self.is_downloading,
            can_open_folder: self.last_saved.is_some() && !self.is_downloading,
        });

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .style(iced::theme::Container::Custom(Box::new(
                theme::BackgroundContainer,
            )))
            .into()
    }

    fn subscription(&self) -> Subscription<Message> {
        if self.progress_rx.is_some() {
            iced::time::every(std::time::Duration::from_millis(100)).map(|_| Message::Tick)
        } else {
            Subscription::none()
        }
    }

    fn theme(&self) -> Self::Theme {
        Theme::Light
    }
}

impl TubegrabApp {
    fn start_download(&mut self) -> Command<Message> {
        if self.is_downloading || self.is_fetching {
            return Command::none();
        }
        let (Some(video), Some(quality)) = (self.video.clone(), self.quality.clone()) else {
            return Command::none();
        };

        let criterion = match quality.parse::<Criterion>() {
            Ok(criterion) => criterion,
            Err(e) => {
                self.status_message = e.user_message();
                return Command::none();
            }
        };
        let destination = PathBuf::from(self.destination.trim());
        if destination.as_os_str().is_empty() {
            self.status_message = "Choose a folder to save into".to_string();
            return Command::none();
        }

        self.remember_choices(&destination, quality);

        let request = DownloadRequest {
            video_url: self.video_url.clone(),
            criterion,
            destination,
            output: if self.video_only {
                OutputMode::VideoOnly
            } else {
                OutputMode::Combined
            },
        };

        let (tx, rx) = mpsc::channel(64);
        self.progress_rx = Some(rx);
        self.progress = None;
        self.last_saved = None;
        self.is_downloading = true;
        self.status_message = format!("Downloading \"{}\"", video.title);

        let downloader = Arc::clone(&self.downloader);
        Command::perform(
            async move {
                downloader
                    .download(&request, &ProgressReporter::new(tx))
                    .await
                    .map_err(|e| e.user_message())
            },
            Message::DownloadFinished,
        )
    }

    fn drain_progress(&mut self) {
        if let Some(rx) = self.progress_rx.as_mut() {
            while let Ok(update) = rx.try_recv() {
                self.progress = Some(update);
            }
        }
    }

    /// Persist the folder and quality so the next session starts with them
    fn remember_choices(&mut self, destination: &std::path::Path, quality: String) {
        let mut updated = self.settings.clone();
        updated.download_location = destination.to_path_buf();
        updated.preferred_quality = quality;
        if updated == self.settings {
            return;
        }
        match updated.save(&self.settings_path) {
            Ok(()) => info!("Saved settings to {}", self.settings_path.display()),
            Err(e) => warn!("Failed to save settings: {}", e),
        }
        self.settings = updated;
    }
}

/// Picker entries: the fixed criteria, then every resolution the video offers
pub fn quality_options(video: &VideoDetails) -> Vec<String> {
    let mut options = vec![BEST_AVAILABLE.to_string(), HIGHEST.to_string()];
    options.extend(available_resolutions(&video.streams));
    if video.streams.iter().any(|s| s.is_audio_only()) {
        options.push(AUDIO_ONLY.to_string());
    }
    options
}

/// Preferred quality when offered, the closest lower resolution otherwise
pub fn initial_quality(options: &[String], preferred: &str) -> String {
    if let Some(found) = options.iter().find(|o| o.eq_ignore_ascii_case(preferred)) {
        return found.clone();
    }
    if let Some(target) = crate::selector::parse_height(preferred) {
        let lower = options
            .iter()
            .filter_map(|o| crate::selector::parse_height(o).map(|h| (h, o)))
            .filter(|(h, _)| *h <= target)
            .max_by_key(|(h, _)| *h);
        if let Some((_, label)) = lower {
            return label.clone();
        }
    }
    BEST_AVAILABLE.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::models::StreamInfo;

    fn video(heights: &[u32], with_audio: bool) -> VideoDetails {
        let mut streams: Vec<StreamInfo> = heights
            .iter()
            .map(|h| StreamInfo {
                itag: h.to_string(),
                resolution: Some(format!("{}p", h)),
                height: Some(*h),
                has_video: true,
                has_audio: false,
                container: "mp4".to_string(),
                mime_type: "video/mp4".to_string(),
                approximate_size_bytes: None,
                audio_bitrate_kbps: None,
                fps: None,
            })
            .collect();
        if with_audio {
            streams.push(StreamInfo {
                itag: "140".to_string(),
                resolution: None,
                height: None,
                has_video: false,
                has_audio: true,
                container: "m4a".to_string(),
                mime_type: "audio/mp4".to_string(),
                approximate_size_bytes: None,
                audio_bitrate_kbps: Some(128.0),
                fps: None,
            });
        }
        VideoDetails {
            id: "abc".to_string(),
            title: "Clip".to_string(),
            webpage_url: "https://www.youtube.com/watch?v=abc".to_string(),
            uploader: None,
            duration_secs: None,
            view_count: None,
            thumbnail: None,
            streams,
        }
    }

    #[test]
    fn test_quality_options_order() {
        let options = quality_options(&video(&[720, 1080], true));
        assert_eq!(
            options,
            vec!["Best Available", "Highest", "1080p", "720p", "Audio Only"]
        );
    }

    #[test]
    fn test_every_option_parses() {
        for option in quality_options(&video(&[2160, 480], true)) {
            assert!(option.parse::<Criterion>().is_ok(), "{}", option);
        }
    }

    #[test]
    fn test_initial_quality_prefers_setting_then_lower() {
        let options = quality_options(&video(&[1080, 720], false));
        assert_eq!(initial_quality(&options, "1080p"), "1080p");
        assert_eq!(initial_quality(&options, "4K"), "1080p");
        assert_eq!(initial_quality(&options, "360p"), BEST_AVAILABLE);
        assert_eq!(initial_quality(&options, "highest"), HIGHEST);
    }
}
