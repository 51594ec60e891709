//! Progress bar component

use crate::downloader::progress::{DownloadProgress, DownloadStatus};
use crate::gui::app::Message;
use crate::gui::theme::{self, ProgressBarStyle};
use iced::widget::{column, progress_bar as iced_progress_bar, row, text, Space};
use iced::{Element, Length};
use std::time::Duration;

/// Bar for the whole job plus a status line with speed and ETA
pub fn progress_bar<'a>(progress: &DownloadProgress) -> Element<'a, Message> {
    let style = match progress.status {
        DownloadStatus::Completed => ProgressBarStyle::Completed,
        DownloadStatus::Failed(_) => ProgressBarStyle::Failed,
        _ => ProgressBarStyle::Running,
    };

    let bar = iced_progress_bar(0.0..=1.0, progress.overall() as f32)
        .height(Length::Fixed(8.0))
        .style(iced::theme::ProgressBar::Custom(Box::new(style)));

    column![
        bar,
        row![
            text(status_line(progress))
                .size(12)
                .style(iced::theme::Text::Color(theme::TEXT_SECONDARY)),
            Space::with_width(Length::Fill),
            text(eta_text(progress))
                .size(12)
                .style(iced::theme::Text::Color(theme::TEXT_SECONDARY)),
        ],
    ]
    .spacing(6)
    .into()
}

fn status_line(progress: &DownloadProgress) -> String {
    match progress.status {
        DownloadStatus::Downloading => {
            let what = if progress.parts > 1 {
                if progress.part == 0 {
                    "Downloading video"
                } else {
                    "Downloading audio"
                }
            } else {
                "Downloading"
            };
            if progress.total_bytes > 0 {
                format!(
                    "{}: {} of {} at {}/s",
                    what,
                    format_bytes(progress.downloaded_bytes),
                    format_bytes(progress.total_bytes),
                    format_bytes(progress.speed as u64)
                )
            } else {
                format!("{}: {}", what, format_bytes(progress.downloaded_bytes))
            }
        }
        ref other => other.label().to_string(),
    }
}

fn eta_text(progress: &DownloadProgress) -> String {
    match (&progress.status, progress.eta) {
        (DownloadStatus::Downloading, Some(eta)) if eta.as_secs() == 0 => {
            "Almost done...".to_string()
        }
        (DownloadStatus::Downloading, Some(eta)) => format!("{} remaining", format_duration(eta)),
        (DownloadStatus::Downloading, None) => "Calculating...".to_string(),
        _ => String::new(),
    }
}

/// Format duration as human-readable string
pub fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    if total_seconds < 60 {
        format!("{}s", total_seconds)
    } else if total_seconds < 3600 {
        format!("{}m {}s", total_seconds / 60, total_seconds % 60)
    } else {
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        format!("{}h {}m", hours, minutes)
    }
}

/// Binary-prefixed size such as "12.3 MiB"
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}
