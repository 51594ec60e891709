//! Fetched video summary

use crate::extractor::models::VideoDetails;
use crate::gui::app::Message;
use crate::gui::theme;
use iced::widget::{column, container, text};
use iced::{Element, Length};

pub fn video_card<'a>(video: &VideoDetails) -> Element<'a, Message> {
    let mut facts = Vec::new();
    if let Some(uploader) = &video.uploader {
        facts.push(uploader.clone());
    }
    if let Some(duration) = video.duration_label() {
        facts.push(duration);
    }
    if let Some(views) = video.view_count {
        facts.push(format!("{} views", group_thousands(views)));
    }

    container(
        column![
            text(&video.title).size(18),
            text(facts.join("  ·  "))
                .size(13)
                .style(iced::theme::Text::Color(theme::TEXT_SECONDARY)),
            text(format!("{} streams available", video.streams.len()))
                .size(12)
                .style(iced::theme::Text::Color(theme::TEXT_SECONDARY)),
        ]
        .spacing(6),
    )
    .padding([12, 16])
    .width(Length::Fill)
    .style(iced::theme::Container::Custom(Box::new(theme::TagContainer)))
    .into()
}

/// 1234567 -> "1,234,567"
fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(1234567), "1,234,567");
    }
}
