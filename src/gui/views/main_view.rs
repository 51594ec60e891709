//! Main view implementation - Light Theme

use crate::downloader::progress::DownloadProgress;
use crate::extractor::models::VideoDetails;
use crate::gui::app::Message;
use crate::gui::components::{progress_bar, url_input, video_card};
use crate::gui::theme;
use iced::widget::{button, column, container, pick_list, row, text, text_input, toggler, Space};
use iced::{Alignment, Element, Length};

/// Everything the main view renders
pub struct MainViewState<'s> {
    pub url: &'s str,
    pub url_error: Option<&'s str>,
    pub video: Option<&'s VideoDetails>,
    pub qualities: &'s [String],
    pub quality: Option<&'s String>,
    pub video_only: bool,
    pub destination: &'s str,
    pub progress: Option<&'s DownloadProgress>,
    pub status_message: &'s str,
    pub is_fetching: bool,
    pub is_downloading: bool,
    pub can_open_folder: bool,
}

pub fn main_view<'a>(state: MainViewState<'_>) -> Element<'a, Message> {
    let busy = state.is_fetching || state.is_downloading;

    let fetch_row = row![
        Space::with_width(Length::Fill),
        button(text(if state.is_fetching { "Fetching..." } else { "Fetch" }).size(16))
            .on_press_maybe((!state.url.trim().is_empty() && !busy).then_some(Message::FetchPressed))
            .padding([14, 28])
            .style(iced::theme::Button::Custom(Box::new(theme::PrimaryButton))),
    ];

    let mut hero = column![
        text("Download Video")
            .size(28)
            .style(iced::theme::Text::Color(theme::TEXT_PRIMARY)),
        url_input(state.url, busy, state.url_error),
        fetch_row,
    ]
    .spacing(18);

    if let Some(video) = state.video {
        hero = hero.push(video_card(video));
        hero = hero.push(options_row(&state, busy));
        hero = hero.push(destination_row(state.destination, busy));

        let mut actions = row![Space::with_width(Length::Fill)]
            .spacing(12)
            .align_items(Alignment::Center);
        if state.can_open_folder {
            actions = actions.push(
                button(text("Open Folder").size(14))
                    .on_press(Message::OpenFolder)
                    .padding([10, 16])
                    .style(iced::theme::Button::Custom(Box::new(theme::SecondaryButton))),
            );
        }
        actions = actions.push(
            button(
                text(if state.is_downloading {
                    "Downloading..."
                } else {
                    "Download"
                })
                .size(16),
            )
            .on_press_maybe(
                (!busy && state.quality.is_some()).then_some(Message::DownloadPressed),
            )
            .padding([14, 28])
            .style(iced::theme::Button::Custom(Box::new(theme::PrimaryButton))),
        );
        hero = hero.push(actions);
    }

    if let Some(progress) = state.progress {
        hero = hero.push(progress_bar(progress));
    }

    let card = container(hero)
        .padding(28)
        .width(Length::Fill)
        .style(iced::theme::Container::Custom(Box::new(theme::CardContainer)));

    column![
        card,
        Space::with_height(Length::Fill),
        text(state.status_message)
            .size(13)
            .style(iced::theme::Text::Color(theme::TEXT_SECONDARY)),
    ]
    .spacing(16)
    .width(Length::Fill)
    .height(Length::Fill)
    .padding(28)
    .into()
}

fn options_row<'a>(state: &MainViewState<'_>, busy: bool) -> Element<'a, Message> {
    let output: Element<'a, Message> = if busy {
        text(if state.video_only {
            "Video only"
        } else {
            "Video + audio"
        })
        .size(12)
        .into()
    } else {
        toggler(
            Some("Video only (no merge)".to_string()),
            state.video_only,
            Message::VideoOnlyToggled,
        )
        .text_size(12)
        .width(Length::Shrink)
        .into()
    };

    let quality = pick_list(
        state.qualities.to_vec(),
        state.quality.cloned(),
        Message::QualitySelected,
    )
    .text_size(12)
    .padding([6, 10])
    .width(Length::Fixed(150.0));

    row![tag("Quality", quality.into()), tag("Output", output)]
        .spacing(12)
        .into()
}

fn destination_row<'a>(destination: &str, busy: bool) -> Element<'a, Message> {
    let mut field = text_input("Download folder", destination)
        .padding(10)
        .size(13)
        .width(Length::Fill)
        .style(iced::theme::TextInput::Custom(Box::new(theme::InputStyle {
            error: false,
        })));
    if !busy {
        field = field.on_input(Message::DestinationChanged);
    }

    tag(
        "Save to",
        row![
            field,
            button(text("Browse").size(13))
                .on_press_maybe((!busy).then_some(Message::BrowseDestination))
                .padding([8, 14])
                .style(iced::theme::Button::Custom(Box::new(theme::SecondaryButton))),
        ]
        .spacing(8)
        .align_items(Alignment::Center)
        .into(),
    )
}

fn tag<'a>(label: &str, body: Element<'a, Message>) -> Element<'a, Message> {
    container(
        column![
            text(label)
                .size(11)
                .style(iced::theme::Text::Color(theme::TEXT_SECONDARY)),
            body,
        ]
        .spacing(4),
    )
    .padding([8, 12])
    .style(iced::theme::Container::Custom(Box::new(theme::TagContainer)))
    .into()
}
