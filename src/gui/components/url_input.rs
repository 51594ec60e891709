//! URL input component

use crate::gui::app::Message;
use crate::gui::theme;
use iced::widget::{button, column, row, text, text_input, tooltip};
use iced::{Alignment, Element, Length};

/// URL field with Paste and Clear buttons and an optional error line
pub fn url_input<'a>(value: &str, busy: bool, error_message: Option<&str>) -> Element<'a, Message> {
    let mut input = text_input("Paste a YouTube URL here...", value)
        .padding(14)
        .width(Length::Fill)
        .style(iced::theme::TextInput::Custom(Box::new(theme::InputStyle {
            error: error_message.is_some(),
        })));
    if !busy {
        input = input
            .on_input(Message::UrlInputChanged)
            .on_submit(Message::FetchPressed);
    }

    let input_row = row![
        input,
        tooltip(
            button(text("Paste").size(14))
                .on_press_maybe((!busy).then_some(Message::PasteFromClipboard))
                .padding([8, 12])
                .style(iced::theme::Button::Custom(Box::new(theme::IconButton))),
            "Paste from clipboard",
            tooltip::Position::Bottom,
        ),
        button(text("Clear").size(14))
            .on_press_maybe((!busy).then_some(Message::ClearUrlInput))
            .padding([8, 12])
            .style(iced::theme::Button::Custom(Box::new(theme::IconButton))),
    ]
    .spacing(12)
    .align_items(Alignment::Center);

    match error_message {
        Some(error) => column![
            input_row,
            text(error)
                .size(14)
                .style(iced::theme::Text::Color(theme::DANGER)),
        ]
        .spacing(8)
        .into(),
        None => input_row.into(),
    }
}
