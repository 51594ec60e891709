//! Desktop front end built on iced

pub mod app;
pub mod clipboard;
pub mod components;
pub mod theme;
pub mod views;

pub use app::{GuiFlags, Message, TubegrabApp};

use iced::{Application, Settings, Size};

/// Open the main window and block until it closes
pub fn run(flags: GuiFlags) -> iced::Result {
    TubegrabApp::run(Settings {
        window: iced::window::Settings {
            size: Size::new(760.0, 640.0),
            min_size: Some(Size::new(560.0, 480.0)),
            ..Default::default()
        },
        ..Settings::with_flags(flags)
    })
}
