//! Custom theme definitions for the application - Light Theme

use iced::widget::{button, container, progress_bar, text_input};
use iced::{Background, Border, Color, Gradient, Shadow, Theme, Vector};

// --- Palette ---

// Background gradient - warm white to soft rose
pub const BACKGROUND_START: Color = Color::from_rgb(0.996, 0.976, 0.973); // Stone 50
pub const BACKGROUND_END: Color = Color::from_rgb(1.0, 0.945, 0.949); // Rose 50

// Primary colors - Rose into Orange
pub const ROSE_600: Color = Color::from_rgb(0.882, 0.114, 0.282); // Primary actions
pub const ROSE_400: Color = Color::from_rgb(0.984, 0.443, 0.522); // Focus ring
pub const ROSE_100: Color = Color::from_rgb(1.0, 0.894, 0.902); // Subtle backgrounds
pub const ORANGE_500: Color = Color::from_rgb(0.976, 0.451, 0.086); // Accent end

pub const EMERALD_500: Color = Color::from_rgb(0.063, 0.725, 0.506);
pub const EMERALD_400: Color = Color::from_rgb(0.204, 0.827, 0.600);

pub const RED_500: Color = Color::from_rgb(0.937, 0.267, 0.267);

// Slate scale for text and borders
pub const SLATE_800: Color = Color::from_rgb(0.118, 0.161, 0.231); // Primary text
pub const SLATE_600: Color = Color::from_rgb(0.278, 0.333, 0.412); // Secondary text
pub const SLATE_400: Color = Color::from_rgb(0.580, 0.639, 0.722); // Placeholder
pub const SLATE_200: Color = Color::from_rgb(0.886, 0.910, 0.941); // Light borders
pub const SLATE_100: Color = Color::from_rgb(0.945, 0.961, 0.976); // Very light bg

pub const WHITE: Color = Color::from_rgb(1.0, 1.0, 1.0);
pub const WHITE_90: Color = Color::from_rgba(1.0, 1.0, 1.0, 0.9);

pub const TEXT_PRIMARY: Color = SLATE_800;
pub const TEXT_SECONDARY: Color = SLATE_600;
pub const DANGER: Color = RED_500;

fn accent_gradient() -> Gradient {
    Gradient::Linear(
        iced::gradient::Linear::new(iced::Radians(0.0))
            .add_stop(0.0, ROSE_600)
            .add_stop(1.0, ORANGE_500),
    )
}

// --- Container Styles ---

pub struct BackgroundContainer;

impl container::StyleSheet for BackgroundContainer {
    type Style = Theme;

    fn appearance(&self, _style: &Self::Style) -> container::Appearance {
        container::Appearance {
            text_color: Some(TEXT_PRIMARY),
            background: Some(Background::Gradient(Gradient::Linear(
                iced::gradient::Linear::new(iced::Radians(2.356)) // 135 degrees
                    .add_stop(0.0, BACKGROUND_START)
                    .add_stop(1.0, BACKGROUND_END),
            ))),
            ..Default::default()
        }
    }
}

/// Raised white panel
pub struct CardContainer;

impl container::StyleSheet for CardContainer {
    type Style = Theme;

    fn appearance(&self, _style: &Self::Style) -> container::Appearance {
        container::Appearance {
            text_color: Some(TEXT_PRIMARY),
            background: Some(Background::Color(WHITE_90)),
            border: Border {
                color: SLATE_200,
                width: 1.0,
                radius: 20.0.into(),
            },
            shadow: Shadow {
                color: Color::from_rgba(0.882, 0.114, 0.282, 0.10),
                offset: Vector::new(0.0, 6.0),
                blur_radius: 20.0,
            },
        }
    }
}

/// Small labelled field inside a card
pub struct TagContainer;

impl container::StyleSheet for TagContainer {
    type Style = Theme;

    fn appearance(&self, _style: &Self::Style) -> container::Appearance {
        container::Appearance {
            background: Some(Background::Color(SLATE_100)),
            border: Border {
                color: SLATE_200,
                width: 1.0,
                radius: 10.0.into(),
            },
            ..Default::default()
        }
    }
}

// --- Button Styles ---

pub struct PrimaryButton;

impl button::StyleSheet for PrimaryButton {
    type Style = Theme;

    fn active(&self, _style: &Self::Style) -> button::Appearance {
        button::Appearance {
            background: Some(Background::Gradient(accent_gradient())),
            text_color: WHITE,
            border: Border {
                radius: 14.0.into(),
                ..Default::default()
            },
            shadow: Shadow {
                color: Color::from_rgba(0.882, 0.114, 0.282, 0.3),
                offset: Vector::new(0.0, 4.0),
                blur_radius: 12.0,
            },
            shadow_offset: Vector::new(0.0, 0.0),
        }
    }

    fn hovered(&self, style: &Self::Style) -> button::Appearance {
        let active = self.active(style);
        button::Appearance {
            shadow: Shadow {
                offset: Vector::new(0.0, 6.0),
                blur_radius: 18.0,
                ..active.shadow
            },
            ..active
        }
    }

    fn disabled(&self, style: &Self::Style) -> button::Appearance {
        button::Appearance {
            background: Some(Background::Color(SLATE_200)),
            text_color: SLATE_400,
            shadow: Shadow::default(),
            ..self.active(style)
        }
    }
}

pub struct SecondaryButton;

impl button::StyleSheet for SecondaryButton {
    type Style = Theme;

    fn active(&self, _style: &Self::Style) -> button::Appearance {
        button::Appearance {
            background: Some(Background::Color(WHITE)),
            text_color: SLATE_600,
            border: Border {
                radius: 12.0.into(),
                color: SLATE_200,
                width: 1.0,
            },
            ..Default::default()
        }
    }

    fn hovered(&self, style: &Self::Style) -> button::Appearance {
        button::Appearance {
            background: Some(Background::Color(SLATE_100)),
            ..self.active(style)
        }
    }
}

/// Borderless text button
pub struct IconButton;

impl button::StyleSheet for IconButton {
    type Style = Theme;

    fn active(&self, _style: &Self::Style) -> button::Appearance {
        button::Appearance {
            background: None,
            text_color: SLATE_600,
            border: Border {
                radius: 8.0.into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn hovered(&self, style: &Self::Style) -> button::Appearance {
        button::Appearance {
            text_color: SLATE_800,
            background: Some(Background::Color(SLATE_200)),
            ..self.active(style)
        }
    }
}

// --- Input Styles ---

/// Text input, red-bordered when `error` is set
pub struct InputStyle {
    pub error: bool,
}

impl text_input::StyleSheet for InputStyle {
    type Style = Theme;

    fn active(&self, _style: &Self::Style) -> text_input::Appearance {
        let edge = if self.error { RED_500 } else { SLATE_200 };
        text_input::Appearance {
            background: Background::Color(WHITE),
            border: Border {
                radius: 14.0.into(),
                width: 2.0,
                color: edge,
            },
            icon_color: SLATE_400,
        }
    }

    fn focused(&self, style: &Self::Style) -> text_input::Appearance {
        let active = self.active(style);
        if self.error {
            return active;
        }
        text_input::Appearance {
            border: Border {
                color: ROSE_400,
                ..active.border
            },
            ..active
        }
    }

    fn placeholder_color(&self, _style: &Self::Style) -> Color {
        SLATE_400
    }

    fn value_color(&self, _style: &Self::Style) -> Color {
        SLATE_800
    }

    fn selection_color(&self, _style: &Self::Style) -> Color {
        Color::from_rgba(0.882, 0.114, 0.282, 0.25)
    }

    fn disabled(&self, style: &Self::Style) -> text_input::Appearance {
        text_input::Appearance {
            background: Background::Color(SLATE_100),
            ..self.active(style)
        }
    }

    fn disabled_color(&self, _style: &Self::Style) -> Color {
        SLATE_400
    }
}

// --- Progress Bar Styles ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressBarStyle {
    Running,
    Completed,
    Failed,
}

impl progress_bar::StyleSheet for ProgressBarStyle {
    type Style = Theme;

    fn appearance(&self, _style: &Self::Style) -> progress_bar::Appearance {
        let bar = match self {
            ProgressBarStyle::Running => Background::Gradient(accent_gradient()),
            ProgressBarStyle::Completed => Background::Gradient(Gradient::Linear(
                iced::gradient::Linear::new(iced::Radians(0.0))
                    .add_stop(0.0, EMERALD_400)
                    .add_stop(1.0, EMERALD_500),
            )),
            ProgressBarStyle::Failed => Background::Color(RED_500),
        };
        progress_bar::Appearance {
            background: Background::Color(ROSE_100),
            bar,
            border_radius: 4.0.into(),
        }
    }
}
