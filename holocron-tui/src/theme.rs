//! Colour palette and status colours.

use holocron_client::NotificationLevel;
use ratatui::style::Color;

#[derive(Debug, Clone)]
pub struct Theme {
    pub bg: Color,
    pub bg_highlight: Color,
    pub primary: Color,
    pub secondary: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub info: Color,
    pub text: Color,
    pub text_dim: Color,
    pub border: Color,
    pub border_focus: Color,
}

impl Theme {
    pub fn holocron() -> Self {
        Self {
            bg: Color::Rgb(10, 10, 14),
            bg_highlight: Color::Rgb(38, 38, 48),
            primary: Color::Rgb(0, 200, 255),
            secondary: Color::Rgb(255, 200, 0),
            success: Color::Rgb(0, 230, 118),
            warning: Color::Rgb(255, 200, 0),
            error: Color::Rgb(255, 64, 64),
            info: Color::Rgb(0, 200, 255),
            text: Color::Rgb(235, 235, 235),
            text_dim: Color::Rgb(130, 130, 140),
            border: Color::Rgb(68, 68, 80),
            border_focus: Color::Rgb(0, 200, 255),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::holocron()
    }
}

pub fn notification_color(level: NotificationLevel, theme: &Theme) -> Color {
    match level {
        NotificationLevel::Info => theme.info,
        NotificationLevel::Warning => theme.warning,
        NotificationLevel::Error => theme.error,
        NotificationLevel::Success => theme.success,
    }
}

pub fn notification_label(level: NotificationLevel) -> &'static str {
    match level {
        NotificationLevel::Info => "INFO",
        NotificationLevel::Warning => "WARN",
        NotificationLevel::Error => "ERROR",
        NotificationLevel::Success => "OK",
    }
}
