//! Light and dark palettes and per-source colours.

use crate::notifications::NotificationLevel;
use ratatui::style::Color;
use staffsync_core::Source;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    pub bg: Color,
    pub bg_secondary: Color,
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

impl Palette {
    pub fn light() -> Self {
        Self {
            bg: Color::Rgb(248, 250, 252),
            bg_secondary: Color::Rgb(241, 245, 249),
            bg_highlight: Color::Rgb(226, 232, 240),
            primary: Color::Rgb(79, 70, 229),
            secondary: Color::Rgb(14, 165, 233),
            success: Color::Rgb(22, 163, 74),
            warning: Color::Rgb(217, 119, 6),
            error: Color::Rgb(220, 38, 38),
            info: Color::Rgb(37, 99, 235),
            text: Color::Rgb(15, 23, 42),
            text_dim: Color::Rgb(100, 116, 139),
            border: Color::Rgb(203, 213, 225),
            border_focus: Color::Rgb(79, 70, 229),
        }
    }

    pub fn dark() -> Self {
        Self {
            bg: Color::Rgb(15, 23, 42),
            bg_secondary: Color::Rgb(30, 41, 59),
            bg_highlight: Color::Rgb(51, 65, 85),
            primary: Color::Rgb(129, 140, 248),
            secondary: Color::Rgb(56, 189, 248),
            success: Color::Rgb(74, 222, 128),
            warning: Color::Rgb(251, 191, 36),
            error: Color::Rgb(248, 113, 113),
            info: Color::Rgb(96, 165, 250),
            text: Color::Rgb(241, 245, 249),
            text_dim: Color::Rgb(148, 163, 184),
            border: Color::Rgb(71, 85, 105),
            border_focus: Color::Rgb(129, 140, 248),
        }
    }

    pub fn for_mode(dark_mode: bool) -> Self {
        if dark_mode {
            Self::dark()
        } else {
            Self::light()
        }
    }

    pub fn level_color(&self, level: NotificationLevel) -> Color {
        match level {
            NotificationLevel::Info => self.info,
            NotificationLevel::Warning => self.warning,
            NotificationLevel::Error => self.error,
            NotificationLevel::Success => self.success,
        }
    }
}

/// Fixed brand colour of a source, identical in both palettes.
pub fn source_color(source: Option<Source>) -> Color {
    match source {
        Some(Source::Csv) => Color::Rgb(0x10, 0xb9, 0x81),
        Some(Source::Mysql) => Color::Rgb(0x3b, 0x82, 0xf6),
        Some(Source::Postgresql) => Color::Rgb(0xf5, 0x9e, 0x0b),
        None => Color::Rgb(0x6b, 0x72, 0x80),
    }
}
