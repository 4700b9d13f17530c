use ratatui::style::{Color, Modifier, Style};

use crate::model::queue::FilePhase;

/// Theme names accepted by `--theme` and the settings screen.
pub const THEME_NAMES: [&str; 2] = ["hacker", "modern"];

/// Color theme for the TUI.
pub struct Theme {
    pub done: Color,
    pub failed: Color,
    pub fallback: Color,

    pub header_fg: Color,
    pub header_bg: Color,
    pub border: Color,
    pub text: Color,
    pub dim: Color,
    pub highlight_bg: Color,
    pub active: Color,
    pub queued: Color,
    pub footer_fg: Color,
    pub footer_bg: Color,
}

impl Theme {
    /// Theme by name; anything unknown gets the hacker theme.
    pub fn named(name: &str) -> Self {
        match name {
            "modern" => Self::modern(),
            _ => Self::hacker(),
        }
    }

    /// Hacker-green terminal theme.
    pub fn hacker() -> Self {
        Self {
            done: Color::Rgb(0, 210, 0),
            failed: Color::Red,
            fallback: Color::Yellow,

            header_fg: Color::Black,
            header_bg: Color::Rgb(0, 210, 0),
            border: Color::DarkGray,
            text: Color::White,
            dim: Color::DarkGray,
            highlight_bg: Color::Rgb(30, 50, 30),
            active: Color::Cyan,
            queued: Color::DarkGray,
            footer_fg: Color::DarkGray,
            footer_bg: Color::Reset,
        }
    }

    /// Modern theme: white text, electric blue accents, dark blue header.
    pub fn modern() -> Self {
        Self {
            done: Color::Rgb(0, 200, 80),
            failed: Color::Rgb(255, 80, 80),
            fallback: Color::Rgb(255, 200, 0),

            header_fg: Color::White,
            header_bg: Color::Rgb(30, 60, 120),
            border: Color::Rgb(60, 60, 80),
            text: Color::White,
            dim: Color::Rgb(120, 120, 140),
            highlight_bg: Color::Rgb(30, 40, 80),
            active: Color::Rgb(60, 140, 255),
            queued: Color::Rgb(80, 80, 100),
            footer_fg: Color::Rgb(120, 120, 140),
            footer_bg: Color::Reset,
        }
    }

    pub fn phase_color(&self, phase: &FilePhase) -> Color {
        match phase {
            FilePhase::Queued => self.queued,
            FilePhase::Converting => self.active,
            FilePhase::Done => self.done,
            FilePhase::Failed => self.failed,
        }
    }

    pub fn header_style(&self) -> Style {
        Style::default()
            .fg(self.header_fg)
            .bg(self.header_bg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn highlight_style(&self) -> Style {
        Style::default()
            .bg(self.highlight_bg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn border_style(&self) -> Style {
        Style::default().fg(self.border)
    }

    pub fn footer_style(&self) -> Style {
        Style::default().fg(self.footer_fg).bg(self.footer_bg)
    }
}
