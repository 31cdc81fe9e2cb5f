//! Color theme and styling for the surprise TUI

use ratatui::style::{Color, Modifier, Style};

/// Surprise UI color theme
#[derive(Debug, Clone)]
pub struct SurpriseTheme {
    // Base colors
    pub foreground: Color,
    pub border: Color,
    pub border_focused: Color,

    // Fake errors
    pub error: Color,
    pub loading: Color,

    // Choices
    pub cursor: Color,
    pub checked: Color,
    pub warning: Color,
    pub disabled: Color,

    // Story and letter
    pub story_text: Color,
    pub letter_text: Color,
    pub photo_card: Color,
    pub status_text: Color,
}

impl Default for SurpriseTheme {
    fn default() -> Self {
        Self {
            foreground: Color::White,
            border: Color::DarkGray,
            border_focused: Color::Magenta,

            error: Color::Red,
            loading: Color::Gray,

            cursor: Color::Magenta,
            checked: Color::LightGreen,
            warning: Color::Yellow,
            disabled: Color::DarkGray,

            story_text: Color::White,
            letter_text: Color::LightMagenta,
            photo_card: Color::LightYellow,
            status_text: Color::DarkGray,
        }
    }
}

impl SurpriseTheme {
    /// Get style for normal text
    pub fn text_style(&self) -> Style {
        Style::default().fg(self.foreground)
    }

    /// Get style for the fake error messages
    pub fn error_style(&self) -> Style {
        Style::default().fg(self.error).add_modifier(Modifier::BOLD)
    }

    pub fn loading_style(&self) -> Style {
        Style::default()
            .fg(self.loading)
            .add_modifier(Modifier::ITALIC)
    }

    /// Get style for a list entry
    pub fn entry_style(&self, selected: bool, enabled: bool) -> Style {
        if !enabled {
            Style::default()
                .fg(self.disabled)
                .add_modifier(Modifier::DIM)
        } else if selected {
            Style::default()
                .fg(self.cursor)
                .add_modifier(Modifier::BOLD | Modifier::REVERSED)
        } else {
            Style::default().fg(self.foreground)
        }
    }

    pub fn checked_style(&self) -> Style {
        Style::default().fg(self.checked)
    }

    /// Get style for the "pick exactly N" warning
    pub fn warning_style(&self) -> Style {
        Style::default()
            .fg(self.warning)
            .add_modifier(Modifier::ITALIC)
    }

    pub fn story_style(&self) -> Style {
        Style::default().fg(self.story_text)
    }

    pub fn letter_style(&self) -> Style {
        Style::default()
            .fg(self.letter_text)
            .add_modifier(Modifier::ITALIC)
    }

    pub fn photo_style(&self) -> Style {
        Style::default().fg(self.photo_card)
    }

    /// Get style for the status line
    pub fn status_style(&self) -> Style {
        Style::default()
            .fg(self.status_text)
            .add_modifier(Modifier::DIM)
    }

    /// Get border style
    pub fn border_style(&self, focused: bool) -> Style {
        Style::default().fg(if focused {
            self.border_focused
        } else {
            self.border
        })
    }

    /// Get title style
    pub fn title_style(&self) -> Style {
        Style::default()
            .fg(self.border_focused)
            .add_modifier(Modifier::BOLD)
    }
}
