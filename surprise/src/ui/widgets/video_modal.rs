//! Video modal overlay

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};

use surprise_core::VideoModal;

use crate::ui::theme::SurpriseTheme;

/// Widget for the video modal
pub struct VideoModalWidget<'a> {
    modal: &'a VideoModal,
    path: Option<&'a str>,
    player: Option<&'a str>,
    theme: &'a SurpriseTheme,
}

impl<'a> VideoModalWidget<'a> {
    pub fn new(modal: &'a VideoModal, theme: &'a SurpriseTheme) -> Self {
        Self {
            modal,
            path: None,
            player: None,
            theme,
        }
    }

    /// Local file the video was cached to
    pub fn path(mut self, path: Option<&'a str>) -> Self {
        self.path = path;
        self
    }

    /// External player the video was handed to
    pub fn player(mut self, player: Option<&'a str>) -> Self {
        self.player = player;
        self
    }
}

impl Widget for VideoModalWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);

        let block = Block::default()
            .title(" Video [x/Esc close] ")
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(true));

        let mut lines: Vec<Line> = Vec::new();

        if let Some(error) = &self.modal.error {
            lines.push(Line::from(Span::styled(error.as_str(), self.theme.error_style())));
        } else if self.modal.playing {
            lines.push(Line::from(Span::styled(
                "▶ Oynatılıyor",
                Style::default().add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(""));
            if let Some(path) = self.path {
                lines.push(Line::from(Span::styled(path, self.theme.status_style())));
            }
            match self.player {
                Some(player) => lines.push(Line::from(format!("{player} ile açıldı"))),
                None => lines.push(Line::from(Span::styled(
                    "Oynatıcı ayarlanmadı, dosyayı kendiniz açabilirsiniz.",
                    self.theme.status_style(),
                ))),
            }
        } else {
            lines.push(Line::from(Span::styled(
                "Video yükleniyor...",
                self.theme.loading_style(),
            )));
        }

        Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(area, buf);
    }
}
