//! Story and letter display widget

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::Span,
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use crate::ui::theme::SurpriseTheme;

/// Widget for long scrollable text
pub struct StoryWidget<'a> {
    text: &'a str,
    title: &'a str,
    scroll: u16,
    style: Style,
    theme: &'a SurpriseTheme,
}

impl<'a> StoryWidget<'a> {
    pub fn new(text: &'a str, theme: &'a SurpriseTheme) -> Self {
        Self {
            text,
            title: "",
            scroll: 0,
            style: theme.story_style(),
            theme,
        }
    }

    pub fn title(mut self, title: &'a str) -> Self {
        self.title = title;
        self
    }

    pub fn scroll(mut self, scroll: u16) -> Self {
        self.scroll = scroll;
        self
    }

    /// Use the handwritten letter look
    pub fn letter(mut self) -> Self {
        self.style = self.theme.letter_style();
        self
    }
}

impl Widget for StoryWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let title = if self.title.is_empty() {
            String::new()
        } else {
            format!(" {} [j/k scroll] ", self.title)
        };
        let block = Block::default()
            .title(Span::styled(title, self.theme.title_style()))
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(true));

        Paragraph::new(self.text)
            .style(self.style)
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((self.scroll, 0))
            .render(area, buf);
    }
}
