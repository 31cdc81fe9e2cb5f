//! Falling photo cards

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    text::Span,
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::ui::theme::SurpriseTheme;

const CARD_WIDTH: u16 = 14;
const CARD_HEIGHT: u16 = 5;

/// A dropped photo at some point of its fall
#[derive(Debug, Clone)]
pub struct PhotoCard {
    pub label: String,
    /// Percent of the scene width
    pub left_percent: f32,
    /// 0.0 at the top, 1.0 once it has fallen out of view
    pub progress: f32,
}

/// Widget for the photo scene
pub struct PhotoRainWidget<'a> {
    cards: &'a [PhotoCard],
    error: Option<&'a str>,
    theme: &'a SurpriseTheme,
}

impl<'a> PhotoRainWidget<'a> {
    pub fn new(cards: &'a [PhotoCard], theme: &'a SurpriseTheme) -> Self {
        Self {
            cards,
            error: None,
            theme,
        }
    }

    pub fn error(mut self, error: Option<&'a str>) -> Self {
        self.error = error;
        self
    }
}

/// Where a card sits, clipped to `area`. `None` once it is out of view.
fn card_rect(card: &PhotoCard, area: Rect) -> Option<Rect> {
    let width = CARD_WIDTH.min(area.width);
    let height = CARD_HEIGHT.min(area.height);
    let span_x = f32::from(area.width.saturating_sub(width));
    let x = area.x + (span_x * card.left_percent.clamp(0.0, 100.0) / 100.0) as u16;

    // Cards enter from above the top edge and leave below the bottom edge.
    let travel = i32::from(area.height) + i32::from(height);
    let top = (travel as f32 * card.progress.clamp(0.0, 1.0)) as i32 - i32::from(height);
    let bottom = top + i32::from(height);
    let visible_top = top.max(0);
    let visible_bottom = bottom.min(i32::from(area.height));
    if visible_bottom <= visible_top {
        return None;
    }

    Some(Rect {
        x,
        y: area.y + visible_top as u16,
        width,
        height: (visible_bottom - visible_top) as u16,
    })
}

impl Widget for PhotoRainWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for card in self.cards {
            let Some(rect) = card_rect(card, area) else {
                continue;
            };
            let block = Block::default()
                .borders(Borders::ALL)
                .border_style(self.theme.photo_style());
            let inner = block.inner(rect);
            block.render(rect, buf);
            Paragraph::new(Span::styled(card.label.as_str(), self.theme.photo_style()))
                .alignment(Alignment::Center)
                .render(inner, buf);
        }

        if let Some(error) = self.error {
            let y = area.y + area.height / 2;
            let line = Rect {
                x: area.x,
                y,
                width: area.width,
                height: area.height.min(1),
            };
            Paragraph::new(Span::styled(error, self.theme.error_style()))
                .alignment(Alignment::Center)
                .render(line, buf);
        }
    }
}
