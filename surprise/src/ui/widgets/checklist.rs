//! Buttons, checkboxes and radio lists

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use crate::ui::theme::SurpriseTheme;

/// How an entry is marked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    Button,
    Checkbox(bool),
    Radio(bool),
}

/// A single selectable line
#[derive(Debug, Clone)]
pub struct ChecklistEntry {
    pub label: String,
    pub mark: Mark,
    pub enabled: bool,
}

impl ChecklistEntry {
    pub fn button(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            mark: Mark::Button,
            enabled: true,
        }
    }

    pub fn checkbox(label: impl Into<String>, checked: bool) -> Self {
        Self {
            label: label.into(),
            mark: Mark::Checkbox(checked),
            enabled: true,
        }
    }

    pub fn radio(label: impl Into<String>, selected: bool) -> Self {
        Self {
            label: label.into(),
            mark: Mark::Radio(selected),
            enabled: true,
        }
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// Widget for a scene made of a prompt and a list of entries
pub struct ChecklistWidget<'a> {
    entries: &'a [ChecklistEntry],
    title: &'a str,
    prompt: &'a str,
    cursor: usize,
    warning: Option<&'a str>,
    scroll: u16,
    theme: &'a SurpriseTheme,
}

impl<'a> ChecklistWidget<'a> {
    pub fn new(entries: &'a [ChecklistEntry], theme: &'a SurpriseTheme) -> Self {
        Self {
            entries,
            title: "",
            prompt: "",
            cursor: 0,
            warning: None,
            scroll: 0,
            theme,
        }
    }

    pub fn title(mut self, title: &'a str) -> Self {
        self.title = title;
        self
    }

    pub fn prompt(mut self, prompt: &'a str) -> Self {
        self.prompt = prompt;
        self
    }

    pub fn cursor(mut self, cursor: usize) -> Self {
        self.cursor = cursor;
        self
    }

    pub fn warning(mut self, warning: Option<&'a str>) -> Self {
        self.warning = warning;
        self
    }

    pub fn scroll(mut self, scroll: u16) -> Self {
        self.scroll = scroll;
        self
    }

    fn entry_line(&self, index: usize, entry: &'a ChecklistEntry) -> Line<'a> {
        let selected = index == self.cursor;
        let pointer = if selected { "> " } else { "  " };
        let mark = match entry.mark {
            Mark::Button => Span::raw(""),
            Mark::Checkbox(true) => Span::styled("[x] ", self.theme.checked_style()),
            Mark::Checkbox(false) => Span::raw("[ ] "),
            Mark::Radio(true) => Span::styled("(•) ", self.theme.checked_style()),
            Mark::Radio(false) => Span::raw("( ) "),
        };
        let label = match entry.mark {
            Mark::Button => format!("[ {} ]", entry.label),
            _ => entry.label.clone(),
        };

        Line::from(vec![
            Span::raw(pointer),
            mark,
            Span::styled(label, self.theme.entry_style(selected, entry.enabled)),
        ])
    }
}

impl Widget for ChecklistWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(Span::styled(format!(" {} ", self.title), self.theme.title_style()))
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(true));

        let inner = block.inner(area);
        block.render(area, buf);

        let [prompt_area, list_area, warning_area] = Layout::vertical([
            Constraint::Min(3),
            Constraint::Length(self.entries.len() as u16 + 1),
            Constraint::Length(1),
        ])
        .areas(inner);

        Paragraph::new(self.prompt)
            .style(self.theme.text_style())
            .wrap(Wrap { trim: true })
            .scroll((self.scroll, 0))
            .render(prompt_area, buf);

        let lines: Vec<Line> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| self.entry_line(i, entry))
            .collect();
        Paragraph::new(lines).render(list_area, buf);

        if let Some(warning) = self.warning {
            Paragraph::new(Span::styled(warning, self.theme.warning_style())).render(warning_area, buf);
        }
    }
}
