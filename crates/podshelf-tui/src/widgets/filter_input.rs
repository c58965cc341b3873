//! FilterInput: a one-line `/` filter bar on top of tui-input.

use ratatui::crossterm::event::{Event, KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use tui_input::{backend::crossterm::EventHandler, Input};

use crate::theme::{C_FILTER_BG, C_FILTER_FG, C_MUTED};

pub enum FilterAction {
    Changed(String),
    Closed,
}

pub struct FilterInput {
    input: Input,
    active: bool,
    placeholder: &'static str,
}

impl FilterInput {
    pub fn new(placeholder: &'static str) -> Self {
        Self {
            input: Input::default(),
            active: false,
            placeholder,
        }
    }

    pub fn activate(&mut self) {
        self.active = true;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Esc clears a non-empty query first and closes the bar on the second
    /// press; Enter keeps the query and closes the bar.
    pub fn handle_key(&mut self, key: KeyEvent) -> FilterAction {
        match key.code {
            KeyCode::Esc if !self.input.value().is_empty() => {
                self.input.reset();
                FilterAction::Changed(String::new())
            }
            KeyCode::Esc | KeyCode::Enter => {
                self.active = false;
                FilterAction::Closed
            }
            _ => {
                self.input.handle_event(&Event::Key(key));
                FilterAction::Changed(self.input.value().to_string())
            }
        }
    }

    pub fn draw(&self, frame: &mut Frame, area: Rect) {
        let scroll = self.input.visual_scroll(area.width.saturating_sub(4) as usize);
        let value = self.input.value();
        let span = if value.is_empty() {
            Span::styled(format!("/ {}", self.placeholder), Style::default().fg(C_MUTED))
        } else {
            let visible: String = value.chars().skip(scroll).collect();
            Span::styled(format!("/ {}", visible), Style::default().fg(C_FILTER_FG))
        };
        frame.render_widget(
            Paragraph::new(Line::from(span)).style(Style::default().bg(C_FILTER_BG)),
            area,
        );

        if self.active && area.width > 0 {
            let cursor_x = area.x + 2 + self.input.visual_cursor().saturating_sub(scroll) as u16;
            frame.set_cursor_position((cursor_x.min(area.x + area.width - 1), area.y));
        }
    }
}
