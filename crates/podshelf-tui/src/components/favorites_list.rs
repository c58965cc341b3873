//! FavoritesList: every favorited episode, in the order it was added.

use ratatui::crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use podshelf_core::model::Episode;

use crate::action::Action;
use crate::app_state::AppState;
use crate::component::Component;
use crate::text::truncate;
use crate::theme::{style_default, style_focused_border, style_muted, style_playing, style_selected};
use crate::widgets::filter_input::{FilterAction, FilterInput};
use crate::widgets::scrollable_list::ScrollableList;

pub struct FavoritesList {
    list: ScrollableList<Episode>,
    filter: FilterInput,
}

fn title_matches(ep: &Episode, query: &str) -> bool {
    ep.title.to_lowercase().contains(&query.to_lowercase())
}

impl FavoritesList {
    pub fn new() -> Self {
        Self {
            list: ScrollableList::new(title_matches),
            filter: FilterInput::new("episode title…"),
        }
    }

    /// Refresh from the app's snapshot of persisted favorites.
    pub fn sync(&mut self, state: &AppState) {
        self.list.set_items(state.saved_favorites.clone());
    }
}

impl Default for FavoritesList {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for FavoritesList {
    fn handle_key(&mut self, key: KeyEvent, _state: &AppState) -> Vec<Action> {
        if self.filter.is_active() {
            if let FilterAction::Changed(q) = self.filter.handle_key(key) {
                self.list.set_filter(&q);
            }
            return Vec::new();
        }

        match key.code {
            KeyCode::Char('/') => self.filter.activate(),
            KeyCode::Up | KeyCode::Char('k') => self.list.select_up(1),
            KeyCode::Down | KeyCode::Char('j') => self.list.select_down(1),
            KeyCode::Home | KeyCode::Char('g') => self.list.select_first(),
            KeyCode::End | KeyCode::Char('G') => self.list.select_last(),
            KeyCode::Enter | KeyCode::Char('p') => {
                if let Some(ep) = self.list.selected_item() {
                    return vec![Action::PlayFavorite(ep.clone())];
                }
            }
            KeyCode::Esc | KeyCode::Backspace => return vec![Action::GoHome],
            _ => {}
        }
        Vec::new()
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, state: &AppState) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(style_focused_border())
            .title(format!(" Favorites ({}/{}) ", self.list.len(), self.list.total_len()));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [filter_area, inner] =
            Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).areas(inner);
        self.filter.draw(frame, filter_area);

        if self.list.is_empty() {
            let hint = if self.list.total_len() == 0 {
                "No favorites yet. Press a on an episode to add one."
            } else {
                "No favorites match."
            };
            frame.render_widget(Paragraph::new(Span::styled(hint, style_muted())), inner);
            return;
        }

        let height = inner.height as usize;
        self.list.ensure_visible(height);
        let title_w = (inner.width as usize).saturating_sub(4);
        let lines: Vec<Line> = self
            .list
            .visible_items(height)
            .map(|(selected, ep)| {
                let marker = if state.is_playing(ep) {
                    Span::styled("▶ ", style_playing())
                } else {
                    Span::raw("  ")
                };
                let line = Line::from(vec![marker, Span::styled(truncate(&ep.title, title_w), style_default())]);
                if selected {
                    line.style(style_selected())
                } else {
                    line
                }
            })
            .collect();
        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn captures_input(&self) -> bool {
        self.filter.is_active()
    }

    fn hints(&self, _state: &AppState) -> &'static str {
        "↑↓ move  enter play  / filter  s stop  esc back  q quit"
    }
}
