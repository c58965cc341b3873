//! ShowList: the home screen: every show in the catalog, filterable.

use ratatui::crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use podshelf_core::genres::genre_names;
use podshelf_core::model::ShowPreview;

use crate::action::Action;
use crate::app_state::{AppState, PreviewsState};
use crate::component::Component;
use crate::text::truncate;
use crate::theme::{
    style_default, style_focused_border, style_muted, style_secondary, style_selected, C_ERROR,
    C_GENRE, C_LOADING,
};
use crate::widgets::filter_input::{FilterAction, FilterInput};
use crate::widgets::scrollable_list::ScrollableList;

pub struct ShowList {
    list: ScrollableList<ShowPreview>,
    filter: FilterInput,
}

fn preview_matches(show: &ShowPreview, query: &str) -> bool {
    let query = query.to_lowercase();
    let haystack = format!("{} {}", show.title, genre_names(&show.genres)).to_lowercase();
    query.split_whitespace().all(|word| haystack.contains(word))
}

impl ShowList {
    pub fn new() -> Self {
        Self {
            list: ScrollableList::new(preview_matches),
            filter: FilterInput::new("title or genre…"),
        }
    }

    pub fn set_previews(&mut self, mut previews: Vec<ShowPreview>) {
        previews.sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase()));
        self.list.set_items(previews);
    }

    fn row(show: &ShowPreview, width: usize) -> Line<'static> {
        let seasons = match show.seasons {
            1 => "1 season".to_string(),
            n => format!("{n} seasons"),
        };
        let updated = show.updated_display().unwrap_or_default();
        let title_w = width.saturating_sub(44).max(12);
        Line::from(vec![
            Span::styled(format!("{:<w$}", truncate(&show.title, title_w), w = title_w), style_default()),
            Span::styled(format!(" {:>10} ", seasons), style_secondary()),
            Span::styled(
                format!("{:<18}", truncate(&genre_names(&show.genres), 18)),
                Style::default().fg(C_GENRE),
            ),
            Span::styled(format!(" {updated}"), style_muted()),
        ])
    }
}

impl Default for ShowList {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for ShowList {
    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
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
            KeyCode::PageUp => self.list.select_up(10),
            KeyCode::PageDown => self.list.select_down(10),
            KeyCode::Home | KeyCode::Char('g') => self.list.select_first(),
            KeyCode::End | KeyCode::Char('G') => self.list.select_last(),
            KeyCode::Enter => {
                if let Some(show) = self.list.selected_item() {
                    return vec![Action::OpenShow(show.id.clone())];
                }
            }
            KeyCode::Char('r') if matches!(state.previews, PreviewsState::Failed(_)) => {
                return vec![Action::RetryPreviews];
            }
            _ => {}
        }
        Vec::new()
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, state: &AppState) {
        let title = format!(" Shows ({}/{}) ", self.list.len(), self.list.total_len());
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(style_focused_border())
            .title(title);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [filter_area, list_area] =
            Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).areas(inner);
        self.filter.draw(frame, filter_area);

        match &state.previews {
            PreviewsState::Loading => {
                frame.render_widget(
                    Paragraph::new(Span::styled("Loading shows…", Style::default().fg(C_LOADING))),
                    list_area,
                );
            }
            PreviewsState::Failed(msg) => {
                frame.render_widget(
                    Paragraph::new(vec![
                        Line::from(Span::styled(
                            format!("Could not load shows: {msg}"),
                            Style::default().fg(C_ERROR),
                        )),
                        Line::from(Span::styled("press r to retry", style_muted())),
                    ]),
                    list_area,
                );
            }
            PreviewsState::Loaded if self.list.is_empty() => {
                frame.render_widget(Paragraph::new(Span::styled("No shows match.", style_muted())), list_area);
            }
            PreviewsState::Loaded => {
                let height = list_area.height as usize;
                self.list.ensure_visible(height);
                let width = list_area.width as usize;
                let lines: Vec<Line> = self
                    .list
                    .visible_items(height)
                    .map(|(selected, show)| {
                        let line = Self::row(show, width);
                        if selected {
                            line.style(style_selected())
                        } else {
                            line
                        }
                    })
                    .collect();
                frame.render_widget(Paragraph::new(lines), list_area);
            }
        }
    }

    fn captures_input(&self) -> bool {
        self.filter.is_active()
    }

    fn hints(&self, state: &AppState) -> &'static str {
        match state.previews {
            PreviewsState::Failed(_) => "r retry  f favorites  q quit",
            _ => "↑↓ move  enter open  / filter  f favorites  s stop  q quit",
        }
    }
}
