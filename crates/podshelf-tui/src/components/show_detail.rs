//! ShowDetail: one show: metadata, season selector, episode list.

use ratatui::crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs, Wrap},
    Frame,
};

use podshelf_core::model::ShowRecord;
use podshelf_core::view::ShowState;

use crate::action::Action;
use crate::app_state::AppState;
use crate::component::Component;
use crate::text::truncate;
use crate::theme::{
    style_default, style_focused_border, style_muted, style_playing, style_secondary,
    style_selected, style_title, C_ERROR, C_FAVORITE, C_GENRE, C_LOADING,
};

pub struct ShowDetail {
    cursor: usize,
    scroll: usize,
    /// (show id, season) the cursor belongs to; a change resets the cursor.
    anchor: Option<(String, usize)>,
}

impl ShowDetail {
    pub fn new() -> Self {
        Self {
            cursor: 0,
            scroll: 0,
            anchor: None,
        }
    }

    fn sync(&mut self, state: &AppState) {
        let anchor = state
            .view
            .show()
            .map(|s| (s.id.clone(), state.view.selected_season()));
        if anchor != self.anchor {
            self.anchor = anchor;
            self.cursor = 0;
            self.scroll = 0;
        }
        let len = state.view.episodes().len();
        self.cursor = self.cursor.min(len.saturating_sub(1));
    }

    fn draw_header(&self, frame: &mut Frame, area: Rect, show: &ShowRecord, state: &AppState) {
        let mut meta = vec![Span::styled(
            state.view.genre_names(),
            Style::default().fg(C_GENRE),
        )];
        if let Some(updated) = show.updated_display() {
            meta.push(Span::styled(format!("  updated {updated}"), style_muted()));
        }
        let lines = vec![
            Line::from(Span::styled(show.title.clone(), style_title())),
            Line::from(meta),
            Line::from(Span::styled(show.description.clone(), style_secondary())),
        ];
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), area);
    }

    fn draw_episodes(&mut self, frame: &mut Frame, area: Rect, state: &AppState) {
        let episodes = state.view.episodes();
        if episodes.is_empty() {
            frame.render_widget(
                Paragraph::new(Span::styled("No episodes in this season.", style_muted())),
                area,
            );
            return;
        }

        let height = area.height as usize;
        if height == 0 {
            return;
        }
        if self.cursor < self.scroll {
            self.scroll = self.cursor;
        } else if self.cursor >= self.scroll + height {
            self.scroll = self.cursor + 1 - height;
        }

        let title_w = (area.width as usize).saturating_sub(10);
        let lines: Vec<Line> = episodes
            .iter()
            .enumerate()
            .skip(self.scroll)
            .take(height)
            .map(|(i, ep)| {
                let marker = if state.is_playing(ep) {
                    Span::styled("▶ ", style_playing())
                } else {
                    Span::raw("  ")
                };
                let star = if state.view.is_favorite(ep) {
                    Span::styled(" ★", Style::default().fg(C_FAVORITE))
                } else {
                    Span::raw("")
                };
                let line = Line::from(vec![
                    marker,
                    Span::styled(format!("{:>3}. ", i + 1), style_muted()),
                    Span::styled(truncate(&ep.title, title_w), style_default()),
                    star,
                ]);
                if i == self.cursor {
                    line.style(style_selected())
                } else {
                    line
                }
            })
            .collect();
        frame.render_widget(Paragraph::new(lines), area);
    }
}

impl Default for ShowDetail {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for ShowDetail {
    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        self.sync(state);

        if matches!(key.code, KeyCode::Esc | KeyCode::Backspace) {
            return vec![Action::GoHome];
        }

        match state.view.show_state() {
            ShowState::Absent => Vec::new(),
            ShowState::Error(_) => match key.code {
                KeyCode::Char('r') => vec![Action::ReloadShow],
                _ => Vec::new(),
            },
            ShowState::Loaded(_) => {
                let selected = state.view.episode(self.cursor).cloned();
                match key.code {
                    KeyCode::Left | KeyCode::Char('[') => vec![Action::PrevSeason],
                    KeyCode::Right | KeyCode::Char(']') => vec![Action::NextSeason],
                    KeyCode::Char(c @ '1'..='9') => {
                        vec![Action::SelectSeason(c as usize - '1' as usize)]
                    }
                    KeyCode::Up | KeyCode::Char('k') => {
                        self.cursor = self.cursor.saturating_sub(1);
                        Vec::new()
                    }
                    KeyCode::Down | KeyCode::Char('j') => {
                        let last = state.view.episodes().len().saturating_sub(1);
                        self.cursor = (self.cursor + 1).min(last);
                        Vec::new()
                    }
                    KeyCode::Enter | KeyCode::Char('p') => {
                        selected.map(Action::PlayEpisode).into_iter().collect()
                    }
                    KeyCode::Char('a') => selected.map(Action::AddFavorite).into_iter().collect(),
                    _ => Vec::new(),
                }
            }
        }
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, state: &AppState) {
        self.sync(state);

        let title = match state.view.active_id() {
            Some(id) => format!(" Show {id} "),
            None => " Show ".to_string(),
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(style_focused_border())
            .title(title);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        match state.view.show_state() {
            ShowState::Absent => {
                frame.render_widget(
                    Paragraph::new(Span::styled("Loading…", Style::default().fg(C_LOADING))),
                    inner,
                );
            }
            ShowState::Error(msg) => {
                frame.render_widget(
                    Paragraph::new(vec![
                        Line::from(Span::styled(
                            format!("Could not load this show: {msg}"),
                            Style::default().fg(C_ERROR),
                        )),
                        Line::from(Span::styled("r retry  esc back", style_muted())),
                    ])
                    .wrap(Wrap { trim: true }),
                    inner,
                );
            }
            ShowState::Loaded(show) => {
                let [header, tabs, list] = Layout::vertical([
                    Constraint::Length(6),
                    Constraint::Length(2),
                    Constraint::Min(0),
                ])
                .areas(inner);
                self.draw_header(frame, header, show, state);

                let labels: Vec<String> = show
                    .seasons
                    .iter()
                    .enumerate()
                    .map(|(i, s)| s.label(i))
                    .collect();
                frame.render_widget(
                    Tabs::new(labels)
                        .select(state.view.selected_season())
                        .style(style_secondary())
                        .highlight_style(style_selected())
                        .block(Block::default().borders(Borders::BOTTOM).border_style(style_muted())),
                    tabs,
                );

                self.draw_episodes(frame, list, state);
            }
        }
    }

    fn hints(&self, state: &AppState) -> &'static str {
        match state.view.show_state() {
            ShowState::Absent => "esc back  q quit",
            ShowState::Error(_) => "r retry  esc back  q quit",
            ShowState::Loaded(_) => "←→ season  ↑↓ episode  enter play  a favorite  s stop  esc back",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use podshelf_core::error::CatalogError;
    use podshelf_core::favorites::FavoritesStore;
    use podshelf_core::model::{Episode, Season};
    use podshelf_core::storage::MemoryKvStore;
    use ratatui::{backend::TestBackend, Terminal};

    use crate::theme::C_SELECTION_BG;

    fn loaded_state() -> AppState {
        let mut state = AppState::new();
        let store = FavoritesStore::new(MemoryKvStore::new());
        let ticket = state.view.mount("7", &store);
        let show = ShowRecord {
            id: "7".to_string(),
            title: "Seven".to_string(),
            genres: vec![3],
            seasons: vec![
                Season::new(vec![Episode::new("Pilot", "a.mp3"), Episode::new("Second", "a2.mp3")]),
                Season::new(vec![Episode::new("Finale", "b.mp3")]),
            ],
            ..Default::default()
        };
        assert!(state.view.apply_fetch(&ticket, Ok(show)));
        state
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::from(code)
    }

    fn render(detail: &mut ShowDetail, state: &AppState) -> Terminal<TestBackend> {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal
            .draw(|f| detail.draw(f, f.area(), state))
            .unwrap();
        terminal
    }

    fn rows(terminal: &Terminal<TestBackend>) -> Vec<String> {
        let buf = terminal.backend().buffer();
        (0..buf.area.height)
            .map(|y| (0..buf.area.width).map(|x| buf[(x, y)].symbol()).collect::<String>())
            .collect()
    }

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        rows(terminal).join("\n")
    }

    #[test]
    fn test_draw_absent_shows_loading() {
        let mut state = AppState::new();
        let store = FavoritesStore::new(MemoryKvStore::new());
        state.view.mount("7", &store);
        let text = screen_text(&render(&mut ShowDetail::new(), &state));
        assert!(text.contains("Loading…"));
        assert!(!text.contains("Season 1"));
    }

    #[test]
    fn test_draw_error_shows_failure() {
        let mut state = AppState::new();
        let store = FavoritesStore::new(MemoryKvStore::new());
        let ticket = state.view.mount("7", &store);
        assert!(state
            .view
            .apply_fetch(&ticket, Err(CatalogError::NotFound("7".to_string()))));
        let text = screen_text(&render(&mut ShowDetail::new(), &state));
        assert!(text.contains("Could not load this show"));
        assert!(!text.contains("Loading…"));
    }

    #[test]
    fn test_draw_loaded_shows_selected_season_only() {
        let mut state = loaded_state();
        let mut detail = ShowDetail::new();

        let text = screen_text(&render(&mut detail, &state));
        assert!(text.contains("Seven"));
        assert!(text.contains("History"));
        assert!(text.contains("Pilot"));
        assert!(!text.contains("Finale"));

        assert!(state.view.select_season(1));
        let terminal = render(&mut detail, &state);
        let text = screen_text(&terminal);
        assert!(text.contains("Finale"));
        assert!(!text.contains("Pilot"));

        let (y, row) = rows(&terminal)
            .into_iter()
            .enumerate()
            .find(|(_, row)| row.contains("Season 2"))
            .expect("season selector row");
        // Column of a label, counted in cells rather than bytes.
        let column = |label: &str| row[..row.find(label).unwrap()].chars().count() as u16;
        let buf = terminal.backend().buffer();
        assert_eq!(buf[(column("Season 2"), y as u16)].bg, C_SELECTION_BG);
        assert_ne!(buf[(column("Season 1"), y as u16)].bg, C_SELECTION_BG);
    }

    #[test]
    fn test_loading_accepts_only_back() {
        let mut state = AppState::new();
        let store = FavoritesStore::new(MemoryKvStore::new());
        state.view.mount("7", &store);
        let mut detail = ShowDetail::new();
        assert!(detail.handle_key(key(KeyCode::Enter), &state).is_empty());
        assert!(detail.handle_key(key(KeyCode::Char('a')), &state).is_empty());
        assert_eq!(detail.handle_key(key(KeyCode::Esc), &state), vec![Action::GoHome]);
    }

    #[test]
    fn test_cursor_selects_episode_for_play_and_favorite() {
        let state = loaded_state();
        let mut detail = ShowDetail::new();
        detail.handle_key(key(KeyCode::Down), &state);
        detail.handle_key(key(KeyCode::Down), &state);
        assert_eq!(
            detail.handle_key(key(KeyCode::Enter), &state),
            vec![Action::PlayEpisode(Episode::new("Second", "a2.mp3"))]
        );
        assert_eq!(
            detail.handle_key(key(KeyCode::Char('a')), &state),
            vec![Action::AddFavorite(Episode::new("Second", "a2.mp3"))]
        );
    }

    #[test]
    fn test_cursor_resets_on_season_change() {
        let mut state = loaded_state();
        let mut detail = ShowDetail::new();
        detail.handle_key(key(KeyCode::Down), &state);
        assert_eq!(
            detail.handle_key(key(KeyCode::Char('2')), &state),
            vec![Action::SelectSeason(1)]
        );
        assert!(state.view.select_season(1));
        assert_eq!(
            detail.handle_key(key(KeyCode::Enter), &state),
            vec![Action::PlayEpisode(Episode::new("Finale", "b.mp3"))]
        );
    }
}
