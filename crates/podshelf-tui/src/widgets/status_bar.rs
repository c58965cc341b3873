//! Status bar: bottom line with the screen, the now-playing slot, and key hints.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use podshelf_core::model::Episode;

use crate::action::Screen;
use crate::text::truncate;
use crate::theme::{C_ACCENT, C_MUTED, C_PLAYING, C_PRIMARY, C_SECONDARY};

fn screen_label(screen: Screen) -> &'static str {
    match screen {
        Screen::Home => "SHOWS",
        Screen::Show => "SHOW",
        Screen::Favorites => "FAVORITES",
    }
}

/// Top line: what is playing right now.
pub fn draw_now_playing(frame: &mut Frame, area: Rect, now_playing: Option<&Episode>) {
    let width = area.width as usize;
    let line = match now_playing {
        Some(ep) => Line::from(vec![
            Span::styled(" ● ", Style::default().fg(C_PLAYING).add_modifier(Modifier::BOLD)),
            Span::styled(
                truncate(&ep.title, width.saturating_sub(12)),
                Style::default().fg(C_PRIMARY),
            ),
            Span::styled("  s stop", Style::default().fg(C_MUTED)),
        ]),
        None => Line::from(vec![
            Span::styled(" ○ ", Style::default().fg(C_ACCENT)),
            Span::styled("nothing playing", Style::default().fg(C_SECONDARY)),
        ]),
    };
    frame.render_widget(Paragraph::new(line), area);
}

/// Bottom line: screen label followed by the active component's hints.
pub fn draw_keys_bar(frame: &mut Frame, area: Rect, screen: Screen, hints: &str) {
    let [left, right] =
        Layout::horizontal([Constraint::Length(12), Constraint::Min(0)]).areas(area);
    frame.render_widget(
        Paragraph::new(Span::styled(
            format!(" {} ", screen_label(screen)),
            Style::default().fg(C_PLAYING).add_modifier(Modifier::BOLD),
        )),
        left,
    );
    frame.render_widget(
        Paragraph::new(Span::styled(
            truncate(hints, right.width as usize),
            Style::default().fg(C_MUTED),
        )),
        right,
    );
}
