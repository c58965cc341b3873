//! Color palette and style constants.

use ratatui::style::{Color, Modifier, Style};

pub const C_ACCENT: Color = Color::Rgb(255, 95, 95);
pub const C_PLAYING: Color = Color::Rgb(80, 200, 120);
pub const C_LOADING: Color = Color::Rgb(255, 184, 80);
pub const C_ERROR: Color = Color::Rgb(255, 80, 80);
pub const C_MUTED: Color = Color::Rgb(72, 72, 88);
pub const C_SECONDARY: Color = Color::Rgb(115, 115, 138);
pub const C_PRIMARY: Color = Color::Rgb(210, 210, 225);
pub const C_SELECTION_BG: Color = Color::Rgb(28, 28, 40);
pub const C_PANEL_BORDER_FOCUSED: Color = Color::Rgb(120, 100, 200);
pub const C_FILTER_BG: Color = Color::Rgb(20, 20, 32);
pub const C_FILTER_FG: Color = Color::Rgb(255, 200, 80);
pub const C_GENRE: Color = Color::Rgb(80, 140, 200);
pub const C_FAVORITE: Color = Color::Rgb(255, 210, 50);
pub const C_TOAST_INFO: Color = Color::Rgb(80, 160, 220);
pub const C_TOAST_SUCCESS: Color = Color::Rgb(80, 200, 120);
pub const C_TOAST_ERROR: Color = Color::Rgb(255, 95, 95);

pub fn style_default() -> Style {
    Style::default().fg(C_PRIMARY)
}

pub fn style_secondary() -> Style {
    Style::default().fg(C_SECONDARY)
}

pub fn style_muted() -> Style {
    Style::default().fg(C_MUTED)
}

pub fn style_title() -> Style {
    Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD)
}

pub fn style_playing() -> Style {
    Style::default().fg(C_PLAYING)
}

pub fn style_selected() -> Style {
    Style::default()
        .bg(C_SELECTION_BG)
        .fg(C_PRIMARY)
        .add_modifier(Modifier::BOLD)
}

pub fn style_focused_border() -> Style {
    Style::default().fg(C_PANEL_BORDER_FOCUSED)
}
