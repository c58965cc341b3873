//! Toast notifications: transient one-line messages in the top-right corner.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, Paragraph},
    Frame,
};

use crate::theme::{C_TOAST_ERROR, C_TOAST_INFO, C_TOAST_SUCCESS};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Severity {
    Info,
    Success,
    Error,
}

impl Severity {
    fn icon(self) -> &'static str {
        match self {
            Severity::Info => "·",
            Severity::Success => "✓",
            Severity::Error => "✗",
        }
    }
}

struct Toast {
    message: String,
    severity: Severity,
    expires: Instant,
}

pub struct ToastManager {
    toasts: VecDeque<Toast>,
    max_visible: usize,
}

impl ToastManager {
    pub fn new() -> Self {
        Self {
            toasts: VecDeque::new(),
            max_visible: 3,
        }
    }

    pub fn push(&mut self, message: impl Into<String>, severity: Severity, ttl: Duration) {
        let message = message.into();
        self.toasts.retain(|t| t.message != message);
        self.toasts.push_back(Toast {
            message,
            severity,
            expires: Instant::now() + ttl,
        });
        while self.toasts.len() > self.max_visible {
            self.toasts.pop_front();
        }
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(message, Severity::Info, Duration::from_secs(3));
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(message, Severity::Success, Duration::from_secs(3));
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(message, Severity::Error, Duration::from_secs(6));
    }

    /// Drop expired toasts.  Returns true if anything was removed.
    pub fn tick(&mut self) -> bool {
        let before = self.toasts.len();
        let now = Instant::now();
        self.toasts.retain(|t| t.expires > now);
        self.toasts.len() != before
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }

    pub fn draw(&self, frame: &mut Frame, area: Rect) {
        let max_width = (area.width / 2).clamp(30, 70);
        let mut y = area.y + 1;

        for toast in self.toasts.iter().rev() {
            if y >= area.y + area.height {
                break;
            }
            let color = match toast.severity {
                Severity::Info => C_TOAST_INFO,
                Severity::Success => C_TOAST_SUCCESS,
                Severity::Error => C_TOAST_ERROR,
            };
            let text = format!(" {} {} ", toast.severity.icon(), toast.message);
            let w = (text.chars().count() as u16).min(max_width).min(area.width);
            let toast_area = Rect {
                x: area.x + area.width.saturating_sub(w + 1),
                y,
                width: w,
                height: 1,
            };
            frame.render_widget(Clear, toast_area);
            frame.render_widget(
                Paragraph::new(Line::from(Span::styled(
                    text,
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ))),
                toast_area,
            );
            y += 1;
        }
    }
}

impl Default for ToastManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicates_collapse_and_queue_is_capped() {
        let mut toasts = ToastManager::new();
        toasts.info("a");
        toasts.info("a");
        assert_eq!(toasts.toasts.len(), 1);
        for i in 0..10 {
            toasts.error(format!("e{i}"));
        }
        assert_eq!(toasts.toasts.len(), 3);
        assert_eq!(toasts.toasts.back().unwrap().message, "e9");
    }

    #[test]
    fn test_expired_toasts_are_dropped() {
        let mut toasts = ToastManager::new();
        toasts.push("gone", Severity::Info, Duration::ZERO);
        std::thread::sleep(Duration::from_millis(2));
        assert!(toasts.tick());
        assert!(toasts.is_empty());
    }
}
