//! Component trait: the interface every screen implements.
//!
//! - Components own their cursor/scroll state and render themselves.
//! - They read `AppState` for everything else and never mutate it.
//! - They produce `Vec<Action>`; the App applies those.

use ratatui::crossterm::event::KeyEvent;
use ratatui::{layout::Rect, Frame};

use crate::action::Action;
use crate::app_state::AppState;

pub trait Component {
    /// Handle a key while this component's screen is active.
    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action>;

    fn draw(&mut self, frame: &mut Frame, area: Rect, state: &AppState);

    /// True while the component is capturing text input, so global keys
    /// must not fire.
    fn captures_input(&self) -> bool {
        false
    }

    /// Key hints for the status bar.
    fn hints(&self, _state: &AppState) -> &'static str {
        ""
    }
}
