//! AppState: data shared read-only with components during key handling and
//! rendering.  Only the App event loop writes to it.

use podshelf_core::model::Episode;
use podshelf_core::view::ShowDetailView;

use crate::action::Screen;

#[derive(Debug, Clone, PartialEq)]
pub enum PreviewsState {
    Loading,
    Loaded,
    Failed(String),
}

pub struct AppState {
    pub screen: Screen,
    pub previews: PreviewsState,
    /// State of the show page; lives across navigations so tickets stay
    /// monotonic.
    pub view: ShowDetailView,
    /// Snapshot of persisted favorites for the favorites screen, reloaded on
    /// every visit.
    pub saved_favorites: Vec<Episode>,
    /// Episode in the audio slot, kept in step with `AudioSession`.
    pub now_playing: Option<Episode>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            screen: Screen::Home,
            previews: PreviewsState::Loading,
            view: ShowDetailView::new(),
            saved_favorites: Vec::new(),
            now_playing: None,
        }
    }

    pub fn is_playing(&self, episode: &Episode) -> bool {
        self.now_playing
            .as_ref()
            .is_some_and(|now| now.audio_url == episode.audio_url)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
