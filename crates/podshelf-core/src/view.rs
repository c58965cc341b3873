//! ShowDetailView: state for one show page.
//!
//! # States
//! ```text
//!  Absent ──fetch ok──▶ Loaded(record)
//!    │    ──fetch err─▶ Error(message)
//!    ▲
//!    └──── mount(id) from any state (route change / re-navigation)
//! ```
//!
//! Every `mount` issues a new [`FetchTicket`].  A fetch result is applied only
//! if its ticket is still the active one and the view is still waiting, so a
//! slow response for an earlier navigation can never overwrite a newer show.
//!
//! Season, play and favorite actions are accepted only in `Loaded`.

use tracing::{debug, info, warn};

use crate::audio::{AudioBackend, AudioSession};
use crate::error::{CatalogError, StoreError};
use crate::favorites::FavoritesStore;
use crate::genres;
use crate::model::{Episode, ShowRecord};
use crate::storage::KeyValueStore;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum ShowState {
    #[default]
    Absent,
    Loaded(ShowRecord),
    Error(String),
}

/// Identifies the navigation a fetch was started for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    id: String,
    generation: u64,
}

impl FetchTicket {
    pub fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Default)]
pub struct ShowDetailView {
    active: Option<FetchTicket>,
    generation: u64,
    show: ShowState,
    selected_season: usize,
    favorites: Vec<Episode>,
}

impl ShowDetailView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter the page for show `id`: reset to `Absent`, reload favorites and
    /// hand back the ticket the caller must fetch for.
    pub fn mount<S: KeyValueStore>(&mut self, id: &str, store: &FavoritesStore<S>) -> FetchTicket {
        self.generation += 1;
        let ticket = FetchTicket {
            id: id.to_string(),
            generation: self.generation,
        };
        debug!("view: mount show {} (gen {})", id, self.generation);
        self.active = Some(ticket.clone());
        self.show = ShowState::Absent;
        self.selected_season = 0;
        self.favorites = store.load();
        ticket
    }

    /// Apply the outcome of the fetch identified by `ticket`.
    ///
    /// Returns false (and changes nothing) for stale or duplicate results.
    pub fn apply_fetch(
        &mut self,
        ticket: &FetchTicket,
        result: Result<ShowRecord, CatalogError>,
    ) -> bool {
        if !self.is_current(ticket) || self.show != ShowState::Absent {
            debug!(
                "view: discarding stale fetch for {} (gen {})",
                ticket.id, ticket.generation
            );
            return false;
        }
        match result {
            Ok(record) => {
                info!("view: loaded show {} ({} seasons)", record.id, record.seasons.len());
                self.show = ShowState::Loaded(record);
                self.selected_season = 0;
            }
            Err(e) => {
                warn!("view: fetch for show {} failed: {}", ticket.id, e);
                self.show = ShowState::Error(e.to_string());
            }
        }
        true
    }

    pub fn is_current(&self, ticket: &FetchTicket) -> bool {
        self.active.as_ref() == Some(ticket)
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active.as_ref().map(|t| t.id.as_str())
    }

    pub fn show_state(&self) -> &ShowState {
        &self.show
    }

    pub fn show(&self) -> Option<&ShowRecord> {
        match &self.show {
            ShowState::Loaded(record) => Some(record),
            _ => None,
        }
    }

    pub fn selected_season(&self) -> usize {
        self.selected_season
    }

    /// Select season `idx`.  Out-of-range input, or any input before the show
    /// has loaded, leaves the state untouched and returns false.
    pub fn select_season(&mut self, idx: usize) -> bool {
        let Some(show) = self.show() else {
            return false;
        };
        if idx >= show.seasons.len() {
            return false;
        }
        self.selected_season = idx;
        true
    }

    pub fn next_season(&mut self) -> bool {
        self.select_season(self.selected_season + 1)
    }

    pub fn prev_season(&mut self) -> bool {
        match self.selected_season.checked_sub(1) {
            Some(idx) => self.select_season(idx),
            None => false,
        }
    }

    /// Episodes of the selected season; empty until loaded.
    pub fn episodes(&self) -> &[Episode] {
        self.show()
            .and_then(|s| s.season(self.selected_season))
            .map(|s| s.episodes.as_slice())
            .unwrap_or(&[])
    }

    pub fn episode(&self, idx: usize) -> Option<&Episode> {
        self.episodes().get(idx)
    }

    /// Start `episode` on the shared audio session.  Returns whether audio
    /// started; false before the show has loaded.
    pub fn play<B: AudioBackend>(&self, audio: &mut AudioSession<B>, episode: &Episode) -> bool {
        if self.show().is_none() {
            return false;
        }
        audio.play(&episode.audio_url)
    }

    /// Append `episode` to favorites and persist the whole list.
    ///
    /// The in-memory list only changes once the write succeeded, so a failed
    /// save never leaves the episode looking favorited.  Returns `Ok(false)`
    /// before the show has loaded.
    pub fn favorite<S: KeyValueStore>(
        &mut self,
        store: &mut FavoritesStore<S>,
        episode: Episode,
    ) -> Result<bool, StoreError> {
        if self.show().is_none() {
            return Ok(false);
        }
        let mut updated = Vec::with_capacity(self.favorites.len() + 1);
        updated.extend_from_slice(&self.favorites);
        updated.push(episode);
        store.save(&updated)?;
        self.favorites = updated;
        Ok(true)
    }

    pub fn favorites(&self) -> &[Episode] {
        &self.favorites
    }

    pub fn is_favorite(&self, episode: &Episode) -> bool {
        self.favorites.contains(episode)
    }

    pub fn genre_names(&self) -> String {
        self.show()
            .map(|s| genres::genre_names(&s.genres))
            .unwrap_or_default()
    }
}
