//! Action enum: everything a component can ask the App to do.

use podshelf_core::model::Episode;

/// Top-level screens (the routed pages of the app).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Home,
    Show,
    Favorites,
}

/// Components produce Actions; the App applies them.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    OpenShow(String),
    /// Re-issue the fetch for the show currently on screen.
    ReloadShow,
    GoHome,
    OpenFavorites,
    RetryPreviews,
    SelectSeason(usize),
    NextSeason,
    PrevSeason,
    /// Play an episode of the loaded show.
    PlayEpisode(Episode),
    /// Play an entry from the favorites screen.
    PlayFavorite(Episode),
    AddFavorite(Episode),
    StopAudio,
    Quit,
}
