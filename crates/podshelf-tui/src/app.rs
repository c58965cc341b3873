//! App: component-based event loop.
//!
//! Architecture:
//! - `App` owns the components, `AppState`, the audio session and the
//!   favorites store.
//! - A `tokio::mpsc` channel carries `AppMessage` events in from the key
//!   reader and from catalog fetch tasks.
//! - The event loop draws a frame, then waits on the channel or the tick.
//! - Components return `Vec<Action>`; App applies each Action.
//! - The show fetch is latest-wins: a new navigation aborts the previous
//!   task, and the view's ticket drops anything that still gets through.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use ratatui::crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    Frame, Terminal,
};
use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tracing::{debug, error, info};

use podshelf_core::audio::{AudioBackend, AudioSession};
use podshelf_core::catalog::ShowCatalog;
use podshelf_core::error::CatalogError;
use podshelf_core::favorites::FavoritesStore;
use podshelf_core::model::{Episode, ShowPreview, ShowRecord};
use podshelf_core::storage::KeyValueStore;
use podshelf_core::view::FetchTicket;

use crate::{
    action::{Action, Screen},
    app_state::{AppState, PreviewsState},
    component::Component,
    components::{favorites_list::FavoritesList, show_detail::ShowDetail, show_list::ShowList},
    widgets::{status_bar, toast::ToastManager},
};

type Tui = Terminal<CrosstermBackend<io::Stdout>>;

/// How long the key reader blocks before rechecking its shutdown flag.
const KEY_POLL: Duration = Duration::from_millis(100);

#[derive(Debug)]
pub enum AppMessage {
    Event(Event),
    PreviewsFetched(Result<Vec<ShowPreview>, CatalogError>),
    ShowFetched(FetchTicket, Result<ShowRecord, CatalogError>),
}

pub struct App<C: ShowCatalog, B: AudioBackend, S: KeyValueStore> {
    catalog: Arc<C>,
    audio: AudioSession<B>,
    favorites: FavoritesStore<S>,
    state: AppState,

    show_list: ShowList,
    show_detail: ShowDetail,
    favorites_list: FavoritesList,
    toast: ToastManager,

    show_fetch: Option<AbortHandle>,
    previews_fetch: Option<AbortHandle>,
    tx: mpsc::Sender<AppMessage>,
    rx: Option<mpsc::Receiver<AppMessage>>,
    should_quit: bool,
}

impl<C: ShowCatalog, B: AudioBackend, S: KeyValueStore> App<C, B, S> {
    pub fn new(catalog: C, audio: AudioSession<B>, favorites: FavoritesStore<S>) -> Self {
        let (tx, rx) = mpsc::channel::<AppMessage>(256);
        Self {
            catalog: Arc::new(catalog),
            audio,
            favorites,
            state: AppState::new(),
            show_list: ShowList::new(),
            show_detail: ShowDetail::new(),
            favorites_list: FavoritesList::new(),
            toast: ToastManager::new(),
            show_fetch: None,
            previews_fetch: None,
            tx,
            rx: Some(rx),
            should_quit: false,
        }
    }

    // ── Main run loop ─────────────────────────────────────────────────────────

    pub async fn run(mut self) -> anyhow::Result<()> {
        let mut rx = self.rx.take().context("app event loop already running")?;

        debug!("run(): enabling raw mode");
        enable_raw_mode().context("enable raw mode")?;
        let mut terminal = open_or_restore(
            || {
                let mut stdout = io::stdout();
                execute!(stdout, EnterAlternateScreen)?;
                Terminal::new(CrosstermBackend::new(stdout))
            },
            || {
                let _ = disable_raw_mode();
            },
        )?;

        // ── Background task: keyboard events ──────────────────────────────────
        // Polls instead of parking in `event::read` so the runtime can shut
        // down once the loop has exited.
        let shutdown = Arc::new(AtomicBool::new(false));
        let reader = {
            let event_tx = self.tx.clone();
            let shutdown = Arc::clone(&shutdown);
            tokio::task::spawn_blocking(move || read_keys(&event_tx, &shutdown, poll_terminal))
        };

        self.spawn_previews_fetch();

        let result = self.event_loop(&mut terminal, &mut rx).await;

        // ── Teardown ──────────────────────────────────────────────────────────
        shutdown.store(true, Ordering::Relaxed);
        // A reader blocked on a full channel fails its send once rx is gone.
        drop(rx);
        if let Err(e) = reader.await {
            debug!("key reader ended abnormally: {}", e);
        }
        self.audio.stop();
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;
        info!("podshelf exiting");

        result
    }

    async fn event_loop(
        &mut self,
        terminal: &mut Tui,
        rx: &mut mpsc::Receiver<AppMessage>,
    ) -> anyhow::Result<()> {
        // Toast expiry and "did mpv exit on its own" check.
        let mut tick = tokio::time::interval(Duration::from_millis(250));
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal.draw(|f| self.draw(f))?;
            }
            needs_redraw = false;

            if self.should_quit {
                return Ok(());
            }

            tokio::select! {
                msg = rx.recv() => {
                    let Some(msg) = msg else {
                        return Ok(());
                    };
                    needs_redraw = self.handle_message(msg);
                    while let Ok(next) = rx.try_recv() {
                        needs_redraw |= self.handle_message(next);
                    }
                }

                _ = tick.tick() => {
                    needs_redraw = self.on_tick();
                }
            }
        }
    }

    fn on_tick(&mut self) -> bool {
        let mut redraw = self.toast.tick();
        if self.audio.refresh() {
            self.state.now_playing = None;
            redraw = true;
        }
        redraw
    }

    fn handle_message(&mut self, msg: AppMessage) -> bool {
        match msg {
            AppMessage::Event(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                for action in self.handle_key(key) {
                    self.apply_action(action);
                }
                true
            }
            AppMessage::Event(Event::Resize(..)) => true,
            AppMessage::Event(_) => false,
            AppMessage::PreviewsFetched(result) => {
                self.previews_fetch = None;
                match result {
                    Ok(previews) => {
                        info!("home: {} shows", previews.len());
                        self.show_list.set_previews(previews);
                        self.state.previews = PreviewsState::Loaded;
                    }
                    Err(e) => {
                        error!("home: could not load shows: {}", e);
                        self.state.previews = PreviewsState::Failed(e.to_string());
                    }
                }
                true
            }
            AppMessage::ShowFetched(ticket, result) => {
                let applied = self.state.view.apply_fetch(&ticket, result);
                if applied {
                    self.show_fetch = None;
                }
                applied
            }
        }
    }

    // ── Key handling ──────────────────────────────────────────────────────────

    fn captures_input(&self) -> bool {
        match self.state.screen {
            Screen::Home => self.show_list.captures_input(),
            Screen::Show => self.show_detail.captures_input(),
            Screen::Favorites => self.favorites_list.captures_input(),
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Vec<Action> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return vec![Action::Quit];
        }

        // Global keys, unless a text field has the keyboard.
        if !self.captures_input() {
            match key.code {
                KeyCode::Char('q') => return vec![Action::Quit],
                KeyCode::Char('h') => return vec![Action::GoHome],
                KeyCode::Char('f') => return vec![Action::OpenFavorites],
                KeyCode::Char('s') => return vec![Action::StopAudio],
                _ => {}
            }
        }

        match self.state.screen {
            Screen::Home => self.show_list.handle_key(key, &self.state),
            Screen::Show => self.show_detail.handle_key(key, &self.state),
            Screen::Favorites => self.favorites_list.handle_key(key, &self.state),
        }
    }

    // ── Actions ───────────────────────────────────────────────────────────────

    fn apply_action(&mut self, action: Action) {
        debug!("apply_action: {:?}", action);
        match action {
            // ── Navigation ────────────────────────────────────────────────────
            Action::OpenShow(id) => self.open_show(&id),
            Action::ReloadShow => {
                if let Some(id) = self.state.view.active_id().map(str::to_string) {
                    self.open_show(&id);
                }
            }
            Action::GoHome => {
                self.abort_show_fetch();
                self.state.screen = Screen::Home;
            }
            Action::OpenFavorites => {
                self.abort_show_fetch();
                self.state.saved_favorites = self.favorites.load();
                self.favorites_list.sync(&self.state);
                self.state.screen = Screen::Favorites;
            }
            Action::RetryPreviews => {
                self.state.previews = PreviewsState::Loading;
                self.spawn_previews_fetch();
            }

            // ── Season selection ──────────────────────────────────────────────
            Action::SelectSeason(idx) => {
                self.state.view.select_season(idx);
            }
            Action::NextSeason => {
                self.state.view.next_season();
            }
            Action::PrevSeason => {
                self.state.view.prev_season();
            }

            // ── Playback ──────────────────────────────────────────────────────
            Action::PlayEpisode(episode) => {
                if self.state.view.show().is_none() {
                    return;
                }
                let started = self.state.view.play(&mut self.audio, &episode);
                self.after_play(started, episode);
            }
            Action::PlayFavorite(episode) => {
                let started = self.audio.play(&episode.audio_url);
                self.after_play(started, episode);
            }
            Action::StopAudio => {
                if self.state.now_playing.take().is_some() {
                    self.toast.info("Stopped");
                }
                self.audio.stop();
            }

            // ── Favorites ─────────────────────────────────────────────────────
            Action::AddFavorite(episode) => {
                let title = episode.title.clone();
                match self.state.view.favorite(&mut self.favorites, episode) {
                    Ok(true) => self.toast.success(format!("★ {title}")),
                    Ok(false) => {}
                    Err(e) => {
                        error!("favorites: save failed: {}", e);
                        self.toast.error(format!("Could not save favorite: {e}"));
                    }
                }
            }

            Action::Quit => self.should_quit = true,
        }
    }

    fn after_play(&mut self, started: bool, episode: Episode) {
        if started {
            self.toast.info(format!("▶ {}", episode.title));
            self.state.now_playing = Some(episode);
            return;
        }
        // `play` empties the slot before trying the new stream.
        self.state.now_playing = None;
        let reason = self.audio.last_error().unwrap_or("unknown error");
        self.toast.error(format!("Could not play {}: {reason}", episode.title));
    }

    fn open_show(&mut self, id: &str) {
        self.state.screen = Screen::Show;
        let ticket = self.state.view.mount(id, &self.favorites);
        self.spawn_show_fetch(ticket);
    }

    fn abort_show_fetch(&mut self) {
        if let Some(handle) = self.show_fetch.take() {
            debug!("aborting in-flight show fetch");
            handle.abort();
        }
    }

    fn spawn_show_fetch(&mut self, ticket: FetchTicket) {
        self.abort_show_fetch();
        let catalog = Arc::clone(&self.catalog);
        let tx = self.tx.clone();
        let handle = tokio::spawn(async move {
            let result = catalog.fetch_show(ticket.id()).await;
            let _ = tx.send(AppMessage::ShowFetched(ticket, result)).await;
        });
        self.show_fetch = Some(handle.abort_handle());
    }

    fn spawn_previews_fetch(&mut self) {
        if let Some(prev) = self.previews_fetch.take() {
            prev.abort();
        }
        let catalog = Arc::clone(&self.catalog);
        let tx = self.tx.clone();
        let handle = tokio::spawn(async move {
            let result = catalog.fetch_previews().await;
            let _ = tx.send(AppMessage::PreviewsFetched(result)).await;
        });
        self.previews_fetch = Some(handle.abort_handle());
    }

    // ── Drawing ───────────────────────────────────────────────────────────────

    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let [top, body, bottom] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .areas(area);

        status_bar::draw_now_playing(frame, top, self.state.now_playing.as_ref());

        let hints = match self.state.screen {
            Screen::Home => {
                self.show_list.draw(frame, body, &self.state);
                self.show_list.hints(&self.state)
            }
            Screen::Show => {
                self.show_detail.draw(frame, body, &self.state);
                self.show_detail.hints(&self.state)
            }
            Screen::Favorites => {
                self.favorites_list.draw(frame, body, &self.state);
                self.favorites_list.hints(&self.state)
            }
        };
        status_bar::draw_keys_bar(frame, bottom, self.state.screen, hints);

        self.toast.draw(frame, area);
    }
}

/// Run `open` (terminal setup after raw mode is on); on failure call
/// `restore` so the shell is not left in raw mode.
fn open_or_restore<T>(
    open: impl FnOnce() -> io::Result<T>,
    restore: impl FnOnce(),
) -> anyhow::Result<T> {
    match open() {
        Ok(terminal) => Ok(terminal),
        Err(e) => {
            restore();
            Err(e).context("enter alternate screen")
        }
    }
}

fn poll_terminal(timeout: Duration) -> io::Result<Option<Event>> {
    if event::poll(timeout)? {
        event::read().map(Some)
    } else {
        Ok(None)
    }
}

/// Forward terminal events to the App until `shutdown` is set, the App's
/// receiver is gone, or the terminal errors.
fn read_keys(
    tx: &mpsc::Sender<AppMessage>,
    shutdown: &AtomicBool,
    mut next_event: impl FnMut(Duration) -> io::Result<Option<Event>>,
) {
    while !shutdown.load(Ordering::Relaxed) {
        match next_event(KEY_POLL) {
            Ok(Some(ev)) => {
                if tx.blocking_send(AppMessage::Event(ev)).is_err() {
                    break;
                }
            }
            Ok(None) => {}
            Err(e) => {
                debug!("key reader: {}", e);
                break;
            }
        }
    }
}
