//! End-to-end flow through the show page: load, pick a season, play,
//! favorite, then navigate away while an older fetch is still in flight.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use podshelf_core::audio::{AudioBackend, AudioSession, Playback};
use podshelf_core::catalog::ShowCatalog;
use podshelf_core::error::{CatalogError, PlaybackError};
use podshelf_core::favorites::FavoritesStore;
use podshelf_core::model::{Episode, Season, ShowPreview, ShowRecord};
use podshelf_core::storage::{FileKvStore, MemoryKvStore};
use podshelf_core::view::{FetchTicket, ShowDetailView, ShowState};
use tokio::sync::{mpsc, oneshot};

/// Catalog whose responses are released by the test, one gate per request.
#[derive(Default)]
struct GatedCatalog {
    shows: HashMap<String, ShowRecord>,
    gates: Mutex<Vec<(String, oneshot::Sender<()>)>>,
}

impl GatedCatalog {
    fn with(shows: Vec<ShowRecord>) -> Self {
        Self {
            shows: shows.into_iter().map(|s| (s.id.clone(), s)).collect(),
            gates: Mutex::new(Vec::new()),
        }
    }

    /// Let the oldest pending request for `id` complete.
    fn release(&self, id: &str) {
        let mut gates = self.gates.lock().unwrap();
        let pos = gates.iter().position(|(g, _)| g == id).expect("no pending request");
        let (_, tx) = gates.remove(pos);
        let _ = tx.send(());
    }

    fn pending(&self) -> usize {
        self.gates.lock().unwrap().len()
    }
}

impl ShowCatalog for GatedCatalog {
    async fn fetch_show(&self, id: &str) -> Result<ShowRecord, CatalogError> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().push((id.to_string(), tx));
        let _ = rx.await;
        self.shows
            .get(id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))
    }

    async fn fetch_previews(&self) -> Result<Vec<ShowPreview>, CatalogError> {
        Ok(Vec::new())
    }
}

#[derive(Clone, Default)]
struct LiveStreams(Arc<Mutex<Vec<String>>>);

struct Stream {
    url: String,
    live: LiveStreams,
}

impl Playback for Stream {
    fn stop(&mut self) {
        self.live.0.lock().unwrap().retain(|u| *u != self.url);
    }
}

impl AudioBackend for LiveStreams {
    fn start(&mut self, url: &str) -> Result<Box<dyn Playback>, PlaybackError> {
        self.0.lock().unwrap().push(url.to_string());
        Ok(Box::new(Stream {
            url: url.to_string(),
            live: self.clone(),
        }))
    }
}

fn show(id: &str, seasons: Vec<Vec<Episode>>) -> ShowRecord {
    ShowRecord {
        id: id.to_string(),
        title: format!("Show {id}"),
        seasons: seasons.into_iter().map(Season::new).collect(),
        ..Default::default()
    }
}

fn spawn_fetch(
    catalog: &Arc<GatedCatalog>,
    ticket: FetchTicket,
    tx: &mpsc::Sender<(FetchTicket, Result<ShowRecord, CatalogError>)>,
) {
    let catalog = Arc::clone(catalog);
    let tx = tx.clone();
    tokio::spawn(async move {
        let result = catalog.fetch_show(ticket.id()).await;
        let _ = tx.send((ticket, result)).await;
    });
}

async fn wait_for_pending(catalog: &GatedCatalog, n: usize) {
    while catalog.pending() < n {
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
async fn test_play_favorite_then_navigate_discards_stale_fetch() {
    let pilot = Episode::new("Pilot", "a.mp3");
    let finale = Episode::new("Finale", "b.mp3");
    let catalog = Arc::new(GatedCatalog::with(vec![
        show("1", vec![vec![pilot.clone()], vec![finale.clone()]]),
        show("2", vec![vec![Episode::new("Other", "c.mp3")]]),
    ]));
    let live = LiveStreams::default();
    let mut audio = AudioSession::new(live.clone());
    let mut store = FavoritesStore::new(MemoryKvStore::new());
    let mut view = ShowDetailView::new();
    let (tx, mut rx) = mpsc::channel(8);

    // Load show 1.
    let ticket = view.mount("1", &store);
    spawn_fetch(&catalog, ticket, &tx);
    wait_for_pending(&catalog, 1).await;
    catalog.release("1");
    let (t, r) = rx.recv().await.unwrap();
    assert!(view.apply_fetch(&t, r));
    assert_eq!(view.selected_season(), 0);
    assert_eq!(view.episodes(), &[pilot.clone()]);

    // Season 1, play and favorite the finale.
    assert!(view.select_season(1));
    let ep = view.episode(0).cloned().unwrap();
    assert_eq!(ep, finale);
    assert!(view.play(&mut audio, &ep));
    assert_eq!(audio.now_playing(), Some("b.mp3"));
    assert!(view.favorite(&mut store, ep).unwrap());
    assert_eq!(store.load().last(), Some(&finale));

    // Re-enter show 1, then navigate to show 2 before that fetch completes.
    let stale = view.mount("1", &store);
    spawn_fetch(&catalog, stale, &tx);
    wait_for_pending(&catalog, 1).await;
    let fresh = view.mount("2", &store);
    spawn_fetch(&catalog, fresh, &tx);
    wait_for_pending(&catalog, 2).await;

    catalog.release("2");
    let (t, r) = rx.recv().await.unwrap();
    assert!(view.apply_fetch(&t, r));
    assert_eq!(view.show().unwrap().id, "2");

    catalog.release("1");
    let (t, r) = rx.recv().await.unwrap();
    assert_eq!(t.id(), "1");
    assert!(!view.apply_fetch(&t, r));
    assert_eq!(view.show().unwrap().id, "2");
    assert_eq!(view.selected_season(), 0);

    // Favorites carried across the navigation; audio untouched by it.
    assert_eq!(view.favorites().last(), Some(&finale));
    assert_eq!(*live.0.lock().unwrap(), vec!["b.mp3".to_string()]);
}

#[tokio::test]
async fn test_stale_error_does_not_replace_loaded_show() {
    let catalog = Arc::new(GatedCatalog::with(vec![show("2", vec![vec![]])]));
    let store = FavoritesStore::new(MemoryKvStore::new());
    let mut view = ShowDetailView::new();
    let (tx, mut rx) = mpsc::channel(8);

    let missing = view.mount("missing", &store);
    spawn_fetch(&catalog, missing, &tx);
    wait_for_pending(&catalog, 1).await;
    let ok = view.mount("2", &store);
    spawn_fetch(&catalog, ok, &tx);
    wait_for_pending(&catalog, 2).await;

    catalog.release("2");
    let (t, r) = rx.recv().await.unwrap();
    assert!(view.apply_fetch(&t, r));

    catalog.release("missing");
    let (t, r) = rx.recv().await.unwrap();
    assert!(r.is_err());
    assert!(!view.apply_fetch(&t, r));
    assert!(matches!(view.show_state(), ShowState::Loaded(s) if s.id == "2"));
    assert!(view.episodes().is_empty());
}

#[test]
fn test_favorites_survive_reopening_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");
    let finale = Episode::new("Finale", "b.mp3");

    {
        let mut store = FavoritesStore::new(FileKvStore::open(&path));
        let mut view = ShowDetailView::new();
        let ticket = view.mount("1", &store);
        view.apply_fetch(&ticket, Ok(show("1", vec![vec![finale.clone()]])));
        view.favorite(&mut store, finale.clone()).unwrap();
    }

    let store = FavoritesStore::new(FileKvStore::open(&path));
    assert_eq!(store.load(), vec![finale]);

    let raw = std::fs::read_to_string(&path).unwrap();
    let map: HashMap<String, String> = serde_json::from_str(&raw).unwrap();
    assert_eq!(map["favorites"], r#"[{"title":"Finale","audioUrl":"b.mp3"}]"#);
}
