mod action;
mod app;
mod app_state;
mod component;
mod components;
mod mpv;
mod text;
mod theme;
mod widgets;

use anyhow::Context;

use podshelf_core::audio::AudioSession;
use podshelf_core::catalog::HttpCatalog;
use podshelf_core::config::Config;
use podshelf_core::favorites::FavoritesStore;
use podshelf_core::platform;
use podshelf_core::storage::FileKvStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let data_dir = platform::data_dir();
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("create data dir {}", data_dir.display()))?;

    let log_path = data_dir.join("podshelf.log");
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    // Allow RUST_LOG override; keep HTTP client internals quiet by default.
    let log_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "debug,hyper_util=warn,reqwest=warn,hyper=warn".to_string());
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(log_filter.as_str())
        .with_ansi(false)
        .init();

    eprintln!("podshelf log: {}", log_path.display());
    tracing::info!("podshelf starting…");

    // ── Load config ──────────────────────────────────────────────────────────
    let config = Config::load().unwrap_or_else(|e| {
        tracing::warn!("config: {:#}; using defaults", e);
        Config::default()
    });

    // ── Wire the pieces ──────────────────────────────────────────────────────
    let catalog = HttpCatalog::new(&config.catalog).context("build catalog client")?;
    let audio = AudioSession::new(mpv::MpvBackend::new(&config.player));
    tracing::info!("favorites: {}", config.storage.store_file.display());
    let favorites = FavoritesStore::new(FileKvStore::open(config.storage.store_file.clone()));

    app::App::new(catalog, audio, favorites).run().await
}
