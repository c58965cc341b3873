use thiserror::Error;

/// The show catalog could not produce a record.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("catalog returned status {status} for {url}")]
    Status { status: u16, url: String },
    #[error("catalog response could not be decoded: {0}")]
    Decode(String),
    #[error("show {0} not found")]
    NotFound(String),
}

/// The local key-value store could not be written (or read at all).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not encode value for key {key}: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// An audio URL could not be started.
#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("player binary not found: {0}")]
    BinaryNotFound(String),
    #[error("failed to start playback of {url}: {reason}")]
    Spawn { url: String, reason: String },
}
