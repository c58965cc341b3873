//! AudioSession: the one "now playing" slot for the whole application.
//!
//! The session owns the current stream exclusively.  `play` stops whatever
//! is in the slot before asking the backend for the next stream, so callers
//! holding `&mut AudioSession` never observe two live streams.  Replaying the
//! URL that is already playing restarts it from the beginning.

use tracing::{debug, info, warn};

use crate::error::PlaybackError;

/// A live stream handed out by an [`AudioBackend`].
pub trait Playback: Send {
    /// Stop and release the stream.  Must be idempotent.
    fn stop(&mut self);

    /// False once the stream has ended or died on its own.
    fn is_active(&mut self) -> bool {
        true
    }
}

/// Something that can turn an audio URL into a running [`Playback`].
pub trait AudioBackend {
    fn start(&mut self, url: &str) -> Result<Box<dyn Playback>, PlaybackError>;
}

struct NowPlaying {
    url: String,
    playback: Box<dyn Playback>,
}

pub struct AudioSession<B: AudioBackend> {
    backend: B,
    current: Option<NowPlaying>,
    last_error: Option<String>,
}

impl<B: AudioBackend> AudioSession<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            current: None,
            last_error: None,
        }
    }

    /// Stop the current stream (if any) and start `url`.
    ///
    /// Returns whether the new stream started.  A failure leaves the slot
    /// empty and is kept in `last_error`; it never propagates.
    pub fn play(&mut self, url: &str) -> bool {
        self.stop();

        match self.backend.start(url) {
            Ok(playback) => {
                info!("audio: playing {}", url);
                self.current = Some(NowPlaying {
                    url: url.to_string(),
                    playback,
                });
                self.last_error = None;
                true
            }
            Err(e) => {
                warn!("audio: could not play {}: {}", url, e);
                self.last_error = Some(e.to_string());
                false
            }
        }
    }

    pub fn stop(&mut self) {
        if let Some(mut prev) = self.current.take() {
            debug!("audio: stopping {}", prev.url);
            prev.playback.stop();
        }
    }

    /// Drop the slot if its stream finished by itself.  Returns true when the
    /// slot was cleared.
    pub fn refresh(&mut self) -> bool {
        let ended = match self.current.as_mut() {
            Some(now) => !now.playback.is_active(),
            None => false,
        };
        if ended {
            if let Some(mut prev) = self.current.take() {
                debug!("audio: {} ended", prev.url);
                prev.playback.stop();
            }
        }
        ended
    }

    pub fn now_playing(&self) -> Option<&str> {
        self.current.as_ref().map(|n| n.url.as_str())
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}

impl<B: AudioBackend> Drop for AudioSession<B> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::{Arc, Mutex};

    use super::*;

    /// Backend that records which URLs are live.  URLs listed in `failing`
    /// refuse to start.
    #[derive(Clone, Default)]
    pub struct RecordingBackend {
        pub live: Arc<Mutex<Vec<String>>>,
        pub started: Arc<Mutex<Vec<String>>>,
        pub failing: Vec<String>,
    }

    impl RecordingBackend {
        pub fn live(&self) -> Vec<String> {
            self.live.lock().unwrap().clone()
        }

        pub fn started(&self) -> Vec<String> {
            self.started.lock().unwrap().clone()
        }

        /// Simulate the stream for `url` ending by itself.
        pub fn finish(&self, url: &str) {
            self.live.lock().unwrap().retain(|u| u != url);
        }
    }

    struct RecordedPlayback {
        url: String,
        live: Arc<Mutex<Vec<String>>>,
    }

    impl Playback for RecordedPlayback {
        fn stop(&mut self) {
            let mut live = self.live.lock().unwrap();
            if let Some(pos) = live.iter().position(|u| *u == self.url) {
                live.remove(pos);
            }
        }

        fn is_active(&mut self) -> bool {
            self.live.lock().unwrap().contains(&self.url)
        }
    }

    impl AudioBackend for RecordingBackend {
        fn start(&mut self, url: &str) -> Result<Box<dyn Playback>, PlaybackError> {
            if self.failing.iter().any(|f| f == url) {
                return Err(PlaybackError::Spawn {
                    url: url.to_string(),
                    reason: "unsupported format".to_string(),
                });
            }
            let mut live = self.live.lock().unwrap();
            assert!(live.is_empty(), "backend asked to start {url} while {live:?} still live");
            live.push(url.to_string());
            self.started.lock().unwrap().push(url.to_string());
            Ok(Box::new(RecordedPlayback {
                url: url.to_string(),
                live: Arc::clone(&self.live),
            }))
        }
    }
}
