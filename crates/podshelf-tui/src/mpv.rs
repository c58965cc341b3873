/// mpv-backed audio output.
///
/// Each stream is its own headless `mpv` child process.  Stopping a stream
/// kills the child, so the single-slot rule of `AudioSession` maps directly
/// onto "at most one mpv process alive".
///
/// mpv's stderr is appended to `mpv-stderr.log` in the data dir so a stream
/// that dies right after start leaves a trace.
use std::path::PathBuf;
use std::process::Stdio;

use podshelf_core::audio::{AudioBackend, Playback};
use podshelf_core::config::PlayerConfig;
use podshelf_core::error::PlaybackError;
use podshelf_core::platform;
use tracing::{debug, info, warn};

pub struct MpvBackend {
    binary: Option<PathBuf>,
    volume: f32,
    stderr_log: PathBuf,
}

impl MpvBackend {
    pub fn new(config: &PlayerConfig) -> Self {
        let binary = platform::find_mpv_binary(config.mpv_binary.as_deref());
        match &binary {
            Some(p) => info!("mpv: using {}", p.display()),
            None => warn!("mpv: binary not found; playback will be unavailable"),
        }
        Self {
            binary,
            volume: config.volume,
            stderr_log: platform::data_dir().join("mpv-stderr.log"),
        }
    }

    fn args(&self, url: &str) -> Vec<String> {
        vec![
            "--no-video".to_string(),
            "--no-terminal".to_string(),
            "--idle=no".to_string(),
            format!(
                "--volume={}",
                (self.volume * 100.0).clamp(0.0, 100.0).round() as i64
            ),
            "--".to_string(),
            url.to_string(),
        ]
    }

    fn stderr_sink(&self) -> Stdio {
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.stderr_log)
            .map(Stdio::from)
            .unwrap_or_else(|e| {
                debug!("mpv: cannot open {}: {}", self.stderr_log.display(), e);
                Stdio::null()
            })
    }
}

impl AudioBackend for MpvBackend {
    fn start(&mut self, url: &str) -> Result<Box<dyn Playback>, PlaybackError> {
        let binary = self
            .binary
            .clone()
            .ok_or_else(|| PlaybackError::BinaryNotFound(platform::mpv_binary_name().to_string()))?;

        let child = tokio::process::Command::new(&binary)
            .args(self.args(url))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(self.stderr_sink())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| PlaybackError::Spawn {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        debug!("mpv: spawned pid {:?} for {}", child.id(), url);
        Ok(Box::new(MpvPlayback {
            child,
            url: url.to_string(),
        }))
    }
}

struct MpvPlayback {
    child: tokio::process::Child,
    url: String,
}

impl Playback for MpvPlayback {
    fn stop(&mut self) {
        if let Ok(Some(_)) = self.child.try_wait() {
            return;
        }
        if let Err(e) = self.child.start_kill() {
            warn!("mpv: failed to kill player for {}: {}", self.url, e);
        }
        let _ = self.child.try_wait();
    }

    fn is_active(&mut self) -> bool {
        match self.child.try_wait() {
            Ok(None) => true,
            Ok(Some(status)) => {
                if !status.success() {
                    warn!("mpv: player for {} exited with {}", self.url, status);
                }
                false
            }
            Err(e) => {
                warn!("mpv: liveness check failed: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_end_with_url_after_separator() {
        let backend = MpvBackend {
            binary: None,
            volume: 0.42,
            stderr_log: PathBuf::from("/dev/null"),
        };
        let args = backend.args("-weird.mp3");
        assert!(args.contains(&"--volume=42".to_string()));
        assert_eq!(&args[args.len() - 2..], ["--", "-weird.mp3"]);
    }

    #[test]
    fn test_missing_binary_is_an_error() {
        let mut backend = MpvBackend {
            binary: None,
            volume: 0.5,
            stderr_log: PathBuf::from("/dev/null"),
        };
        assert!(matches!(
            backend.start("a.mp3"),
            Err(PlaybackError::BinaryNotFound(_))
        ));
    }
}
