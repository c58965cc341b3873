use std::path::PathBuf;

const APP_DIR: &str = "podshelf";

pub fn data_dir() -> PathBuf {
    // On macOS and Linux, use ~/.local/share/podshelf/ (XDG standard)
    #[cfg(unix)]
    {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp"))
            .join(".local")
            .join("share")
            .join(APP_DIR)
    }
    #[cfg(windows)]
    {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
    }
}

pub fn config_dir() -> PathBuf {
    #[cfg(unix)]
    {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join(APP_DIR)
    }

    #[cfg(windows)]
    {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
    }
}

#[cfg(unix)]
pub fn mpv_binary_name() -> &'static str {
    "mpv"
}

#[cfg(windows)]
pub fn mpv_binary_name() -> &'static str {
    "mpv.exe"
}

fn find_beside_exe(name: &str) -> Option<PathBuf> {
    let current_exe = std::env::current_exe().ok()?;
    let dir = current_exe.parent()?;
    let p = dir.join(name);
    p.exists().then_some(p)
}

fn find_on_path(name: &str) -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path)
        .map(|dir| dir.join(name))
        .find(|p| p.exists())
}

/// Find the mpv binary for playback.
///
/// An explicit `configured` path wins when it exists; otherwise look beside
/// the current executable, then on PATH.
pub fn find_mpv_binary(configured: Option<&std::path::Path>) -> Option<PathBuf> {
    if let Some(p) = configured {
        if p.exists() {
            return Some(p.to_path_buf());
        }
    }
    find_beside_exe(mpv_binary_name()).or_else(|| find_on_path(mpv_binary_name()))
}
