use std::path::PathBuf;
use std::time::Duration;

use url::Url;

const CACHE_SUBDIR: &str = "catalog-preview";
const PLAYER_ENV: &str = "CATALOG_PREVIEW_PLAYER";
const DEFAULT_PLAYER: &str = "mpv";
const CONNECT_PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// Sanitize a value destined for a filename.
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            _ => c,
        })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Deterministic on-disk location for an item's preview video, or `None` when
/// no cache directory is available.
pub fn preview_cache_path(item_id: &str) -> Option<PathBuf> {
    let dir = dirs::cache_dir()?.join(CACHE_SUBDIR).join("previews");
    std::fs::create_dir_all(&dir).ok()?;
    Some(dir.join(format!("{}.mp4", sanitize_filename(item_id))))
}

/// Connectivity probe: can we open a TCP connection to the preview host?
pub async fn has_connection(url: &Url) -> bool {
    let Some(host) = url.host_str() else {
        return false;
    };
    let port = url.port_or_known_default().unwrap_or(443);

    matches!(
        tokio::time::timeout(
            CONNECT_PROBE_TIMEOUT,
            tokio::net::TcpStream::connect((host, port)),
        )
        .await,
        Ok(Ok(_))
    )
}

pub fn open_in_browser(url: &str) -> bool {
    webbrowser::open(url).is_ok()
}

/// Plays the preview on loop in an external player (mpv by default, override
/// with `CATALOG_PREVIEW_PLAYER`) and waits for it to exit.
pub async fn play_looping(path: PathBuf) -> Result<(), String> {
    let player = std::env::var(PLAYER_ENV).unwrap_or_else(|_| DEFAULT_PLAYER.to_string());

    let mut child = tokio::process::Command::new(&player)
        .arg("--loop=inf")
        .arg("--really-quiet")
        .arg(&path)
        .spawn()
        .map_err(|e| format!("failed to launch {player}: {e}"))?;

    let status = child
        .wait()
        .await
        .map_err(|e| format!("failed to wait for {player}: {e}"))?;

    if status.success() {
        Ok(())
    } else {
        Err(format!("{player} exited with {status}"))
    }
}
