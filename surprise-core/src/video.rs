//! The birthday video: a one-time fetch cached for the session, and the
//! modal that wraps playback.

use std::path::{Path, PathBuf};
use tracing::{error, info};
use uuid::Uuid;

use crate::assets::{AssetError, AssetSource};

/// A fetched video written to a local file the player can open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoHandle {
    pub source_url: String,
    pub path: PathBuf,
    pub size: usize,
}

/// Fetches the video once and hands out the cached handle afterwards.
#[derive(Debug, Default)]
pub struct VideoCache {
    handle: Option<VideoHandle>,
    spool_dir: Option<PathBuf>,
}

impl VideoCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write fetched videos under `dir` instead of the system temp directory.
    pub fn with_spool_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.spool_dir = Some(dir.into());
        self
    }

    pub fn cached(&self) -> Option<&VideoHandle> {
        self.handle.as_ref()
    }

    /// Return the cached handle, fetching and spooling the video on first use.
    pub async fn get_or_fetch<S>(&mut self, source: &S, url: &str) -> Result<&VideoHandle, AssetError>
    where
        S: AssetSource + ?Sized,
    {
        if self.handle.is_none() {
            info!(%url, "loading video");
            let bytes = source.fetch(url).await?;
            let path = self.spool_path(url);
            tokio::fs::write(&path, &bytes)
                .await
                .map_err(|source| AssetError::Io {
                    url: url.to_string(),
                    source,
                })?;
            info!(path = %path.display(), size = bytes.len(), "video cached");
            self.handle = Some(VideoHandle {
                source_url: url.to_string(),
                path,
                size: bytes.len(),
            });
        }
        self.handle
            .as_ref()
            .ok_or_else(|| AssetError::Interrupted("video cache is empty".to_string()))
    }

    fn spool_path(&self, url: &str) -> PathBuf {
        let extension = Path::new(url)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("mp4");
        let dir = self.spool_dir.clone().unwrap_or_else(std::env::temp_dir);
        dir.join(format!("surprise-{}.{extension}", Uuid::new_v4()))
    }
}

impl Drop for VideoCache {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = std::fs::remove_file(&handle.path);
        }
    }
}

/// The message shown in red inside the modal when the video can't load.
pub fn video_error_note(video: &str) -> String {
    format!("HATA: Video yüklenemedi. Dosya yolunu kontrol edin: {video}")
}

/// Open/closed and playing/paused state of the video modal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoModal {
    pub open: bool,
    pub playing: bool,
    pub error: Option<String>,
    /// How many times playback started from the beginning.
    pub plays: u32,
}

impl VideoModal {
    pub fn show(&mut self) {
        self.open = true;
    }

    pub fn started(&mut self) {
        self.playing = true;
        self.error = None;
        self.plays += 1;
    }

    /// Record a failed load. The modal stays open with the note visible.
    pub fn failed(&mut self, video: &str, cause: &AssetError) {
        error!(%video, error = %cause, "video failed to load");
        self.playing = false;
        self.error = Some(video_error_note(video));
    }

    /// Hide the modal, pausing and rewinding playback.
    pub fn close(&mut self) {
        self.open = false;
        self.playing = false;
    }
}
