//! Asset access and the speculative photo preload.

use async_trait::async_trait;
use futures::future::try_join_all;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// Errors from loading assets.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to load asset: {url}")]
    NotFound { url: String },

    #[error("failed to load asset {url}: {source}")]
    Io {
        url: String,
        #[source]
        source: std::io::Error,
    },

    #[error("asset {url} is empty")]
    Empty { url: String },

    #[error("asset loading was interrupted: {0}")]
    Interrupted(String),
}

impl AssetError {
    /// The asset that failed, if the failure belongs to one.
    pub fn url(&self) -> Option<&str> {
        match self {
            AssetError::NotFound { url } | AssetError::Io { url, .. } | AssetError::Empty { url } => {
                Some(url)
            }
            AssetError::Interrupted(_) => None,
        }
    }
}

/// Where assets come from.
#[async_trait]
pub trait AssetSource: Send + Sync {
    /// Fetch the bytes behind a relative asset URL.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, AssetError>;
}

/// Assets read from a directory on disk.
#[derive(Debug, Clone)]
pub struct FsAssets {
    root: PathBuf,
}

impl FsAssets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn resolve(&self, url: &str) -> PathBuf {
        self.root.join(url)
    }
}

#[async_trait]
impl AssetSource for FsAssets {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, AssetError> {
        match tokio::fs::read(self.resolve(url)).await {
            Ok(bytes) if bytes.is_empty() => Err(AssetError::Empty {
                url: url.to_string(),
            }),
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(AssetError::NotFound {
                url: url.to_string(),
            }),
            Err(source) => Err(AssetError::Io {
                url: url.to_string(),
                source,
            }),
        }
    }
}

/// A fetched image, kept warm for the photo scene.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedImage {
    pub url: String,
    pub bytes: Vec<u8>,
}

/// Fetch every URL concurrently.
///
/// Fails as soon as any fetch fails; the error names the failing URL.
/// Successful images are returned in the order of `urls`.
pub async fn preload_all<S>(source: &S, urls: &[String]) -> Result<Vec<LoadedImage>, AssetError>
where
    S: AssetSource + ?Sized,
{
    try_join_all(urls.iter().map(|url| async move {
        let bytes = source.fetch(url).await.map_err(|e| {
            error!(%url, error = %e, "failed to load image");
            e
        })?;
        debug!(%url, size = bytes.len(), "image loaded");
        Ok::<_, AssetError>(LoadedImage {
            url: url.clone(),
            bytes,
        })
    }))
    .await
}

/// A preload running in the background, awaited at most once.
#[derive(Debug)]
pub struct PreloadHandle {
    task: JoinHandle<Result<Vec<LoadedImage>, AssetError>>,
}

impl PreloadHandle {
    /// Start preloading `urls` on the current runtime.
    pub fn spawn(source: Arc<dyn AssetSource>, urls: Vec<String>) -> Self {
        info!(count = urls.len(), "starting image preload");
        let task = tokio::spawn(async move { preload_all(source.as_ref(), &urls).await });
        Self { task }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the preload to finish.
    pub async fn wait(self) -> Result<Vec<LoadedImage>, AssetError> {
        match self.task.await {
            Ok(result) => result,
            Err(e) => Err(AssetError::Interrupted(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockAssets;

    fn urls(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_preload_all_succeeds_in_order() {
        let assets = MockAssets::with_photos(3);
        let images = preload_all(&assets, &urls(&["3.png", "1.png", "2.png"]))
            .await
            .unwrap();
        let loaded: Vec<&str> = images.iter().map(|i| i.url.as_str()).collect();
        assert_eq!(loaded, vec!["3.png", "1.png", "2.png"]);
        assert_eq!(assets.fetch_count(), 3);
    }

    #[tokio::test]
    async fn test_preload_all_fails_fast_naming_the_url() {
        let assets = MockAssets::with_photos(3).missing("2.png");
        let err = preload_all(&assets, &urls(&["1.png", "2.png", "3.png"]))
            .await
            .unwrap_err();
        assert!(matches!(err, AssetError::NotFound { .. }));
        assert_eq!(err.url(), Some("2.png"));
        assert_eq!(err.to_string(), "failed to load asset: 2.png");
    }

    #[tokio::test]
    async fn test_preload_handle_waits_once() {
        let assets: Arc<dyn AssetSource> = Arc::new(MockAssets::with_photos(2));
        let handle = PreloadHandle::spawn(assets, urls(&["1.png", "2.png"]));
        let images = handle.wait().await.unwrap();
        assert_eq!(images.len(), 2);
    }

    #[tokio::test]
    async fn test_fs_assets_maps_missing_files() {
        let dir = std::env::temp_dir().join(format!("surprise-assets-{}", uuid::Uuid::new_v4()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        tokio::fs::write(dir.join("1.png"), b"\x89PNG").await.unwrap();
        tokio::fs::write(dir.join("empty.png"), b"").await.unwrap();

        let assets = FsAssets::new(&dir);
        assert_eq!(assets.fetch("1.png").await.unwrap(), b"\x89PNG".to_vec());
        assert!(matches!(
            assets.fetch("2.png").await,
            Err(AssetError::NotFound { url }) if url == "2.png"
        ));
        assert!(matches!(
            assets.fetch("empty.png").await,
            Err(AssetError::Empty { .. })
        ));

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
