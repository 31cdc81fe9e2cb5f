//! Session configuration.
//!
//! Values come from, in increasing precedence: built-in defaults, an
//! optional JSON file, and `SURPRISE_*` environment variables.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::choices::Catalog;
use crate::story::Honoree;

/// Path of the JSON config file, when no path is given explicitly.
pub const CONFIG_VAR: &str = "SURPRISE_CONFIG";
pub const ASSET_DIR_VAR: &str = "SURPRISE_ASSET_DIR";
pub const VIDEO_VAR: &str = "SURPRISE_VIDEO";
pub const TIME_SCALE_VAR: &str = "SURPRISE_TIME_SCALE";
pub const PLAYER_VAR: &str = "SURPRISE_PLAYER";

/// Errors from loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid value for {var}: {value:?}")]
    InvalidVar { var: &'static str, value: String },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Configuration for a surprise session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurpriseConfig {
    /// Directory the photo and video URLs are relative to.
    pub asset_dir: PathBuf,

    /// The photo list, preloaded on start and dropped by 1-based index.
    pub photos: Vec<String>,

    /// The birthday video.
    pub video: String,

    pub honoree: Honoree,

    pub catalog: Catalog,

    /// Multiplier for every scene timer. `0.0` skips the waits.
    pub time_scale: f64,

    /// Seed for photo placement. Random when unset.
    pub seed: Option<u64>,

    /// External command the cached video is handed to, e.g. `mpv`.
    pub player_command: Option<String>,
}

impl Default for SurpriseConfig {
    fn default() -> Self {
        Self {
            asset_dir: PathBuf::from("assets"),
            photos: (1..=9).map(|i| format!("{i}.png")).collect(),
            video: "video.mp4".to_string(),
            honoree: Honoree::default(),
            catalog: Catalog::default(),
            time_scale: 1.0,
            seed: None,
            player_command: None,
        }
    }
}

impl SurpriseConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_asset_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.asset_dir = dir.into();
        self
    }

    pub fn with_photos(mut self, photos: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.photos = photos.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_video(mut self, video: impl Into<String>) -> Self {
        self.video = video.into();
        self
    }

    pub fn with_honoree(mut self, honoree: Honoree) -> Self {
        self.honoree = honoree;
        self
    }

    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_time_scale(mut self, scale: f64) -> Self {
        self.time_scale = scale;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_player_command(mut self, command: impl Into<String>) -> Self {
        self.player_command = Some(command.into());
        self
    }

    /// Read a JSON config file. Missing fields take their defaults.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Build the effective config: defaults, then the file (`path` or
    /// `SURPRISE_CONFIG`), then environment overrides, then validation.
    pub async fn resolve(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_VAR).map(PathBuf::from));
        let config = match path {
            Some(path) => Self::load(path).await?,
            None => Self::default(),
        };
        let config = config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `SURPRISE_*` overrides from the process environment.
    pub fn apply_env(self) -> Result<Self, ConfigError> {
        self.apply_vars(|var| std::env::var(var).ok())
    }

    /// Apply overrides from `lookup`, keyed by variable name.
    pub fn apply_vars(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        if let Some(dir) = lookup(ASSET_DIR_VAR) {
            self.asset_dir = PathBuf::from(dir);
        }
        if let Some(video) = lookup(VIDEO_VAR) {
            self.video = video;
        }
        if let Some(value) = lookup(TIME_SCALE_VAR) {
            self.time_scale = value.trim().parse().map_err(|_| ConfigError::InvalidVar {
                var: TIME_SCALE_VAR,
                value: value.clone(),
            })?;
        }
        if let Some(player) = lookup(PLAYER_VAR) {
            self.player_command = Some(player).filter(|p| !p.trim().is_empty());
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.photos.is_empty() {
            return Err(ConfigError::Invalid("photo list is empty".to_string()));
        }
        if self.video.trim().is_empty() {
            return Err(ConfigError::Invalid("video path is empty".to_string()));
        }
        if !self.time_scale.is_finite() || self.time_scale < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "time_scale must be a non-negative number, got {}",
                self.time_scale
            )));
        }
        self.catalog
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}
