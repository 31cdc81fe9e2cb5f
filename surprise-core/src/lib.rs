//! Scene flow and story engine for an interactive birthday surprise.
//!
//! This crate provides:
//! - A scene controller with exactly one active scene at a time
//! - Cancellable scene timers (fake loading, falling photos)
//! - Gated island choices and the story they produce
//! - Photo preloading and a cached birthday video
//!
//! # Quick Start
//!
//! ```ignore
//! use surprise_core::{Plan, SurpriseConfig, SurpriseSession};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SurpriseConfig::resolve(None).await?;
//!     let mut session = SurpriseSession::new(config)?;
//!
//!     session.start()?;
//!     while let Some(event) = session.next_cue().await {
//!         session.apply_cue(event);
//!         if session.stage().load_error_visible {
//!             break;
//!         }
//!     }
//!     session.go_back().await?;
//!     Ok(())
//! }
//! ```

pub mod assets;
pub mod choices;
pub mod config;
pub mod headless;
pub mod scene;
pub mod scheduler;
pub mod session;
pub mod story;
pub mod testing;
pub mod timeline;
pub mod video;

// Primary public API
pub use assets::{AssetError, AssetSource, FsAssets};
pub use choices::{Catalog, ChoiceError, ChoiceRecord, Dilemma, Gate, ItemId, PersonId, Plan};
pub use config::{ConfigError, SurpriseConfig};
pub use headless::{run_headless, HeadlessChoices, HeadlessReport, VideoOutcome};
pub use scene::{SceneController, SceneError, SceneId};
pub use session::{SessionError, Stage, SurpriseSession};
pub use story::{render_story, Honoree};
pub use testing::{MockAssets, TestHarness};
pub use timeline::{Cue, FallingPhoto};
pub use video::{VideoHandle, VideoModal};
