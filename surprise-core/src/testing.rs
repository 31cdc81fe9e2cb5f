//! Testing utilities.
//!
//! - `MockAssets` for deterministic asset loading without touching disk
//! - `TestHarness` for driving a session straight to a given scene

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::assets::{AssetError, AssetSource};
use crate::choices::Plan;
use crate::config::SurpriseConfig;
use crate::scene::SceneId;
use crate::session::{SessionError, SurpriseSession};

/// PNG file signature, enough to look like an image.
const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

/// An in-memory asset source.
///
/// URLs that were never added behave like a 404.
#[derive(Debug, Default)]
pub struct MockAssets {
    assets: HashMap<String, Vec<u8>>,
    fetches: AtomicUsize,
}

impl MockAssets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Photos `1.png` through `count.png`.
    pub fn with_photos(count: usize) -> Self {
        (1..=count).fold(Self::new(), |assets, i| {
            assets.with_asset(format!("{i}.png"), PNG_SIGNATURE.to_vec())
        })
    }

    pub fn with_asset(mut self, url: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.assets.insert(url.into(), bytes);
        self
    }

    /// The default video as a few placeholder bytes.
    pub fn with_video(self) -> Self {
        self.with_asset("video.mp4", b"\x00\x00\x00\x18ftypmp42".to_vec())
    }

    /// Make `url` fail to load.
    pub fn missing(mut self, url: &str) -> Self {
        self.assets.remove(url);
        self
    }

    /// Total fetches, successful or not.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AssetSource for MockAssets {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, AssetError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.assets
            .get(url)
            .cloned()
            .ok_or_else(|| AssetError::NotFound {
                url: url.to_string(),
            })
    }
}

/// Drives a session through the flow with fixed choices.
///
/// Timers run at `time_scale` 0, so scenes with cues advance as soon as
/// the cues are pumped.
pub struct TestHarness {
    pub session: SurpriseSession,
    pub assets: Arc<MockAssets>,
}

impl TestHarness {
    /// A session over nine photos and a video, with a fixed seed.
    pub fn new() -> Result<Self, SessionError> {
        Self::with_assets(MockAssets::with_photos(9).with_video())
    }

    pub fn with_assets(assets: MockAssets) -> Result<Self, SessionError> {
        Self::with_config(SurpriseConfig::default(), assets)
    }

    pub fn with_config(config: SurpriseConfig, assets: MockAssets) -> Result<Self, SessionError> {
        let assets = Arc::new(assets);
        let config = config.with_time_scale(0.0).with_seed(7);
        let session = SurpriseSession::with_source(config, assets.clone())?;
        Ok(Self { session, assets })
    }

    /// Apply cues until none are pending.
    pub async fn pump(&mut self) {
        while let Some(event) = self.session.next_cue().await {
            self.session.apply_cue(event);
        }
    }

    /// Advance through the flow until `target` is the active scene.
    ///
    /// Choices made on the way: the first three items, the first person,
    /// staying on the island and the first plan.
    pub async fn advance_to(&mut self, target: SceneId) -> Result<(), SessionError> {
        while self.session.scene() != target {
            self.step().await?;
        }
        Ok(())
    }

    async fn step(&mut self) -> Result<(), SessionError> {
        let catalog = self.session.choices().catalog().clone();
        match self.session.scene() {
            SceneId::Start => self.session.start()?,
            SceneId::FakeLoading => self.session.go_back().await?,
            SceneId::Photos => self.pump().await,
            SceneId::IsItOver => {
                self.session.answer_is_it_over()?;
                self.pump().await;
            }
            SceneId::IslandItems => {
                for item in catalog.item_ids().into_iter().take(3) {
                    self.session.toggle_item(item)?;
                }
                self.session.continue_items()?;
            }
            SceneId::IslandPerson => {
                if let Some(person) = catalog.person_ids().first() {
                    self.session.select_person(*person)?;
                }
                self.session.continue_person()?;
            }
            SceneId::Dilemma => self.session.stay()?,
            SceneId::EscapePeople => {
                let options = self
                    .session
                    .choices()
                    .escapee_selection()
                    .map(|s| s.options().to_vec())
                    .unwrap_or_default();
                for person in options.into_iter().take(2) {
                    self.session.toggle_escapee(person)?;
                }
                self.session.continue_escapees()?;
            }
            SceneId::ActivityPlan => {
                self.session.choose_plan(Plan::HangOut)?;
            }
            SceneId::FinalStory => self.session.read_envelope()?,
            SceneId::Letter => {
                return Err(SessionError::WrongScene {
                    action: "advance",
                    expected: SceneId::FinalStory,
                    actual: SceneId::Letter,
                })
            }
        }
        Ok(())
    }
}
