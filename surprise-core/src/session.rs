//! SurpriseSession - the context object behind every scene handler.
//!
//! The session owns the scene controller, the choice accumulator, the cue
//! timers and the assets. Front-ends call one method per button and read
//! [`Stage`] to decide what to draw.

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::assets::{AssetError, AssetSource, FsAssets, PreloadHandle};
use crate::choices::{ChoiceAccumulator, ChoiceError, ChoiceRecord, Dilemma, Gate, ItemId, PersonId, Plan};
use crate::config::{ConfigError, SurpriseConfig};
use crate::scene::{SceneController, SceneError, SceneId, Transition};
use crate::scheduler::{CueEvent, CueScheduler};
use crate::story::{activity_question, dilemma_question, render_story};
use crate::timeline::{
    fake_loading_timeline, is_it_over_timeline, photo_timeline, Cue, FallingPhoto, ScheduledCue,
};
use crate::video::{VideoCache, VideoHandle, VideoModal};

/// Label of the button on the first fake error.
pub const GO_BACK_LABEL: &str = "Geri dön";

/// Label shown while the photos finish loading.
pub const PREPARING_PHOTOS_LABEL: &str = "Fotoğraflar Hazırlanıyor...";

/// The two answers offered on the "is it over?" scene.
pub const IS_IT_OVER_LABELS: [&str; 2] = ["Bitmedi ki", "Başka ne var?"];

/// What both answers turn into once one is picked.
pub const NOT_OVER_LABEL: &str = "Bitmemiş Bitmemiş";

/// How often a cue wait rechecks whether any timers are left.
const CUE_RECHECK: Duration = Duration::from_millis(50);

/// Errors from session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Choice error: {0}")]
    Choice(#[from] ChoiceError),

    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("{action} is only available on the {expected} scene (current: {actual})")]
    WrongScene {
        action: &'static str,
        expected: SceneId,
        actual: SceneId,
    },

    #[error("the go-back button has not been pressed")]
    GoBackNotPressed,

    #[error("no timers left while waiting for {0}")]
    Stalled(&'static str),
}

/// Everything visible besides which scene is active.
#[derive(Debug, Clone)]
pub struct Stage {
    /// The fake loading text has been replaced by the first error.
    pub load_error_visible: bool,
    pub go_back_label: &'static str,
    pub go_back_disabled: bool,
    /// The second error has faded in over the photos.
    pub photo_error_visible: bool,
    /// Photos dropped so far, in drop order.
    pub photos: Vec<FallingPhoto>,
    pub is_it_over_answered: bool,
    pub dilemma_question: String,
    pub activity_question: String,
    pub story: Option<String>,
    /// Images the preload delivered, once awaited.
    pub preloaded: usize,
    pub preload_failure: Option<String>,
    pub video: VideoModal,
}

impl Default for Stage {
    fn default() -> Self {
        Self {
            load_error_visible: false,
            go_back_label: GO_BACK_LABEL,
            go_back_disabled: false,
            photo_error_visible: false,
            photos: Vec::new(),
            is_it_over_answered: false,
            dilemma_question: String::new(),
            activity_question: String::new(),
            story: None,
            preloaded: 0,
            preload_failure: None,
            video: VideoModal::default(),
        }
    }
}

impl Stage {
    /// Current labels of the two "is it over?" answers.
    pub fn is_it_over_labels(&self) -> [&'static str; 2] {
        if self.is_it_over_answered {
            [NOT_OVER_LABEL; 2]
        } else {
            IS_IT_OVER_LABELS
        }
    }
}

/// A birthday surprise session.
pub struct SurpriseSession {
    id: Uuid,
    config: SurpriseConfig,
    source: Arc<dyn AssetSource>,
    scenes: SceneController,
    choices: ChoiceAccumulator,
    scheduler: CueScheduler,
    cues: mpsc::UnboundedReceiver<CueEvent>,
    preload: Option<PreloadHandle>,
    video: VideoCache,
    rng: StdRng,
    stage: Stage,
    history: Vec<SceneId>,
}

impl SurpriseSession {
    /// Create a session reading assets from the configured directory.
    pub fn new(config: SurpriseConfig) -> Result<Self, SessionError> {
        let source = Arc::new(FsAssets::new(config.asset_dir.clone()));
        Self::with_source(config, source)
    }

    /// Create a session with a custom asset source.
    pub fn with_source(
        config: SurpriseConfig,
        source: Arc<dyn AssetSource>,
    ) -> Result<Self, SessionError> {
        config.validate()?;

        let (scheduler, cues) = CueScheduler::new(config.time_scale);
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let scenes = SceneController::new();
        let id = Uuid::new_v4();
        info!(session = %id, scene = %scenes.active(), "session started");

        Ok(Self {
            id,
            choices: ChoiceAccumulator::new(config.catalog.clone()),
            config,
            source,
            history: vec![scenes.active()],
            scenes,
            scheduler,
            cues,
            preload: None,
            video: VideoCache::new(),
            rng,
            stage: Stage::default(),
        })
    }

    // =========================================================================
    // State queries
    // =========================================================================

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &SurpriseConfig {
        &self.config
    }

    pub fn scene(&self) -> SceneId {
        self.scenes.active()
    }

    pub fn scenes(&self) -> &SceneController {
        &self.scenes
    }

    pub fn choices(&self) -> &ChoiceAccumulator {
        &self.choices
    }

    pub fn record(&self) -> &ChoiceRecord {
        self.choices.record()
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    /// Every scene entered so far, in order, starting with `start`.
    pub fn history(&self) -> &[SceneId] {
        &self.history
    }

    pub fn pending_cues(&self) -> usize {
        self.scheduler.pending()
    }

    /// Photo URL for a 1-based photo index.
    pub fn photo_url(&self, index: usize) -> Option<&str> {
        index
            .checked_sub(1)
            .and_then(|i| self.config.photos.get(i))
            .map(String::as_str)
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Switch scenes, cancelling every cue the old scene left behind.
    pub fn transition_to(&mut self, scene: SceneId) -> Transition {
        let cancelled = self.scheduler.cancel_all();
        let transition = self.scenes.transition_to(scene);
        self.history.push(scene);
        info!(
            session = %self.id,
            from = %transition.from,
            to = %transition.to,
            epoch = transition.epoch,
            scroll_locked = transition.scroll_locked,
            cancelled,
            "scene transition"
        );
        transition
    }

    /// Switch scenes by key or element id.
    pub fn transition_to_key(&mut self, key: &str) -> Result<Transition, SessionError> {
        let scene: SceneId = key.parse()?;
        Ok(self.transition_to(scene))
    }

    fn expect_scene(&self, action: &'static str, expected: SceneId) -> Result<(), SessionError> {
        let actual = self.scenes.active();
        if actual == expected {
            Ok(())
        } else {
            Err(SessionError::WrongScene {
                action,
                expected,
                actual,
            })
        }
    }

    fn schedule(&mut self, cues: Vec<ScheduledCue>) {
        self.scheduler.schedule(self.scenes.epoch(), cues);
    }

    // =========================================================================
    // Opening: fake loading and photos
    // =========================================================================

    /// Start button: show the fake loading screen and begin preloading photos.
    pub fn start(&mut self) -> Result<(), SessionError> {
        self.expect_scene("start", SceneId::Start)?;
        self.transition_to(SceneId::FakeLoading);
        self.preload = Some(PreloadHandle::spawn(
            Arc::clone(&self.source),
            self.config.photos.clone(),
        ));
        self.schedule(fake_loading_timeline());
        Ok(())
    }

    /// Go-back button: wait for the preload, then play the photos.
    pub async fn go_back(&mut self) -> Result<(), SessionError> {
        if self.prepare_go_back()? {
            self.finish_go_back().await?;
        }
        Ok(())
    }

    /// First half of [`go_back`](Self::go_back): relabel and disable the button.
    ///
    /// Returns `false` if the button was already pressed.
    pub fn prepare_go_back(&mut self) -> Result<bool, SessionError> {
        self.expect_scene("go back", SceneId::FakeLoading)?;
        if self.stage.go_back_disabled {
            return Ok(false);
        }
        self.stage.go_back_label = PREPARING_PHOTOS_LABEL;
        self.stage.go_back_disabled = true;
        Ok(true)
    }

    /// Second half of [`go_back`](Self::go_back): await the preload and start the photos.
    ///
    /// Only valid on the fake loading scene after [`prepare_go_back`](Self::prepare_go_back).
    pub async fn finish_go_back(&mut self) -> Result<(), SessionError> {
        self.expect_scene("finish go back", SceneId::FakeLoading)?;
        if !self.stage.go_back_disabled {
            return Err(SessionError::GoBackNotPressed);
        }
        self.await_preload().await;
        self.start_photo_sequence();
        Ok(())
    }

    /// Wait for the preload started by [`start`](Self::start).
    ///
    /// A failed preload is recorded and otherwise ignored.
    async fn await_preload(&mut self) {
        let Some(preload) = self.preload.take() else {
            return;
        };
        match preload.wait().await {
            Ok(images) => {
                info!(session = %self.id, count = images.len(), "all images loaded");
                self.stage.preloaded = images.len();
            }
            Err(e) => {
                warn!(session = %self.id, error = %e, "preload failed, continuing anyway");
                self.stage.preload_failure = Some(e.to_string());
            }
        }
    }

    /// Show the photo scene and schedule the falling photos.
    pub fn start_photo_sequence(&mut self) {
        self.transition_to(SceneId::Photos);
        self.schedule(photo_timeline(self.config.photos.len()));
    }

    /// Either "is it over?" answer. Returns `false` if already answered.
    pub fn answer_is_it_over(&mut self) -> Result<bool, SessionError> {
        self.expect_scene("answer", SceneId::IsItOver)?;
        if self.stage.is_it_over_answered {
            return Ok(false);
        }
        self.stage.is_it_over_answered = true;
        self.schedule(is_it_over_timeline());
        Ok(true)
    }

    // =========================================================================
    // Island choices
    // =========================================================================

    pub fn toggle_item(&mut self, item: ItemId) -> Result<Gate, SessionError> {
        self.expect_scene("item selection", SceneId::IslandItems)?;
        Ok(self.choices.toggle_item(item))
    }

    pub fn continue_items(&mut self) -> Result<(), SessionError> {
        self.expect_scene("continue", SceneId::IslandItems)?;
        self.choices.confirm_items()?;
        self.transition_to(SceneId::IslandPerson);
        Ok(())
    }

    pub fn select_person(&mut self, person: PersonId) -> Result<Gate, SessionError> {
        self.expect_scene("person selection", SceneId::IslandPerson)?;
        Ok(self.choices.select_person(person))
    }

    pub fn continue_person(&mut self) -> Result<(), SessionError> {
        self.expect_scene("continue", SceneId::IslandPerson)?;
        let person = self.choices.confirm_person()?;
        let name = self.choices.catalog().person_name(person);
        self.stage.dilemma_question = dilemma_question(name);
        self.transition_to(SceneId::Dilemma);
        Ok(())
    }

    pub fn escape(&mut self) -> Result<(), SessionError> {
        self.expect_scene("escape", SceneId::Dilemma)?;
        self.choices.choose_dilemma(Dilemma::Escaped)?;
        self.transition_to(SceneId::EscapePeople);
        Ok(())
    }

    pub fn stay(&mut self) -> Result<(), SessionError> {
        self.expect_scene("stay", SceneId::Dilemma)?;
        self.choices.choose_dilemma(Dilemma::Stayed)?;
        self.stage.activity_question = activity_question(Dilemma::Stayed).to_string();
        self.transition_to(SceneId::ActivityPlan);
        Ok(())
    }

    pub fn toggle_escapee(&mut self, person: PersonId) -> Result<Gate, SessionError> {
        self.expect_scene("escapee selection", SceneId::EscapePeople)?;
        Ok(self.choices.toggle_escapee(person)?)
    }

    pub fn continue_escapees(&mut self) -> Result<(), SessionError> {
        self.expect_scene("continue", SceneId::EscapePeople)?;
        self.choices.confirm_escapees()?;
        self.stage.activity_question = activity_question(Dilemma::Escaped).to_string();
        self.transition_to(SceneId::ActivityPlan);
        Ok(())
    }

    /// Plan button: finalize the choices and tell the story.
    pub fn choose_plan(&mut self, plan: Plan) -> Result<&str, SessionError> {
        self.expect_scene("plan", SceneId::ActivityPlan)?;
        let choices = self.choices.choose_plan(plan)?;
        let story = render_story(&choices, self.choices.catalog(), &self.config.honoree);
        debug!(session = %self.id, plan = %plan, length = story.len(), "story rendered");
        self.transition_to(SceneId::FinalStory);
        Ok(self.stage.story.insert(story).as_str())
    }

    pub fn read_envelope(&mut self) -> Result<(), SessionError> {
        self.expect_scene("read envelope", SceneId::FinalStory)?;
        self.transition_to(SceneId::Letter);
        Ok(())
    }

    // =========================================================================
    // Video
    // =========================================================================

    /// Open the video modal and start playback.
    ///
    /// The first call fetches the video; later calls reuse the cached
    /// handle. A failed fetch leaves the modal open with the error note and
    /// returns `None`.
    pub async fn play_video(&mut self) -> Result<Option<VideoHandle>, SessionError> {
        self.expect_scene("play video", SceneId::Letter)?;
        self.stage.video.show();
        match self
            .video
            .get_or_fetch(self.source.as_ref(), &self.config.video)
            .await
        {
            Ok(handle) => {
                let handle = handle.clone();
                self.stage.video.started();
                Ok(Some(handle))
            }
            Err(e) => {
                self.stage.video.failed(&self.config.video, &e);
                Ok(None)
            }
        }
    }

    /// Close the modal, pausing and rewinding.
    pub fn close_video(&mut self) {
        self.stage.video.close();
    }

    // =========================================================================
    // Cues
    // =========================================================================

    /// Wait for the next fired cue.
    ///
    /// Returns `None` once no timers are pending and nothing is buffered.
    pub async fn next_cue(&mut self) -> Option<CueEvent> {
        loop {
            // Checked before reading so a timer finishing in between is not missed.
            let idle = self.scheduler.pending() == 0;
            match self.cues.try_recv() {
                Ok(event) => return Some(event),
                Err(_) if idle => return None,
                Err(_) => {}
            }
            if let Ok(event) = tokio::time::timeout(CUE_RECHECK, self.cues.recv()).await {
                return event;
            }
        }
    }

    /// Take every cue that has already fired.
    pub fn drain_cues(&mut self) -> Vec<CueEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.cues.try_recv() {
            events.push(event);
        }
        events
    }

    /// Apply every cue that has already fired. Returns how many took effect.
    pub fn poll_cues(&mut self) -> usize {
        self.drain_cues()
            .into_iter()
            .filter(|event| self.apply_cue(*event))
            .count()
    }

    /// Apply a fired cue. Cues from an earlier scene epoch are dropped.
    pub fn apply_cue(&mut self, event: CueEvent) -> bool {
        if event.epoch != self.scenes.epoch() {
            debug!(
                session = %self.id,
                cue = ?event.cue,
                cue_epoch = event.epoch,
                epoch = self.scenes.epoch(),
                "dropping stale cue"
            );
            return false;
        }

        debug!(session = %self.id, cue = ?event.cue, "applying cue");
        match event.cue {
            Cue::RevealLoadError => self.stage.load_error_visible = true,
            Cue::RevealPhotoError => self.stage.photo_error_visible = true,
            Cue::DropPhoto { index } => {
                if self.photo_url(index).is_none() {
                    warn!(session = %self.id, index, "no photo for index");
                    return false;
                }
                let photo = FallingPhoto::random(index, &mut self.rng);
                self.stage.photos.push(photo);
            }
            Cue::Advance(scene) => {
                self.transition_to(scene);
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockAssets;

    fn session() -> SurpriseSession {
        SurpriseSession::with_source(
            SurpriseConfig::default().with_seed(1),
            Arc::new(MockAssets::with_photos(9)),
        )
        .unwrap()
    }

    #[test]
    fn test_handlers_are_bound_to_their_scene() {
        let mut session = session();
        let err = session.read_envelope().unwrap_err();
        assert!(matches!(
            err,
            SessionError::WrongScene {
                expected: SceneId::FinalStory,
                actual: SceneId::Start,
                ..
            }
        ));
        assert_eq!(session.scene(), SceneId::Start);
    }

    #[test]
    fn test_stale_cues_are_dropped() {
        let mut session = session();
        session.transition_to(SceneId::Photos);
        let stale = CueEvent {
            epoch: session.scenes().epoch() - 1,
            cue: Cue::Advance(SceneId::IsItOver),
        };
        assert!(!session.apply_cue(stale));
        assert_eq!(session.scene(), SceneId::Photos);
    }

    #[test]
    fn test_drop_photo_out_of_range_is_ignored() {
        let mut session = session();
        let event = CueEvent {
            epoch: session.scenes().epoch(),
            cue: Cue::DropPhoto { index: 10 },
        };
        assert!(!session.apply_cue(event));
        assert!(session.stage().photos.is_empty());
    }

    #[test]
    fn test_transition_by_key() {
        let mut session = session();
        session.transition_to_key("scene-letter").unwrap();
        assert_eq!(session.scene(), SceneId::Letter);
        assert!(session.transition_to_key("scene-cake").is_err());
        assert_eq!(session.history(), &[SceneId::Start, SceneId::Letter]);
    }

    #[test]
    fn test_photo_urls_are_one_based() {
        let session = session();
        assert_eq!(session.photo_url(0), None);
        assert_eq!(session.photo_url(1), Some("1.png"));
        assert_eq!(session.photo_url(9), Some("9.png"));
        assert_eq!(session.photo_url(10), None);
    }

    #[test]
    fn test_is_it_over_labels() {
        let mut stage = Stage::default();
        assert_eq!(stage.is_it_over_labels(), IS_IT_OVER_LABELS);
        stage.is_it_over_answered = true;
        assert_eq!(stage.is_it_over_labels(), [NOT_OVER_LABEL, NOT_OVER_LABEL]);
    }
}
