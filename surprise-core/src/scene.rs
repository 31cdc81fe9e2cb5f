//! Scene controller.
//!
//! Exactly one scene is active at a time. Activating a scene deactivates
//! every other one and sets the scroll lock for the full-screen scenes.
//! The controller does not restrict which scene may follow which; the
//! allowed paths are a property of the handlers wired to each scene.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors from scene lookups.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SceneError {
    #[error("unknown scene: {0}")]
    Unknown(String),
}

/// The fixed set of scenes, in flow order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SceneId {
    Start,
    FakeLoading,
    Photos,
    IsItOver,
    IslandItems,
    IslandPerson,
    Dilemma,
    EscapePeople,
    ActivityPlan,
    FinalStory,
    Letter,
}

impl SceneId {
    /// All scenes, in flow order.
    pub fn all() -> &'static [SceneId] {
        &[
            SceneId::Start,
            SceneId::FakeLoading,
            SceneId::Photos,
            SceneId::IsItOver,
            SceneId::IslandItems,
            SceneId::IslandPerson,
            SceneId::Dilemma,
            SceneId::EscapePeople,
            SceneId::ActivityPlan,
            SceneId::FinalStory,
            SceneId::Letter,
        ]
    }

    /// Short key, e.g. `fake-loading`.
    pub fn key(&self) -> &'static str {
        match self {
            SceneId::Start => "start",
            SceneId::FakeLoading => "fake-loading",
            SceneId::Photos => "photos",
            SceneId::IsItOver => "is-it-over",
            SceneId::IslandItems => "island-items",
            SceneId::IslandPerson => "island-person",
            SceneId::Dilemma => "dilemma",
            SceneId::EscapePeople => "escape-people",
            SceneId::ActivityPlan => "activity-plan",
            SceneId::FinalStory => "final-story",
            SceneId::Letter => "letter",
        }
    }

    /// Page-style element id, e.g. `scene-fake-loading`.
    pub fn element_id(&self) -> String {
        format!("scene-{}", self.key())
    }

    /// Whether this scene is a full-screen, non-scrolling scene.
    pub fn locks_scroll(&self) -> bool {
        matches!(
            self,
            SceneId::Start | SceneId::FakeLoading | SceneId::Photos | SceneId::IsItOver
        )
    }
}

impl fmt::Display for SceneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for SceneId {
    type Err = SceneError;

    /// Accepts either the short key or the `scene-` prefixed element id.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.strip_prefix("scene-").unwrap_or(s);
        SceneId::all()
            .iter()
            .copied()
            .find(|scene| scene.key() == key)
            .ok_or_else(|| SceneError::Unknown(s.to_string()))
    }
}

/// The outcome of a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: SceneId,
    pub to: SceneId,
    /// Epoch of the newly entered scene.
    pub epoch: u64,
    pub scroll_locked: bool,
}

/// Tracks the single active scene and the scroll lock.
#[derive(Debug, Clone)]
pub struct SceneController {
    active: SceneId,
    scroll_locked: bool,
    epoch: u64,
}

impl SceneController {
    pub fn new() -> Self {
        Self {
            active: SceneId::Start,
            scroll_locked: SceneId::Start.locks_scroll(),
            epoch: 0,
        }
    }

    /// Activate `scene`, deactivating every other scene.
    ///
    /// Re-entering the active scene still starts a new epoch.
    pub fn transition_to(&mut self, scene: SceneId) -> Transition {
        let from = self.active;
        self.active = scene;
        self.scroll_locked = scene.locks_scroll();
        self.epoch += 1;
        Transition {
            from,
            to: scene,
            epoch: self.epoch,
            scroll_locked: self.scroll_locked,
        }
    }

    /// Transition by key or element id. Unknown ids leave the state untouched.
    pub fn transition_to_key(&mut self, key: &str) -> Result<Transition, SceneError> {
        let scene = key.parse()?;
        Ok(self.transition_to(scene))
    }

    pub fn active(&self) -> SceneId {
        self.active
    }

    pub fn is_active(&self, scene: SceneId) -> bool {
        self.active == scene
    }

    pub fn scroll_locked(&self) -> bool {
        self.scroll_locked
    }

    /// Incremented on every transition. Used to tell stale timers apart.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Every scene paired with its active flag.
    pub fn visibility(&self) -> impl Iterator<Item = (SceneId, bool)> + '_ {
        SceneId::all()
            .iter()
            .map(move |scene| (*scene, *scene == self.active))
    }
}

impl Default for SceneController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_on_start_scene() {
        let controller = SceneController::new();
        assert_eq!(controller.active(), SceneId::Start);
        assert!(controller.scroll_locked());
        assert_eq!(controller.epoch(), 0);
    }

    #[test]
    fn test_transition_is_exclusive() {
        let mut controller = SceneController::new();
        for scene in SceneId::all() {
            controller.transition_to(*scene);
            let active: Vec<SceneId> = controller
                .visibility()
                .filter(|(_, active)| *active)
                .map(|(s, _)| s)
                .collect();
            assert_eq!(active, vec![*scene]);
        }
    }

    #[test]
    fn test_scroll_lock_follows_scene() {
        let locked = [
            SceneId::Start,
            SceneId::FakeLoading,
            SceneId::Photos,
            SceneId::IsItOver,
        ];
        let mut controller = SceneController::new();
        // Walk backwards too, so the flag has to be cleared as well as set.
        for scene in SceneId::all().iter().chain(SceneId::all().iter().rev()) {
            let transition = controller.transition_to(*scene);
            assert_eq!(controller.scroll_locked(), locked.contains(scene));
            assert_eq!(transition.scroll_locked, controller.scroll_locked());
        }
    }

    #[test]
    fn test_epoch_increments_on_reentry() {
        let mut controller = SceneController::new();
        let first = controller.transition_to(SceneId::Photos);
        let second = controller.transition_to(SceneId::Photos);
        assert_eq!(first.epoch + 1, second.epoch);
        assert_eq!(second.from, SceneId::Photos);
    }

    #[test]
    fn test_parse_keys_and_element_ids() {
        for scene in SceneId::all() {
            assert_eq!(scene.key().parse::<SceneId>().unwrap(), *scene);
            assert_eq!(scene.element_id().parse::<SceneId>().unwrap(), *scene);
        }
    }

    #[test]
    fn test_unknown_key_is_rejected_without_side_effects() {
        let mut controller = SceneController::new();
        controller.transition_to(SceneId::Dilemma);

        let err = controller.transition_to_key("scene-cake").unwrap_err();
        assert_eq!(err, SceneError::Unknown("scene-cake".to_string()));
        assert_eq!(controller.active(), SceneId::Dilemma);
        assert_eq!(controller.epoch(), 1);
    }
}
