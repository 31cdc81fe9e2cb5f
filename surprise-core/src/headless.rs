//! Headless surprise runs for programmatic use.
//!
//! Runs the whole flow without a terminal, from choices given by display
//! name. It's designed for:
//! - Previewing the story a set of choices produces
//! - Checking an asset directory before the big day
//! - Script-driven runs in tests
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use surprise_core::headless::{run_headless, HeadlessChoices};
//! use surprise_core::{FsAssets, Plan, SurpriseConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SurpriseConfig::default().with_time_scale(0.0);
//!     let source = Arc::new(FsAssets::new(config.asset_dir.clone()));
//!     let choices = HeadlessChoices::stay(["Telefon", "Kitap", "Hamak"], "Elif", Plan::Sunbathe);
//!
//!     let report = run_headless(config, source, &choices).await?;
//!     println!("{}", report.story);
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::assets::AssetSource;
use crate::choices::{Catalog, ChoiceError, ChoiceRecord, ItemId, PersonId, Plan};
use crate::config::SurpriseConfig;
use crate::scene::SceneId;
use crate::session::{SessionError, SurpriseSession};

/// Choices for a headless run, by display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadlessChoices {
    pub items: Vec<String>,
    pub person: String,
    /// The two people who ran off too. `None` means nobody ran away.
    pub escapees: Option<[String; 2]>,
    pub plan: Plan,
}

impl HeadlessChoices {
    /// Choices where the chosen person stayed on the island.
    pub fn stay(
        items: impl IntoIterator<Item = impl Into<String>>,
        person: impl Into<String>,
        plan: Plan,
    ) -> Self {
        Self {
            items: items.into_iter().map(Into::into).collect(),
            person: person.into(),
            escapees: None,
            plan,
        }
    }

    /// Choices where the chosen person ran away along with two others.
    pub fn escape(
        items: impl IntoIterator<Item = impl Into<String>>,
        person: impl Into<String>,
        escapees: [&str; 2],
        plan: Plan,
    ) -> Self {
        Self {
            items: items.into_iter().map(Into::into).collect(),
            person: person.into(),
            escapees: Some(escapees.map(str::to_string)),
            plan,
        }
    }

    fn resolve(&self, catalog: &Catalog) -> Result<ResolvedChoices, ChoiceError> {
        let items = self
            .items
            .iter()
            .map(|name| catalog.find_item(name))
            .collect::<Result<Vec<_>, _>>()?;
        let person = catalog.find_person(&self.person)?;
        let escapees = match &self.escapees {
            Some([a, b]) => Some([catalog.find_person(a)?, catalog.find_person(b)?]),
            None => None,
        };
        Ok(ResolvedChoices {
            items,
            person,
            escapees,
            plan: self.plan,
        })
    }
}

struct ResolvedChoices {
    items: Vec<ItemId>,
    person: PersonId,
    escapees: Option<[PersonId; 2]>,
    plan: Plan,
}

/// What happened when the video was opened at the end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum VideoOutcome {
    Played { size: usize },
    Failed { note: String },
}

/// Everything a headless run observed.
#[derive(Debug, Clone, Serialize)]
pub struct HeadlessReport {
    pub session_id: Uuid,
    /// Scenes entered, in order, starting with `start`.
    pub scenes: Vec<SceneId>,
    pub record: ChoiceRecord,
    pub story: String,
    pub photos_dropped: usize,
    pub preload_failure: Option<String>,
    pub video: VideoOutcome,
}

/// Run the whole surprise with fixed choices.
///
/// Timed scenes wait for their cues like the interactive flow does, so
/// pass a config with `time_scale` 0 to skip the waits.
pub async fn run_headless(
    config: SurpriseConfig,
    source: Arc<dyn AssetSource>,
    choices: &HeadlessChoices,
) -> Result<HeadlessReport, SessionError> {
    let mut session = SurpriseSession::with_source(config, source)?;
    let resolved = choices.resolve(session.choices().catalog())?;
    info!(session = %session.id(), plan = %choices.plan, "headless run started");

    session.start()?;
    pump_until(&mut session, "the loading error", |s| s.stage().load_error_visible).await?;
    session.go_back().await?;

    pump_until(&mut session, "the is-it-over scene", |s| {
        s.scene() == SceneId::IsItOver
    })
    .await?;
    let photos_dropped = session.stage().photos.len();
    session.answer_is_it_over()?;
    pump_until(&mut session, "the island", |s| s.scene() == SceneId::IslandItems).await?;

    for item in resolved.items {
        session.toggle_item(item)?;
    }
    session.continue_items()?;
    session.select_person(resolved.person)?;
    session.continue_person()?;

    match resolved.escapees {
        Some(escapees) => {
            session.escape()?;
            for person in escapees {
                session.toggle_escapee(person)?;
            }
            session.continue_escapees()?;
        }
        None => session.stay()?,
    }

    let story = session.choose_plan(resolved.plan)?.to_string();
    session.read_envelope()?;

    let video = match session.play_video().await? {
        Some(handle) => VideoOutcome::Played { size: handle.size },
        None => VideoOutcome::Failed {
            note: session.stage().video.error.clone().unwrap_or_default(),
        },
    };
    session.close_video();

    info!(session = %session.id(), scenes = session.history().len(), "headless run finished");
    Ok(HeadlessReport {
        session_id: session.id(),
        scenes: session.history().to_vec(),
        record: session.record().clone(),
        story,
        photos_dropped,
        preload_failure: session.stage().preload_failure.clone(),
        video,
    })
}

/// Apply cues until `done` holds.
async fn pump_until(
    session: &mut SurpriseSession,
    waiting_for: &'static str,
    done: impl Fn(&SurpriseSession) -> bool,
) -> Result<(), SessionError> {
    while !done(session) {
        let event = session
            .next_cue()
            .await
            .ok_or(SessionError::Stalled(waiting_for))?;
        session.apply_cue(event);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockAssets;

    fn fast() -> SurpriseConfig {
        SurpriseConfig::default().with_time_scale(0.0).with_seed(3)
    }

    #[tokio::test]
    async fn test_stayed_run() {
        let assets = Arc::new(MockAssets::with_photos(9).with_video());
        let choices = HeadlessChoices::stay(["Telefon", "Kitap", "Hamak"], "Mert", Plan::HangOut);

        let report = run_headless(fast(), assets, &choices).await.unwrap();

        assert_eq!(
            report.scenes,
            vec![
                SceneId::Start,
                SceneId::FakeLoading,
                SceneId::Photos,
                SceneId::IsItOver,
                SceneId::IslandItems,
                SceneId::IslandPerson,
                SceneId::Dilemma,
                SceneId::ActivityPlan,
                SceneId::FinalStory,
                SceneId::Letter,
            ]
        );
        assert_eq!(report.photos_dropped, 9);
        assert!(report.story.contains("Telefon, Kitap, Hamak"));
        assert!(report.story.contains("Mert"));
        assert_eq!(report.preload_failure, None);
        assert!(matches!(report.video, VideoOutcome::Played { .. }));
    }

    #[tokio::test]
    async fn test_escaped_run_visits_escape_scene() {
        let assets = Arc::new(MockAssets::with_photos(9).with_video());
        let choices = HeadlessChoices::escape(
            ["Powerbank", "Çakı", "Türk kahvesi"],
            "Ece",
            ["Elif", "Kaan"],
            Plan::PostStory,
        );

        let report = run_headless(fast(), assets, &choices).await.unwrap();

        assert!(report.scenes.contains(&SceneId::EscapePeople));
        assert!(report.story.contains("yanımda Ece, Elif ve Kaan"));
    }

    #[tokio::test]
    async fn test_unknown_names_fail_before_starting() {
        let assets = Arc::new(MockAssets::with_photos(9));
        let choices = HeadlessChoices::stay(["Telefon", "Kitap", "Uçak"], "Mert", Plan::HangOut);

        let err = run_headless(fast(), assets.clone(), &choices).await.unwrap_err();

        assert!(matches!(err, SessionError::Choice(ChoiceError::UnknownItem(_))));
        assert_eq!(assets.fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_wrong_item_count_closes_the_gate() {
        let assets = Arc::new(MockAssets::with_photos(9));
        let choices = HeadlessChoices::stay(["Telefon", "Kitap"], "Mert", Plan::HangOut);

        let err = run_headless(fast(), assets, &choices).await.unwrap_err();

        assert!(matches!(
            err,
            SessionError::Choice(ChoiceError::GateClosed {
                selected: 2,
                required: 3
            })
        ));
    }

    #[tokio::test]
    async fn test_missing_video_is_reported() {
        let assets = Arc::new(MockAssets::with_photos(9));
        let choices = HeadlessChoices::stay(["Telefon", "Kitap", "Hamak"], "Mert", Plan::Sunbathe);

        let report = run_headless(fast(), assets, &choices).await.unwrap();

        assert_eq!(
            report.video,
            VideoOutcome::Failed {
                note: "HATA: Video yüklenemedi. Dosya yolunu kontrol edin: video.mp4".to_string()
            }
        );
    }
}
