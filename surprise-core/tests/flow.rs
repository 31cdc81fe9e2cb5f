//! End-to-end flows through the session, with in-memory assets.
//!
//! Timer tests run with tokio's clock paused, so the real scene delays
//! apply without slowing the suite down.

use std::sync::Arc;
use std::time::Duration;

use surprise_core::session::{NOT_OVER_LABEL, PREPARING_PHOTOS_LABEL};
use surprise_core::{
    run_headless, Dilemma, HeadlessChoices, MockAssets, Plan, SceneId, SessionError,
    SurpriseConfig, SurpriseSession, TestHarness,
};

fn paused_session(assets: MockAssets) -> (SurpriseSession, Arc<MockAssets>) {
    let assets = Arc::new(assets);
    let config = SurpriseConfig::default().with_seed(11);
    let session = SurpriseSession::with_source(config, assets.clone()).unwrap();
    (session, assets)
}

/// Apply cues until `scene` is active.
async fn pump_to(session: &mut SurpriseSession, scene: SceneId) {
    while session.scene() != scene {
        let event = session.next_cue().await.expect("ran out of cues");
        session.apply_cue(event);
    }
}

#[tokio::test]
async fn test_stayed_flow_reaches_the_letter() {
    let mut harness = TestHarness::new().unwrap();
    harness.advance_to(SceneId::Letter).await.unwrap();

    let session = &harness.session;
    assert_eq!(session.record().dilemma, Some(Dilemma::Stayed));
    assert!(session.record().escapees.is_empty());
    assert_eq!(session.record().plan, Some(Plan::HangOut));
    assert!(!session.history().contains(&SceneId::EscapePeople));

    let story = session.stage().story.as_deref().unwrap();
    assert!(story.starts_with("Bir gün Zeynep adlı bir kız 22 yaşına"));
    assert!(story.contains("'Hiiç takılırız' yapmaya karar verdi"));
    assert!(!story.contains("yanımda"));
    assert!(story.ends_with("Önüne bir zarf geldi ve zarfı açmaya başladı."));
}

#[tokio::test]
async fn test_escaped_flow_names_everyone() {
    let mut harness = TestHarness::new().unwrap();
    harness.advance_to(SceneId::Dilemma).await.unwrap();

    let catalog = harness.session.choices().catalog().clone();
    let session = &mut harness.session;
    session.escape().unwrap();
    assert_eq!(session.scene(), SceneId::EscapePeople);

    // The chosen person is not offered again.
    let options = session.choices().escapee_selection().unwrap().options().to_vec();
    assert_eq!(options.len(), catalog.person_ids().len() - 1);
    assert!(!options.contains(&catalog.find_person("Elif").unwrap()));

    let defne = catalog.find_person("Defne").unwrap();
    let mert = catalog.find_person("Mert").unwrap();
    session.toggle_escapee(defne).unwrap();
    assert!(session.continue_escapees().is_err());
    assert_eq!(session.scene(), SceneId::EscapePeople);

    session.toggle_escapee(mert).unwrap();
    session.continue_escapees().unwrap();
    assert_eq!(session.scene(), SceneId::ActivityPlan);
    assert_ne!(session.stage().activity_question, "");

    let story = session.choose_plan(Plan::FindActivity).unwrap().to_string();
    assert!(story.contains("kaçtı seçeneğine"));
    // Escapees are listed in catalog order, not click order.
    assert!(story.contains("yanımda Elif, Mert ve Defne olduğu sürece sıkıntı yok"));
}

#[tokio::test]
async fn test_item_gate_needs_exactly_three() {
    let mut harness = TestHarness::new().unwrap();
    harness.advance_to(SceneId::IslandItems).await.unwrap();

    let items = harness.session.choices().catalog().item_ids();
    let session = &mut harness.session;

    for item in &items[..4] {
        session.toggle_item(*item).unwrap();
    }
    let gate = session.choices().items_gate();
    assert_eq!(gate.selected, 4);
    assert!(gate.shows_warning());
    assert!(matches!(
        session.continue_items(),
        Err(SessionError::Choice(_))
    ));

    let gate = session.toggle_item(items[0]).unwrap();
    assert!(gate.is_open());
    session.continue_items().unwrap();
    assert_eq!(session.record().items, items[1..4].to_vec());
    assert_eq!(session.scene(), SceneId::IslandPerson);
}

#[tokio::test]
async fn test_person_must_be_chosen() {
    let mut harness = TestHarness::new().unwrap();
    harness.advance_to(SceneId::IslandPerson).await.unwrap();

    assert!(harness.session.continue_person().is_err());
    assert_eq!(harness.session.scene(), SceneId::IslandPerson);

    let kaan = harness.session.choices().catalog().find_person("Kaan").unwrap();
    harness.session.select_person(kaan).unwrap();
    harness.session.continue_person().unwrap();
    assert!(harness.session.stage().dilemma_question.contains("Kaan"));
}

#[tokio::test(start_paused = true)]
async fn test_fake_loading_reveals_error_after_two_seconds() {
    let (mut session, _) = paused_session(MockAssets::with_photos(9));
    session.start().unwrap();
    assert_eq!(session.scene(), SceneId::FakeLoading);
    assert!(session.scenes().scroll_locked());

    tokio::time::sleep(Duration::from_millis(1999)).await;
    session.poll_cues();
    assert!(!session.stage().load_error_visible);

    tokio::time::sleep(Duration::from_millis(2)).await;
    session.poll_cues();
    assert!(session.stage().load_error_visible);
}

#[tokio::test(start_paused = true)]
async fn test_photo_sequence_timing() {
    let (mut session, _) = paused_session(MockAssets::with_photos(9));
    session.start().unwrap();
    session.go_back().await.unwrap();
    assert_eq!(session.scene(), SceneId::Photos);
    assert_eq!(session.stage().go_back_label, PREPARING_PHOTOS_LABEL);
    assert_eq!(session.stage().preloaded, 9);

    // First wave: photos 1-4 two seconds apart.
    tokio::time::sleep(Duration::from_millis(6001)).await;
    session.poll_cues();
    assert_eq!(session.stage().photos.len(), 4);
    assert!(!session.stage().photo_error_visible);

    tokio::time::sleep(Duration::from_millis(1000)).await;
    session.poll_cues();
    assert!(session.stage().photo_error_visible);

    // Second wave starts at 9 s, 1.8 s apart: the last one lands at 16.2 s.
    tokio::time::sleep(Duration::from_millis(9200)).await;
    session.poll_cues();
    assert_eq!(session.stage().photos.len(), 9);
    let indices: Vec<usize> = session.stage().photos.iter().map(|p| p.index).collect();
    assert_eq!(indices, (1..=9).collect::<Vec<_>>());
    assert_eq!(session.scene(), SceneId::Photos);

    tokio::time::sleep(Duration::from_millis(4000)).await;
    session.poll_cues();
    assert_eq!(session.scene(), SceneId::IsItOver);
    assert_eq!(session.pending_cues(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_leaving_a_scene_cancels_its_timers() {
    let (mut session, _) = paused_session(MockAssets::with_photos(9));
    session.start().unwrap();
    session.go_back().await.unwrap();

    tokio::time::sleep(Duration::from_millis(2500)).await;
    session.poll_cues();
    assert_eq!(session.stage().photos.len(), 2);

    session.transition_to(SceneId::IslandItems);
    assert_eq!(session.pending_cues(), 0);

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(session.poll_cues(), 0);
    assert_eq!(session.scene(), SceneId::IslandItems);
    assert_eq!(session.stage().photos.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_is_it_over_waits_half_a_second() {
    let (mut session, _) = paused_session(MockAssets::with_photos(9));
    session.transition_to(SceneId::IsItOver);

    assert!(session.answer_is_it_over().unwrap());
    assert!(!session.answer_is_it_over().unwrap());
    assert_eq!(session.stage().is_it_over_labels(), [NOT_OVER_LABEL; 2]);

    tokio::time::sleep(Duration::from_millis(499)).await;
    session.poll_cues();
    assert_eq!(session.scene(), SceneId::IsItOver);

    pump_to(&mut session, SceneId::IslandItems).await;
}

#[tokio::test]
async fn test_failed_preload_still_shows_photos() {
    let mut harness = TestHarness::with_assets(MockAssets::with_photos(9).missing("2.png")).unwrap();
    harness.advance_to(SceneId::Photos).await.unwrap();

    let failure = harness.session.stage().preload_failure.clone().unwrap();
    assert!(failure.contains("2.png"));

    harness.pump().await;
    assert_eq!(harness.session.scene(), SceneId::IsItOver);
}

#[tokio::test]
async fn test_go_back_only_runs_once() {
    let mut harness = TestHarness::new().unwrap();
    harness.advance_to(SceneId::FakeLoading).await.unwrap();

    assert!(harness.session.prepare_go_back().unwrap());
    assert!(!harness.session.prepare_go_back().unwrap());
    harness.session.finish_go_back().await.unwrap();
    assert_eq!(harness.session.scene(), SceneId::Photos);
    // Nine photos, preloaded exactly once.
    assert_eq!(harness.assets.fetch_count(), 9);
}

#[tokio::test]
async fn test_finish_go_back_needs_the_button() {
    let mut harness = TestHarness::new().unwrap();
    assert!(matches!(
        harness.session.finish_go_back().await,
        Err(SessionError::WrongScene { .. })
    ));
    assert_eq!(harness.session.scene(), SceneId::Start);

    harness.advance_to(SceneId::FakeLoading).await.unwrap();
    assert!(matches!(
        harness.session.finish_go_back().await,
        Err(SessionError::GoBackNotPressed)
    ));
    assert_eq!(harness.session.scene(), SceneId::FakeLoading);

    harness.advance_to(SceneId::IslandItems).await.unwrap();
    assert!(harness.session.finish_go_back().await.is_err());
    assert_eq!(harness.session.scene(), SceneId::IslandItems);
}

#[tokio::test]
async fn test_huge_time_scale_only_delays_cues() {
    let config = SurpriseConfig::default().with_time_scale(1e300);
    let mut session =
        SurpriseSession::with_source(config, Arc::new(MockAssets::with_photos(9))).unwrap();

    session.start().unwrap();
    assert_eq!(session.scene(), SceneId::FakeLoading);
    assert_eq!(session.pending_cues(), 1);

    tokio::task::yield_now().await;
    assert_eq!(session.poll_cues(), 0);
    assert!(!session.stage().load_error_visible);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_instant_timers_drop_every_photo_on_worker_threads() {
    for seed in 0..25 {
        let config = SurpriseConfig::default().with_time_scale(0.0).with_seed(seed);
        let assets = Arc::new(MockAssets::with_photos(9).with_video());
        let choices = HeadlessChoices::stay(["Telefon", "Kitap", "Hamak"], "Mert", Plan::HangOut);

        let report = run_headless(config, assets, &choices).await.unwrap();
        assert_eq!(report.photos_dropped, 9, "seed {seed}");
        assert_eq!(report.scenes.last(), Some(&SceneId::Letter));
    }
}

#[tokio::test]
async fn test_video_is_fetched_once_across_plays() {
    let mut harness = TestHarness::new().unwrap();
    harness.advance_to(SceneId::Letter).await.unwrap();
    let before = harness.assets.fetch_count();

    let first = harness.session.play_video().await.unwrap().unwrap();
    assert!(harness.session.stage().video.open);
    assert!(harness.session.stage().video.playing);
    harness.session.close_video();
    assert!(!harness.session.stage().video.playing);

    let second = harness.session.play_video().await.unwrap().unwrap();
    assert_eq!(first, second);
    assert_eq!(harness.assets.fetch_count(), before + 1);
    assert_eq!(harness.session.stage().video.plays, 2);
}

#[tokio::test]
async fn test_video_failure_keeps_modal_open() {
    let config = SurpriseConfig::default().with_video("missing.mp4");
    let mut harness = TestHarness::with_config(config, MockAssets::with_photos(9)).unwrap();
    harness.advance_to(SceneId::Letter).await.unwrap();

    assert!(harness.session.play_video().await.unwrap().is_none());
    let modal = &harness.session.stage().video;
    assert!(modal.open);
    assert_eq!(
        modal.error.as_deref(),
        Some("HATA: Video yüklenemedi. Dosya yolunu kontrol edin: missing.mp4")
    );
}

#[tokio::test]
async fn test_only_one_scene_is_ever_active() {
    let mut harness = TestHarness::new().unwrap();
    for scene in [SceneId::Photos, SceneId::IslandPerson, SceneId::Letter] {
        harness.advance_to(scene).await.unwrap();
        let active: Vec<SceneId> = harness
            .session
            .scenes()
            .visibility()
            .filter(|(_, visible)| *visible)
            .map(|(scene, _)| scene)
            .collect();
        assert_eq!(active, vec![scene]);
    }
}
