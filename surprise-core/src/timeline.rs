//! Timed cues played on scene entry.
//!
//! Each timeline is a list of cues with offsets from the moment the scene
//! was entered. The [`CueScheduler`](crate::scheduler::CueScheduler) turns
//! them into cancellable timers.

use rand::Rng;
use std::time::Duration;

use crate::scene::SceneId;

/// Photos dropped before the second error appears.
pub const FIRST_WAVE: usize = 4;

const FIRST_WAVE_SPACING: Duration = Duration::from_millis(2000);
const PHOTO_ERROR_AT: Duration = Duration::from_millis(7000);
const SECOND_WAVE_AT: Duration = Duration::from_millis(9000);
const SECOND_WAVE_SPACING: Duration = Duration::from_millis(1800);
const PHOTOS_END_AT: Duration = Duration::from_millis(20000);
const LOAD_ERROR_AT: Duration = Duration::from_millis(2000);
const IS_IT_OVER_DELAY: Duration = Duration::from_millis(500);

/// Something that happens at a fixed offset into a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    /// Swap the loading text for the first fake error.
    RevealLoadError,
    /// Drop the photo with this 1-based index.
    DropPhoto { index: usize },
    /// Fade in the second fake error over the photos.
    RevealPhotoError,
    /// Move on to another scene.
    Advance(SceneId),
}

/// A cue and its offset from scene entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledCue {
    pub after: Duration,
    pub cue: Cue,
}

impl ScheduledCue {
    pub fn new(after: Duration, cue: Cue) -> Self {
        Self { after, cue }
    }
}

/// The fake loading screen gives up after two seconds.
pub fn fake_loading_timeline() -> Vec<ScheduledCue> {
    vec![ScheduledCue::new(LOAD_ERROR_AT, Cue::RevealLoadError)]
}

/// The falling photo show.
///
/// The first [`FIRST_WAVE`] photos fall two seconds apart, then the
/// second error fades in, then the rest fall 1.8 seconds apart. The
/// scene always ends at twenty seconds.
pub fn photo_timeline(photo_count: usize) -> Vec<ScheduledCue> {
    let mut cues = Vec::with_capacity(photo_count + 2);

    for index in 1..=photo_count.min(FIRST_WAVE) {
        cues.push(ScheduledCue::new(
            FIRST_WAVE_SPACING * (index as u32 - 1),
            Cue::DropPhoto { index },
        ));
    }

    cues.push(ScheduledCue::new(PHOTO_ERROR_AT, Cue::RevealPhotoError));

    for index in FIRST_WAVE + 1..=photo_count {
        cues.push(ScheduledCue::new(
            SECOND_WAVE_AT + SECOND_WAVE_SPACING * (index - FIRST_WAVE - 1) as u32,
            Cue::DropPhoto { index },
        ));
    }

    cues.push(ScheduledCue::new(
        PHOTOS_END_AT,
        Cue::Advance(SceneId::IsItOver),
    ));
    cues
}

/// Answering "is it over?" moves on after half a second.
pub fn is_it_over_timeline() -> Vec<ScheduledCue> {
    vec![ScheduledCue::new(
        IS_IT_OVER_DELAY,
        Cue::Advance(SceneId::IslandItems),
    )]
}

/// A photo falling across the screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FallingPhoto {
    /// 1-based index into the photo list.
    pub index: usize,
    /// Horizontal position, percent of the scene width.
    pub left_percent: f32,
    pub fall_duration: Duration,
}

impl FallingPhoto {
    /// Place a photo somewhere between 10% and 90% across, falling for 6 to 10 seconds.
    pub fn random(index: usize, rng: &mut impl Rng) -> Self {
        Self {
            index,
            left_percent: rng.gen_range(10.0..90.0),
            fall_duration: Duration::from_secs_f32(rng.gen_range(6.0..10.0)),
        }
    }

    /// How far down the photo is after `elapsed`, from 0.0 (top) to 1.0 (gone).
    pub fn progress(&self, elapsed: Duration) -> f32 {
        if self.fall_duration.is_zero() {
            return 1.0;
        }
        (elapsed.as_secs_f32() / self.fall_duration.as_secs_f32()).min(1.0)
    }
}
