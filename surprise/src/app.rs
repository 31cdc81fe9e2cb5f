//! Main application state and logic

use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use surprise_core::{SceneId, SessionError, SurpriseSession};
use tracing::{info, warn};

use crate::ui::theme::SurpriseTheme;

/// Main application state
pub struct App {
    pub session: SurpriseSession,

    // UI state
    pub theme: SurpriseTheme,
    pub cursor: usize,
    pub scroll: u16,

    // Status
    status_message: Option<String>,
    pub should_quit: bool,

    // Animation
    pub animation_frame: u8,
    seen_epoch: u64,
    photo_drops: Vec<Instant>,

    // Video
    video_path: Option<String>,
    player: Option<Child>,
}

impl App {
    pub fn new(session: SurpriseSession) -> Self {
        let seen_epoch = session.scenes().epoch();
        Self {
            session,
            theme: SurpriseTheme::default(),
            cursor: 0,
            scroll: 0,
            status_message: None,
            should_quit: false,
            animation_frame: 0,
            seen_epoch,
            photo_drops: Vec::new(),
            video_path: None,
            player: None,
        }
    }

    pub fn scene(&self) -> SceneId {
        self.session.scene()
    }

    /// Set a status message
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    pub fn status(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    /// Show a failed action on the status line.
    pub fn report<T>(&mut self, result: Result<T, SessionError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                self.set_status(e.to_string());
                None
            }
        }
    }

    /// Apply fired cues and catch up with whatever they changed.
    pub fn sync(&mut self) {
        self.session.poll_cues();

        let epoch = self.session.scenes().epoch();
        if epoch != self.seen_epoch {
            self.seen_epoch = epoch;
            self.cursor = 0;
            self.scroll = 0;
            self.photo_drops.clear();
            self.clear_status();
        }

        let dropped = self.session.stage().photos.len();
        while self.photo_drops.len() < dropped {
            self.photo_drops.push(Instant::now());
        }
    }

    /// Tick animations
    pub fn tick(&mut self) {
        self.animation_frame = self.animation_frame.wrapping_add(1);
    }

    /// How long ago the `n`th dropped photo started falling.
    pub fn photo_elapsed(&self, n: usize) -> Duration {
        self.photo_drops
            .get(n)
            .map(Instant::elapsed)
            .unwrap_or_default()
    }

    // =========================================================================
    // Cursor and scrolling
    // =========================================================================

    /// Number of selectable entries on the current scene.
    pub fn entry_count(&self) -> usize {
        let choices = self.session.choices();
        match self.scene() {
            SceneId::Start | SceneId::FinalStory | SceneId::Letter => 1,
            SceneId::FakeLoading => usize::from(self.session.stage().load_error_visible),
            SceneId::Photos => 0,
            SceneId::IsItOver | SceneId::Dilemma => 2,
            SceneId::IslandItems => choices.catalog().item_ids().len() + 1,
            SceneId::IslandPerson => choices.catalog().person_ids().len() + 1,
            SceneId::EscapePeople => {
                choices
                    .escapee_selection()
                    .map(|s| s.options().len())
                    .unwrap_or_default()
                    + 1
            }
            SceneId::ActivityPlan => surprise_core::Plan::all().len(),
        }
    }

    pub fn cursor_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_down(&mut self) {
        let last = self.entry_count().saturating_sub(1);
        self.cursor = (self.cursor + 1).min(last);
    }

    /// Scroll up, unless the scene is scroll locked
    pub fn scroll_up(&mut self, lines: u16) {
        if !self.session.scenes().scroll_locked() {
            self.scroll = self.scroll.saturating_sub(lines);
        }
    }

    /// Scroll down, unless the scene is scroll locked
    pub fn scroll_down(&mut self, lines: u16) {
        if !self.session.scenes().scroll_locked() {
            self.scroll = self.scroll.saturating_add(lines);
        }
    }

    // =========================================================================
    // Async actions
    // =========================================================================

    /// Wait for the preload and start the photos.
    pub async fn finish_go_back(&mut self) {
        let result = self.session.finish_go_back().await;
        self.report(result);
        self.sync();
    }

    /// Open the video modal and hand the video to the player.
    pub async fn play_video(&mut self) {
        let result = self.session.play_video().await;
        let Some(handle) = self.report(result).flatten() else {
            return;
        };
        let path = handle.path.display().to_string();
        self.video_path = Some(path.clone());
        self.launch_player(&path);
    }

    /// Close the modal and stop the player.
    pub fn close_video(&mut self) {
        self.session.close_video();
        self.stop_player();
    }

    pub fn video_path(&self) -> Option<&str> {
        self.video_path.as_deref()
    }

    pub fn player_command(&self) -> Option<&str> {
        self.session.config().player_command.as_deref()
    }

    fn launch_player(&mut self, path: &str) {
        self.stop_player();
        let Some(command) = self.player_command().map(str::to_string) else {
            return;
        };
        let mut parts = command.split_whitespace();
        let Some(program) = parts.next() else {
            return;
        };

        let spawned = Command::new(program)
            .args(parts)
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        match spawned {
            Ok(child) => {
                info!(player = %program, pid = child.id(), "video player started");
                self.player = Some(child);
            }
            Err(e) => {
                warn!(player = %program, error = %e, "failed to start video player");
                self.set_status(format!("{program} başlatılamadı: {e}"));
            }
        }
    }

    fn stop_player(&mut self) {
        if let Some(mut child) = self.player.take() {
            // The player may already have exited on its own.
            let _ = child.kill();
            let _ = child.wait();
        }
    }

    /// Release anything running outside the terminal.
    pub fn shutdown(&mut self) {
        self.stop_player();
    }
}
