//! Event handling for the surprise TUI

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use surprise_core::{Plan, SceneId};

use crate::app::App;

/// Result of handling an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    Continue,
    Quit,
    NeedsRedraw,
    /// The go-back button was pressed; draw its new label, then wait for the preload.
    AwaitPreload,
    /// Fetch the video and start playback.
    PlayVideo,
}

/// Handle a terminal event
pub fn handle_event(app: &mut App, event: Event) -> EventResult {
    match event {
        Event::Key(key) if key.kind != KeyEventKind::Release => handle_key_event(app, key),
        Event::Resize(_, _) => EventResult::NeedsRedraw,
        _ => EventResult::Continue,
    }
}

/// Handle a key event
fn handle_key_event(app: &mut App, key: KeyEvent) -> EventResult {
    // Global shortcuts (always work)
    if let (KeyCode::Char('c'), KeyModifiers::CONTROL) = (key.code, key.modifiers) {
        return EventResult::Quit;
    }

    if app.session.stage().video.open {
        return handle_video_key(app, key);
    }

    match key.code {
        KeyCode::Char('q') => EventResult::Quit,
        KeyCode::Esc if matches!(app.scene(), SceneId::Start | SceneId::Letter) => {
            EventResult::Quit
        }

        // Navigation
        KeyCode::Char('j') | KeyCode::Down => {
            if app.entry_count() > 1 {
                app.cursor_down();
            } else {
                app.scroll_down(1);
            }
            EventResult::NeedsRedraw
        }
        KeyCode::Char('k') | KeyCode::Up => {
            if app.entry_count() > 1 {
                app.cursor_up();
            } else {
                app.scroll_up(1);
            }
            EventResult::NeedsRedraw
        }
        KeyCode::PageDown => {
            app.scroll_down(10);
            EventResult::NeedsRedraw
        }
        KeyCode::PageUp => {
            app.scroll_up(10);
            EventResult::NeedsRedraw
        }

        KeyCode::Enter | KeyCode::Char(' ') => activate(app),
        KeyCode::Char(c @ '1'..='9') => {
            let index = c as usize - '1' as usize;
            if index < app.entry_count() {
                app.cursor = index;
                activate(app)
            } else {
                EventResult::Continue
            }
        }
        KeyCode::Char('v') if app.scene() == SceneId::Letter => EventResult::PlayVideo,

        _ => EventResult::Continue,
    }
}

/// Handle keys while the video modal is open
fn handle_video_key(app: &mut App, key: KeyEvent) -> EventResult {
    match key.code {
        KeyCode::Char('x') | KeyCode::Esc => {
            app.close_video();
            EventResult::NeedsRedraw
        }
        KeyCode::Char('v') => EventResult::PlayVideo,
        KeyCode::Char('q') => EventResult::Quit,
        _ => EventResult::Continue,
    }
}

/// Press whatever the cursor is on
fn activate(app: &mut App) -> EventResult {
    let cursor = app.cursor;
    let catalog = app.session.choices().catalog().clone();

    match app.scene() {
        SceneId::Start => {
            let result = app.session.start();
            app.report(result);
        }
        SceneId::FakeLoading => {
            if !app.session.stage().load_error_visible {
                return EventResult::Continue;
            }
            let result = app.session.prepare_go_back();
            if app.report(result) == Some(true) {
                return EventResult::AwaitPreload;
            }
        }
        SceneId::Photos => return EventResult::Continue,
        SceneId::IsItOver => {
            let result = app.session.answer_is_it_over();
            app.report(result);
        }
        SceneId::IslandItems => {
            let result = match catalog.item_ids().get(cursor) {
                Some(item) => app.session.toggle_item(*item).map(|_| ()),
                None => app.session.continue_items(),
            };
            app.report(result);
        }
        SceneId::IslandPerson => {
            let result = match catalog.person_ids().get(cursor) {
                Some(person) => app.session.select_person(*person).map(|_| ()),
                None => app.session.continue_person(),
            };
            app.report(result);
        }
        SceneId::Dilemma => {
            let result = if cursor == 0 {
                app.session.escape()
            } else {
                app.session.stay()
            };
            app.report(result);
        }
        SceneId::EscapePeople => {
            let option = app
                .session
                .choices()
                .escapee_selection()
                .and_then(|s| s.options().get(cursor).copied());
            let result = match option {
                Some(person) => app.session.toggle_escapee(person).map(|_| ()),
                None => app.session.continue_escapees(),
            };
            app.report(result);
        }
        SceneId::ActivityPlan => {
            if let Some(plan) = Plan::all().get(cursor).copied() {
                let result = app.session.choose_plan(plan).map(|_| ());
                app.report(result);
            }
        }
        SceneId::FinalStory => {
            let result = app.session.read_envelope();
            app.report(result);
        }
        SceneId::Letter => return EventResult::PlayVideo,
    }

    app.sync();
    EventResult::NeedsRedraw
}
