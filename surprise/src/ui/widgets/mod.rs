//! TUI widgets for the surprise scenes

pub mod checklist;
pub mod photos;
pub mod story;
pub mod video_modal;

pub use checklist::{ChecklistEntry, ChecklistWidget};
pub use photos::{PhotoCard, PhotoRainWidget};
pub use story::StoryWidget;
pub use video_modal::VideoModalWidget;
