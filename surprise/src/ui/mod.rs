//! UI module for the surprise TUI

pub mod render;
pub mod theme;
pub mod widgets;
