//! Grid Snake - the classic snake game for the terminal
//!
//! This library provides:
//! - Core game logic: the engine and its fixed-rate loop (game module)
//! - Keyboard mapping (input module)
//! - TUI rendering of frame snapshots (render module)
//! - Per-session stats (metrics module)
//! - The interactive terminal mode (modes module)

pub mod game;
pub mod input;
pub mod metrics;
pub mod modes;
pub mod render;
