//! Core game logic module for Snake
//!
//! The engine and its fixed-rate loop have no I/O or rendering dependencies;
//! hosts drive them with direction requests and frame timestamps.

pub mod action;
pub mod config;
pub mod engine;
pub mod error;
pub mod game_loop;
pub mod snapshot;
pub mod state;

// Re-export commonly used types
pub use action::Direction;
pub use config::{GameConfig, MAX_GRID_SIZE, MIN_GRID_SIZE};
pub use engine::{GameEngine, StepInfo, StepResult};
pub use error::GameError;
pub use game_loop::{Frame, GameLoop, LoopState};
pub use snapshot::{Cell, RenderSnapshot};
pub use state::{EndReason, Position, Snake};
