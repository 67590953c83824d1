use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::error::GameError;

/// Smallest grid axis that leaves room for a starting snake and a turn
pub const MIN_GRID_SIZE: usize = 4;

/// Largest grid axis; keeps cell coordinates in `i32` and bounds the food scan
pub const MAX_GRID_SIZE: usize = 1024;

/// Configuration for the game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Width of the game grid
    pub grid_width: usize,
    /// Height of the game grid
    pub grid_height: usize,
    /// Initial length of the snake
    pub initial_snake_length: usize,
    /// Points awarded per food
    pub food_reward: u32,
    /// Logical time between simulation steps
    pub tick_interval_ms: u64,
    /// Time between display frames
    pub frame_interval_ms: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_width: 20,
            grid_height: 20,
            initial_snake_length: 3,
            food_reward: 1,
            tick_interval_ms: 150,
            frame_interval_ms: 16,
        }
    }
}

impl GameConfig {
    /// Create a new configuration with custom grid size
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            grid_width: width,
            grid_height: height,
            ..Default::default()
        }
    }

    /// Create a small grid for testing
    pub fn small() -> Self {
        Self::new(10, 10)
    }

    /// Read a JSON config file; missing fields fall back to defaults
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        let config: GameConfig = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse config {:?}", path))?;
        Ok(config)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    pub fn validate(&self) -> Result<(), GameError> {
        let playable = MIN_GRID_SIZE..=MAX_GRID_SIZE;
        if !playable.contains(&self.grid_width) || !playable.contains(&self.grid_height) {
            return Err(GameError::InvalidDimensions {
                width: self.grid_width,
                height: self.grid_height,
                min: MIN_GRID_SIZE,
                max: MAX_GRID_SIZE,
            });
        }

        // The body trails left from the centre cell and must stay on the grid.
        let room = self.grid_width / 2 + 1;
        if self.initial_snake_length == 0 || self.initial_snake_length > room {
            return Err(GameError::InvalidSnakeLength {
                length: self.initial_snake_length,
                width: self.grid_width,
            });
        }

        if self.tick_interval_ms == 0 {
            return Err(GameError::InvalidInterval {
                name: "tick_interval_ms",
            });
        }
        if self.frame_interval_ms == 0 {
            return Err(GameError::InvalidInterval {
                name: "frame_interval_ms",
            });
        }

        Ok(())
    }
}
