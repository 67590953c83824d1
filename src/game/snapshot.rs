use serde::Serialize;

use super::state::{EndReason, Position};

/// What occupies a grid cell in a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Empty,
    Head,
    Body,
    Food,
}

/// Immutable copy of the engine state handed to the renderer once per frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderSnapshot {
    pub width: usize,
    pub height: usize,
    /// Body cells, head first
    pub snake: Vec<Position>,
    pub food: Position,
    pub score: u32,
    pub game_over: bool,
    pub end_reason: Option<EndReason>,
}

impl RenderSnapshot {
    pub fn head(&self) -> Option<Position> {
        self.snake.first().copied()
    }

    /// Row-major grid of cell contents.
    ///
    /// Food is only drawn while the game is running.
    pub fn grid(&self) -> Vec<Vec<Cell>> {
        let mut grid = vec![vec![Cell::Empty; self.width]; self.height];

        let mut mark = |pos: Position, cell: Cell| {
            if pos.x >= 0 && pos.y >= 0 {
                if let Some(slot) = grid
                    .get_mut(pos.y as usize)
                    .and_then(|row| row.get_mut(pos.x as usize))
                {
                    *slot = cell;
                }
            }
        };

        if !self.game_over {
            mark(self.food, Cell::Food);
        }
        for (i, &pos) in self.snake.iter().enumerate() {
            mark(pos, if i == 0 { Cell::Head } else { Cell::Body });
        }

        grid
    }
}
