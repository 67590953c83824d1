use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::action::Direction;

/// A cell on the game grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Neighbouring cell one step away in `direction`
    pub fn moved_in_direction(&self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// True when `other` shares an edge with this cell
    pub fn is_adjacent(&self, other: Position) -> bool {
        (self.x - other.x).abs() + (self.y - other.y).abs() == 1
    }
}

/// Why a game ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    /// Head left the grid
    Wall,
    /// Head ran into the body
    SelfCollision,
    /// Snake covers every cell, nowhere left to put food
    GridFull,
}

impl EndReason {
    pub fn describe(&self) -> &'static str {
        match self {
            EndReason::Wall => "Hit the wall",
            EndReason::SelfCollision => "Ran into yourself",
            EndReason::GridFull => "Grid filled, you win!",
        }
    }
}

/// The snake body, head first
#[derive(Debug, Clone, PartialEq)]
pub struct Snake {
    body: VecDeque<Position>,
    direction: Direction,
}

impl Snake {
    /// Lay out `length` segments starting at `head`, trailing away from `direction`
    pub fn new(head: Position, direction: Direction, length: usize) -> Self {
        let back = direction.opposite();
        let mut body = VecDeque::with_capacity(length.max(1));
        let mut cell = head;
        body.push_back(cell);
        for _ in 1..length {
            cell = cell.moved_in_direction(back);
            body.push_back(cell);
        }

        Self { body, direction }
    }

    pub fn head(&self) -> Position {
        self.body[0]
    }

    pub fn tail(&self) -> Position {
        self.body[self.body.len() - 1]
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Would moving the head onto `pos` hit the body?
    ///
    /// A non-growing move vacates the tail in the same step, so the tail only
    /// counts when `growing` is set.
    pub fn would_collide(&self, pos: Position, growing: bool) -> bool {
        let checked = if growing {
            self.body.len()
        } else {
            self.body.len() - 1
        };
        self.body.iter().take(checked).any(|&segment| segment == pos)
    }

    /// Push a new head, dropping the tail unless the snake grows
    pub fn advance(&mut self, new_head: Position, grow: bool) {
        self.body.push_front(new_head);
        if !grow {
            self.body.pop_back();
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Position> {
        self.body.iter()
    }

    /// Owned copy of the body, head first
    pub fn cells(&self) -> Vec<Position> {
        self.body.iter().copied().collect()
    }
}
