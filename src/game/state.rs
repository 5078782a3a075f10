use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

use super::direction::Direction;

/// A position on the game grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Move position by delta
    pub fn moved_by(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Move position in a direction
    pub fn moved_in_direction(&self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        self.moved_by(dx, dy)
    }

    /// Fold the position back onto a `width` x `height` torus
    pub fn wrapped(&self, width: usize, height: usize) -> Self {
        Self {
            x: self.x.rem_euclid(width as i32),
            y: self.y.rem_euclid(height as i32),
        }
    }
}

/// The snake in the game
#[derive(Debug, Clone, PartialEq)]
pub struct Snake {
    /// Body segments, with head at the front
    body: VecDeque<Position>,
    /// Direction of the last move
    pub direction: Direction,
    /// Direction committed at the next tick
    pub next_direction: Direction,
}

impl Snake {
    /// Create a one-cell snake
    pub fn new(head: Position, direction: Direction) -> Self {
        Self {
            body: VecDeque::from([head]),
            direction,
            next_direction: direction,
        }
    }

    /// Create a snake from its cells, head first
    #[cfg(test)]
    pub(crate) fn from_body(cells: impl IntoIterator<Item = Position>, direction: Direction) -> Self {
        let body: VecDeque<Position> = cells.into_iter().collect();
        assert!(!body.is_empty(), "snake needs at least one cell");
        Self {
            body,
            direction,
            next_direction: direction,
        }
    }

    /// Get the head position
    pub fn head(&self) -> Position {
        self.body[0]
    }

    /// Iterate over the cells, head first
    pub fn cells(&self) -> impl Iterator<Item = Position> + '_ {
        self.body.iter().copied()
    }

    /// Check if position collides with snake body (excluding head)
    pub fn collides_with_body(&self, pos: Position) -> bool {
        self.body.iter().skip(1).any(|&cell| cell == pos)
    }

    /// Check if position is any snake cell, head included
    pub fn occupies(&self, pos: Position) -> bool {
        self.body.contains(&pos)
    }

    /// Whether turning to `direction` is allowed from the current direction
    pub fn can_turn(&self, direction: Direction) -> bool {
        self.len() == 1 || !self.direction.is_opposite(direction)
    }

    /// Put `new_head` in front, dropping the tail unless growing
    pub fn advance(&mut self, new_head: Position, grow: bool) {
        self.body.push_front(new_head);
        if !grow {
            self.body.pop_back();
        }
    }

    /// Get the length of the snake
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Always false, a snake keeps at least its head
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// A food variant from the fixed catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FoodKind {
    Apple,
    Pizza,
    Burger,
    Star,
}

impl FoodKind {
    pub const ALL: [FoodKind; 4] = [
        FoodKind::Apple,
        FoodKind::Pizza,
        FoodKind::Burger,
        FoodKind::Star,
    ];

    pub fn symbol(&self) -> &'static str {
        match self {
            FoodKind::Apple => "🍎",
            FoodKind::Pizza => "🍕",
            FoodKind::Burger => "🍔",
            FoodKind::Star => "🌟",
        }
    }

    pub fn points(&self) -> u32 {
        match self {
            FoodKind::Apple => 10,
            FoodKind::Pizza => 15,
            FoodKind::Burger => 20,
            FoodKind::Star => 25,
        }
    }
}

/// A food item on the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Food {
    pub position: Position,
    pub kind: FoodKind,
}

/// Lifecycle of a game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Waiting for the start command
    Ready,
    Running,
    Paused,
    GameOver,
}

/// Why a game ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOverReason {
    /// The head ran into the body
    SelfCollision,
    /// No free cell was left for food
    BoardFull,
}

/// Read-only view of a game handed to renderers
#[derive(Debug, Clone, PartialEq)]
pub struct GameSnapshot {
    /// Snake cells, head first
    pub snake: Vec<Position>,
    /// Missing only when the snake fills the grid
    pub food: Option<Food>,
    pub score: u32,
    pub high_score: u32,
    pub speed: Duration,
    pub phase: GamePhase,
    pub game_over_reason: Option<GameOverReason>,
    pub grid_width: usize,
    pub grid_height: usize,
}

impl GameSnapshot {
    pub fn head(&self) -> Position {
        self.snake[0]
    }
}
