//! Core game logic module for Snake
//!
//! This module contains all the game logic without any I/O or rendering dependencies.
//! The state machine is advanced by calling `tick()`; it can be driven by a real
//! timer or synchronously in tests.

pub mod config;
pub mod direction;
pub mod engine;
pub mod state;

// Re-export commonly used types
pub use config::{GameConfig, MilestoneRule};
pub use direction::Direction;
pub use engine::{SnakeGame, TickInfo, TickResult};
pub use state::{Food, FoodKind, GameOverReason, GamePhase, GameSnapshot, Position, Snake};
