//! Grid Snake - a terminal snake game on a wraparound grid
//!
//! This library provides:
//! - Core game state machine (game module)
//! - Tick scheduling (clock module)
//! - High score persistence (persistence module)
//! - Keyboard mapping (input module)
//! - TUI rendering (render module)
//! - The interactive terminal mode (modes module)

pub mod clock;
pub mod game;
pub mod input;
pub mod modes;
pub mod persistence;
pub mod render;
