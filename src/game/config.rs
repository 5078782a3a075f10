use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use super::state::Position;

/// Largest grid side the terminal renderer can lay out
pub const MAX_GRID_SIDE: usize = 1000;

/// How score milestones trigger a speed-up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneRule {
    /// Speed up whenever the score crosses a multiple of the milestone
    #[default]
    Crossed,
    /// Speed up only when the score lands exactly on a multiple of the milestone
    ExactMultiple,
}

impl MilestoneRule {
    /// Number of speed-ups earned going from `old` to `new` score
    pub fn speed_ups(&self, old: u32, new: u32, milestone: u32) -> u32 {
        match self {
            MilestoneRule::Crossed => (new / milestone).saturating_sub(old / milestone),
            MilestoneRule::ExactMultiple => u32::from(new % milestone == 0),
        }
    }
}

/// Configuration for the game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Width of the game grid in cells
    pub grid_width: usize,
    /// Height of the game grid in cells
    pub grid_height: usize,
    /// Starting cell of the snake, grid center when unset
    pub start: Option<Position>,

    // Speed
    /// Tick interval at the start of a game
    pub initial_speed_ms: u64,
    /// Amount the tick interval shrinks at each milestone
    pub speed_step_ms: u64,
    /// Floor of the tick interval
    pub min_speed_ms: u64,
    /// Score distance between speed-ups
    pub speed_milestone: u32,
    pub milestone_rule: MilestoneRule,

    /// Seed for food placement; random when unset
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_width: 20,
            grid_height: 20,
            start: None,
            initial_speed_ms: 100,
            speed_step_ms: 10,
            min_speed_ms: 50,
            speed_milestone: 50,
            milestone_rule: MilestoneRule::default(),
            seed: None,
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

    /// Derive the grid from a canvas measured in pixels
    pub fn from_canvas(canvas_width: usize, canvas_height: usize, cell_size: usize) -> Self {
        Self::new(canvas_width / cell_size.max(1), canvas_height / cell_size.max(1))
    }

    /// Create a small grid for testing
    pub fn small() -> Self {
        Self::new(10, 10)
    }

    /// Load a configuration from a JSON file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        let config: GameConfig = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config {:?}", path))?;
        Ok(config)
    }

    /// Check that the configuration describes a playable game
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.grid_width > 0 && self.grid_height > 0,
            "grid must have at least one cell, got {}x{}",
            self.grid_width,
            self.grid_height
        );
        ensure!(
            self.grid_width <= MAX_GRID_SIDE && self.grid_height <= MAX_GRID_SIDE,
            "grid {}x{} is larger than {}x{}",
            self.grid_width,
            self.grid_height,
            MAX_GRID_SIDE,
            MAX_GRID_SIDE
        );
        ensure!(
            self.cell_count() >= 2,
            "grid needs room for the snake and its food"
        );
        if let Some(start) = self.start {
            ensure!(
                self.contains(start),
                "start cell ({}, {}) is outside the {}x{} grid",
                start.x,
                start.y,
                self.grid_width,
                self.grid_height
            );
        }
        ensure!(self.min_speed_ms > 0, "minimum speed must be positive");
        ensure!(
            self.min_speed_ms <= self.initial_speed_ms,
            "minimum speed {}ms exceeds initial speed {}ms",
            self.min_speed_ms,
            self.initial_speed_ms
        );
        ensure!(self.speed_milestone > 0, "speed milestone must be positive");
        Ok(())
    }

    /// Starting cell of the snake
    pub fn start_position(&self) -> Position {
        self.start.unwrap_or_else(|| {
            Position::new((self.grid_width / 2) as i32, (self.grid_height / 2) as i32)
        })
    }

    pub fn initial_speed(&self) -> Duration {
        Duration::from_millis(self.initial_speed_ms)
    }

    /// The interval after one more milestone, floored at the minimum
    pub fn faster(&self, speed: Duration) -> Duration {
        speed
            .saturating_sub(Duration::from_millis(self.speed_step_ms))
            .max(Duration::from_millis(self.min_speed_ms))
    }

    pub fn cell_count(&self) -> usize {
        self.grid_width.saturating_mul(self.grid_height)
    }

    /// Check if a position is within the grid
    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= 0
            && pos.x < self.grid_width as i32
            && pos.y >= 0
            && pos.y < self.grid_height as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GameConfig::default();
        assert_eq!(config.grid_width, 20);
        assert_eq!(config.grid_height, 20);
        assert_eq!(config.start_position(), Position::new(10, 10));
        assert_eq!(config.initial_speed(), Duration::from_millis(100));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_custom_config() {
        let config = GameConfig::new(15, 15);
        assert_eq!(config.grid_width, 15);
        assert_eq!(config.grid_height, 15);
        assert_eq!(config.start_position(), Position::new(7, 7));
    }

    #[test]
    fn test_from_canvas() {
        let config = GameConfig::from_canvas(400, 400, 20);
        assert_eq!(config.grid_width, 20);
        assert_eq!(config.grid_height, 20);
    }

    #[test]
    fn test_faster_is_floored() {
        let config = GameConfig::default();
        assert_eq!(
            config.faster(Duration::from_millis(100)),
            Duration::from_millis(90)
        );
        assert_eq!(
            config.faster(Duration::from_millis(55)),
            Duration::from_millis(50)
        );
        assert_eq!(
            config.faster(Duration::from_millis(50)),
            Duration::from_millis(50)
        );
    }

    #[test]
    fn test_milestone_rules() {
        assert_eq!(MilestoneRule::Crossed.speed_ups(45, 50, 50), 1);
        assert_eq!(MilestoneRule::Crossed.speed_ups(40, 60, 50), 1);
        assert_eq!(MilestoneRule::Crossed.speed_ups(50, 60, 50), 0);
        assert_eq!(MilestoneRule::Crossed.speed_ups(0, 25, 10), 2);

        assert_eq!(MilestoneRule::ExactMultiple.speed_ups(40, 50, 50), 1);
        assert_eq!(MilestoneRule::ExactMultiple.speed_ups(40, 60, 50), 0);
        assert_eq!(MilestoneRule::ExactMultiple.speed_ups(0, 20, 10), 1);
    }

    #[test]
    fn test_validate_rejects_bad_configs() {
        assert!(GameConfig::new(0, 20).validate().is_err());
        assert!(GameConfig::new(1, 1).validate().is_err());
        assert!(GameConfig::new(2, 1).validate().is_ok());
        assert!(GameConfig::new(MAX_GRID_SIDE, MAX_GRID_SIDE).validate().is_ok());
        assert!(GameConfig::new(40_000, 1).validate().is_err());
        assert!(GameConfig::new(usize::MAX / 2, 4).validate().is_err());

        let config = GameConfig {
            start: Some(Position::new(20, 3)),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = GameConfig {
            min_speed_ms: 200,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = GameConfig {
            speed_milestone: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_partial_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{ "grid_width": 12, "milestone_rule": "exact_multiple" }"#,
        )
        .unwrap();

        let config = GameConfig::load(&path).unwrap();
        assert_eq!(config.grid_width, 12);
        assert_eq!(config.grid_height, 20);
        assert_eq!(config.milestone_rule, MilestoneRule::ExactMultiple);
    }
}
