use anyhow::Result;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{
    config::GameConfig,
    direction::Direction,
    state::{Food, FoodKind, GameOverReason, GamePhase, GameSnapshot, Position, Snake},
};
use crate::clock::Scheduler;
use crate::persistence::HighScoreStore;

/// Random food candidates tried per grid cell before scanning for free cells
const FOOD_ATTEMPTS_PER_CELL: usize = 4;

/// Information about a tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickInfo {
    /// Kind of food eaten this tick
    pub eaten: Option<FoodKind>,
    /// Why the game ended, if it ended this tick
    pub game_over: Option<GameOverReason>,
    /// New tick interval, if it changed this tick
    pub speed_change: Option<Duration>,
    /// Whether this tick set a new high score
    pub new_high_score: bool,
}

/// Result of a tick
#[derive(Debug, Clone, PartialEq)]
pub struct TickResult {
    /// Whether the snake moved
    pub advanced: bool,
    /// Whether the game is over
    pub terminated: bool,
    pub info: TickInfo,
}

/// The snake game state machine
///
/// Owns every piece of game state. Input goes through [`set_direction`],
/// [`toggle_pause`], [`start`] and [`restart`]; renderers read a
/// [`GameSnapshot`]. The game drives its own cadence through the
/// scheduler and reports new high scores to the store.
///
/// [`set_direction`]: SnakeGame::set_direction
/// [`toggle_pause`]: SnakeGame::toggle_pause
/// [`start`]: SnakeGame::start
/// [`restart`]: SnakeGame::restart
pub struct SnakeGame<S: Scheduler, H: HighScoreStore> {
    config: GameConfig,
    rng: StdRng,
    scheduler: S,
    store: H,

    snake: Snake,
    food: Option<Food>,
    score: u32,
    high_score: u32,
    speed: Duration,
    phase: GamePhase,
    game_over_reason: Option<GameOverReason>,
}

impl<S: Scheduler, H: HighScoreStore> SnakeGame<S, H> {
    /// Create a game in the `Ready` phase
    pub fn new(config: GameConfig, scheduler: S, mut store: H) -> Result<Self> {
        config.validate()?;

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let high_score = store.load().unwrap_or_else(|e| {
            warn!("High score unavailable, keeping it in memory: {:#}", e);
            0
        });

        let snake = Snake::new(config.start_position(), Direction::Right);
        let speed = config.initial_speed();

        let mut game = Self {
            config,
            rng,
            scheduler,
            store,
            snake,
            food: None,
            score: 0,
            high_score,
            speed,
            phase: GamePhase::Ready,
            game_over_reason: None,
        };
        game.food = place_food(&game.config, &game.snake, &mut game.rng);

        Ok(game)
    }

    /// Leave `Ready` and start ticking. No-op in any other phase.
    pub fn start(&mut self) -> bool {
        if self.phase != GamePhase::Ready {
            return false;
        }

        self.phase = GamePhase::Running;
        self.scheduler.start(self.speed);
        info!("Game started at {}ms per tick", self.speed.as_millis());
        true
    }

    /// Buffer a direction for the next tick
    ///
    /// Ignored when it would reverse a snake longer than one cell. Returns
    /// whether the direction was taken.
    pub fn set_direction(&mut self, direction: Direction) -> bool {
        if !self.snake.can_turn(direction) {
            return false;
        }

        self.snake.next_direction = direction;
        true
    }

    /// Switch between `Running` and `Paused`. Returns whether anything changed.
    pub fn toggle_pause(&mut self) -> bool {
        match self.phase {
            GamePhase::Running => {
                self.phase = GamePhase::Paused;
                self.scheduler.stop();
                debug!("Paused");
                true
            }
            GamePhase::Paused => {
                self.phase = GamePhase::Running;
                self.scheduler.start(self.speed);
                debug!("Resumed at {}ms per tick", self.speed.as_millis());
                true
            }
            GamePhase::Ready | GamePhase::GameOver => false,
        }
    }

    /// Advance the game by one cell
    pub fn tick(&mut self) -> TickResult {
        if self.phase != GamePhase::Running {
            return TickResult {
                advanced: false,
                terminated: self.phase == GamePhase::GameOver,
                info: TickInfo::default(),
            };
        }

        self.snake.direction = self.snake.next_direction;
        let new_head = self
            .snake
            .head()
            .moved_in_direction(self.snake.direction)
            .wrapped(self.config.grid_width, self.config.grid_height);

        // Checked against the body before the move, tail included
        if self.snake.collides_with_body(new_head) {
            let new_high_score = self.end_game(GameOverReason::SelfCollision);
            return TickResult {
                advanced: false,
                terminated: true,
                info: TickInfo {
                    game_over: Some(GameOverReason::SelfCollision),
                    new_high_score,
                    ..Default::default()
                },
            };
        }

        let eaten = self.food.filter(|food| food.position == new_head);
        self.snake.advance(new_head, eaten.is_some());

        let mut info = TickInfo::default();
        if let Some(food) = eaten {
            info.eaten = Some(food.kind);
            info.speed_change = self.eat(food.kind);

            self.food = place_food(&self.config, &self.snake, &mut self.rng);
            if self.food.is_none() {
                info.game_over = Some(GameOverReason::BoardFull);
                info.new_high_score = self.end_game(GameOverReason::BoardFull);
                return TickResult {
                    advanced: true,
                    terminated: true,
                    info,
                };
            }
        }

        TickResult {
            advanced: true,
            terminated: false,
            info,
        }
    }

    /// Reset to a fresh game and start ticking at the initial speed
    pub fn restart(&mut self) {
        self.snake = Snake::new(self.config.start_position(), Direction::Right);
        self.food = place_food(&self.config, &self.snake, &mut self.rng);
        self.score = 0;
        self.speed = self.config.initial_speed();
        self.game_over_reason = None;
        self.phase = GamePhase::Running;
        self.scheduler.start(self.speed);
        info!("Game restarted");
    }

    /// Copy of everything a renderer needs
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            snake: self.snake.cells().collect(),
            food: self.food,
            score: self.score,
            high_score: self.high_score,
            speed: self.speed,
            phase: self.phase,
            game_over_reason: self.game_over_reason,
            grid_width: self.config.grid_width,
            grid_height: self.config.grid_height,
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    /// Current tick interval
    pub fn speed(&self) -> Duration {
        self.speed
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn food(&self) -> Option<Food> {
        self.food
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn store(&self) -> &H {
        &self.store
    }

    /// Add the food's points and speed up once per milestone passed.
    /// Returns the new interval when it changed.
    fn eat(&mut self, kind: FoodKind) -> Option<Duration> {
        let old_score = self.score;
        self.score += kind.points();
        debug!("Ate {:?}, score {}", kind, self.score);

        let speed_ups = self.config.milestone_rule.speed_ups(
            old_score,
            self.score,
            self.config.speed_milestone,
        );
        let faster = (0..speed_ups).fold(self.speed, |speed, _| self.config.faster(speed));
        if faster == self.speed {
            return None;
        }

        self.speed = faster;
        self.scheduler.reschedule(self.speed);
        debug!("Speed up to {}ms per tick", self.speed.as_millis());
        Some(self.speed)
    }

    /// Enter `GameOver`. Returns whether a new high score was set.
    fn end_game(&mut self, reason: GameOverReason) -> bool {
        self.phase = GamePhase::GameOver;
        self.game_over_reason = Some(reason);
        self.scheduler.stop();
        info!("Game over ({:?}) with score {}", reason, self.score);

        if self.score <= self.high_score {
            return false;
        }

        self.high_score = self.score;
        if let Err(e) = self.store.save(self.high_score) {
            warn!("Failed to persist high score {}: {:#}", self.high_score, e);
        }
        true
    }
}

/// Pick a free cell and a random food kind
///
/// Tries random cells first, then falls back to choosing among all free
/// cells. Returns `None` only when the snake covers the whole grid.
fn place_food(config: &GameConfig, snake: &Snake, rng: &mut StdRng) -> Option<Food> {
    let kind = FoodKind::ALL[rng.gen_range(0..FoodKind::ALL.len())];

    for _ in 0..config.cell_count() * FOOD_ATTEMPTS_PER_CELL {
        let position = Position::new(
            rng.gen_range(0..config.grid_width) as i32,
            rng.gen_range(0..config.grid_height) as i32,
        );
        if !snake.occupies(position) {
            return Some(Food { position, kind });
        }
    }

    let free: Vec<Position> = (0..config.grid_height)
        .flat_map(|y| (0..config.grid_width).map(move |x| Position::new(x as i32, y as i32)))
        .filter(|&pos| !snake.occupies(pos))
        .collect();

    free.choose(rng).map(|&position| Food { position, kind })
}
