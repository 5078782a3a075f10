use anyhow::{Context, Result};
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{Stderr, stderr};
use tracing::{debug, info};

use crate::clock::{self, ClockControl, Scheduler, Ticker};
use crate::game::{GameConfig, GamePhase, SnakeGame};
use crate::input::{InputHandler, KeyAction};
use crate::persistence::HighScoreStore;
use crate::render::Renderer;

/// Keyboard-driven game in the terminal
pub struct HumanMode<S: Scheduler, H: HighScoreStore> {
    game: SnakeGame<S, H>,
    renderer: Renderer,
    input_handler: InputHandler,
    should_quit: bool,
    /// Whether the screen is out of date
    dirty: bool,
}

impl<H: HighScoreStore> HumanMode<ClockControl, H> {
    /// Build a game wired to a real tick clock
    pub fn new(config: GameConfig, store: H) -> Result<(Self, Ticker)> {
        let (control, ticker) = clock::channel();
        let game = SnakeGame::new(config, control, store)?;
        Ok((Self::with_game(game), ticker))
    }

    pub async fn run(&mut self, ticker: &mut Ticker) -> Result<()> {
        // Setup terminal
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stderr = stderr();
        execute!(stderr, EnterAlternateScreen).context("Failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stderr);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
        terminal.hide_cursor().context("Failed to hide cursor")?;
        terminal.clear().context("Failed to clear terminal")?;

        // Run game loop with cleanup
        let result = self.run_game_loop(&mut terminal, ticker).await;

        // Cleanup terminal
        self.cleanup_terminal(&mut terminal)?;

        result
    }

    async fn run_game_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
        ticker: &mut Ticker,
    ) -> Result<()> {
        let mut event_stream = EventStream::new();
        info!("Session started");

        loop {
            if self.dirty {
                let snapshot = self.game.snapshot();
                terminal
                    .draw(|frame| self.renderer.render(frame, &snapshot))
                    .context("Failed to draw frame")?;
                self.dirty = false;
            }

            tokio::select! {
                // Handle terminal events
                maybe_event = event_stream.next() => {
                    match maybe_event {
                        Some(Ok(event)) => self.handle_event(event),
                        Some(Err(e)) => return Err(e).context("Failed to read terminal event"),
                        None => self.should_quit = true,
                    }
                }

                // Game logic tick, pending while stopped
                _ = ticker.tick() => {
                    self.update_game();
                }

                // Handle Ctrl+C
                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
            }

            if self.should_quit {
                break;
            }
        }

        info!(
            "Session ended, score {} high score {}",
            self.game.score(),
            self.game.high_score()
        );
        Ok(())
    }

    fn cleanup_terminal(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)
            .context("Failed to leave alternate screen")?;
        terminal.show_cursor().context("Failed to show cursor")?;
        Ok(())
    }
}

impl<S: Scheduler, H: HighScoreStore> HumanMode<S, H> {
    pub fn with_game(game: SnakeGame<S, H>) -> Self {
        Self {
            game,
            renderer: Renderer::new(),
            input_handler: InputHandler::new(),
            should_quit: false,
            dirty: true,
        }
    }

    pub fn game(&self) -> &SnakeGame<S, H> {
        &self.game
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) => {
                // Only process key press events, not release
                if key.kind != KeyEventKind::Press {
                    return;
                }

                let action = self.input_handler.handle_key_event(key);
                self.apply(action);
            }
            Event::Resize(_, _) => self.dirty = true,
            _ => {}
        }
    }

    fn apply(&mut self, action: KeyAction) {
        match action {
            KeyAction::Turn(direction) => {
                // Steering is locked while paused
                if self.game.phase() != GamePhase::Paused {
                    self.game.set_direction(direction);
                }
            }
            KeyAction::TogglePause => {
                self.dirty |= self.game.toggle_pause();
            }
            KeyAction::Start => {
                self.dirty |= self.game.start();
            }
            KeyAction::Restart => {
                self.game.restart();
                self.dirty = true;
            }
            KeyAction::Quit => {
                self.should_quit = true;
            }
            KeyAction::None => {}
        }
    }

    fn update_game(&mut self) {
        let result = self.game.tick();

        if let Some(kind) = result.info.eaten {
            debug!("Ate {} for {} points", kind.symbol(), kind.points());
        }
        if result.info.new_high_score {
            info!("New high score: {}", self.game.high_score());
        }

        self.dirty |= result.advanced || result.terminated;
    }
}
