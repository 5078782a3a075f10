use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};

use crate::game::{GameOverReason, GamePhase, GameSnapshot, Position};

/// Terminal columns per grid cell
const CELL_WIDTH: u16 = 2;

const HEAD_COLOR: Color = Color::Rgb(0x2E, 0x7D, 0x32);
const BODY_COLOR: Color = Color::Rgb(0x38, 0x8E, 0x3C);

pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, frame: &mut Frame, snapshot: &GameSnapshot) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Game area
                Constraint::Length(3), // Footer
            ])
            .split(frame.area());

        frame.render_widget(self.render_stats(snapshot), chunks[0]);

        let board_area = centered(
            chunks[1],
            to_columns(snapshot.grid_width)
                .saturating_mul(CELL_WIDTH)
                .saturating_add(2),
            to_columns(snapshot.grid_height).saturating_add(2),
        );
        frame.render_widget(self.render_grid(snapshot), board_area);

        if let Some(overlay) = self.render_overlay(snapshot) {
            let overlay_area = centered(board_area, 30, 7);
            frame.render_widget(Clear, overlay_area);
            frame.render_widget(overlay, overlay_area);
        }

        frame.render_widget(self.render_controls(), chunks[2]);
    }

    fn render_grid(&self, snapshot: &GameSnapshot) -> Paragraph<'_> {
        let head = snapshot.head();
        let mut lines = Vec::with_capacity(snapshot.grid_height);

        for y in 0..snapshot.grid_height {
            let mut spans = Vec::with_capacity(snapshot.grid_width);

            for x in 0..snapshot.grid_width {
                let pos = Position::new(x as i32, y as i32);

                let cell = if pos == head {
                    Span::styled(
                        "██",
                        Style::default().fg(HEAD_COLOR).add_modifier(Modifier::BOLD),
                    )
                } else if snapshot.snake.contains(&pos) {
                    Span::styled("██", Style::default().fg(BODY_COLOR))
                } else if let Some(food) = snapshot.food.filter(|food| food.position == pos) {
                    Span::raw(food.kind.symbol())
                } else {
                    Span::styled("· ", Style::default().fg(Color::DarkGray))
                };

                spans.push(cell);
            }

            lines.push(Line::from(spans));
        }

        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Double)
                .border_style(Style::default().fg(Color::White))
                .title(" Snake "),
        )
    }

    fn render_stats(&self, snapshot: &GameSnapshot) -> Paragraph<'_> {
        let text = vec![Line::from(vec![
            Span::styled("Score: ", Style::default().fg(Color::Yellow)),
            Span::styled(
                snapshot.score.to_string(),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("    "),
            Span::styled("High: ", Style::default().fg(Color::Yellow)),
            Span::styled(
                snapshot.high_score.to_string(),
                Style::default().fg(Color::White),
            ),
            Span::raw("    "),
            Span::styled("Speed: ", Style::default().fg(Color::Yellow)),
            Span::styled(
                format!("{}ms", snapshot.speed.as_millis()),
                Style::default().fg(Color::White),
            ),
        ])];

        Paragraph::new(text)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::BOTTOM))
    }

    fn render_overlay(&self, snapshot: &GameSnapshot) -> Option<Paragraph<'_>> {
        let key = |label: &'static str, color: Color| {
            Span::styled(label, Style::default().fg(color).add_modifier(Modifier::BOLD))
        };
        let hint = |text: &'static str| Span::styled(text, Style::default().fg(Color::Gray));

        let (title, title_color, detail, prompt) = match snapshot.phase {
            GamePhase::Running => return None,
            GamePhase::Ready => (
                "SNAKE",
                Color::Green,
                Line::from(""),
                Line::from(vec![
                    hint("Press "),
                    key("ENTER", Color::Green),
                    hint(" to start"),
                ]),
            ),
            GamePhase::Paused => (
                "PAUSED",
                Color::Yellow,
                Line::from(""),
                Line::from(vec![
                    hint("Press "),
                    key("SPACE", Color::Yellow),
                    hint(" to resume"),
                ]),
            ),
            GamePhase::GameOver => (
                match snapshot.game_over_reason {
                    Some(GameOverReason::BoardFull) => "Board Full!",
                    _ => "Game Over!",
                },
                Color::Red,
                Line::from(vec![
                    Span::styled("Final Score: ", Style::default().fg(Color::Yellow)),
                    Span::styled(
                        snapshot.score.to_string(),
                        Style::default()
                            .fg(Color::White)
                            .add_modifier(Modifier::BOLD),
                    ),
                ]),
                Line::from(vec![
                    hint("Press "),
                    key("R", Color::Green),
                    hint(" to restart"),
                ]),
            ),
        };

        let text = vec![
            Line::from(Span::styled(
                title,
                Style::default().fg(title_color).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            detail,
            prompt,
        ];

        Some(
            Paragraph::new(text).alignment(Alignment::Center).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(title_color)),
            ),
        )
    }

    fn render_controls(&self) -> Paragraph<'_> {
        let text = vec![Line::from(vec![
            Span::styled("↑↓←→", Style::default().fg(Color::Cyan)),
            Span::raw(" or "),
            Span::styled("WASD", Style::default().fg(Color::Cyan)),
            Span::raw(" to move | "),
            Span::styled("SPACE", Style::default().fg(Color::Yellow)),
            Span::raw(" pause | "),
            Span::styled("ENTER", Style::default().fg(Color::Green)),
            Span::raw(" start | "),
            Span::styled("R", Style::default().fg(Color::Green)),
            Span::raw(" restart | "),
            Span::styled("Q", Style::default().fg(Color::Red)),
            Span::raw(" quit"),
        ])];

        Paragraph::new(text)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::TOP))
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

fn to_columns(cells: usize) -> u16 {
    u16::try_from(cells).unwrap_or(u16::MAX)
}

/// A `width` x `height` rect centered in `area`, clipped to it
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
