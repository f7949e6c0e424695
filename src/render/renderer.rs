use std::collections::VecDeque;
use std::time::{Duration, Instant};

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
    Frame,
};

use crate::game::{
    FoodKind, GameEvent, GameSession, GameState, Phase, Position, Tier, TierCapabilities,
};
use crate::metrics::GameMetrics;

const TIER_NOTICE: Duration = Duration::from_secs(3);
const SHORT_NOTICE: Duration = Duration::from_millis(1500);
const FLASH: Duration = Duration::from_millis(300);
const LOST_SEGMENT: Duration = Duration::from_millis(400);
const TRAIL: Duration = Duration::from_millis(400);
const TRAIL_LEN: usize = 5;

const RAINBOW: [Color; 6] = [
    Color::Red,
    Color::Yellow,
    Color::Green,
    Color::Cyan,
    Color::Blue,
    Color::Magenta,
];

struct Notice {
    text: String,
    color: Color,
    until: Instant,
}

/// Draws the board and side panel. Short-lived effects (banners, border
/// flashes, debris from bombs) are fed in through [`Renderer::absorb`].
#[derive(Default)]
pub struct Renderer {
    notice: Option<Notice>,
    flash: Option<(Color, Instant)>,
    lost: Vec<(Position, Instant)>,
    last_tail: Option<Position>,
    trail: VecDeque<(Position, Instant)>,
}

fn rgb((r, g, b): (u8, u8, u8)) -> Color {
    Color::Rgb(r, g, b)
}

fn food_cell(kind: FoodKind) -> Span<'static> {
    let (glyph, color) = match kind {
        FoodKind::Normal => ("● ", Color::Red),
        FoodKind::Special => ("★ ", Color::Yellow),
        FoodKind::Bomb => ("✸ ", Color::Magenta),
        FoodKind::Heart => ("♥ ", Color::LightRed),
    };
    Span::styled(glyph, Style::default().fg(color).add_modifier(Modifier::BOLD))
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Turn game events into transient visual effects
    pub fn absorb(&mut self, events: &[GameEvent], now: Instant) {
        for event in events {
            match event {
                GameEvent::TierChanged { from, to } => {
                    let text = if to > from {
                        format!("Evolved: {}!", to.name())
                    } else {
                        format!("Devolved: {}", to.name())
                    };
                    self.show_notice(text, rgb(to.palette()[0]), now + TIER_NOTICE);
                }
                GameEvent::LifeLost { lives_left, .. } => {
                    self.flash = Some((Color::Red, now + FLASH));
                    self.show_notice(
                        format!("Life lost! {lives_left} left"),
                        Color::Red,
                        now + SHORT_NOTICE,
                    );
                }
                GameEvent::LifeGained { lives } => {
                    self.flash = Some((Color::LightRed, now + FLASH));
                    self.show_notice(format!("Extra life! ({lives})"), Color::LightRed, now + SHORT_NOTICE);
                }
                GameEvent::FoodEaten {
                    kind: FoodKind::Bomb,
                    ..
                } => {
                    self.flash = Some((Color::Magenta, now + FLASH));
                }
                GameEvent::SegmentsLost { positions } => {
                    self.lost
                        .extend(positions.iter().map(|&p| (p, now + LOST_SEGMENT)));
                }
                GameEvent::SlowMotionStarted => {
                    self.show_notice("Slow motion".to_string(), Color::Yellow, now + SHORT_NOTICE);
                }
                GameEvent::Died { .. } => {
                    self.flash = Some((Color::Red, now + FLASH));
                }
                GameEvent::GameOver { .. } => {
                    self.notice = None;
                    self.lost.clear();
                }
                _ => {}
            }
        }
    }

    fn show_notice(&mut self, text: String, color: Color, until: Instant) {
        self.notice = Some(Notice { text, color, until });
    }

    fn expire_effects(&mut self, state: &GameState, now: Instant) {
        if self.notice.as_ref().is_some_and(|n| n.until <= now) {
            self.notice = None;
        }
        if self.flash.is_some_and(|(_, until)| until <= now) {
            self.flash = None;
        }
        self.lost.retain(|&(_, until)| until > now);

        let tail = state.snake.tail();
        if let Some(previous) = self.last_tail {
            if previous != tail && !state.snake.contains(previous) {
                self.trail.push_front((previous, now + TRAIL));
                self.trail.truncate(TRAIL_LEN);
            }
        }
        self.last_tail = Some(tail);
        self.trail.retain(|&(_, until)| until > now);
    }

    pub fn render(
        &mut self,
        frame: &mut Frame,
        session: &GameSession,
        metrics: &GameMetrics,
        now: Instant,
    ) {
        let state = session.state();
        self.expire_effects(state, now);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Board and side panel
                Constraint::Length(3), // Footer
            ])
            .split(frame.area());

        frame.render_widget(self.render_stats(state, metrics), chunks[0]);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(28)])
            .split(chunks[1]);

        let fade = session.fade_progress(now);
        frame.render_widget(self.render_grid(state, fade), body[0]);
        frame.render_widget(self.render_panel(state, metrics), body[1]);

        match state.phase {
            Phase::Idle => {
                let area = centered(body[0], 36, 7);
                frame.render_widget(Clear, area);
                frame.render_widget(self.render_idle(), area);
            }
            Phase::GameOver => {
                let area = centered(body[0], 36, 9);
                frame.render_widget(Clear, area);
                frame.render_widget(self.render_game_over(state, metrics), area);
            }
            Phase::Running | Phase::Dying => {}
        }

        frame.render_widget(self.render_controls(), chunks[2]);
    }

    fn snake_style(&self, state: &GameState, index: usize, fade: f32) -> Style {
        if state.phase == Phase::Dying {
            let color = if fade < 0.5 { Color::Red } else { Color::DarkGray };
            return Style::default().fg(color);
        }

        let palette = state.tier.palette();
        let caps: TierCapabilities = state.tier.capabilities();

        let color = if caps.rainbow_effect {
            RAINBOW[(index + state.steps as usize) % RAINBOW.len()]
        } else if caps.scale_pattern && index % 2 == 1 {
            rgb(palette[1])
        } else {
            rgb(palette[0])
        };

        let mut style = Style::default().fg(color);
        if index == 0 || caps.golden_effect {
            style = style.add_modifier(Modifier::BOLD);
        }
        style
    }

    fn render_grid(&self, state: &GameState, fade: f32) -> Paragraph<'static> {
        let caps = state.tier.capabilities();
        let death_cell = state.death.map(|d| d.position);
        let mut lines = Vec::with_capacity(state.grid_height);

        for y in 0..state.grid_height {
            let mut spans = Vec::with_capacity(state.grid_width);

            for x in 0..state.grid_width {
                let pos = Position::new(x as i32, y as i32);
                let segment = state.snake.body.iter().position(|&p| p == pos);

                let cell = if death_cell == Some(pos) {
                    Span::styled(
                        "✖ ",
                        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                    )
                } else if let Some(index) = segment {
                    let glyph = if index == 0 { "■ " } else { "□ " };
                    Span::styled(glyph, self.snake_style(state, index, fade))
                } else if let Some(food) = state.food.filter(|f| f.is_at(pos)) {
                    food_cell(food.kind)
                } else if state.extra_food.is_some_and(|f| f.is_at(pos)) {
                    Span::styled(
                        "● ",
                        Style::default()
                            .fg(Color::LightGreen)
                            .add_modifier(Modifier::BOLD),
                    )
                } else if self.lost.iter().any(|&(p, _)| p == pos) {
                    Span::styled("x ", Style::default().fg(Color::Magenta))
                } else if caps.trail_effect && self.trail.iter().any(|&(p, _)| p == pos) {
                    Span::styled("· ", Style::default().fg(rgb(state.tier.palette()[1])))
                } else {
                    Span::styled(". ", Style::default().fg(Color::DarkGray))
                };

                spans.push(cell);
            }

            lines.push(Line::from(spans));
        }

        let border_color = match self.flash {
            Some((color, _)) => color,
            None if caps.energy_aura && state.phase == Phase::Running => {
                rgb(state.tier.palette()[0])
            }
            None => Color::White,
        };

        let title = match &self.notice {
            Some(notice) => Span::styled(
                format!(" {} ", notice.text),
                Style::default()
                    .fg(notice.color)
                    .add_modifier(Modifier::BOLD),
            ),
            None => Span::raw(" Evolution Snake "),
        };

        Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Double)
                    .border_style(Style::default().fg(border_color))
                    .title(title),
            )
            .alignment(Alignment::Center)
    }

    fn render_stats(&self, state: &GameState, metrics: &GameMetrics) -> Paragraph<'static> {
        let text = vec![Line::from(vec![
            Span::styled("Score: ", Style::default().fg(Color::Yellow)),
            Span::styled(
                state.score.to_string(),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("    "),
            Span::styled("Length: ", Style::default().fg(Color::Yellow)),
            Span::styled(state.snake.len().to_string(), Style::default().fg(Color::White)),
            Span::raw("    "),
            Span::styled("Speed: ", Style::default().fg(Color::Yellow)),
            Span::styled(
                format!("{}ms", state.tick_interval.as_millis()),
                Style::default().fg(Color::White),
            ),
            Span::raw("    "),
            Span::styled("Time: ", Style::default().fg(Color::Yellow)),
            Span::styled(metrics.format_time(), Style::default().fg(Color::White)),
        ])];

        Paragraph::new(text).alignment(Alignment::Center)
    }

    fn render_panel(&self, state: &GameState, metrics: &GameMetrics) -> Paragraph<'static> {
        let label = Style::default().fg(Color::Yellow);
        let value = Style::default().fg(Color::White);

        let hearts: String = "♥".repeat(state.lives as usize);
        let mut lines = vec![
            Line::from(vec![
                Span::styled("Tier: ", label),
                Span::styled(
                    state.tier.name(),
                    Style::default()
                        .fg(rgb(state.tier.palette()[0]))
                        .add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(vec![
                Span::styled("Lives: ", label),
                Span::styled(
                    if hearts.is_empty() { "-".to_string() } else { hearts },
                    Style::default().fg(Color::LightRed),
                ),
            ]),
            Line::from(vec![
                Span::styled("Steps: ", label),
                Span::styled(state.steps.to_string(), value),
            ]),
            Line::from(""),
            Line::from(vec![
                Span::styled("High score: ", label),
                Span::styled(metrics.high_score.to_string(), value),
            ]),
            Line::from(vec![
                Span::styled("Games: ", label),
                Span::styled(metrics.games_played.to_string(), value),
            ]),
            Line::from(vec![
                Span::styled("Best tier: ", label),
                Span::styled(metrics.best_tier.name(), value),
            ]),
            Line::from(vec![
                Span::styled("Lives lost: ", label),
                Span::styled(metrics.lives_lost.to_string(), value),
            ]),
            Line::from(""),
        ];

        if let Some(next) = Tier::ALL.iter().find(|t| t.min_score() > state.score) {
            lines.push(Line::from(vec![
                Span::styled("Next: ", label),
                Span::styled(format!("{} @ {}", next.name(), next.min_score()), value),
            ]));
        }

        lines.push(Line::from(""));
        for kind in FoodKind::ALL {
            lines.push(Line::from(vec![
                food_cell(kind),
                Span::styled(
                    format!("{:<8}{:+}", kind.name(), kind.score_delta()),
                    Style::default().fg(Color::Gray),
                ),
            ]));
        }

        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .title(" Status "),
        )
    }

    fn render_idle(&self) -> Paragraph<'static> {
        let text = vec![
            Line::from(""),
            Line::from(Span::styled(
                "EVOLUTION SNAKE",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(vec![
                Span::styled("Press ", Style::default().fg(Color::Gray)),
                Span::styled(
                    "Space",
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(" to start", Style::default().fg(Color::Gray)),
            ]),
        ];

        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Green)),
        )
    }

    fn render_game_over(&self, state: &GameState, metrics: &GameMetrics) -> Paragraph<'static> {
        let mut text = vec![
            Line::from(""),
            Line::from(vec![Span::styled(
                "GAME OVER",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )]),
            Line::from(""),
            Line::from(vec![
                Span::styled("Final Score: ", Style::default().fg(Color::Yellow)),
                Span::styled(
                    state.score.to_string(),
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ),
            ]),
        ];
        if state.score > 0 && state.score >= metrics.high_score {
            text.push(Line::from(Span::styled(
                "New high score!",
                Style::default().fg(Color::Yellow),
            )));
        } else {
            text.push(Line::from(""));
        }
        text.push(Line::from(vec![
            Span::styled("Press ", Style::default().fg(Color::Gray)),
            Span::styled(
                "R",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(" to restart or ", Style::default().fg(Color::Gray)),
            Span::styled(
                "Q",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            Span::styled(" to quit", Style::default().fg(Color::Gray)),
        ]));

        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        )
    }

    fn render_controls(&self) -> Paragraph<'static> {
        let text = vec![Line::from(vec![
            Span::styled("↑↓←→", Style::default().fg(Color::Cyan)),
            Span::raw(" or "),
            Span::styled("WASD", Style::default().fg(Color::Cyan)),
            Span::raw(" to move | "),
            Span::styled("Space", Style::default().fg(Color::Green)),
            Span::raw(" start | "),
            Span::styled("R", Style::default().fg(Color::Green)),
            Span::raw(" restart | "),
            Span::styled("Q", Style::default().fg(Color::Red)),
            Span::raw(" to quit"),
        ])];

        Paragraph::new(text).alignment(Alignment::Center)
    }
}

/// A `width` x `height` rectangle in the middle of `area`, shrunk to fit
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{GameConfig, GameEngine};
    use ratatui::{backend::TestBackend, Terminal};

    fn draw(renderer: &mut Renderer, session: &GameSession, now: Instant) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 32)).unwrap();
        let metrics = GameMetrics::new();
        terminal
            .draw(|frame| renderer.render(frame, session, &metrics, now))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_idle_screen_prompts_for_start() {
        let now = Instant::now();
        let session = GameSession::new(GameEngine::with_seed(GameConfig::default(), 1), now).unwrap();
        let screen = draw(&mut Renderer::new(), &session, now);

        assert!(screen.contains("EVOLUTION SNAKE"));
        assert!(screen.contains("Basic Snake"));
    }

    #[test]
    fn test_tier_notice_lasts_three_seconds() {
        let now = Instant::now();
        let mut session =
            GameSession::new(GameEngine::with_seed(GameConfig::default(), 2), now).unwrap();
        session.start(now).unwrap();
        let mut renderer = Renderer::new();
        renderer.absorb(
            &[GameEvent::TierChanged {
                from: Tier::Basic,
                to: Tier::Skilled,
            }],
            now,
        );

        let screen = draw(&mut renderer, &session, now + Duration::from_millis(2900));
        assert!(screen.contains("Evolved: Skilled Snake!"));

        let screen = draw(&mut renderer, &session, now + Duration::from_secs(3));
        assert!(!screen.contains("Evolved"));
    }

    #[test]
    fn test_segments_lost_fade_out() {
        let now = Instant::now();
        let mut renderer = Renderer::new();
        renderer.absorb(
            &[GameEvent::SegmentsLost {
                positions: vec![Position::new(1, 1), Position::new(2, 1)],
            }],
            now,
        );
        assert_eq!(renderer.lost.len(), 2);

        renderer.absorb(&[GameEvent::GameOver { final_score: 0 }], now);
        assert!(renderer.lost.is_empty());
    }
}
