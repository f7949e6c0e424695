use anyhow::{Context, Result};
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{stderr, Stderr};
use std::time::{Duration, Instant};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::game::{Action, GameEngine, GameEvent, GameSession, Phase};
use crate::input::{InputHandler, KeyAction};
use crate::metrics::GameMetrics;
use crate::render::Renderer;

/// About 60 frames per second; game ticks are scheduled inside the session
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

pub struct HumanMode {
    session: GameSession,
    metrics: GameMetrics,
    renderer: Renderer,
    input_handler: InputHandler,
    should_quit: bool,
}

impl HumanMode {
    pub fn new(engine: GameEngine) -> Result<Self> {
        let session =
            GameSession::new(engine, Instant::now()).context("Failed to set up the board")?;

        Ok(Self {
            session,
            metrics: GameMetrics::new(),
            renderer: Renderer::new(),
            input_handler: InputHandler::new(),
            should_quit: false,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stderr = stderr();
        execute!(stderr, EnterAlternateScreen).context("Failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stderr);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
        terminal.hide_cursor().context("Failed to hide cursor")?;
        terminal.clear().context("Failed to clear terminal")?;

        let result = self.run_game_loop(&mut terminal).await;

        self.cleanup_terminal(&mut terminal)?;

        result
    }

    async fn run_game_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        let mut event_stream = EventStream::new();

        let mut frame_timer = interval(FRAME_INTERVAL);
        frame_timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                maybe_event = event_stream.next() => {
                    match maybe_event {
                        Some(Ok(event)) => self.handle_event(event, Instant::now())?,
                        Some(Err(e)) => return Err(e).context("Failed to read terminal event"),
                        None => self.should_quit = true,
                    }
                }

                _ = frame_timer.tick() => {
                    let now = Instant::now();
                    self.advance(now)?;
                    terminal.draw(|frame| {
                        self.renderer.render(frame, &self.session, &self.metrics, now);
                    }).context("Failed to draw frame")?;
                }

                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
            }

            if self.should_quit {
                break;
            }
        }

        if self.session.stop() {
            self.absorb_events(Instant::now());
        }
        info!(
            games = self.metrics.games_played,
            high_score = self.metrics.high_score,
            "leaving"
        );

        Ok(())
    }

    fn handle_event(&mut self, event: Event, now: Instant) -> Result<()> {
        let Event::Key(key) = event else {
            return Ok(());
        };
        // Only process key press events, not release
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }

        match self.input_handler.handle_key_event(key) {
            KeyAction::Game(action) => self.apply(action, now)?,
            KeyAction::Quit => self.should_quit = true,
            KeyAction::None => {}
        }

        Ok(())
    }

    fn apply(&mut self, action: Action, now: Instant) -> Result<()> {
        let changed = self
            .session
            .handle(action, now)
            .context("Failed to start a new game")?;

        if changed && matches!(action, Action::Start | Action::Restart) {
            self.metrics.on_game_start(now);
            self.renderer = Renderer::new();
        }
        if !changed {
            debug!(?action, phase = ?self.session.phase(), "input ignored");
        }
        Ok(())
    }

    fn advance(&mut self, now: Instant) -> Result<()> {
        self.session.frame(now).context("Game tick failed")?;
        if self.session.phase() == Phase::Running {
            self.metrics.update(now);
        }
        self.absorb_events(now);
        Ok(())
    }

    fn absorb_events(&mut self, now: Instant) {
        let events = self.session.drain_events();
        for event in &events {
            match event {
                GameEvent::TierChanged { to, .. } => self.metrics.on_tier_reached(*to),
                GameEvent::LifeLost { .. } => self.metrics.on_life_lost(),
                GameEvent::GameOver { final_score } => {
                    self.metrics.on_game_over(*final_score, now);
                }
                _ => {}
            }
        }
        self.renderer.absorb(&events, now);
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
