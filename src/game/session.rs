//! Drives one engine through the Idle → Running → Dying → GameOver lifecycle.
//!
//! The session owns the tick cadence: the front-end calls [`GameSession::frame`]
//! as often as it likes and the session decides whether a tick is due. All
//! time comes in as an argument, so tests can step through a game with
//! hand-made instants.

use std::time::{Duration, Instant};

use tracing::info;

use super::{
    action::{Action, Direction},
    config::GameConfig,
    engine::{GameEngine, StepResult},
    error::GameError,
    events::GameEvent,
    food::FoodKind,
    state::{GameState, Phase, Position},
};

/// What a call to [`GameSession::frame`] did
#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    /// Not started or already over; nothing moves
    Halted,
    /// Running or dying, but no tick was due
    Waiting,
    /// The snake advanced one cell
    Ticked(StepResult),
}

pub struct GameSession {
    engine: GameEngine,
    state: GameState,
    last_tick: Option<Instant>,
}

impl GameSession {
    /// Idle session with food already on the board
    pub fn new(mut engine: GameEngine, now: Instant) -> Result<Self, GameError> {
        let state = engine.reset(now)?;
        Ok(Self {
            engine,
            state,
            last_tick: None,
        })
    }

    pub fn with_config(config: GameConfig, now: Instant) -> Result<Self, GameError> {
        Self::new(GameEngine::new(config), now)
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn engine(&self) -> &GameEngine {
        &self.engine
    }

    pub fn config(&self) -> &GameConfig {
        self.engine.config()
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn tick_interval(&self) -> Duration {
        self.state.tick_interval
    }

    /// Score frozen at game over
    pub fn final_score(&self) -> Option<u32> {
        (self.state.phase == Phase::GameOver).then_some(self.state.score)
    }

    /// Begin a fresh game. Ignored while a game is running or dying.
    pub fn start(&mut self, now: Instant) -> Result<bool, GameError> {
        if matches!(self.state.phase, Phase::Running | Phase::Dying) {
            return Ok(false);
        }

        self.state = self.engine.reset(now)?;
        self.state.phase = Phase::Running;
        self.last_tick = None;
        info!(
            width = self.state.grid_width,
            height = self.state.grid_height,
            "game started"
        );
        Ok(true)
    }

    /// Apply a player action; returns whether it changed anything
    pub fn handle(&mut self, action: Action, now: Instant) -> Result<bool, GameError> {
        match action {
            Action::Move(direction) => Ok(self.set_direction(direction)),
            Action::Start | Action::Restart => self.start(now),
        }
    }

    /// Buffer a heading for the next tick. Reversals and requests outside a
    /// live game are ignored.
    pub fn set_direction(&mut self, direction: Direction) -> bool {
        if !self.state.is_alive() {
            return false;
        }
        self.engine.set_direction(&mut self.state, direction)
    }

    /// Vector form of [`set_direction`](Self::set_direction); anything other
    /// than a unit step along one axis is ignored.
    pub fn set_direction_delta(&mut self, dx: i32, dy: i32) -> bool {
        match Direction::from_delta(dx, dy) {
            Some(direction) => self.set_direction(direction),
            None => false,
        }
    }

    /// Advance the clock to `now`: fire due timers, then tick if the current
    /// interval has elapsed since the last tick.
    pub fn frame(&mut self, now: Instant) -> Result<FrameOutcome, GameError> {
        if matches!(self.state.phase, Phase::Idle | Phase::GameOver) {
            return Ok(FrameOutcome::Halted);
        }

        self.engine.fire_timers(&mut self.state, now)?;

        match self.state.phase {
            Phase::Running => {}
            Phase::Dying => return Ok(FrameOutcome::Waiting),
            Phase::Idle | Phase::GameOver => return Ok(FrameOutcome::Halted),
        }

        if let Some(last) = self.last_tick {
            if now.saturating_duration_since(last) < self.state.tick_interval {
                return Ok(FrameOutcome::Waiting);
            }
        }

        self.last_tick = Some(now);
        let result = self.engine.step(&mut self.state, now)?;
        Ok(FrameOutcome::Ticked(result))
    }

    /// Stop the loop for good. Pending timers are dropped so nothing mutates
    /// the state afterwards. Calling it again does nothing.
    pub fn stop(&mut self) -> bool {
        if !matches!(self.state.phase, Phase::Running | Phase::Dying) {
            return false;
        }

        self.state.timers.clear();
        self.state.phase = Phase::GameOver;
        self.last_tick = None;
        self.state.events.push(GameEvent::GameOver {
            final_score: self.state.score,
        });
        info!(score = self.state.score, "game stopped");
        true
    }

    /// Replace the primary food with a chosen kind at a chosen cell
    pub fn place_food(&mut self, kind: FoodKind, position: Position, now: Instant) {
        self.engine.place_food(&mut self.state, kind, position, now);
    }

    /// Take every event produced since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.state.events)
    }

    /// Death animation progress in `[0, 1]`
    pub fn fade_progress(&self, now: Instant) -> f32 {
        self.state
            .fade_progress(now, self.engine.config().timing.death_delay())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn session(config: GameConfig, t0: Instant) -> GameSession {
        GameSession::new(GameEngine::with_seed(config, 99), t0).unwrap()
    }

    #[test]
    fn test_new_session_is_idle() {
        let t0 = Instant::now();
        let mut s = session(GameConfig::default(), t0);

        assert_eq!(s.phase(), Phase::Idle);
        assert!(s.state().food.is_some());
        assert_eq!(s.frame(t0 + ms(500)).unwrap(), FrameOutcome::Halted);
    }

    #[test]
    fn test_start_is_ignored_while_running() {
        let t0 = Instant::now();
        let mut s = session(GameConfig::default(), t0);

        assert!(s.start(t0).unwrap());
        s.state_mut().score = 70;
        assert!(!s.start(t0 + ms(10)).unwrap());
        assert_eq!(s.state().score, 70);
    }

    #[test]
    fn test_frame_ticks_on_interval() {
        let t0 = Instant::now();
        let mut s = session(GameConfig::default(), t0);
        s.start(t0).unwrap();
        let pos = Position::new(0, 0);
        s.place_food(FoodKind::Normal, pos, t0);

        assert!(matches!(s.frame(t0).unwrap(), FrameOutcome::Ticked(_)));
        assert_eq!(s.frame(t0 + ms(100)).unwrap(), FrameOutcome::Waiting);
        assert!(matches!(
            s.frame(t0 + ms(150)).unwrap(),
            FrameOutcome::Ticked(_)
        ));
        assert_eq!(s.state().steps, 2);
    }

    #[test]
    fn test_set_direction_delta() {
        let t0 = Instant::now();
        let mut s = session(GameConfig::default(), t0);
        s.start(t0).unwrap();

        assert!(!s.set_direction_delta(-1, 0));
        assert!(!s.set_direction_delta(1, 1));
        assert!(s.set_direction_delta(0, -1));
        assert_eq!(s.state().snake.next_direction, Direction::Up);
    }

    #[test]
    fn test_death_then_game_over() {
        let t0 = Instant::now();
        let mut s = session(GameConfig::small(), t0);
        s.start(t0).unwrap();
        s.place_food(FoodKind::Normal, Position::new(0, 0), t0);

        // Head starts at (5,5) facing right; the wall is 5 moves away.
        let mut now = t0;
        let died_at = loop {
            if let FrameOutcome::Ticked(result) = s.frame(now).unwrap() {
                if result.terminated {
                    break now;
                }
            }
            now += ms(150);
        };

        assert_eq!(s.phase(), Phase::Dying);
        assert!(!s.set_direction(Direction::Up));
        assert_eq!(s.frame(died_at + ms(999)).unwrap(), FrameOutcome::Waiting);
        assert_eq!(s.frame(died_at + ms(1000)).unwrap(), FrameOutcome::Halted);
        assert_eq!(s.final_score(), Some(0));
    }

    #[test]
    fn test_start_ignored_while_dying_then_restarts() {
        let t0 = Instant::now();
        let mut s = session(GameConfig::small(), t0);
        s.start(t0).unwrap();
        s.state_mut().phase = Phase::Dying;

        assert!(!s.start(t0).unwrap());

        s.state_mut().phase = Phase::GameOver;
        s.state_mut().score = 40;
        assert!(s.handle(Action::Restart, t0).unwrap());
        assert_eq!(s.phase(), Phase::Running);
        assert_eq!(s.state().score, 0);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let t0 = Instant::now();
        let mut s = session(GameConfig::default(), t0);
        s.start(t0).unwrap();
        s.state_mut().score = 20;
        s.drain_events();

        assert!(s.stop());
        assert!(!s.stop());
        assert_eq!(s.phase(), Phase::GameOver);
        assert_eq!(s.frame(t0 + ms(10_000)).unwrap(), FrameOutcome::Halted);
        assert_eq!(
            s.drain_events(),
            vec![GameEvent::GameOver { final_score: 20 }]
        );
    }
}
