use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

use super::{
    action::Direction,
    collision::{self, FoodSlot, MoveOutcome},
    config::GameConfig,
    error::GameError,
    events::GameEvent,
    food::{Food, FoodKind, FoodSpawner},
    progression::{ProgressionTracker, Tier},
    state::{CollisionType, Death, GameState, Phase, Position, Snake},
    timers::TimerKind,
};

/// Information about a step
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StepInfo {
    /// Kind of food eaten this step, if any
    pub eaten: Option<FoodKind>,
    /// Type of collision if one occurred
    pub collision: Option<CollisionType>,
    /// The collision cost a life instead of ending the game
    pub life_lost: bool,
    /// Tier reached this step, if it changed
    pub tier_change: Option<Tier>,
}

/// Result of a game step
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    /// Whether the game has terminated
    pub terminated: bool,
    /// Additional information about the step
    pub info: StepInfo,
}

impl StepResult {
    fn skipped(terminated: bool) -> Self {
        Self {
            terminated,
            info: StepInfo::default(),
        }
    }
}

fn expiry_timer(kind: FoodKind) -> Option<TimerKind> {
    match kind {
        FoodKind::Bomb => Some(TimerKind::BombExpiry),
        FoodKind::Heart => Some(TimerKind::HeartExpiry),
        FoodKind::Normal | FoodKind::Special => None,
    }
}

/// The game engine that handles all game logic
pub struct GameEngine {
    config: GameConfig,
    rng: StdRng,
    spawner: FoodSpawner,
    progression: ProgressionTracker,
}

impl GameEngine {
    /// Create a new game engine with the given configuration
    pub fn new(config: GameConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Engine whose food placement is reproducible
    pub fn with_seed(config: GameConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: GameConfig, rng: StdRng) -> Self {
        Self {
            spawner: FoodSpawner::new(&config),
            progression: ProgressionTracker::new(config.progression_enabled),
            config,
            rng,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Snake in its start configuration: centred, facing right
    pub fn initial_snake(&self) -> Snake {
        let center_x = (self.config.grid_width / 2) as i32;
        let center_y = (self.config.grid_height / 2) as i32;

        Snake::new(
            Position::new(center_x, center_y),
            Direction::Right,
            self.config.initial_snake_length,
        )
    }

    /// Reset the game to initial state. The returned state is idle.
    pub fn reset(&mut self, now: Instant) -> Result<GameState, GameError> {
        let mut state = GameState::new(
            self.initial_snake(),
            None,
            self.config.grid_width,
            self.config.grid_height,
            self.config.timing.interval_for_score(0),
        );
        if self.config.lives_enabled {
            state.lives = self.config.initial_lives;
        }
        state.tier = self.progression.tier_for(0);

        self.respawn_food(&mut state, now)?;
        Ok(state)
    }

    /// Buffer a heading for the next tick; reversals are refused
    pub fn set_direction(&self, state: &mut GameState, direction: Direction) -> bool {
        state.snake.set_next_direction(direction)
    }

    /// Execute one tick of the game
    pub fn step(&mut self, state: &mut GameState, now: Instant) -> Result<StepResult, GameError> {
        if state.phase != Phase::Running {
            return Ok(StepResult::skipped(!state.is_alive()));
        }

        state.snake.apply_next_direction();
        let new_head = state.snake.next_head();
        state.steps += 1;

        let outcome = collision::classify(state, new_head);
        if let MoveOutcome::Collision(cause) = outcome {
            return self.handle_collision(state, new_head, cause, now);
        }

        state.snake.push_head(new_head);

        let eaten = match outcome {
            MoveOutcome::Food(FoodSlot::Primary) => state.food.take().map(|f| (f, FoodSlot::Primary)),
            MoveOutcome::Food(FoodSlot::Extra) => {
                state.extra_food.take().map(|f| (f, FoodSlot::Extra))
            }
            _ => None,
        };

        let eaten_kind = match eaten {
            Some((food, slot)) => {
                self.apply_food_effect(state, food.kind, now);
                state.events.push(GameEvent::FoodEaten {
                    kind: food.kind,
                    position: food.position,
                });
                debug!(kind = food.kind.name(), score = state.score, "food eaten");

                if slot == FoodSlot::Primary {
                    self.respawn_food(state, now)?;
                    if food.kind == FoodKind::Heart {
                        self.spawn_extra_food(state, now)?;
                    }
                }
                Some(food.kind)
            }
            None => {
                state.snake.pop_tail();
                None
            }
        };

        self.refresh_speed(state);
        let tier_change = self.refresh_tier(state);

        Ok(StepResult {
            terminated: false,
            info: StepInfo {
                eaten: eaten_kind,
                tier_change,
                ..StepInfo::default()
            },
        })
    }

    /// Run every timer that is due at `now`. Returns the kinds that fired.
    pub fn fire_timers(
        &mut self,
        state: &mut GameState,
        now: Instant,
    ) -> Result<Vec<TimerKind>, GameError> {
        let due = state.timers.pop_due(now);

        for &kind in &due {
            match kind {
                TimerKind::BombExpiry => self.expire_food(state, FoodKind::Bomb, now)?,
                TimerKind::HeartExpiry => self.expire_food(state, FoodKind::Heart, now)?,
                TimerKind::SlowMotion => {
                    self.refresh_speed(state);
                    state.events.push(GameEvent::SlowMotionEnded);
                }
                TimerKind::GameOver => {
                    if state.phase == Phase::Dying {
                        state.phase = Phase::GameOver;
                        state.events.push(GameEvent::GameOver {
                            final_score: state.score,
                        });
                        info!(score = state.score, steps = state.steps, "game over");
                    }
                }
            }
        }

        Ok(due)
    }

    /// Put a specific food on the board as the primary item, replacing the
    /// current one and its expiry timer.
    pub fn place_food(
        &self,
        state: &mut GameState,
        kind: FoodKind,
        position: Position,
        now: Instant,
    ) {
        state.timers.cancel(TimerKind::BombExpiry);
        state.timers.cancel(TimerKind::HeartExpiry);

        let mut food = Food::new(position, kind, now);
        if let (Some(timer), Some(ttl)) = (expiry_timer(kind), self.config.timing.lifetime(kind)) {
            let deadline = now + ttl;
            food.expires_at = Some(deadline);
            state.timers.schedule(timer, deadline);
        }

        state.food = Some(food);
        state.events.push(GameEvent::FoodSpawned {
            kind,
            position,
            extra: false,
        });
        debug!(kind = kind.name(), x = position.x, y = position.y, "food spawned");
    }

    /// Replace the primary food with a freshly rolled one
    pub fn respawn_food(&mut self, state: &mut GameState, now: Instant) -> Result<(), GameError> {
        state.food = None;

        let kind = self.spawner.decide_kind(
            &mut self.rng,
            state.score,
            state.lives,
            self.config.effective_max_lives(),
        );
        let position = {
            let occupied = &*state;
            self.spawner.place(
                &mut self.rng,
                state.grid_width,
                state.grid_height,
                |p| occupied.is_occupied(p),
            )?
        };

        self.place_food(state, kind, position, now);
        Ok(())
    }

    fn spawn_extra_food(&mut self, state: &mut GameState, now: Instant) -> Result<(), GameError> {
        state.extra_food = None;

        let position = {
            let occupied = &*state;
            self.spawner.place(
                &mut self.rng,
                state.grid_width,
                state.grid_height,
                |p| occupied.is_occupied(p),
            )?
        };

        state.extra_food = Some(Food::new(position, FoodKind::Normal, now));
        state.events.push(GameEvent::FoodSpawned {
            kind: FoodKind::Normal,
            position,
            extra: true,
        });
        Ok(())
    }

    fn apply_food_effect(&self, state: &mut GameState, kind: FoodKind, now: Instant) {
        let before = state.score;
        let delta = kind.score_delta();
        state.score = if delta >= 0 {
            state.score.saturating_add(delta.unsigned_abs())
        } else {
            state.score.saturating_sub(delta.unsigned_abs())
        };

        // The new head is already in place; keeping the tail is one segment.
        let growth = kind.growth();
        if growth > 0 {
            state.snake.extend_tail((growth - 1) as usize);
        } else {
            state.snake.pop_tail();
            if growth < 0 {
                let removed = state
                    .snake
                    .shrink(growth.unsigned_abs() as usize, self.config.min_snake_length);
                if !removed.is_empty() {
                    state
                        .events
                        .push(GameEvent::SegmentsLost { positions: removed });
                }
            }
        }

        match kind {
            FoodKind::Special => {
                state
                    .timers
                    .schedule(TimerKind::SlowMotion, now + self.config.timing.slow_motion());
                state.events.push(GameEvent::SlowMotionStarted);
            }
            FoodKind::Heart => {
                let cap = self.config.effective_max_lives();
                if state.lives < cap {
                    state.lives += 1;
                    state.events.push(GameEvent::LifeGained { lives: state.lives });
                }
            }
            FoodKind::Normal | FoodKind::Bomb => {}
        }

        if state.score != before {
            state.events.push(GameEvent::ScoreChanged { score: state.score });
        }
    }

    fn handle_collision(
        &mut self,
        state: &mut GameState,
        new_head: Position,
        cause: CollisionType,
        now: Instant,
    ) -> Result<StepResult, GameError> {
        let position = new_head.clamped(state.grid_width, state.grid_height);

        if self.config.lives_enabled && state.lives > 0 {
            state.lives -= 1;
            state.snake = self.initial_snake();
            state.events.push(GameEvent::LifeLost {
                position,
                lives_left: state.lives,
            });
            info!(?cause, lives_left = state.lives, "life lost");

            if state.food.is_some_and(|f| state.snake.contains(f.position)) {
                self.respawn_food(state, now)?;
            }
            if state
                .extra_food
                .is_some_and(|f| state.snake.contains(f.position))
            {
                state.extra_food = None;
            }

            return Ok(StepResult {
                terminated: false,
                info: StepInfo {
                    collision: Some(cause),
                    life_lost: true,
                    ..StepInfo::default()
                },
            });
        }

        state.phase = Phase::Dying;
        state.death = Some(Death {
            position,
            cause,
            at: now,
        });
        state.timers.clear();
        state
            .timers
            .schedule(TimerKind::GameOver, now + self.config.timing.death_delay());
        state.events.push(GameEvent::Died { position, cause });
        info!(?cause, score = state.score, "snake died");

        Ok(StepResult {
            terminated: true,
            info: StepInfo {
                collision: Some(cause),
                ..StepInfo::default()
            },
        })
    }

    fn expire_food(
        &mut self,
        state: &mut GameState,
        kind: FoodKind,
        now: Instant,
    ) -> Result<(), GameError> {
        let Some(food) = state.food.filter(|f| f.kind == kind) else {
            return Ok(());
        };

        state.events.push(GameEvent::FoodExpired {
            kind,
            position: food.position,
        });
        debug!(kind = kind.name(), "food expired");
        self.respawn_food(state, now)
    }

    fn refresh_speed(&self, state: &mut GameState) {
        let base = self.config.timing.interval_for_score(state.score);
        state.tick_interval = if state.timers.is_pending(TimerKind::SlowMotion) {
            let slowed = base.as_millis() as f64 * self.config.timing.slow_motion_factor;
            Duration::from_millis(slowed.round() as u64)
        } else {
            base
        };
    }

    fn refresh_tier(&self, state: &mut GameState) -> Option<Tier> {
        let next = self.progression.evaluate(state.tier, state.score)?;
        state.events.push(GameEvent::TierChanged {
            from: state.tier,
            to: next,
        });
        info!(from = state.tier.name(), to = next.name(), "tier changed");
        state.tier = next;
        Some(next)
    }
}
