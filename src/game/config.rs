use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::ConfigError;
use super::food::FoodKind;

/// Which rule set to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// Plain snake: normal food only, no lives, no evolution
    Classic,
    /// Every food kind, extra lives and evolution tiers
    #[default]
    Evolution,
}

/// Tick timing and timed effects, all in milliseconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Tick interval at score zero
    pub base_tick_ms: u64,
    /// Fastest the game ever gets
    pub min_tick_ms: u64,
    /// Interval reduction per completed score step
    pub tick_step_ms: u64,
    /// Points needed for one step of speed-up
    pub score_per_step: u32,
    /// Interval multiplier while slow motion is active
    pub slow_motion_factor: f64,
    pub slow_motion_ms: u64,
    pub bomb_ttl_ms: u64,
    pub heart_ttl_ms: u64,
    /// Grace period between a fatal collision and game over
    pub death_delay_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            base_tick_ms: 150,
            min_tick_ms: 50,
            tick_step_ms: 10,
            score_per_step: 50,
            slow_motion_factor: 1.5,
            slow_motion_ms: 1000,
            bomb_ttl_ms: 5000,
            heart_ttl_ms: 3000,
            death_delay_ms: 1000,
        }
    }
}

impl TimingConfig {
    /// Tick interval for a score: `max(min, base - step * floor(score / score_per_step))`
    pub fn interval_for_score(&self, score: u32) -> Duration {
        let steps = u64::from(score / self.score_per_step.max(1));
        let reduction = steps.saturating_mul(self.tick_step_ms);
        let ms = self
            .base_tick_ms
            .saturating_sub(reduction)
            .max(self.min_tick_ms);
        Duration::from_millis(ms)
    }

    pub fn slow_motion(&self) -> Duration {
        Duration::from_millis(self.slow_motion_ms)
    }

    pub fn death_delay(&self) -> Duration {
        Duration::from_millis(self.death_delay_ms)
    }

    /// How long an unconsumed food of this kind stays on the board
    pub fn lifetime(&self, kind: FoodKind) -> Option<Duration> {
        match kind {
            FoodKind::Bomb => Some(Duration::from_millis(self.bomb_ttl_ms)),
            FoodKind::Heart => Some(Duration::from_millis(self.heart_ttl_ms)),
            FoodKind::Normal | FoodKind::Special => None,
        }
    }
}

/// Weights used by the food spawner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    /// Score at which bombs and hearts can start to appear
    pub unlock_score: u32,
    /// Special chance below the unlock score
    pub early_special_chance: f64,
    pub bomb_chance: f64,
    pub special_chance: f64,
    pub heart_chance: f64,
    /// Random probes before falling back to scanning for free cells
    pub max_attempts: usize,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            unlock_score: 50,
            early_special_chance: 0.15,
            bomb_chance: 0.12,
            special_chance: 0.13,
            heart_chance: 0.03,
            max_attempts: 256,
        }
    }
}

/// Configuration for the game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Width of the game grid
    pub grid_width: usize,
    /// Height of the game grid
    pub grid_height: usize,
    /// Initial length of the snake
    pub initial_snake_length: usize,
    /// Bombs never shrink the snake below this
    pub min_snake_length: usize,

    pub lives_enabled: bool,
    pub initial_lives: u32,
    pub max_lives: u32,
    pub progression_enabled: bool,
    /// Food kinds the spawner may produce; Normal is always allowed
    pub food_kinds: Vec<FoodKind>,

    pub timing: TimingConfig,
    pub spawn: SpawnConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::for_variant(Variant::default())
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

    /// Capability set for one of the two rule sets
    pub fn for_variant(variant: Variant) -> Self {
        let (lives_enabled, progression_enabled, food_kinds) = match variant {
            Variant::Classic => (false, false, vec![FoodKind::Normal]),
            Variant::Evolution => (true, true, FoodKind::ALL.to_vec()),
        };

        Self {
            grid_width: 20,
            grid_height: 20,
            initial_snake_length: 3,
            min_snake_length: 3,
            lives_enabled,
            initial_lives: 0,
            max_lives: 3,
            progression_enabled,
            food_kinds,
            timing: TimingConfig::default(),
            spawn: SpawnConfig::default(),
        }
    }

    pub fn classic() -> Self {
        Self::for_variant(Variant::Classic)
    }

    /// Create a small grid for testing
    pub fn small() -> Self {
        Self::new(10, 10)
    }

    pub fn allows(&self, kind: FoodKind) -> bool {
        kind == FoodKind::Normal || self.food_kinds.contains(&kind)
    }

    /// Lives cap that actually applies; zero when lives are disabled
    pub fn effective_max_lives(&self) -> u32 {
        if self.lives_enabled {
            self.max_lives
        } else {
            0
        }
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_yaml_ng::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));

        if self.grid_width < 5 || self.grid_height < 5 {
            return invalid(format!(
                "grid must be at least 5x5, got {}x{}",
                self.grid_width, self.grid_height
            ));
        }
        if self.initial_snake_length == 0 || self.min_snake_length == 0 {
            return invalid("snake lengths must be at least 1".to_string());
        }
        // The start snake extends left of the centre tile.
        if self.initial_snake_length > self.grid_width / 2 + 1 {
            return invalid(format!(
                "initial snake length {} does not fit a grid {} wide",
                self.initial_snake_length, self.grid_width
            ));
        }
        if self.initial_lives > self.max_lives {
            return invalid(format!(
                "initial lives {} exceed max lives {}",
                self.initial_lives, self.max_lives
            ));
        }

        let t = &self.timing;
        if t.min_tick_ms == 0 || t.min_tick_ms > t.base_tick_ms {
            return invalid(format!(
                "min tick {}ms must be non-zero and at most base tick {}ms",
                t.min_tick_ms, t.base_tick_ms
            ));
        }
        if t.score_per_step == 0 {
            return invalid("score_per_step must be non-zero".to_string());
        }
        if !(t.slow_motion_factor.is_finite() && t.slow_motion_factor > 0.0) {
            return invalid("slow_motion_factor must be a positive number".to_string());
        }

        let s = &self.spawn;
        for (name, p) in [
            ("early_special_chance", s.early_special_chance),
            ("bomb_chance", s.bomb_chance),
            ("special_chance", s.special_chance),
            ("heart_chance", s.heart_chance),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return invalid(format!("{name} must be between 0.0 and 1.0, got {p}"));
            }
        }
        if s.bomb_chance + s.special_chance + s.heart_chance > 1.0 {
            return invalid("bomb, special and heart chances sum above 1.0".to_string());
        }
        if s.max_attempts == 0 {
            return invalid("max_attempts must be non-zero".to_string());
        }

        Ok(())
    }
}
