//! Core game logic for Evolution Snake
//!
//! Everything here is free of I/O and rendering. Time is always passed in, so
//! the whole game can be driven from tests with synthetic instants.

pub mod action;
pub mod collision;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod food;
pub mod progression;
pub mod session;
pub mod state;
pub mod timers;

// Re-export commonly used types
pub use action::{Action, Direction};
pub use config::{GameConfig, SpawnConfig, TimingConfig, Variant};
pub use engine::{GameEngine, StepInfo, StepResult};
pub use error::{ConfigError, GameError};
pub use events::GameEvent;
pub use food::{Food, FoodKind, FoodSpawner};
pub use progression::{ProgressionTracker, Tier, TierCapabilities};
pub use session::{FrameOutcome, GameSession};
pub use state::{CollisionType, Death, GameState, Phase, Position, Snake};
pub use timers::{TimerHandle, TimerKind, TimerTable};
