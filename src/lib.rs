//! Evolution Snake - a terminal snake game with special food, lives and
//! evolution tiers
//!
//! This library provides:
//! - Core game logic, timers and the session state machine (game module)
//! - Keyboard mapping (input module)
//! - TUI rendering (render module)
//! - Per-session statistics (metrics module)
//! - The interactive terminal loop (modes module)

pub mod game;
pub mod input;
pub mod metrics;
pub mod modes;
pub mod render;
