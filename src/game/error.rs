use std::path::PathBuf;

use thiserror::Error;

/// Faults raised by the engine itself.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    /// Every cell of the grid is covered by the snake or by other food.
    #[error("board full: no free cell left on the {width}x{height} grid")]
    BoardFull { width: usize, height: usize },
}

/// Failures while loading or validating a [`GameConfig`](super::GameConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml_ng::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}
