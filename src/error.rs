//! Error types
//!
//! Only configuration can fail. Illegal player intents are expected and
//! are rejected silently (logged), never surfaced as errors.

use std::fmt;

use crate::consts::{MAX_GRID_DIMENSION, MIN_GRID_DIMENSION};

/// Malformed arena configuration, reported before any entity is created.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    InvalidDimensions { width: i32, height: i32 },
    InvalidTileSize(f32),
    InvalidDuration { name: &'static str, value: f32 },
    InvalidProbability { name: &'static str, value: f32 },
    InvalidThrowDistance(u32),
    InvalidPlayerCount(usize),
    InvalidStat { name: &'static str },
    /// Override document could not be parsed
    Parse(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidDimensions { width, height } => {
                write!(
                    f,
                    "arena sides must be {}..={} tiles, got {width}x{height}",
                    MIN_GRID_DIMENSION, MAX_GRID_DIMENSION
                )
            }
            ConfigError::InvalidTileSize(size) => {
                write!(f, "tile size must be positive, got {size}")
            }
            ConfigError::InvalidDuration { name, value } => {
                write!(f, "{name} must be a positive duration, got {value}")
            }
            ConfigError::InvalidProbability { name, value } => {
                write!(f, "{name} must be within [0, 1], got {value}")
            }
            ConfigError::InvalidThrowDistance(distance) => {
                write!(f, "throw distance must be at least 1, got {distance}")
            }
            ConfigError::InvalidPlayerCount(count) => {
                write!(f, "player count must be between 1 and 4, got {count}")
            }
            ConfigError::InvalidStat { name } => write!(f, "invalid starting stat: {name}"),
            ConfigError::Parse(detail) => write!(f, "config parse error: {detail}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<serde_json::Error> for ConfigError {
    fn from(error: serde_json::Error) -> Self {
        ConfigError::Parse(error.to_string())
    }
}
