//! Generation errors

use thiserror::Error;

/// Errors that can stop a generation run
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenError {
    /// A configuration value is unusable; raised before any generation work.
    #[error("invalid configuration for `{field}`: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    /// Room placement ran out of candidate positions and retries.
    #[error("room placement exhausted: placed {placed} of {requested} rooms")]
    PlacementExhausted { placed: usize, requested: usize },

    /// A cell access fell outside the grid.
    #[error("cell ({x}, {y}) is outside the {width}x{height} grid")]
    OutOfBounds {
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    },
}

impl GenError {
    /// Shorthand for a configuration failure
    pub fn config(field: &'static str, reason: impl Into<String>) -> Self {
        GenError::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}

/// Result alias used throughout the crate
pub type Result<T> = core::result::Result<T, GenError>;
