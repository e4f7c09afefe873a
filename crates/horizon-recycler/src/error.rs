//! Error types for the adapter.

use crate::view::ViewType;

/// Result type alias for adapter operations.
pub type Result<T> = std::result::Result<T, AdapterError>;

/// Errors raised synchronously to the direct caller. Nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    /// A position or range fell outside the current item list.
    #[error("position {position} is out of range for {len} items")]
    OutOfRange { position: usize, len: usize },

    /// The host reported a negative position.
    #[error("invalid position {position}: positions must not be negative")]
    InvalidPosition { position: isize },

    /// View holder creation was requested for a type with no factory.
    #[error("no view holder factory registered for {view_type}")]
    NoFactory { view_type: ViewType },

    /// The binder for a type expects a different holder than the one given.
    #[error("view holder does not match the binder registered for {view_type}")]
    HolderMismatch { view_type: ViewType },

    /// The adapter configuration could not be parsed.
    #[error("invalid adapter configuration: {0}")]
    Config(#[from] toml::de::Error),
}

impl AdapterError {
    /// Create an out-of-range error.
    pub fn out_of_range(position: usize, len: usize) -> Self {
        Self::OutOfRange { position, len }
    }
}
