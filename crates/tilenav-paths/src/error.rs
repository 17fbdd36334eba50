//! Error type for construction-time failures.
//!
//! Searches never return errors: a missing path is reported as data through
//! [`PathResult`](crate::PathResult). [`NavError`] only covers building the
//! grid, parsing tile layers and starting the dispatcher.

/// Errors raised while setting up navigation.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum NavError {
    /// A configuration value is out of its valid range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Tile rows could not be turned into a [`TileLayer`](crate::TileLayer).
    #[error("invalid tile layer: {0}")]
    TileLayer(String),

    /// A dispatcher worker thread could not be started.
    #[error("failed to spawn path worker: {0}")]
    WorkerSpawn(#[from] std::io::Error),

    /// Configuration JSON could not be parsed.
    #[cfg(feature = "serde")]
    #[error("config parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

impl NavError {
    /// Creates an invalid configuration error with the given message.
    #[must_use]
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    /// Creates a tile layer error with the given message.
    #[must_use]
    pub fn tile_layer(message: impl Into<String>) -> Self {
        Self::TileLayer(message.into())
    }
}
