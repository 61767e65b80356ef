//! Error types for the engine binary.
//!
//! [`EngineError`] is the top-level error of a session, wrapping every
//! failure that can stop the turn loop.

use dominion_types::KingdomId;

/// Top-level error for a play session.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type the session can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: dominion_core::ConfigError,
    },

    /// A store or config provider failed.
    #[error("store error: {source}")]
    Store {
        /// The underlying store error.
        #[from]
        source: dominion_core::StoreError,
    },

    /// A core service rejected its input.
    #[error("core error: {source}")]
    Core {
        /// The underlying core error.
        #[from]
        source: dominion_core::CoreError,
    },

    /// The session's kingdom disappeared from the store.
    #[error("kingdom {id} is no longer stored")]
    KingdomMissing {
        /// The kingdom that was looked up.
        id: KingdomId,
    },
}
