//! Error types for the engine binary.

/// Top-level error for the engine binary.
///
/// Each variant wraps a subsystem error so `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: spacefund_core::config::ConfigError,
    },

    /// The session runner stopped while the autopilot was playing.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: spacefund_core::RunnerError,
    },

    /// The autopilot section of the config file could not be read.
    #[error("autopilot config error: {message}")]
    Autopilot {
        /// Description of the failure.
        message: String,
    },

    /// The runner task panicked or was cancelled.
    #[error("runner task failed: {message}")]
    Task {
        /// Description of the failure.
        message: String,
    },
}
