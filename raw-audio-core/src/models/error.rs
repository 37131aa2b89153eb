use thiserror::Error;

/// Errors raised while building an engine.
///
/// Both kinds are synchronous and fatal to the build attempt: a failed
/// `build()` never leaves a partially constructed engine behind. Runtime
/// file I/O failures inside a worker are not represented here — they are
/// recovered locally by stopping the engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The stream parameters were invalid, rejected by the device, or a
    /// mandatory path was missing.
    #[error("configuration rejected: {0}")]
    Configuration(String),

    /// The device accepted the configuration but the stream failed to reach
    /// a ready state.
    #[error("stream initialization failed: {0}")]
    Initialization(String),
}
