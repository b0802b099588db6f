use thiserror::Error;

/// Recoverable failure taxonomy for the engine.
///
/// Nothing in this enum is allowed to abort a simulation tick; every variant
/// degrades to "this agent's event/spawn/placement this tick did not happen".
#[derive(Debug, Error)]
pub enum EngineError {
    /// Corrupted or out-of-range state, recovered by clamping or defaulting.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// An event variant's execution failed; caught at the dispatch boundary.
    #[error("dispatch of '{variant}' failed")]
    DispatchFailure {
        variant: &'static str,
        #[source]
        source: anyhow::Error,
    },
}
