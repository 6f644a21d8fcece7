//! Error types for the session core and the engine boundary

use thiserror::Error;

use crate::engine::BodyHandle;

/// Failures reported by the scene engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("unknown body handle {0:?}")]
    UnknownBody(BodyHandle),

    #[error("physics has not been enabled")]
    NotInitialized,

    #[error("engine rejected request: {0}")]
    Rejected(String),
}

/// Errors surfaced by [`crate::sim::SessionController`].
///
/// All of these are recoverable; the caller shows them to the player and
/// carries on.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    #[error("ball variant {0} is not in the catalog")]
    InvalidVariant(u32),

    #[error("no ball selected")]
    NoVariantSelected,

    #[error("session already started")]
    AlreadyPlaying,

    #[error("engine state error: {0}")]
    EngineState(#[from] EngineError),
}

/// Errors from loading or validating [`crate::GameSettings`].
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings JSON is malformed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("could not read settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid setting `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}
