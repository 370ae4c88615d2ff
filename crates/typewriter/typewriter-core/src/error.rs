//! Error types for the typewriter engine.

use thiserror::Error;

use crate::ids::TargetId;

/// Everything that can go wrong while mounting or driving a typewriter.
///
/// None of these are fatal to a page: trigger entry points on
/// [`crate::Stage`] swallow them and the worst outcome is a skipped animation.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum TypewriterError {
    /// The surface exposes no text-bearing node to mutate.
    #[error("target has no text node to animate")]
    NoTextNode,

    /// A script must hold at least one line.
    #[error("script is empty")]
    EmptyScript,

    #[error("invalid config: {reason}")]
    InvalidConfig { reason: String },

    #[error("unknown target: {0:?}")]
    UnknownTarget(TargetId),

    #[error("script index {index} out of range (script has {len} lines)")]
    IndexOutOfRange { index: usize, len: usize },

    /// Scene JSON failed to parse or described an unusable mount.
    #[error("scene error: {0}")]
    Scene(String),
}

impl From<serde_json::Error> for TypewriterError {
    fn from(err: serde_json::Error) -> Self {
        TypewriterError::Scene(err.to_string())
    }
}
