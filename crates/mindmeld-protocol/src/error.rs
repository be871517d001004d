//! Error types for the protocol layer.
//!
//! Each crate in Mindmeld defines its own error enum. A `ProtocolError`
//! always means the bytes on the wire were the problem, never the game
//! state behind them.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    ///
    /// Common causes: malformed JSON, an unknown `type` tag, or a field
    /// with the wrong data type.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// An `UpdateLobby` request named an action the server doesn't know.
    #[error("unknown action: {0}")]
    UnknownAction(String),

    /// A request decoded fine but is missing a field it needs.
    #[error("missing required field: {0}")]
    MissingField(&'static str),
}
