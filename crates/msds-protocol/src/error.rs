//! Error types for the protocol layer.
//!
//! Each MSDS crate defines its own error enum, so a `ProtocolError` always
//! means "the session record could not be encoded, decoded, or trusted",
//! never a storage or navigation problem.

/// Errors that can occur while handling the session record format.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serializing a value to its stored text form failed.
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// The stored text is not valid JSON, is truncated, or has the wrong
    /// shape for the requested type.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The record parsed but breaks a session invariant
    /// (for example a blank email).
    #[error("invalid session: {0}")]
    InvalidSession(String),
}
