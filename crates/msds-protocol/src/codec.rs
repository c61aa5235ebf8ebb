//! Codec trait and implementations for the stored session record.
//!
//! The durable slot holds text, so a codec here converts between Rust
//! values and `String`s. The store only depends on the [`Codec`] trait;
//! [`JsonCodec`] is the format the dashboard writes today.

use serde::{de::DeserializeOwned, Serialize};

use crate::{ProtocolError, Session};

/// Encodes values to text and decodes them back.
///
/// `Send + Sync + 'static` so a store holding a codec can live inside a
/// long-running Tokio task.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into its stored text form.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if the value cannot be represented.
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError>;

    /// Parses stored text back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` on malformed or mismatched input.
    fn decode<T: DeserializeOwned>(
        &self,
        data: &str,
    ) -> Result<T, ProtocolError>;

    /// Decodes a session record and checks its invariants.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` or `ProtocolError::InvalidSession`.
    fn decode_session(&self, data: &str) -> Result<Session, ProtocolError> {
        let session: Session = self.decode(data)?;
        session.validate()?;
        Ok(session)
    }
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] backed by `serde_json`.
///
/// Behind the `json` feature flag (enabled by default).
///
/// ## Example
///
/// ```rust
/// use msds_protocol::{Codec, JsonCodec, Role, SessionCandidate};
///
/// let codec = JsonCodec;
/// let session = SessionCandidate::new("ops@msds.org", "Ops")
///     .into_session()
///     .unwrap();
///
/// let text = codec.encode(&session).unwrap();
/// let decoded = codec.decode_session(&text).unwrap();
/// assert_eq!(decoded.role, Role::User);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError> {
        serde_json::to_string(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(
        &self,
        data: &str,
    ) -> Result<T, ProtocolError> {
        serde_json::from_str(data).map_err(ProtocolError::Decode)
    }
}
