//! Unified error type for the MSDS core.

use msds_guard::RouteTableError;
use msds_protocol::ProtocolError;
use msds_session::{SessionError, StorageError};

/// Top-level error that wraps every crate-specific error.
///
/// `#[from]` on each variant lets `?` convert sub-crate errors, so code
/// using the `msds` meta-crate only ever sees this one type.
#[derive(Debug, thiserror::Error)]
pub enum MsdsError {
    /// The session record could not be encoded, decoded, or trusted.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session operation failed (not initialized, invalid, rejected).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A durable slot failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The route table would leave the guard redirecting forever.
    #[error("invalid route table: {0}")]
    Routes(#[from] RouteTableError),
}
