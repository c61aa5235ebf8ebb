//! Error types for the session layer.

/// Errors returned by [`SessionStore`](crate::SessionStore) operations.
///
/// A malformed stored record is deliberately absent from this list: the
/// store treats it as "nobody is signed in" and only logs it.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The store has not finished [`initialize`](crate::SessionStore::initialize).
    ///
    /// Reading the session context or calling a mutator before that point
    /// is a programming error and fails immediately.
    #[error("session store used before initialization")]
    NotInitialized,

    /// The session handed to `login` breaks a session invariant.
    #[error(transparent)]
    InvalidSession(#[from] msds_protocol::ProtocolError),

    /// The [`Authenticator`](crate::Authenticator) rejected the credentials.
    #[error("authentication failed: {0}")]
    AuthFailed(String),
}

/// Errors from a [`DurableSlot`](crate::DurableSlot).
///
/// The store never surfaces these to its callers; they end up in the log.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The key cannot be mapped to a storage location safely.
    #[error("invalid storage key `{0}`")]
    InvalidKey(String),
}
