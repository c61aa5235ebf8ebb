//! Credential check for the engineer login.
//!
//! The dashboard does not verify passwords itself. It defines the
//! [`Authenticator`] trait, a single async method that looks at the
//! submitted [`Credentials`] and says yes or no. Deployments plug in a call
//! to their identity service here; the prototype ships
//! [`PlaceholderAuthenticator`], which says yes to everyone.

use msds_protocol::Credentials;

use crate::SessionError;

/// Decides whether an engineer login may proceed.
///
/// # Trait bounds
///
/// - `Send + Sync` → one authenticator can be shared by every task that
///   holds the store.
/// - `'static` → it owns its configuration (endpoints, keys) and lives as
///   long as the store does.
///
/// # Example
///
/// ```rust
/// use msds_protocol::Credentials;
/// use msds_session::{Authenticator, SessionError};
///
/// /// Only lets in accounts on the hospital domain.
/// struct DomainAuthenticator;
///
/// impl Authenticator for DomainAuthenticator {
///     async fn verify_engineer(
///         &self,
///         credentials: &Credentials,
///     ) -> Result<(), SessionError> {
///         if credentials.email.ends_with("@msds.org") {
///             Ok(())
///         } else {
///             Err(SessionError::AuthFailed("unknown domain".into()))
///         }
///     }
/// }
/// ```
pub trait Authenticator: Send + Sync + 'static {
    /// Verifies the submitted credentials.
    ///
    /// # Returns
    /// - `Ok(())` — the engineer session may be created
    /// - `Err(SessionError::AuthFailed)` — reject the login
    fn verify_engineer(
        &self,
        credentials: &Credentials,
    ) -> impl std::future::Future<Output = Result<(), SessionError>> + Send;
}

/// Accepts every engineer login without looking at the password.
///
/// This is the prototype behavior and it grants engineer access to anyone
/// who types an email. Replace it before the dashboard guards anything
/// real.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderAuthenticator;

impl Authenticator for PlaceholderAuthenticator {
    async fn verify_engineer(
        &self,
        credentials: &Credentials,
    ) -> Result<(), SessionError> {
        tracing::warn!(
            email = %credentials.email,
            "engineer login accepted without credential verification"
        );
        Ok(())
    }
}
