//! Session state as seen from outside the store.
//!
//! - [`SessionConfig`] — where the record lives and where logout goes.
//! - [`SessionSnapshot`] — a cloneable copy of the store's state,
//!   broadcast to watchers (the route guard) after every change.
//! - [`SessionContext`] — the read-only view handed to dashboard views.

use msds_protocol::{LOGIN_PATH, Role, Session};

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Configuration for a [`SessionStore`](crate::SessionStore).
///
/// Override only what you need with struct update syntax:
///
/// ```rust
/// use msds_session::SessionConfig;
///
/// let config = SessionConfig {
///     storage_key: "ward7_user".into(),
///     ..SessionConfig::default()
/// };
/// assert_eq!(config.login_path, "/login");
/// ```
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// The single key the session record is stored under.
    pub storage_key: String,

    /// Where `logout` sends the navigator.
    pub login_path: String,

    /// Prefix of generated engineer staff IDs (`ENG-0042`).
    pub engineer_staff_prefix: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            storage_key: "msds_user".to_string(),
            login_path: LOGIN_PATH.to_string(),
            engineer_staff_prefix: "ENG".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// SessionSnapshot
// ---------------------------------------------------------------------------

/// The store's state at one moment.
///
/// ```text
///   Loading ──(initialize)──→ Ready { user: None }
///                                 │  ↑
///                        (login)  ↓  │ (logout)
///                             Ready { user: Some(..) }
/// ```
///
/// While `loading` is `true` the user field carries no meaning and every
/// consumer must wait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub loading: bool,
    pub user: Option<Session>,
}

impl SessionSnapshot {
    /// The state of a store that has not read storage yet.
    pub fn loading() -> Self {
        Self {
            loading: true,
            user: None,
        }
    }

    /// A ready state holding `user`.
    pub fn ready(user: Option<Session>) -> Self {
        Self {
            loading: false,
            user,
        }
    }

    /// Returns `true` if a user is present. Never `true` while loading.
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Returns `true` if the user has the engineer role.
    pub fn is_engineer(&self) -> bool {
        self.user.as_ref().is_some_and(|u| u.role == Role::Engineer)
    }
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self::loading()
    }
}

// ---------------------------------------------------------------------------
// SessionContext
// ---------------------------------------------------------------------------

/// What a view may read about the signed-in user.
///
/// Only obtainable from an initialized store through
/// [`SessionStore::context`](crate::SessionStore::context); the mutators
/// stay on the store itself.
#[derive(Debug, Clone, Copy)]
pub struct SessionContext<'a> {
    pub user: Option<&'a Session>,
    pub is_authenticated: bool,
    pub is_engineer: bool,
}

impl<'a> SessionContext<'a> {
    pub(crate) fn from_snapshot(snapshot: &'a SessionSnapshot) -> Self {
        Self {
            user: snapshot.user.as_ref(),
            is_authenticated: snapshot.is_authenticated(),
            is_engineer: snapshot.is_engineer(),
        }
    }
}
