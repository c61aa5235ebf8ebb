//! Route classification and the guard's decision type.

use std::collections::BTreeSet;

use msds_protocol::{HOME_PATH, LOGIN_PATH, PUBLIC_PATHS};
use serde::{Deserialize, Serialize};

use crate::RouteTableError;

// ---------------------------------------------------------------------------
// RouteTable
// ---------------------------------------------------------------------------

/// Which paths are public and where the guard sends people.
///
/// Public paths are reachable only while signed out; every other path is
/// protected and reachable only while signed in. Matching is exact string
/// equality, so `/login/` is protected.
///
/// `login_path` must itself be public and `home_path` protected; otherwise
/// the guard keeps redirecting to the page it is already on.
/// [`validate`](Self::validate) checks both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteTable {
    /// Paths reachable without a session.
    pub public: BTreeSet<String>,

    /// Where unauthenticated visitors to a protected path are sent.
    pub login_path: String,

    /// Where authenticated visitors to a public path are sent.
    pub home_path: String,
}

impl RouteTable {
    /// Adds another public path.
    pub fn with_public(mut self, path: impl Into<String>) -> Self {
        self.public.insert(path.into());
        self
    }

    /// Returns `true` if `path` is reachable without a session.
    pub fn is_public(&self, path: &str) -> bool {
        self.public.contains(path)
    }

    /// Checks that the guard can settle under this table.
    ///
    /// # Errors
    /// - [`RouteTableError::LoginPathNotPublic`] if `login_path` is protected
    /// - [`RouteTableError::HomePathPublic`] if `home_path` is public
    pub fn validate(&self) -> Result<(), RouteTableError> {
        if !self.is_public(&self.login_path) {
            return Err(RouteTableError::LoginPathNotPublic(
                self.login_path.clone(),
            ));
        }
        if self.is_public(&self.home_path) {
            return Err(RouteTableError::HomePathPublic(self.home_path.clone()));
        }
        Ok(())
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self {
            public: PUBLIC_PATHS.iter().map(|p| p.to_string()).collect(),
            login_path: LOGIN_PATH.to_string(),
            home_path: HOME_PATH.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// GuardDecision
// ---------------------------------------------------------------------------

/// The outcome of one guard evaluation.
///
/// Exactly one of three things happens per evaluation, never two:
///
/// - **Render**: show the page at the current path.
/// - **Redirect**: show nothing and move to the carried path.
/// - **Pending**: the session store is still loading; show nothing and
///   move nowhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "path")]
pub enum GuardDecision {
    Render,
    Redirect(String),
    Pending,
}

impl GuardDecision {
    /// Returns `true` if the page's content may be shown.
    pub fn renders(&self) -> bool {
        matches!(self, Self::Render)
    }

    /// The redirect target, if this decision is a redirect.
    pub fn redirect_target(&self) -> Option<&str> {
        match self {
            Self::Redirect(path) => Some(path),
            _ => None,
        }
    }
}

impl std::fmt::Display for GuardDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Render => write!(f, "Render"),
            Self::Redirect(path) => write!(f, "Redirect({path})"),
            Self::Pending => write!(f, "Pending"),
        }
    }
}
