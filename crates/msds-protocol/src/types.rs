//! The session record and the inputs that create it.
//!
//! A [`Session`] is what the dashboard knows about the person at the
//! keyboard. It is the one structure that is written to durable storage,
//! so its serde layout doubles as the persisted record format:
//!
//! ```json
//! { "email": "a@b.org", "name": "a", "role": "engineer", "staffId": "ENG-0042" }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// What kind of account is signed in.
///
/// What a signed-in user may do on the dashboard.
///
/// Serialized lowercase (`"user"`, `"admin"`, `"engineer"`) to match the
/// stored record. `#[default]` makes `Role::default()` return `User`, which
/// is the role assigned when a login does not name one.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular ward or pharmacy staff.
    #[default]
    User,

    /// Fleet administrator.
    Admin,

    /// Maintenance engineer with access to robot diagnostics.
    Engineer,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Admin => write!(f, "admin"),
            Self::Engineer => write!(f, "engineer"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            "engineer" => Ok(Self::Engineer),
            other => Err(ProtocolError::InvalidSession(format!(
                "unknown role `{other}`"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// The authenticated identity.
///
/// There is no "half" session: the store holds either `None` or a
/// `Session` whose [`validate`](Self::validate) passes. Optional fields are
/// left out of the JSON entirely when they are `None`, and unknown fields
/// in a stored record are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Login email. Required and non-blank.
    pub email: String,

    /// Display name shown in the dashboard header.
    #[serde(default)]
    pub name: String,

    /// Account kind. A stored record without a role is read as `user`.
    #[serde(default)]
    pub role: Role,

    /// Staff identifier, if the account has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staff_id: Option<String>,

    /// Hospital department, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
}

impl Session {
    /// Checks the fields every session must carry.
    ///
    /// # Errors
    /// Returns [`ProtocolError::InvalidSession`] when `email` is blank.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        if self.email.trim().is_empty() {
            return Err(ProtocolError::InvalidSession(
                "email must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Returns `true` if this session belongs to an engineer.
    pub fn is_engineer(&self) -> bool {
        self.role == Role::Engineer
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}> ({})", self.name, self.email, self.role)
    }
}

// ---------------------------------------------------------------------------
// SessionCandidate
// ---------------------------------------------------------------------------

/// Input to a regular login: a session that may not name its role yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCandidate {
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub staff_id: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
}

impl SessionCandidate {
    /// Starts a candidate with just an email and a display name.
    pub fn new(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sets the role explicitly.
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    /// Turns the candidate into a session, defaulting the role to `user`.
    ///
    /// Surrounding whitespace is trimmed from the email.
    ///
    /// # Errors
    /// Returns [`ProtocolError::InvalidSession`] if the result would not
    /// pass [`Session::validate`].
    pub fn into_session(self) -> Result<Session, ProtocolError> {
        let session = Session {
            email: self.email.trim().to_string(),
            name: self.name,
            role: self.role.unwrap_or_default(),
            staff_id: self.staff_id,
            department: self.department,
        };
        session.validate()?;
        Ok(session)
    }
}

impl From<Session> for SessionCandidate {
    fn from(session: Session) -> Self {
        Self {
            email: session.email,
            name: session.name,
            role: Some(session.role),
            staff_id: session.staff_id,
            department: session.department,
        }
    }
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// Email and password submitted on the engineer login form.
///
/// `Debug` is implemented by hand so the password never reaches a log line.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    /// Wraps the form fields as submitted; nothing is trimmed here.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// The part of the email before `@`.
    ///
    /// Falls back to the whole email when there is no `@` or the local
    /// part is blank, and returns `None` only for a blank email.
    pub fn local_part(&self) -> Option<&str> {
        let email = self.email.trim();
        if email.is_empty() {
            return None;
        }
        match email.split_once('@') {
            Some((local, _)) if !local.trim().is_empty() => Some(local.trim()),
            _ => Some(email),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}
