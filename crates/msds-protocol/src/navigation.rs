//! The navigation capability and the dashboard's well-known paths.
//!
//! The session and guard layers never touch a real router. They talk to
//! anything that implements [`Navigator`]: a browser history shim, a
//! console loop, or an in-memory recorder in tests.

/// Sign-in page. Unauthenticated visitors are sent here.
pub const LOGIN_PATH: &str = "/login";

/// Self-service account registration.
pub const REGISTER_PATH: &str = "/register";

/// Password recovery.
pub const FORGOT_PASSWORD_PATH: &str = "/forgot-password";

/// Fleet overview. Signed-in users who land on a public page go here.
pub const HOME_PATH: &str = "/";

/// Paths reachable without a session.
pub const PUBLIC_PATHS: [&str; 3] =
    [LOGIN_PATH, REGISTER_PATH, FORGOT_PASSWORD_PATH];

/// Reads and changes the current location.
///
/// Paths are compared by plain string equality; no normalization happens
/// anywhere in MSDS.
pub trait Navigator: Send + Sync + 'static {
    /// The path currently displayed.
    fn current_path(&self) -> String;

    /// Moves to `path`, replacing the current location.
    ///
    /// Fire-and-forget: a navigator that cannot move has no way to report
    /// it, and callers do not retry.
    fn redirect(&self, path: &str);
}

impl<N: Navigator> Navigator for std::sync::Arc<N> {
    fn current_path(&self) -> String {
        (**self).current_path()
    }

    fn redirect(&self, path: &str) {
        (**self).redirect(path)
    }
}
