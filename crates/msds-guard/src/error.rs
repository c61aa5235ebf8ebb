//! Route table errors.

/// A [`RouteTable`](crate::RouteTable) the guard cannot settle on.
///
/// Either mistake makes the guard redirect forever: a protected login page
/// sends signed-out visitors to itself, a public home page sends signed-in
/// visitors to itself.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteTableError {
    /// The login path is missing from the public set.
    #[error("login path {0} is not public")]
    LoginPathNotPublic(String),

    /// The home path is in the public set.
    #[error("home path {0} is public")]
    HomePathPublic(String),
}
