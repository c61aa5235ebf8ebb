//! Shared vocabulary for the MSDS dashboard core.
//!
//! This crate defines what the other layers pass around:
//!
//! - **Types** ([`Session`], [`Role`], [`SessionCandidate`],
//!   [`Credentials`]) — the identity and the inputs that create it.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how a session becomes the
//!   single text record kept in durable storage.
//! - **Navigation** ([`Navigator`] trait, path constants) — the router
//!   capability the store and the guard consume.
//! - **Errors** ([`ProtocolError`]).
//!
//! ```text
//! Guard (msds-guard) → Session store (msds-session) → Protocol (this crate)
//! ```

mod codec;
mod error;
mod navigation;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use navigation::{
    FORGOT_PASSWORD_PATH, HOME_PATH, LOGIN_PATH, Navigator, PUBLIC_PATHS,
    REGISTER_PATH,
};
pub use types::{Credentials, Role, Session, SessionCandidate};
