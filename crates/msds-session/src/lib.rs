//! Session management for the MSDS dashboard.
//!
//! This crate owns the answer to "who is using the dashboard right now":
//!
//! 1. **Session store** — the single owner of the current identity
//!    ([`SessionStore`]), with login, engineer login, and logout
//! 2. **Persistence** — rehydrating that identity from one durable record
//!    ([`DurableSlot`], [`MemorySlot`], [`FileSlot`])
//! 3. **Engineer authentication** — the hook where credentials get checked
//!    ([`Authenticator`], [`PlaceholderAuthenticator`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Route guard (above)  ← watches SessionSnapshot to allow or redirect
//!     ↕
//! Session layer (this crate)  ← owns the identity and its stored record
//!     ↕
//! Protocol layer (below)  ← Session, Credentials, Codec, Navigator
//! ```

#![allow(async_fn_in_trait)]

mod auth;
mod error;
mod session;
mod storage;
mod store;

pub use auth::{Authenticator, PlaceholderAuthenticator};
pub use error::{SessionError, StorageError};
pub use session::{SessionConfig, SessionContext, SessionSnapshot};
pub use storage::{DurableSlot, FileSlot, MemorySlot};
pub use store::SessionStore;
