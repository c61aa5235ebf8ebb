//! Route guarding for the MSDS dashboard.
//!
//! Decides, on every navigation and every session change, whether the
//! current page may render, must redirect, or has to wait for the session
//! store to finish loading.
//!
//! # Key types
//!
//! - [`RouteGuard`] — the decision function and its reactive task
//! - [`RouteTable`] — public paths, login path, home path
//! - [`GuardDecision`] — `Render`, `Redirect(path)`, or `Pending`
//! - [`GuardOutcome`] — a decision together with the inputs it was made for
//! - [`History`] — an in-memory navigator the guard can watch
//!
//! The guard is a convenience for the people using the dashboard, not a
//! security boundary: it trusts whatever session the store restored from
//! local storage.

mod config;
mod error;
mod guard;
mod history;

pub use config::{GuardDecision, RouteTable};
pub use error::RouteTableError;
pub use guard::{GuardOutcome, RouteGuard};
pub use history::History;
