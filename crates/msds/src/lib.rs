//! # MSDS
//!
//! Session and route-guard core for the MSDS (Medical Supply Delivery
//! System) robot-fleet dashboard.
//!
//! A [`Dashboard`] owns one session store persisted to a durable slot, an
//! in-memory navigation history, and a route-guard task that keeps the two
//! consistent: signed-out users only see the public pages, signed-in users
//! never see them.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use msds::prelude::*;
//!
//! # async fn run() -> Result<(), MsdsError> {
//! let mut dashboard = DashboardBuilder::new()
//!     .build(FileSlot::new(".msds"), PlaceholderAuthenticator)
//!     .await?;
//!
//! dashboard
//!     .login(SessionCandidate::new("nurse@ward7.org", "Nurse Joy"))
//!     .await?;
//! dashboard.settle().await;
//! # Ok(())
//! # }
//! ```

mod dashboard;
mod error;
mod telemetry;

pub use dashboard::{Dashboard, DashboardBuilder};
pub use error::MsdsError;
pub use telemetry::init_tracing;

/// Everything needed to build and drive a dashboard, for glob import.
pub mod prelude {
    pub use crate::{Dashboard, DashboardBuilder, MsdsError, init_tracing};
    pub use msds_guard::{
        GuardDecision, GuardOutcome, History, RouteGuard, RouteTable,
        RouteTableError,
    };
    pub use msds_protocol::{
        Codec, Credentials, JsonCodec, Navigator, ProtocolError, Role,
        Session, SessionCandidate,
    };
    pub use msds_session::{
        Authenticator, DurableSlot, FileSlot, MemorySlot,
        PlaceholderAuthenticator, SessionConfig, SessionContext,
        SessionError, SessionSnapshot, SessionStore, StorageError,
    };
}
