//! An in-memory [`Navigator`].
//!
//! `History` keeps the current path in a `watch` channel so the guard task
//! can react to every move. It tells apart two kinds of move:
//!
//! - [`navigate`](History::navigate) — the user clicked a link
//! - [`redirect`](Navigator::redirect) — the guard or the store sent them
//!   somewhere; these are counted

use std::sync::atomic::{AtomicUsize, Ordering};

use msds_protocol::Navigator;
use tokio::sync::watch;

/// The dashboard's current path plus a count of redirects.
///
/// Shared behind an `Arc`: the dashboard navigates, the guard task and the
/// session store redirect.
#[derive(Debug)]
pub struct History {
    current: watch::Sender<String>,
    redirects: AtomicUsize,
}

impl History {
    /// Starts at `path`.
    pub fn new(path: impl Into<String>) -> Self {
        let (current, _) = watch::channel(path.into());
        Self {
            current,
            redirects: AtomicUsize::new(0),
        }
    }

    /// A user-initiated move to `path`.
    pub fn navigate(&self, path: impl Into<String>) {
        let path = path.into();
        tracing::debug!(%path, "navigate");
        self.current.send_replace(path);
    }

    /// Watches the current path. The receiver starts at the current value.
    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.current.subscribe()
    }

    /// How many redirects have been issued so far.
    pub fn redirect_count(&self) -> usize {
        self.redirects.load(Ordering::Relaxed)
    }
}

impl Navigator for History {
    fn current_path(&self) -> String {
        self.current.borrow().clone()
    }

    fn redirect(&self, path: &str) {
        tracing::debug!(%path, "redirect");
        self.redirects.fetch_add(1, Ordering::Relaxed);
        self.current.send_replace(path.to_string());
    }
}
