//! The route guard: allow, redirect, or wait.
//!
//! The decision itself is a pure function of three inputs: whether the
//! session store is still loading, whether someone is signed in, and the
//! current path.
//!
//! | state           | path      | decision                |
//! |-----------------|-----------|-------------------------|
//! | loading         | any       | `Pending`               |
//! | signed out      | public    | `Render`                |
//! | signed out      | protected | `Redirect(login_path)`  |
//! | signed in       | public    | `Redirect(home_path)`   |
//! | signed in       | protected | `Render`                |
//!
//! [`RouteGuard::run`] wraps that function in a task that re-evaluates
//! whenever the session or the path changes.

use msds_protocol::Navigator;
use msds_session::SessionSnapshot;
use tokio::sync::{mpsc, watch};

use crate::{GuardDecision, RouteTable};

/// One evaluation made by [`RouteGuard::run`].
///
/// Carries the inputs next to the decision so a consumer can tell whether
/// the guard has caught up with the state it is looking at: the guard is
/// settled once the latest outcome is not a redirect and
/// [`is_for`](Self::is_for) the current snapshot and path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardOutcome {
    /// The session state the decision was made for.
    pub snapshot: SessionSnapshot,

    /// The path the decision was made for. For a redirect this is the path
    /// that was left, not the target.
    pub path: String,

    pub decision: GuardDecision,
}

impl GuardOutcome {
    /// Returns `true` if this outcome was decided for exactly these inputs.
    pub fn is_for(&self, snapshot: &SessionSnapshot, path: &str) -> bool {
        self.path == path && &self.snapshot == snapshot
    }
}

/// Decides whether the current path may render.
///
/// Holds nothing but its [`RouteTable`]; all state comes in through the
/// arguments.
#[derive(Debug, Clone, Default)]
pub struct RouteGuard {
    routes: RouteTable,
}

impl RouteGuard {
    /// Creates a guard over `routes`.
    ///
    /// The table is taken as given; [`RouteTable::validate`] is the place to
    /// reject a table whose login page is protected.
    pub fn new(routes: RouteTable) -> Self {
        Self { routes }
    }

    /// The route table this guard decides against.
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// The pure decision. Performs no navigation.
    pub fn decide(&self, snapshot: &SessionSnapshot, path: &str) -> GuardDecision {
        if snapshot.loading {
            return GuardDecision::Pending;
        }

        let public = self.routes.is_public(path);
        match (snapshot.is_authenticated(), public) {
            (false, true) | (true, false) => GuardDecision::Render,
            (false, false) => {
                GuardDecision::Redirect(self.routes.login_path.clone())
            }
            (true, true) => {
                GuardDecision::Redirect(self.routes.home_path.clone())
            }
        }
    }

    /// Decides for the navigator's current path and acts on it.
    ///
    /// A `Redirect` decision issues exactly one `navigator.redirect`;
    /// `Render` and `Pending` issue none. The caller renders the page only
    /// when the returned decision [`renders`](GuardDecision::renders).
    pub fn evaluate(
        &self,
        snapshot: &SessionSnapshot,
        navigator: &impl Navigator,
    ) -> GuardDecision {
        let path = navigator.current_path();
        let decision = self.decide_traced(snapshot, &path);
        if let GuardDecision::Redirect(target) = &decision {
            navigator.redirect(target);
        }
        decision
    }

    /// Re-evaluates on every session change and every path change.
    ///
    /// Evaluates once immediately, then waits on both watch channels and
    /// sends one [`GuardOutcome`] per evaluation to `outcomes`. A redirect
    /// is issued only after its outcome has been sent, so anyone who sees
    /// the new path can already receive the decision that caused it.
    ///
    /// A wake-up that leaves both the snapshot and the path as they were
    /// last evaluated is skipped. A logout that publishes a new snapshot and
    /// then redirects to the login page therefore yields a single decision
    /// for the login page however the two changes interleave, and a
    /// redirect to the page the guard is already on does not loop.
    ///
    /// Returns when either watch sender is dropped or `outcomes` is closed.
    pub async fn run<N: Navigator>(
        self,
        mut sessions: watch::Receiver<SessionSnapshot>,
        mut paths: watch::Receiver<String>,
        navigator: N,
        outcomes: mpsc::Sender<GuardOutcome>,
    ) {
        let mut last: Option<(SessionSnapshot, String)> = None;

        loop {
            // Seen; a redirect issued below will mark it changed again.
            drop(paths.borrow_and_update());
            // Path before snapshot: the store publishes a logout before it
            // redirects, so a login path read here never pairs with a
            // stale signed-in snapshot.
            let path = navigator.current_path();
            let snapshot = sessions.borrow_and_update().clone();

            let unchanged = last
                .as_ref()
                .is_some_and(|(s, p)| *s == snapshot && *p == path);
            if unchanged {
                tracing::trace!(%path, "route guard inputs unchanged");
            } else {
                let decision = self.decide_traced(&snapshot, &path);
                let target = decision.redirect_target().map(str::to_owned);
                last = Some((snapshot.clone(), path.clone()));

                let outcome = GuardOutcome {
                    snapshot,
                    path,
                    decision,
                };
                if outcomes.send(outcome).await.is_err() {
                    break;
                }
                if let Some(target) = target {
                    navigator.redirect(&target);
                }
            }

            tokio::select! {
                changed = sessions.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                changed = paths.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        tracing::debug!("route guard stopped");
    }

    fn decide_traced(&self, snapshot: &SessionSnapshot, path: &str) -> GuardDecision {
        let decision = self.decide(snapshot, path);
        tracing::debug!(
            %path,
            authenticated = snapshot.is_authenticated(),
            loading = snapshot.loading,
            %decision,
            "route guard evaluated"
        );
        decision
    }
}
