//! `Dashboard` builder and app shell.
//!
//! Ties the layers together: a session store over a durable slot, an
//! in-memory history, and a route-guard task watching both.

use std::sync::Arc;

use msds_guard::{GuardDecision, GuardOutcome, History, RouteGuard, RouteTable};
use msds_protocol::{
    Credentials, HOME_PATH, Navigator, Session, SessionCandidate,
};
use msds_session::{
    Authenticator, DurableSlot, SessionConfig, SessionContext, SessionStore,
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::MsdsError;

/// How many guard decisions may queue up before the guard task waits.
const OUTCOME_BUFFER: usize = 64;

/// Builder for configuring and starting a [`Dashboard`].
///
/// # Example
///
/// ```rust,no_run
/// use msds::prelude::*;
///
/// # async fn demo() -> Result<(), MsdsError> {
/// let dashboard = DashboardBuilder::new()
///     .start_path("/robots")
///     .build(MemorySlot::new(), PlaceholderAuthenticator)
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct DashboardBuilder {
    session_config: SessionConfig,
    route_table: RouteTable,
    start_path: String,
}

impl DashboardBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            session_config: SessionConfig::default(),
            route_table: RouteTable::default(),
            start_path: HOME_PATH.to_string(),
        }
    }

    /// Sets the session configuration.
    pub fn session_config(mut self, config: SessionConfig) -> Self {
        self.session_config = config;
        self
    }

    /// Sets the route table.
    pub fn route_table(mut self, routes: RouteTable) -> Self {
        self.route_table = routes;
        self
    }

    /// Sets the path the dashboard opens on.
    pub fn start_path(mut self, path: &str) -> Self {
        self.start_path = path.to_string();
        self
    }

    /// Starts the guard, rehydrates the session, and returns the dashboard
    /// once the guard has settled on a page.
    ///
    /// The guard task is spawned before the store reads storage, so it may
    /// see the store loading and report `Pending` first. Those startup
    /// decisions are consumed here. Must be called from inside a Tokio
    /// runtime.
    ///
    /// # Errors
    /// Returns [`MsdsError::Routes`] if the route table fails
    /// [`RouteTable::validate`]; nothing is spawned in that case.
    pub async fn build<S, A>(
        self,
        slot: S,
        auth: A,
    ) -> Result<Dashboard<S, A>, MsdsError>
    where
        S: DurableSlot,
        A: Authenticator,
    {
        self.route_table.validate()?;

        let mut store = SessionStore::new(slot, auth, self.session_config);
        let history = Arc::new(History::new(self.start_path));
        let (tx, outcomes) = mpsc::channel(OUTCOME_BUFFER);

        let guard = RouteGuard::new(self.route_table);
        let guard_task = tokio::spawn(guard.run(
            store.subscribe(),
            history.subscribe(),
            Arc::clone(&history),
            tx,
        ));

        store.initialize().await;
        tracing::info!(
            authenticated = store.is_authenticated(),
            "dashboard started"
        );

        let mut dashboard = Dashboard {
            store,
            history,
            outcomes,
            last: None,
            guard_task,
        };
        dashboard.settle().await;
        tracing::debug!(
            path = %dashboard.history.current_path(),
            "dashboard settled"
        );
        Ok(dashboard)
    }
}

impl Default for DashboardBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running dashboard core.
///
/// Created by [`DashboardBuilder::build`]. Mutators change the session or
/// the path; the guard task reacts in the background and
/// [`settle`](Self::settle) waits for it to catch up.
pub struct Dashboard<S, A> {
    store: SessionStore<S, A>,
    history: Arc<History>,
    outcomes: mpsc::Receiver<GuardOutcome>,
    last: Option<GuardOutcome>,
    guard_task: JoinHandle<()>,
}

impl<S, A> Dashboard<S, A>
where
    S: DurableSlot,
    A: Authenticator,
{
    /// The session store.
    pub fn session(&self) -> &SessionStore<S, A> {
        &self.store
    }

    /// The session store, for mutators the dashboard does not wrap.
    pub fn session_mut(&mut self) -> &mut SessionStore<S, A> {
        &mut self.store
    }

    /// The read-only session view for dashboard components.
    pub fn context(&self) -> Result<SessionContext<'_>, MsdsError> {
        Ok(self.store.context()?)
    }

    /// The navigator the guard watches.
    pub fn history(&self) -> &Arc<History> {
        &self.history
    }

    /// A user-initiated move to `path`.
    pub fn navigate(&self, path: &str) {
        self.history.navigate(path);
    }

    /// Signs in through [`SessionStore::login`].
    pub async fn login(
        &mut self,
        candidate: SessionCandidate,
    ) -> Result<Session, MsdsError> {
        Ok(self.store.login(candidate).await?)
    }

    /// Signs in an engineer through [`SessionStore::login_as_engineer`].
    pub async fn login_as_engineer(
        &mut self,
        credentials: Credentials,
    ) -> Result<Session, MsdsError> {
        Ok(self.store.login_as_engineer(credentials).await?)
    }

    /// Signs out and sends the history to the login page.
    pub async fn logout(&mut self) -> Result<(), MsdsError> {
        Ok(self.store.logout(&self.history).await?)
    }

    /// Waits for the guard's next decision.
    ///
    /// Returns `None` once the guard task has stopped.
    pub async fn next_decision(&mut self) -> Option<GuardDecision> {
        let outcome = self.outcomes.recv().await?;
        let decision = outcome.decision.clone();
        self.last = Some(outcome);
        Some(decision)
    }

    /// The most recent decision received from the guard.
    pub fn decision(&self) -> Option<&GuardDecision> {
        self.last.as_ref().map(|outcome| &outcome.decision)
    }

    /// Waits until the guard has decided for the current session and path
    /// and is no longer redirecting.
    ///
    /// Returns every decision received on the way, in order. The last one
    /// is what the guard concluded for the state as it is now. If nothing
    /// changed since the previous call the guard has nothing new to say and
    /// the result is empty. Also returns early if the guard task has
    /// stopped.
    pub async fn settle(&mut self) -> Vec<GuardDecision> {
        let mut seen = Vec::new();
        loop {
            // State first: the guard sends each outcome before it redirects,
            // so a moved path means its outcome is already queued.
            let snapshot = self.store.snapshot();
            let path = self.history.current_path();
            while let Ok(outcome) = self.outcomes.try_recv() {
                seen.push(outcome.decision.clone());
                self.last = Some(outcome);
            }

            let caught_up = self.last.as_ref().is_some_and(|outcome| {
                outcome.decision.redirect_target().is_none()
                    && outcome.is_for(&snapshot, &path)
            });
            if caught_up {
                break;
            }

            match self.next_decision().await {
                Some(decision) => seen.push(decision),
                None => break,
            }
        }
        seen
    }

    /// Stops the guard task and waits for it to finish.
    pub async fn shutdown(self) {
        let Self {
            store,
            outcomes,
            guard_task,
            ..
        } = self;
        drop(store);
        drop(outcomes);
        if let Err(e) = guard_task.await {
            tracing::warn!(error = %e, "route guard task failed");
        }
        tracing::info!("dashboard stopped");
    }
}
