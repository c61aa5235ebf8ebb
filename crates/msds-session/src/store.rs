//! The session store: the one owner of "who is signed in".
//!
//! Responsibilities:
//! - Rehydrating the session from its durable slot at startup
//! - Logging users in (regular and engineer) and out
//! - Persisting every change to the slot
//! - Broadcasting a [`SessionSnapshot`] after every change so the route
//!   guard can react
//!
//! # Concurrency note
//!
//! Mutators take `&mut self`: the store is owned by a single task. Other
//! tasks never touch it directly; they hold a `watch::Receiver` from
//! [`SessionStore::subscribe`] and see each new snapshot as it is
//! published.

use msds_protocol::{
    Codec, Credentials, JsonCodec, Navigator, ProtocolError, Role, Session,
    SessionCandidate,
};
use rand::Rng;
use tokio::sync::watch;

use crate::{
    Authenticator, DurableSlot, SessionConfig, SessionContext, SessionError,
    SessionSnapshot,
};

/// Owns the current session and its persisted copy.
///
/// ## Lifecycle
///
/// ```text
/// new() ──→ [loading] ──initialize()──→ [ready, anonymous] ⇄ [ready, signed in]
///                                            login() / login_as_engineer() / logout()
/// ```
///
/// Until [`initialize`](Self::initialize) completes, [`context`](Self::context)
/// and every mutator fail with [`SessionError::NotInitialized`].
pub struct SessionStore<S, A, C = JsonCodec> {
    slot: S,
    auth: A,
    codec: C,
    config: SessionConfig,
    state: SessionSnapshot,
    tx: watch::Sender<SessionSnapshot>,
}

impl<S, A> SessionStore<S, A, JsonCodec>
where
    S: DurableSlot,
    A: Authenticator,
{
    /// Creates a store in the loading state, using the JSON record format.
    pub fn new(slot: S, auth: A, config: SessionConfig) -> Self {
        Self::with_codec(slot, auth, JsonCodec, config)
    }
}

impl<S, A, C> SessionStore<S, A, C>
where
    S: DurableSlot,
    A: Authenticator,
    C: Codec,
{
    /// Creates a store in the loading state with a custom record codec.
    pub fn with_codec(slot: S, auth: A, codec: C, config: SessionConfig) -> Self {
        let (tx, _) = watch::channel(SessionSnapshot::loading());
        Self {
            slot,
            auth,
            codec,
            config,
            state: SessionSnapshot::loading(),
            tx,
        }
    }

    /// Reads the persisted session and leaves the loading state.
    ///
    /// Never fails. A missing, unreadable, or malformed record all end in
    /// the same place: ready, with nobody signed in. Calling this again
    /// re-reads the slot.
    pub async fn initialize(&mut self) {
        let user = self.read_record().await;
        match &user {
            Some(session) => tracing::info!(
                email = %session.email,
                role = %session.role,
                "session restored from storage"
            ),
            None => tracing::debug!("no stored session, starting anonymous"),
        }
        self.state = SessionSnapshot::ready(user);
        self.publish();
    }

    /// Signs in with an already-authenticated identity.
    ///
    /// No credential check happens here. A missing role becomes
    /// [`Role::User`]. The record in storage is replaced wholesale.
    ///
    /// # Errors
    /// - [`SessionError::NotInitialized`] — called before `initialize`
    /// - [`SessionError::InvalidSession`] — the email is blank
    pub async fn login(
        &mut self,
        candidate: SessionCandidate,
    ) -> Result<Session, SessionError> {
        self.ensure_ready()?;
        let session = candidate.into_session()?;

        tracing::info!(
            email = %session.email,
            role = %session.role,
            "user logged in"
        );
        self.establish(session.clone()).await;
        Ok(session)
    }

    /// Signs in an engineer from the maintenance login form.
    ///
    /// The [`Authenticator`] decides whether the credentials are accepted.
    /// On success the session gets `role = engineer`, the email's local
    /// part as its name, and a freshly generated staff ID. The staff ID is
    /// random and is not stable across logins.
    ///
    /// # Errors
    /// - [`SessionError::NotInitialized`] — called before `initialize`
    /// - [`SessionError::AuthFailed`] — the authenticator said no
    /// - [`SessionError::InvalidSession`] — the email is blank
    pub async fn login_as_engineer(
        &mut self,
        credentials: Credentials,
    ) -> Result<Session, SessionError> {
        self.ensure_ready()?;

        let name = credentials
            .local_part()
            .ok_or_else(|| {
                ProtocolError::InvalidSession("email must not be empty".into())
            })?
            .to_string();

        if let Err(e) = self.auth.verify_engineer(&credentials).await {
            tracing::warn!(
                email = %credentials.email,
                error = %e,
                "engineer login rejected"
            );
            return Err(e);
        }

        let session = Session {
            email: credentials.email.trim().to_string(),
            name,
            role: Role::Engineer,
            staff_id: Some(generate_staff_id(
                &self.config.engineer_staff_prefix,
            )),
            department: None,
        };

        tracing::info!(
            email = %session.email,
            staff_id = session.staff_id.as_deref().unwrap_or_default(),
            "engineer logged in"
        );
        self.establish(session.clone()).await;
        Ok(session)
    }

    /// Signs out, deletes the stored record, and sends the navigator to
    /// the login page.
    ///
    /// A navigator already on the login page is left alone, so a guard that
    /// reacted to the new snapshot first does not see a second move.
    ///
    /// # Errors
    /// Returns [`SessionError::NotInitialized`] if called before `initialize`.
    pub async fn logout(
        &mut self,
        navigator: &impl Navigator,
    ) -> Result<(), SessionError> {
        self.ensure_ready()?;

        if let Some(previous) = &self.state.user {
            tracing::info!(email = %previous.email, "user logged out");
        }
        self.state = SessionSnapshot::ready(None);
        self.publish();

        let key = &self.config.storage_key;
        if let Err(e) = self.slot.remove(key).await {
            tracing::warn!(key = %key, error = %e, "failed to remove stored session");
        }

        let login_path = &self.config.login_path;
        if navigator.current_path() != *login_path {
            navigator.redirect(login_path);
        }
        Ok(())
    }

    /// The read-only view for dashboard components.
    ///
    /// # Errors
    /// Returns [`SessionError::NotInitialized`] while the store is loading.
    pub fn context(&self) -> Result<SessionContext<'_>, SessionError> {
        self.ensure_ready()?;
        Ok(SessionContext::from_snapshot(&self.state))
    }

    /// The signed-in user, if any.
    pub fn user(&self) -> Option<&Session> {
        self.state.user.as_ref()
    }

    /// Returns `true` if someone is signed in.
    ///
    /// Always `false` while loading, even if storage holds a record that
    /// `initialize` would restore.
    pub fn is_authenticated(&self) -> bool {
        self.state.is_authenticated()
    }

    /// Returns `true` if the signed-in user has the engineer role.
    pub fn is_engineer(&self) -> bool {
        self.state.is_engineer()
    }

    /// `true` until `initialize` has completed.
    pub fn is_loading(&self) -> bool {
        self.state.loading
    }

    /// A copy of the current state.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.clone()
    }

    /// Subscribes to state changes. The receiver starts at the current state.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.tx.subscribe()
    }

    /// The configuration this store was built with.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    // -- Internals --------------------------------------------------------

    fn ensure_ready(&self) -> Result<(), SessionError> {
        if self.state.loading {
            return Err(SessionError::NotInitialized);
        }
        Ok(())
    }

    /// Makes `session` current, then writes it out.
    async fn establish(&mut self, session: Session) {
        let record = self.codec.encode(&session);
        self.state = SessionSnapshot::ready(Some(session));
        self.publish();

        let key = &self.config.storage_key;
        match record {
            Ok(text) => {
                if let Err(e) = self.slot.set(key, &text).await {
                    tracing::warn!(key = %key, error = %e, "failed to persist session");
                }
            }
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "failed to encode session");
            }
        }
    }

    async fn read_record(&self) -> Option<Session> {
        let key = &self.config.storage_key;
        let raw = match self.slot.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "failed to read stored session");
                return None;
            }
        };

        match self.codec.decode_session(&raw) {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "ignoring malformed stored session");
                None
            }
        }
    }

    fn publish(&self) {
        self.tx.send_replace(self.state.clone());
    }
}

/// Builds a staff ID like `ENG-0042` from four random digits.
///
/// Collisions are possible and expected; nothing relies on uniqueness.
fn generate_staff_id(prefix: &str) -> String {
    let n: u16 = rand::rng().random_range(0..10_000);
    format!("{prefix}-{n:04}")
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! Unit tests for `SessionStore`.
    //!
    //! Naming convention: `test_{function}_{scenario}_{expected}`.
    //! Restarts are simulated by building a second store on a clone of the
    //! same `MemorySlot`.

    use std::sync::Mutex;

    use super::*;
    use crate::{MemorySlot, PlaceholderAuthenticator, StorageError};

    // -- Helpers ----------------------------------------------------------

    type TestStore = SessionStore<MemorySlot, PlaceholderAuthenticator>;

    const KEY: &str = "msds_user";

    fn store_on(slot: &MemorySlot) -> TestStore {
        SessionStore::new(
            slot.clone(),
            PlaceholderAuthenticator,
            SessionConfig::default(),
        )
    }

    async fn ready_store(slot: &MemorySlot) -> TestStore {
        let mut store = store_on(slot);
        store.initialize().await;
        store
    }

    fn nurse() -> SessionCandidate {
        SessionCandidate::new("nurse@ward7.org", "Nurse Joy")
    }

    /// Records every redirect instead of moving anywhere.
    #[derive(Default)]
    struct RecordingNavigator {
        path: String,
        redirects: Mutex<Vec<String>>,
    }

    impl RecordingNavigator {
        fn at(path: &str) -> Self {
            Self {
                path: path.to_string(),
                ..Self::default()
            }
        }

        fn redirects(&self) -> Vec<String> {
            self.redirects.lock().unwrap().clone()
        }
    }

    impl Navigator for RecordingNavigator {
        fn current_path(&self) -> String {
            self.path.clone()
        }

        fn redirect(&self, path: &str) {
            self.redirects.lock().unwrap().push(path.to_string());
        }
    }

    /// A slot whose writes always fail.
    struct BrokenSlot;

    impl DurableSlot for BrokenSlot {
        async fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(std::io::Error::other("disk gone").into())
        }

        async fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(std::io::Error::other("disk gone").into())
        }

        async fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Err(std::io::Error::other("disk gone").into())
        }
    }

    struct RejectAll;

    impl Authenticator for RejectAll {
        async fn verify_engineer(
            &self,
            _credentials: &Credentials,
        ) -> Result<(), SessionError> {
            Err(SessionError::AuthFailed("bad password".into()))
        }
    }

    // =====================================================================
    // initialize()
    // =====================================================================

    #[tokio::test]
    async fn test_new_store_is_loading() {
        let store = store_on(&MemorySlot::new());

        assert!(store.is_loading());
        assert!(!store.is_authenticated());
        assert!(store.subscribe().borrow().loading);
    }

    #[tokio::test]
    async fn test_initialize_empty_slot_is_anonymous() {
        let store = ready_store(&MemorySlot::new()).await;

        assert!(!store.is_loading());
        assert!(!store.is_authenticated());
    }

    #[tokio::test]
    async fn test_initialize_malformed_records_are_anonymous() {
        let records = [
            "",
            "not json",
            "{\"email\":",
            "[]",
            "null",
            r#"{"name":"no email"}"#,
            r#"{"email":"  ","name":"blank"}"#,
            r#"{"email":"a@b.org","role":"superuser"}"#,
        ];

        for record in records {
            let slot = MemorySlot::new();
            slot.set(KEY, record).await.unwrap();

            let store = ready_store(&slot).await;

            assert!(
                !store.is_authenticated(),
                "record {record:?} should not authenticate"
            );
            assert!(!store.is_loading());
        }
    }

    #[tokio::test]
    async fn test_initialize_valid_record_restores_session() {
        let slot = MemorySlot::new();
        slot.set(
            KEY,
            r#"{"email":"ops@msds.org","name":"Ops","role":"admin","department":"Logistics"}"#,
        )
        .await
        .unwrap();

        let store = ready_store(&slot).await;

        let user = store.user().expect("should be restored");
        assert_eq!(user.email, "ops@msds.org");
        assert_eq!(user.role, Role::Admin);
        assert_eq!(user.department.as_deref(), Some("Logistics"));
    }

    #[tokio::test]
    async fn test_initialize_unreadable_slot_is_anonymous() {
        let mut store = SessionStore::new(
            BrokenSlot,
            PlaceholderAuthenticator,
            SessionConfig::default(),
        );

        store.initialize().await;

        assert!(!store.is_loading());
        assert!(!store.is_authenticated());
    }

    // =====================================================================
    // context()
    // =====================================================================

    #[tokio::test]
    async fn test_context_before_initialize_fails_fast() {
        let store = store_on(&MemorySlot::new());

        assert!(matches!(store.context(), Err(SessionError::NotInitialized)));
    }

    #[tokio::test]
    async fn test_context_after_login_reports_user() {
        let mut store = ready_store(&MemorySlot::new()).await;
        store.login(nurse()).await.unwrap();

        let ctx = store.context().expect("store is ready");

        assert!(ctx.is_authenticated);
        assert!(!ctx.is_engineer);
        assert_eq!(ctx.user.unwrap().name, "Nurse Joy");
    }

    // =====================================================================
    // login()
    // =====================================================================

    #[tokio::test]
    async fn test_login_without_role_defaults_to_user() {
        let mut store = ready_store(&MemorySlot::new()).await;

        let session = store.login(nurse()).await.unwrap();

        assert_eq!(session.role, Role::User);
        assert_eq!(store.user().unwrap().role, Role::User);
    }

    #[tokio::test]
    async fn test_login_keeps_explicit_role() {
        let mut store = ready_store(&MemorySlot::new()).await;

        let session =
            store.login(nurse().with_role(Role::Admin)).await.unwrap();

        assert_eq!(session.role, Role::Admin);
        assert!(!store.is_engineer());
    }

    #[tokio::test]
    async fn test_login_before_initialize_returns_not_initialized() {
        let mut store = store_on(&MemorySlot::new());

        let result = store.login(nurse()).await;

        assert!(matches!(result, Err(SessionError::NotInitialized)));
    }

    #[tokio::test]
    async fn test_login_blank_email_returns_invalid_session() {
        let slot = MemorySlot::new();
        let mut store = ready_store(&slot).await;

        let result = store.login(SessionCandidate::new("", "nobody")).await;

        assert!(matches!(result, Err(SessionError::InvalidSession(_))));
        assert!(!store.is_authenticated());
        assert!(slot.is_empty().await);
    }

    #[tokio::test]
    async fn test_login_trims_email_like_engineer_login() {
        let slot = MemorySlot::new();
        let mut store = ready_store(&slot).await;

        let session = store
            .login(SessionCandidate::new("  nurse@ward7.org ", "Nurse Joy"))
            .await
            .unwrap();

        assert_eq!(session.email, "nurse@ward7.org");
        let restarted = ready_store(&slot).await;
        assert_eq!(restarted.user().unwrap().email, "nurse@ward7.org");
    }

    #[tokio::test]
    async fn test_login_twice_same_payload_stores_one_record() {
        let slot = MemorySlot::new();
        let mut store = ready_store(&slot).await;

        store.login(nurse()).await.unwrap();
        let session = store.login(nurse()).await.unwrap();

        assert_eq!(slot.len().await, 1);
        let stored = slot.get(KEY).await.unwrap().unwrap();
        let decoded = JsonCodec.decode_session(&stored).unwrap();
        assert_eq!(decoded, session);
    }

    #[tokio::test]
    async fn test_login_last_write_wins() {
        let slot = MemorySlot::new();
        let mut store = ready_store(&slot).await;

        store.login(nurse()).await.unwrap();
        store
            .login(SessionCandidate::new("porter@ward7.org", "Porter"))
            .await
            .unwrap();

        let restarted = ready_store(&slot).await;
        assert_eq!(restarted.user().unwrap().email, "porter@ward7.org");
    }

    #[tokio::test]
    async fn test_login_persist_failure_is_not_surfaced() {
        let mut store = SessionStore::new(
            BrokenSlot,
            PlaceholderAuthenticator,
            SessionConfig::default(),
        );
        store.initialize().await;

        let result = store.login(nurse()).await;

        assert!(result.is_ok());
        assert!(store.is_authenticated());
    }

    // =====================================================================
    // login_as_engineer()
    // =====================================================================

    #[tokio::test]
    async fn test_login_as_engineer_any_password_yields_engineer() {
        for password in ["", "wrong", "letmein"] {
            let mut store = ready_store(&MemorySlot::new()).await;

            let session = store
                .login_as_engineer(Credentials::new(
                    "tech.lee@msds.org",
                    password,
                ))
                .await
                .unwrap();

            assert_eq!(session.role, Role::Engineer);
            assert_eq!(session.name, "tech.lee");
            let staff_id = session.staff_id.as_deref().unwrap();
            assert!(staff_id.starts_with("ENG-"));
            assert_eq!(staff_id.len(), "ENG-0000".len());
            assert!(store.is_engineer());
        }
    }

    #[tokio::test]
    async fn test_login_as_engineer_email_without_at_uses_whole_email() {
        let mut store = ready_store(&MemorySlot::new()).await;

        let session = store
            .login_as_engineer(Credentials::new("techlee", "x"))
            .await
            .unwrap();

        assert_eq!(session.name, "techlee");
    }

    #[tokio::test]
    async fn test_login_as_engineer_rejected_keeps_previous_session() {
        let mut store = SessionStore::new(
            MemorySlot::new(),
            RejectAll,
            SessionConfig::default(),
        );
        store.initialize().await;
        store.login(nurse()).await.unwrap();

        let result = store
            .login_as_engineer(Credentials::new("eng@msds.org", "nope"))
            .await;

        assert!(matches!(result, Err(SessionError::AuthFailed(_))));
        assert_eq!(store.user().unwrap().email, "nurse@ward7.org");
    }

    #[tokio::test]
    async fn test_login_as_engineer_blank_email_returns_invalid_session() {
        let mut store = ready_store(&MemorySlot::new()).await;

        let result = store
            .login_as_engineer(Credentials::new(" ", "x"))
            .await;

        assert!(matches!(result, Err(SessionError::InvalidSession(_))));
    }

    #[tokio::test]
    async fn test_login_as_engineer_uses_configured_prefix() {
        let mut store = SessionStore::new(
            MemorySlot::new(),
            PlaceholderAuthenticator,
            SessionConfig {
                engineer_staff_prefix: "MNT".into(),
                ..SessionConfig::default()
            },
        );
        store.initialize().await;

        let session = store
            .login_as_engineer(Credentials::new("eng@msds.org", "x"))
            .await
            .unwrap();

        assert!(session.staff_id.unwrap().starts_with("MNT-"));
    }

    // =====================================================================
    // logout()
    // =====================================================================

    #[tokio::test]
    async fn test_logout_clears_session_and_redirects_to_login() {
        let slot = MemorySlot::new();
        let nav = RecordingNavigator::default();
        let mut store = ready_store(&slot).await;
        store.login(nurse()).await.unwrap();

        store.logout(&nav).await.unwrap();

        assert!(!store.is_authenticated());
        assert!(slot.is_empty().await);
        assert_eq!(nav.redirects(), vec!["/login".to_string()]);
    }

    #[tokio::test]
    async fn test_logout_already_on_login_page_does_not_redirect() {
        let slot = MemorySlot::new();
        let nav = RecordingNavigator::at("/login");
        let mut store = ready_store(&slot).await;
        store.login(nurse()).await.unwrap();

        store.logout(&nav).await.unwrap();

        assert!(!store.is_authenticated());
        assert!(slot.is_empty().await);
        assert!(nav.redirects().is_empty());
    }

    #[tokio::test]
    async fn test_logout_then_restart_is_anonymous() {
        let slot = MemorySlot::new();
        let nav = RecordingNavigator::default();
        let mut store = ready_store(&slot).await;
        store
            .login_as_engineer(Credentials::new("eng@msds.org", "x"))
            .await
            .unwrap();

        store.logout(&nav).await.unwrap();
        let restarted = ready_store(&slot).await;

        assert!(!restarted.is_authenticated());
    }

    #[tokio::test]
    async fn test_logout_before_initialize_returns_not_initialized() {
        let nav = RecordingNavigator::default();
        let mut store = store_on(&MemorySlot::new());

        let result = store.logout(&nav).await;

        assert!(matches!(result, Err(SessionError::NotInitialized)));
        assert!(nav.redirects().is_empty());
    }

    #[tokio::test]
    async fn test_logout_remove_failure_still_redirects() {
        let nav = RecordingNavigator::default();
        let mut store = SessionStore::new(
            BrokenSlot,
            PlaceholderAuthenticator,
            SessionConfig::default(),
        );
        store.initialize().await;
        store.login(nurse()).await.unwrap();

        store.logout(&nav).await.unwrap();

        assert!(!store.is_authenticated());
        assert_eq!(nav.redirects(), vec!["/login".to_string()]);
    }

    // =====================================================================
    // subscribe()
    // =====================================================================

    #[tokio::test]
    async fn test_subscribe_sees_every_transition() {
        let nav = RecordingNavigator::default();
        let mut store = store_on(&MemorySlot::new());
        let mut rx = store.subscribe();

        store.initialize().await;
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), SessionSnapshot::ready(None));

        store.login(nurse()).await.unwrap();
        assert!(rx.borrow_and_update().is_authenticated());

        store.logout(&nav).await.unwrap();
        assert!(!rx.borrow_and_update().is_authenticated());
    }

    // =====================================================================
    // generate_staff_id()
    // =====================================================================

    #[test]
    fn test_generate_staff_id_format() {
        for _ in 0..50 {
            let id = generate_staff_id("ENG");
            let digits = id.strip_prefix("ENG-").expect("prefix");
            assert_eq!(digits.len(), 4);
            assert!(digits.chars().all(|c| c.is_ascii_digit()));
        }
    }
}
