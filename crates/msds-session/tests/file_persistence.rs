//! Integration tests: the session store on top of a real directory.
//!
//! Each test builds a store, drops it, and builds a fresh one on the same
//! directory to stand in for a dashboard restart.

use msds_protocol::{Credentials, Navigator, Role, SessionCandidate};
use msds_session::{
    DurableSlot, FileSlot, PlaceholderAuthenticator, SessionConfig,
    SessionStore,
};

// =========================================================================
// Helpers
// =========================================================================

struct NullNavigator;

impl Navigator for NullNavigator {
    fn current_path(&self) -> String {
        "/".into()
    }

    fn redirect(&self, _path: &str) {}
}

async fn boot(
    dir: &std::path::Path,
) -> SessionStore<FileSlot, PlaceholderAuthenticator> {
    let mut store = SessionStore::new(
        FileSlot::new(dir),
        PlaceholderAuthenticator,
        SessionConfig::default(),
    );
    store.initialize().await;
    store
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_session_survives_restart() {
    let dir = tempfile::tempdir().unwrap();

    {
        let mut store = boot(dir.path()).await;
        store
            .login(
                SessionCandidate::new("ops@msds.org", "Ops")
                    .with_role(Role::Admin),
            )
            .await
            .unwrap();
    }

    let store = boot(dir.path()).await;
    let user = store.user().expect("session should be restored");
    assert_eq!(user.email, "ops@msds.org");
    assert_eq!(user.role, Role::Admin);
}

#[tokio::test]
async fn test_engineer_staff_id_survives_restart() {
    let dir = tempfile::tempdir().unwrap();

    let issued = {
        let mut store = boot(dir.path()).await;
        store
            .login_as_engineer(Credentials::new("eng@msds.org", "pw"))
            .await
            .unwrap()
            .staff_id
    };

    let store = boot(dir.path()).await;
    assert!(store.is_engineer());
    assert_eq!(store.user().unwrap().staff_id, issued);
}

#[tokio::test]
async fn test_logout_removes_file_and_restart_is_anonymous() {
    let dir = tempfile::tempdir().unwrap();

    {
        let mut store = boot(dir.path()).await;
        store
            .login(SessionCandidate::new("a@b.org", "A"))
            .await
            .unwrap();
        assert!(dir.path().join("msds_user.json").exists());

        store.logout(&NullNavigator).await.unwrap();
        assert!(!dir.path().join("msds_user.json").exists());
    }

    let store = boot(dir.path()).await;
    assert!(!store.is_authenticated());
}

#[tokio::test]
async fn test_corrupted_file_starts_anonymous() {
    let dir = tempfile::tempdir().unwrap();
    FileSlot::new(dir.path())
        .set("msds_user", "{\"email\": \"trunc")
        .await
        .unwrap();

    let store = boot(dir.path()).await;

    assert!(!store.is_loading());
    assert!(!store.is_authenticated());
}

#[tokio::test]
async fn test_custom_storage_key_is_isolated() {
    let dir = tempfile::tempdir().unwrap();
    let mut ward7 = SessionStore::new(
        FileSlot::new(dir.path()),
        PlaceholderAuthenticator,
        SessionConfig {
            storage_key: "ward7_user".into(),
            ..SessionConfig::default()
        },
    );
    ward7.initialize().await;
    ward7
        .login(SessionCandidate::new("a@b.org", "A"))
        .await
        .unwrap();

    let default_store = boot(dir.path()).await;

    assert!(!default_store.is_authenticated());
    assert!(dir.path().join("ward7_user.json").exists());
}
