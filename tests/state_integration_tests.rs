//! Integration tests for SessionStore with session change events
//!
//! These tests verify that the SessionStore correctly:
//! - Emits change events on dispatch
//! - Supports multiple subscribers
//! - Handles concurrent dispatch from multiple tasks
//! - Persists user, theme and language so a fresh store hydrates them back
//! - Keeps `is_authenticated` tied to the presence of a user

use proptest::prelude::*;
use schooldesk::models::{LanguageConfig, Role, ThemeConfig, ThemeMode, ThemePatch, User};
use schooldesk::storage::{
    LANGUAGE_KEY, MemoryStorage, StorageBackend, StorageError, THEME_KEY, TOKEN_KEY, USER_KEY,
};
use schooldesk::{SessionChange, SessionStore};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::broadcast::error::TryRecvError;
use tokio::time::{Duration, timeout};

fn teacher() -> User {
    User::new("12", "tess@school.io", "Tess", "Ng", Role::Teacher)
}

#[tokio::test]
async fn test_initialize_event_emitted() {
    let store = SessionStore::in_memory();
    let mut rx = store.subscribe();

    store.initialize();

    let mut initialized = None;
    for _ in 0..2 {
        let event = timeout(Duration::from_millis(100), rx.recv())
            .await
            .expect("Timeout waiting for event")
            .expect("Channel closed");

        match event {
            SessionChange::LoadingChanged(loading) => assert!(!loading),
            SessionChange::Initialized { authenticated } => initialized = Some(authenticated),
            other => panic!("Unexpected event: {:?}", other),
        }
    }

    assert_eq!(initialized, Some(false));
}

#[tokio::test]
async fn test_multiple_subscribers_receive_events() {
    let store = SessionStore::in_memory();
    let mut rx1 = store.subscribe();
    let mut rx2 = store.subscribe();

    store.set_user(Some(teacher()));

    for rx in [&mut rx1, &mut rx2] {
        let event = timeout(Duration::from_millis(100), rx.recv())
            .await
            .expect("Timeout")
            .expect("Channel closed");

        assert_eq!(
            event,
            SessionChange::UserChanged {
                authenticated: true,
                role: Some(Role::Teacher),
            }
        );
    }
}

#[tokio::test]
async fn test_concurrent_dispatch() {
    let store = SessionStore::in_memory();
    store.initialize();

    let mut handles = vec![];
    for i in 0..10 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store.set_error(Some(format!("error {i}")));
            store.toggle_sidebar();
        }));
    }

    for handle in handles {
        handle.await.unwrap();
    }

    // Ten toggles bring the sidebar back to its starting position
    let session = store.snapshot();
    assert!(session.sidebar_open);
    assert!(session.error.unwrap().starts_with("error "));
    assert_eq!(
        store
            .metrics()
            .dispatches
            .load(std::sync::atomic::Ordering::Relaxed),
        21
    );
}

#[test]
fn test_teacher_session_scenario() {
    let backend = Arc::new(MemoryStorage::new());
    let store = SessionStore::new(backend.clone());

    store.initialize();
    let session = store.snapshot();
    assert!(!session.is_authenticated());
    assert_eq!(session.theme, ThemeConfig::default());
    assert_eq!(session.theme.mode, ThemeMode::Light);
    assert_eq!(session.language.code, "en");

    store.set_user(Some(teacher()));
    assert!(store.snapshot().is_authenticated());
    let stored: User = serde_json::from_str(&backend.read(USER_KEY).unwrap().unwrap()).unwrap();
    assert_eq!(stored, teacher());

    store.logout();
    let session = store.snapshot();
    assert!(!session.is_authenticated());
    assert!(backend.read(USER_KEY).unwrap().is_none());
    assert_eq!(session.theme, ThemeConfig::default());
    assert_eq!(session.language.code, "en");
}

#[test]
fn test_logout_keeps_preferences_in_storage() {
    let backend = Arc::new(MemoryStorage::new());
    let store = SessionStore::new(backend.clone());
    store.initialize();

    store.set_theme(ThemePatch::mode(ThemeMode::Dark));
    store.set_language(LanguageConfig::new("fr", "Français"));
    store.set_user(Some(teacher()));
    assert!(store.store_token("tok"));

    store.logout();

    assert!(backend.read(USER_KEY).unwrap().is_none());
    assert!(backend.read(TOKEN_KEY).unwrap().is_none());
    assert!(backend.read(THEME_KEY).unwrap().is_some());
    assert!(backend.read(LANGUAGE_KEY).unwrap().is_some());

    let session = store.snapshot();
    assert!(session.theme.is_dark());
    assert_eq!(session.language.code, "fr");
}

#[test]
fn test_preferences_survive_reload() {
    let backend: Arc<dyn StorageBackend> = Arc::new(MemoryStorage::new());

    let first = SessionStore::new(Arc::clone(&backend));
    first.initialize();
    first.set_user(Some(teacher()));
    first.set_theme(ThemePatch {
        mode: Some(ThemeMode::Dark),
        primary_color: Some("#10b981".to_string()),
        ..ThemePatch::default()
    });
    let expected = first.snapshot().theme;

    // A fresh store over the same storage stands in for a page reload
    let second = SessionStore::new(backend);
    assert!(second.snapshot().loading);
    second.initialize();

    let session = second.snapshot();
    assert!(!session.loading);
    assert_eq!(session.theme, expected);
    assert_eq!(session.user, Some(teacher()));
    assert!(session.is_authenticated());
}

#[test]
fn test_corrupt_user_does_not_discard_preferences() {
    let backend = Arc::new(MemoryStorage::new());
    backend.write(USER_KEY, "{\"id\":").unwrap();
    backend
        .write(THEME_KEY, &serde_json::to_string(&ThemeConfig {
            mode: ThemeMode::Dark,
            ..ThemeConfig::default()
        }).unwrap())
        .unwrap();

    let store = SessionStore::new(backend);
    store.initialize();

    let session = store.snapshot();
    assert!(!session.is_authenticated());
    assert!(session.theme.is_dark());
}

/// Memory storage whose reads are slow and counted.
struct SlowStorage {
    inner: MemoryStorage,
    delay: std::time::Duration,
    reads: AtomicUsize,
}

impl SlowStorage {
    fn new(delay_ms: u64) -> Self {
        Self {
            inner: MemoryStorage::new(),
            delay: std::time::Duration::from_millis(delay_ms),
            reads: AtomicUsize::new(0),
        }
    }
}

impl StorageBackend for SlowStorage {
    fn name(&self) -> &'static str {
        "slow"
    }

    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(self.delay);
        self.inner.read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.inner.write(key, value)
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.inner.delete(key)
    }

    fn wipe(&self) -> Result<(), StorageError> {
        self.inner.wipe()
    }
}

#[test]
fn test_set_user_during_hydration_is_kept() {
    let backend = Arc::new(SlowStorage::new(100));
    let store = SessionStore::new(backend.clone());

    let hydrating = {
        let store = store.clone();
        std::thread::spawn(move || store.initialize())
    };

    std::thread::sleep(std::time::Duration::from_millis(150));
    store.set_user(Some(teacher()));
    hydrating.join().unwrap();

    let session = store.snapshot();
    assert!(!session.loading);
    assert!(session.is_authenticated());
    assert!(backend.inner.read(USER_KEY).unwrap().is_some());
}

#[test]
fn test_concurrent_initialize_reads_storage_once() {
    let backend = Arc::new(SlowStorage::new(20));
    let store = SessionStore::new(backend.clone());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let store = store.clone();
            std::thread::spawn(move || store.initialize())
        })
        .collect();

    let applied = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|changes| !changes.is_empty())
        .count();

    assert_eq!(applied, 1);
    assert_eq!(backend.reads.load(Ordering::SeqCst), 3);
    assert_eq!(store.metrics().ignored_dispatches.load(Ordering::Relaxed), 3);
}

#[test]
fn test_lagged_subscriber_keeps_receiving() {
    let store = SessionStore::in_memory();
    store.initialize();
    let mut rx = store.subscribe();

    // One more event than the channel holds
    for _ in 0..101 {
        store.toggle_sidebar();
    }

    assert!(matches!(rx.try_recv(), Err(TryRecvError::Lagged(1))));
    let mut received = 0;
    while let Ok(change) = rx.try_recv() {
        assert!(matches!(change, SessionChange::SidebarChanged(_)));
        received += 1;
    }
    assert_eq!(received, 100);

    store.set_error(Some("still listening".to_string()));
    assert_eq!(
        rx.try_recv().unwrap(),
        SessionChange::ErrorChanged(Some("still listening".to_string()))
    );
}

fn arb_user() -> impl Strategy<Value = Option<User>> {
    let role = prop_oneof![
        Just(Role::Admin),
        Just(Role::Teacher),
        Just(Role::Student),
        Just(Role::Parent),
        "[a-z]{1,8}".prop_map(Role::from),
    ];
    proptest::option::of(("[0-9]{1,4}", role).prop_map(|(id, role)| {
        User::new(id, "u@school.io", "U", "Ser", role)
    }))
}

proptest! {
    #[test]
    fn authenticated_iff_user_present(users in proptest::collection::vec(arb_user(), 1..20)) {
        let store = SessionStore::in_memory();
        store.initialize();

        for user in users {
            let present = user.is_some();
            store.set_user(user);
            let session = store.snapshot();
            prop_assert_eq!(session.is_authenticated(), present);
            prop_assert_eq!(session.user.is_some(), present);
        }
    }
}
