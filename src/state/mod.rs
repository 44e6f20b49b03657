// State management module
//
// This module provides the SessionStore which wraps Session with thread-safe access
// using Arc<RwLock<T>>, runs actions through the pure reducer, applies their storage
// effects and emits change events for the navigation shell.

pub mod reducer;

pub use reducer::{Action, Effect, Hydration, Transition, reduce};

use crate::metrics::SessionMetrics;
use crate::models::{LanguageConfig, Role, Session, ThemeConfig, ThemePatch, User};
use crate::storage::{
    LANGUAGE_KEY, MemoryStorage, PersistenceAdapter, StorageBackend, THEME_KEY, TOKEN_KEY,
    USER_KEY,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::broadcast;

/// Change events emitted after a dispatch modifies the session
///
/// These let interested parties (primarily the navigation shell) react to
/// session changes without polling.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionChange {
    /// The one-time hydration from storage has run
    Initialized { authenticated: bool },

    /// The user was replaced (login, logout or set-user)
    UserChanged {
        authenticated: bool,
        role: Option<Role>,
    },

    LoadingChanged(bool),

    ErrorChanged(Option<String>),

    ThemeChanged(ThemeConfig),

    LanguageChanged(LanguageConfig),

    SidebarChanged(bool),

    /// Logout ran; user and token were cleared
    LoggedOut,
}

/// Thread-safe session store with event emission
///
/// This is the central state component that:
/// - Provides thread-safe access to [`Session`] via `Arc<RwLock<T>>`
/// - Runs every mutation through [`reduce`] so transitions stay pure
/// - Applies the declared storage effects best-effort (a failed write never
///   rolls back the state change)
/// - Hydrates from storage at most once per store
/// - Emits [`SessionChange`] events over a tokio broadcast channel
///
/// Dispatches are serialized by the write lock, and storage effects run
/// before the lock is released, so the persisted copy is written in
/// dispatch order.
///
/// # Related Types
///
/// - [`crate::models::Session`]: the underlying state
/// - [`crate::storage::PersistenceAdapter`]: where effects land
/// - [`crate::ui::AppController`]: primary consumer of the store
pub struct SessionStore {
    state: Arc<RwLock<Session>>,

    /// Multiple subscribers can listen for session changes
    state_tx: broadcast::Sender<SessionChange>,

    storage: PersistenceAdapter,

    hydrated: Arc<AtomicBool>,

    metrics: Arc<SessionMetrics>,
}

impl SessionStore {
    /// Create a store over `backend` with a broadcast buffer of 100 events
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self::with_metrics(backend, Arc::new(SessionMetrics::new()))
    }

    pub fn with_metrics(backend: Arc<dyn StorageBackend>, metrics: Arc<SessionMetrics>) -> Self {
        let (state_tx, _) = broadcast::channel(100);
        Self {
            state: Arc::new(RwLock::new(Session::default())),
            state_tx,
            storage: PersistenceAdapter::with_metrics(backend, Arc::clone(&metrics)),
            hydrated: Arc::new(AtomicBool::new(false)),
            metrics,
        }
    }

    /// A store backed by fresh in-memory storage
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    /// Clone of the current session
    pub fn snapshot(&self) -> Session {
        self.state.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Execute a function with read access to the session
    ///
    /// # Example
    /// ```ignore
    /// let signed_in = store.read(|s| s.is_authenticated());
    /// ```
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Session) -> R,
    {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        f(&state)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionChange> {
        self.state_tx.subscribe()
    }

    pub fn storage(&self) -> &PersistenceAdapter {
        &self.storage
    }

    pub fn metrics(&self) -> &Arc<SessionMetrics> {
        &self.metrics
    }

    pub fn is_hydrated(&self) -> bool {
        self.hydrated.load(Ordering::SeqCst)
    }

    /// Run an action and emit change events
    ///
    /// This is the only way to modify the session. It:
    /// 1. Computes the transition with [`reduce`]
    /// 2. Swaps in the new session
    /// 3. Applies storage effects
    /// 4. Detects what changed and broadcasts it
    ///
    /// A second [`Action::Initialize`] is ignored and returns no changes.
    pub fn dispatch(&self, action: Action) -> Vec<SessionChange> {
        if matches!(action, Action::Initialize(_)) && !self.claim_hydration() {
            return Vec::new();
        }

        let changes = {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            self.transition(&mut state, &action)
        };

        self.publish(action.name(), changes)
    }

    /// Mark the store hydrated. `false` if an earlier call already did.
    fn claim_hydration(&self) -> bool {
        if self.hydrated.swap(true, Ordering::SeqCst) {
            tracing::warn!("Session already initialized, ignoring repeated initialize");
            self.metrics.record_ignored_dispatch();
            return false;
        }
        true
    }

    /// Reduce, swap in the result and apply its effects. Caller holds the write lock.
    fn transition(&self, state: &mut Session, action: &Action) -> Vec<SessionChange> {
        let Transition { session, effects } = reduce(state, action);
        let changes = Self::detect_changes(state, &session, action);
        *state = session;

        for effect in &effects {
            self.apply_effect(effect);
        }

        changes
    }

    fn publish(&self, action: &str, changes: Vec<SessionChange>) -> Vec<SessionChange> {
        self.metrics.record_dispatch();
        tracing::debug!("Dispatched {} ({} changes)", action, changes.len());

        for change in &changes {
            // No receivers is fine
            if self.state_tx.send(change.clone()).is_ok() {
                self.metrics.record_broadcast();
            }
        }

        changes
    }

    fn apply_effect(&self, effect: &Effect) {
        let ok = match effect {
            Effect::PersistUser(user) => self.storage.set(USER_KEY, user),
            Effect::PersistTheme(theme) => self.storage.set(THEME_KEY, theme),
            Effect::PersistLanguage(language) => self.storage.set(LANGUAGE_KEY, language),
            Effect::Remove(key) => self.storage.remove(key),
        };

        if !ok {
            tracing::warn!(
                "Could not persist '{}'; state and storage may differ until the next write",
                effect.key()
            );
        }
    }

    fn detect_changes(old: &Session, new: &Session, action: &Action) -> Vec<SessionChange> {
        let mut changes = Vec::new();

        if old.user != new.user {
            changes.push(SessionChange::UserChanged {
                authenticated: new.is_authenticated(),
                role: new.role().cloned(),
            });
        }

        if old.loading != new.loading {
            changes.push(SessionChange::LoadingChanged(new.loading));
        }

        if old.error != new.error {
            changes.push(SessionChange::ErrorChanged(new.error.clone()));
        }

        if old.theme != new.theme {
            changes.push(SessionChange::ThemeChanged(new.theme.clone()));
        }

        if old.language != new.language {
            changes.push(SessionChange::LanguageChanged(new.language.clone()));
        }

        if old.sidebar_open != new.sidebar_open {
            changes.push(SessionChange::SidebarChanged(new.sidebar_open));
        }

        match action {
            Action::Initialize(_) => changes.push(SessionChange::Initialized {
                authenticated: new.is_authenticated(),
            }),
            Action::Logout => changes.push(SessionChange::LoggedOut),
            _ => {}
        }

        changes
    }

    // Convenience methods for each action

    /// Hydrate from storage. Only the first call per store has any effect.
    ///
    /// Storage is read while the write lock is held, so a dispatch racing with
    /// hydration lands after it instead of being overwritten by stale values.
    pub fn initialize(&self) -> Vec<SessionChange> {
        if !self.claim_hydration() {
            return Vec::new();
        }

        let (name, changes) = {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);

            let hydration = Hydration {
                user: self.storage.get(USER_KEY),
                theme: self.storage.get(THEME_KEY),
                language: self.storage.get(LANGUAGE_KEY),
            };

            tracing::info!(
                "Hydrating session from {} storage: user={}, theme={}, language={}",
                self.storage.backend_name(),
                hydration.user.is_some(),
                hydration.theme.is_some(),
                hydration.language.is_some()
            );

            let action = Action::Initialize(hydration);
            (action.name(), self.transition(&mut state, &action))
        };

        self.publish(name, changes)
    }

    pub fn set_user(&self, user: Option<User>) -> Vec<SessionChange> {
        self.dispatch(Action::SetUser(user))
    }

    pub fn set_loading(&self, loading: bool) -> Vec<SessionChange> {
        self.dispatch(Action::SetLoading(loading))
    }

    pub fn set_error(&self, error: Option<String>) -> Vec<SessionChange> {
        self.dispatch(Action::SetError(error))
    }

    pub fn set_theme(&self, patch: ThemePatch) -> Vec<SessionChange> {
        self.dispatch(Action::SetTheme(patch))
    }

    pub fn set_language(&self, language: LanguageConfig) -> Vec<SessionChange> {
        self.dispatch(Action::SetLanguage(language))
    }

    pub fn toggle_sidebar(&self) -> Vec<SessionChange> {
        self.dispatch(Action::ToggleSidebar)
    }

    pub fn set_sidebar(&self, open: bool) -> Vec<SessionChange> {
        self.dispatch(Action::SetSidebar(open))
    }

    pub fn logout(&self) -> Vec<SessionChange> {
        tracing::info!("Logging out");
        self.dispatch(Action::Logout)
    }

    /// Persist the auth token returned at sign-in. Cleared by [`logout`](Self::logout).
    pub fn store_token(&self, token: &str) -> bool {
        self.storage.set(TOKEN_KEY, token)
    }

    pub fn token(&self) -> Option<String> {
        self.storage.get(TOKEN_KEY)
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

// Clones share the session, channel, storage and hydration flag
impl Clone for SessionStore {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            state_tx: self.state_tx.clone(),
            storage: self.storage.clone(),
            hydrated: Arc::clone(&self.hydrated),
            metrics: Arc::clone(&self.metrics),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ThemeMode;
    use crate::storage::StorageError;
    use crate::storage::MockStorageBackend;

    fn teacher() -> User {
        User::new("7", "t@school.io", "Tess", "Ng", Role::Teacher)
    }

    #[test]
    fn test_new_store() {
        let store = SessionStore::in_memory();
        let session = store.snapshot();

        assert!(session.loading);
        assert!(!session.is_authenticated());
        assert!(!store.is_hydrated());
    }

    #[test]
    fn test_initialize_runs_once() {
        let backend = Arc::new(MemoryStorage::new());
        let store = SessionStore::new(backend.clone());

        let changes = store.initialize();
        assert!(changes.contains(&SessionChange::LoadingChanged(false)));
        assert!(changes.contains(&SessionChange::Initialized { authenticated: false }));

        // A user appearing in storage later is not picked up by a second initialize
        backend
            .write(USER_KEY, &serde_json::to_string(&teacher()).unwrap())
            .unwrap();
        assert!(store.initialize().is_empty());
        assert!(store.dispatch(Action::Initialize(Hydration::default())).is_empty());
        assert!(!store.snapshot().is_authenticated());
    }

    #[test]
    fn test_set_user_emits_and_persists() {
        let store = SessionStore::in_memory();
        store.initialize();

        let changes = store.set_user(Some(teacher()));
        assert_eq!(
            changes,
            vec![SessionChange::UserChanged {
                authenticated: true,
                role: Some(Role::Teacher),
            }]
        );
        assert_eq!(store.storage().get::<User>(USER_KEY), Some(teacher()));
    }

    #[test]
    fn test_unchanged_dispatch_emits_nothing() {
        let store = SessionStore::in_memory();
        store.initialize();

        assert!(store.set_sidebar(true).is_empty());
        assert_eq!(store.set_sidebar(false), vec![SessionChange::SidebarChanged(false)]);
    }

    #[test]
    fn test_failed_persistence_keeps_state_change() {
        let mut mock = MockStorageBackend::new();
        mock.expect_name().return_const("mock");
        mock.expect_write()
            .returning(|_, _| Err(StorageError::Disabled));
        let store = SessionStore::new(Arc::new(mock));

        store.set_theme(ThemePatch::mode(ThemeMode::Dark));
        assert!(store.snapshot().theme.is_dark());
        assert_eq!(
            store.metrics().persist_failures.load(Ordering::Relaxed),
            1
        );
    }

    #[test]
    fn test_logout_emits_logged_out() {
        let store = SessionStore::in_memory();
        store.initialize();
        store.set_user(Some(teacher()));
        assert!(store.store_token("secret"));
        assert_eq!(store.token().as_deref(), Some("secret"));

        let changes = store.logout();
        assert_eq!(changes.last(), Some(&SessionChange::LoggedOut));
        assert!(store.token().is_none());
        assert!(store.storage().get_raw(USER_KEY).is_none());
    }

    #[test]
    fn test_subscribe_to_changes() {
        let store = SessionStore::in_memory();
        let mut rx = store.subscribe();

        store.toggle_sidebar();

        let event = rx.try_recv();
        assert!(matches!(event, Ok(SessionChange::SidebarChanged(false))));
        assert_eq!(store.metrics().broadcasts.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_clone_shares_state() {
        let store1 = SessionStore::in_memory();
        let store2 = store1.clone();

        store1.initialize();
        store1.set_error(Some("Login failed".to_string()));

        assert_eq!(store2.snapshot().error.as_deref(), Some("Login failed"));
        assert!(store2.is_hydrated());
        assert!(store2.initialize().is_empty());
    }

    #[test]
    fn test_read_with_closure() {
        let store = SessionStore::in_memory();
        store.set_user(Some(teacher()));

        let role = store.read(|s| s.role().cloned());
        assert_eq!(role, Some(Role::Teacher));
    }
}
