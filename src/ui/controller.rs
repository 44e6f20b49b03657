// App Controller - Bridges navigation with session state
//
// This module contains the AppController which coordinates between:
// - SessionStore (session state and persistence)
// - Router (guard and role-based route resolution)
// - History (client-side navigation entries)
//
// It handles:
// - Navigation with guard redirects that replace history entries
// - Sign-in and sign-out flows
// - Sidebar and document theme view data

use super::navigation::{DocumentTheme, NavItem, document_theme, navigation_items};
use crate::metrics::SessionMetrics;
use crate::models::User;
use crate::routing::{DASHBOARD_PATH, HOME_PATH, LOGIN_PATH, Resolution, RouteMatch, Router, View};
use crate::state::{SessionChange, SessionStore};
use indexmap::IndexMap;
use std::sync::Arc;

/// Upper bound on redirects followed for one navigation.
const MAX_REDIRECTS: usize = 8;

/// Client-side navigation entries with a cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct History {
    entries: Vec<String>,
    cursor: usize,
}

impl History {
    pub fn new(initial: &str) -> Self {
        Self {
            entries: vec![initial.to_string()],
            cursor: 0,
        }
    }

    pub fn current(&self) -> &str {
        &self.entries[self.cursor]
    }

    /// Add an entry after the cursor, dropping any forward entries.
    pub fn push(&mut self, path: &str) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(path.to_string());
        self.cursor = self.entries.len() - 1;
    }

    /// Overwrite the current entry.
    pub fn replace(&mut self, path: &str) {
        self.entries[self.cursor] = path.to_string();
    }

    pub fn back(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        true
    }

    pub fn forward(&mut self) -> bool {
        if self.cursor + 1 >= self.entries.len() {
            return false;
        }
        self.cursor += 1;
        true
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }
}

/// What the shell shows after a navigation settles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screen {
    pub path: String,
    pub view: View,
    pub params: IndexMap<String, String>,
}

impl From<RouteMatch> for Screen {
    fn from(found: RouteMatch) -> Self {
        Self {
            path: found.path,
            view: found.view,
            params: found.params,
        }
    }
}

/// Navigation shell that wires the session store to the router
///
/// The controller is the explicit context object handed to everything that
/// needs session state; there is no global store.
///
/// # Example
/// ```ignore
/// let store = SessionStore::in_memory();
/// store.initialize();
/// let mut app = AppController::new(store);
///
/// let screen = app.navigate("/students");
/// assert_eq!(screen.path, "/login"); // guard redirect
/// ```
pub struct AppController {
    store: SessionStore,
    router: Router,
    history: History,
    metrics: Arc<SessionMetrics>,
}

impl AppController {
    pub fn new(store: SessionStore) -> Self {
        let metrics = Arc::clone(store.metrics());
        Self {
            store,
            router: Router::new(),
            history: History::new(HOME_PATH),
            metrics,
        }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn current_path(&self) -> &str {
        self.history.current()
    }

    /// Push `path` and resolve it, following redirects.
    pub fn navigate(&mut self, path: &str) -> Screen {
        tracing::debug!("Navigate to {}", path);
        self.history.push(path);
        self.settle()
    }

    /// Resolve the current entry again, e.g. once the session has hydrated.
    pub fn refresh(&mut self) -> Screen {
        self.settle()
    }

    /// Step back in history. `None` at the first entry.
    pub fn back(&mut self) -> Option<Screen> {
        self.history.back().then(|| self.settle())
    }

    pub fn forward(&mut self) -> Option<Screen> {
        self.history.forward().then(|| self.settle())
    }

    /// Complete a successful sign-in: store the user and token, open the dashboard.
    pub fn login(&mut self, user: User, token: Option<&str>) -> Screen {
        tracing::info!("Signed in as {} ({})", user.email, user.role);

        if let Some(token) = token {
            if !self.store.store_token(token) {
                tracing::warn!("Auth token could not be persisted; session lasts until reload");
            }
        }
        self.store.set_user(Some(user));
        self.navigate(DASHBOARD_PATH)
    }

    /// Record a failed sign-in on the session. The user stays on the current page.
    pub fn fail_login(&mut self, message: &str) -> Vec<SessionChange> {
        tracing::warn!("Sign-in failed: {}", message);
        self.store.set_error(Some(message.to_string()))
    }

    /// Sign out and go to the login page.
    pub fn logout(&mut self) -> Screen {
        self.store.logout();
        self.navigate(LOGIN_PATH)
    }

    /// Sidebar entries for the signed-in role, marking the current page.
    pub fn navigation_items(&self) -> Vec<NavItem> {
        let role = self.store.read(|s| s.role().cloned());
        navigation_items(role.as_ref(), self.history.current())
    }

    pub fn document_theme(&self) -> DocumentTheme {
        self.store.read(document_theme)
    }

    fn settle(&mut self) -> Screen {
        self.metrics.record_navigation();

        for _ in 0..MAX_REDIRECTS {
            let resolution = self
                .store
                .read(|session| self.router.resolve(session, self.history.current()));

            match resolution {
                Resolution::Render(found) => {
                    // Keep the history entry in canonical form
                    if found.path != self.history.current() {
                        self.history.replace(&found.path);
                    }
                    return Screen::from(found);
                }
                Resolution::Redirect { to, replace } => {
                    if to == LOGIN_PATH {
                        self.metrics.record_guard_redirect();
                    }
                    tracing::debug!(
                        "Redirect {} -> {} (replace={})",
                        self.history.current(),
                        to,
                        replace
                    );
                    if replace {
                        self.history.replace(&to);
                    } else {
                        self.history.push(&to);
                    }
                }
            }
        }

        tracing::error!(
            "Too many redirects resolving {}, showing not found",
            self.history.current()
        );
        Screen {
            path: self.history.current().to_string(),
            view: View::NotFound,
            params: IndexMap::new(),
        }
    }
}
