use crate::models::{LanguageConfig, Role, ThemeConfig, User};

/// Single source of truth for the dashboard's cross-cutting state.
///
/// `Session` is owned by [`crate::state::SessionStore`] and only changes
/// through [`crate::state::Action`]s run by the reducer. The authenticated
/// flag is derived from `user`, so "authenticated exactly when a user is
/// present" holds for every value of this type.
///
/// # Related Types
///
/// - [`crate::state::SessionStore`]: thread-safe wrapper with change events
/// - [`crate::state::reduce`]: the pure transition function
/// - [`crate::routing::Router`]: reads `loading`, the authenticated flag and the role
#[derive(Clone, Debug, PartialEq)]
pub struct Session {
    pub user: Option<User>,
    pub loading: bool,
    pub error: Option<String>,
    pub theme: ThemeConfig,
    pub language: LanguageConfig,
    pub sidebar_open: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            user: None,
            loading: true,
            error: None,
            theme: ThemeConfig::default(),
            language: LanguageConfig::default(),
            sidebar_open: true,
        }
    }
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn role(&self) -> Option<&Role> {
        self.user.as_ref().map(|u| &u.role)
    }

    /// State left behind by logout: defaults, keeping theme and language.
    pub fn signed_out(&self) -> Session {
        Session {
            loading: false,
            theme: self.theme.clone(),
            language: self.language.clone(),
            ..Session::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ThemeMode;

    #[test]
    fn test_initial_session() {
        let session = Session::default();

        assert!(session.loading);
        assert!(!session.is_authenticated());
        assert!(session.sidebar_open);
        assert!(session.error.is_none());
        assert_eq!(session.language.code, "en");
        assert!(session.role().is_none());
    }

    #[test]
    fn test_signed_out_keeps_preferences() {
        let mut session = Session::default();
        session.user = Some(User::new("1", "a@b.co", "A", "B", Role::Admin));
        session.theme.mode = ThemeMode::Dark;
        session.language = LanguageConfig::new("fr", "Français");
        session.sidebar_open = false;
        session.error = Some("boom".to_string());

        let out = session.signed_out();
        assert!(!out.is_authenticated());
        assert!(!out.loading);
        assert!(out.sidebar_open);
        assert!(out.error.is_none());
        assert_eq!(out.theme.mode, ThemeMode::Dark);
        assert_eq!(out.language.code, "fr");
    }
}
