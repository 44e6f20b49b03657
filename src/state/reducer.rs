// Session reducer
//
// Pure transition function: (old session, action) -> (new session, effects).
// Storage side effects are described, not performed; the store applies them.

use crate::models::{LanguageConfig, Session, ThemeConfig, ThemePatch, User};
use crate::storage::{LANGUAGE_KEY, THEME_KEY, TOKEN_KEY, USER_KEY};

/// Values read from storage by the one-time initialize action.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Hydration {
    pub user: Option<User>,
    pub theme: Option<ThemeConfig>,
    pub language: Option<LanguageConfig>,
}

/// The closed set of ways a session can change.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Initialize(Hydration),
    SetUser(Option<User>),
    SetLoading(bool),
    SetError(Option<String>),
    SetTheme(ThemePatch),
    SetLanguage(LanguageConfig),
    ToggleSidebar,
    SetSidebar(bool),
    Logout,
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::Initialize(_) => "initialize",
            Action::SetUser(_) => "set-user",
            Action::SetLoading(_) => "set-loading",
            Action::SetError(_) => "set-error",
            Action::SetTheme(_) => "set-theme",
            Action::SetLanguage(_) => "set-language",
            Action::ToggleSidebar => "toggle-sidebar",
            Action::SetSidebar(_) => "set-sidebar",
            Action::Logout => "logout",
        }
    }
}

/// A storage write requested by a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    PersistUser(User),
    PersistTheme(ThemeConfig),
    PersistLanguage(LanguageConfig),
    Remove(&'static str),
}

impl Effect {
    pub fn key(&self) -> &'static str {
        match self {
            Effect::PersistUser(_) => USER_KEY,
            Effect::PersistTheme(_) => THEME_KEY,
            Effect::PersistLanguage(_) => LANGUAGE_KEY,
            Effect::Remove(key) => key,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub session: Session,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn pure(session: Session) -> Self {
        Self {
            session,
            effects: Vec::new(),
        }
    }
}

/// Compute the next session for `action`.
///
/// Initialize rebuilds from defaults: any field missing from the hydration
/// falls back to its default, and `loading` is cleared.
pub fn reduce(state: &Session, action: &Action) -> Transition {
    match action {
        Action::Initialize(hydration) => Transition::pure(Session {
            user: hydration.user.clone(),
            loading: false,
            theme: hydration.theme.clone().unwrap_or_default(),
            language: hydration.language.clone().unwrap_or_default(),
            ..Session::default()
        }),

        Action::SetUser(user) => {
            let effect = match user {
                Some(u) => Effect::PersistUser(u.clone()),
                None => Effect::Remove(USER_KEY),
            };
            Transition {
                session: Session {
                    user: user.clone(),
                    loading: false,
                    error: None,
                    ..state.clone()
                },
                effects: vec![effect],
            }
        }

        Action::SetLoading(loading) => Transition::pure(Session {
            loading: *loading,
            ..state.clone()
        }),

        Action::SetError(error) => Transition::pure(Session {
            error: error.clone(),
            loading: false,
            ..state.clone()
        }),

        Action::SetTheme(patch) => {
            let theme = state.theme.merge(patch);
            Transition {
                effects: vec![Effect::PersistTheme(theme.clone())],
                session: Session {
                    theme,
                    ..state.clone()
                },
            }
        }

        Action::SetLanguage(language) => Transition {
            session: Session {
                language: language.clone(),
                ..state.clone()
            },
            effects: vec![Effect::PersistLanguage(language.clone())],
        },

        Action::ToggleSidebar => Transition::pure(Session {
            sidebar_open: !state.sidebar_open,
            ..state.clone()
        }),

        Action::SetSidebar(open) => Transition::pure(Session {
            sidebar_open: *open,
            ..state.clone()
        }),

        Action::Logout => Transition {
            session: state.signed_out(),
            effects: vec![Effect::Remove(USER_KEY), Effect::Remove(TOKEN_KEY)],
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Role, Scale, ThemeMode};

    fn teacher() -> User {
        User::new("7", "t@school.io", "Tess", "Ng", Role::Teacher)
    }

    #[test]
    fn test_initialize_from_empty_storage() {
        let t = reduce(&Session::default(), &Action::Initialize(Hydration::default()));

        assert!(!t.session.loading);
        assert!(!t.session.is_authenticated());
        assert_eq!(t.session.theme, ThemeConfig::default());
        assert_eq!(t.session.language.code, "en");
        assert!(t.effects.is_empty());
    }

    #[test]
    fn test_initialize_with_persisted_values() {
        let hydration = Hydration {
            user: Some(teacher()),
            theme: Some(ThemeConfig::default().merge(&ThemePatch::mode(ThemeMode::Dark))),
            language: Some(LanguageConfig::new("fr", "Français")),
        };
        let t = reduce(&Session::default(), &Action::Initialize(hydration));

        assert!(t.session.is_authenticated());
        assert!(t.session.theme.is_dark());
        assert_eq!(t.session.language.code, "fr");
    }

    #[test]
    fn test_set_user_clears_error_and_loading() {
        let state = Session {
            error: Some("bad credentials".to_string()),
            ..Session::default()
        };

        let t = reduce(&state, &Action::SetUser(Some(teacher())));
        assert!(t.session.is_authenticated());
        assert!(!t.session.loading);
        assert!(t.session.error.is_none());
        assert_eq!(t.effects, vec![Effect::PersistUser(teacher())]);

        let t = reduce(&t.session, &Action::SetUser(None));
        assert!(!t.session.is_authenticated());
        assert_eq!(t.effects, vec![Effect::Remove(USER_KEY)]);
    }

    #[test]
    fn test_set_error_stops_loading() {
        let t = reduce(&Session::default(), &Action::SetError(Some("nope".into())));
        assert_eq!(t.session.error.as_deref(), Some("nope"));
        assert!(!t.session.loading);
        assert!(t.effects.is_empty());
    }

    #[test]
    fn test_set_loading_only_touches_loading() {
        let state = Session {
            error: Some("kept".into()),
            loading: false,
            ..Session::default()
        };
        let t = reduce(&state, &Action::SetLoading(true));
        assert!(t.session.loading);
        assert_eq!(t.session.error.as_deref(), Some("kept"));
    }

    #[test]
    fn test_set_theme_persists_merged_value() {
        let patch = ThemePatch {
            border_radius: Some(Scale::Large),
            ..ThemePatch::default()
        };
        let t = reduce(&Session::default(), &Action::SetTheme(patch));

        assert_eq!(t.session.theme.border_radius, Scale::Large);
        assert_eq!(t.session.theme.mode, ThemeMode::Light);
        assert_eq!(t.effects, vec![Effect::PersistTheme(t.session.theme.clone())]);
    }

    #[test]
    fn test_sidebar_actions() {
        let state = Session::default();
        let t = reduce(&state, &Action::ToggleSidebar);
        assert!(!t.session.sidebar_open);
        let t = reduce(&t.session, &Action::ToggleSidebar);
        assert!(t.session.sidebar_open);
        let t = reduce(&t.session, &Action::SetSidebar(false));
        assert!(!t.session.sidebar_open);
        assert!(t.effects.is_empty());
    }

    #[test]
    fn test_logout_removes_user_and_token() {
        let state = reduce(&Session::default(), &Action::SetUser(Some(teacher()))).session;
        let t = reduce(&state, &Action::Logout);

        assert!(!t.session.is_authenticated());
        assert!(!t.session.loading);
        assert_eq!(t.effects, vec![Effect::Remove(USER_KEY), Effect::Remove(TOKEN_KEY)]);
        assert_eq!(t.effects[1].key(), "token");
    }

    #[test]
    fn test_action_names() {
        assert_eq!(Action::ToggleSidebar.name(), "toggle-sidebar");
        assert_eq!(Action::Initialize(Hydration::default()).name(), "initialize");
    }
}
