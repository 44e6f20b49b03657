use super::guard::{GuardDecision, guard};
use super::pattern::{match_pattern, normalize_path};
use super::roles::{protected_routes, public_routes, routes_for_role};
use super::{RouteDef, View};
use crate::models::Session;
use indexmap::IndexMap;

/// Where unknown paths are sent.
pub const HOME_PATH: &str = "/";

/// A view chosen for a path, with the captured `:param` segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    pub path: String,
    pub view: View,
    pub params: IndexMap<String, String>,
}

impl RouteMatch {
    fn bare(path: String, view: View) -> Self {
        Self {
            path,
            view,
            params: IndexMap::new(),
        }
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Render(RouteMatch),
    Redirect { to: String, replace: bool },
}

/// Resolves client-side paths against the session.
///
/// Resolution order:
/// 1. While the session is loading, everything renders [`View::Loading`]
/// 2. Public routes render for everyone
/// 3. Protected routes go through the [guard](super::guard::guard); signed-in
///    users get the view when their role's route set contains it and
///    [`View::NotFound`] otherwise
/// 4. Anything else redirects home, replacing the history entry
#[derive(Debug, Clone)]
pub struct Router {
    public: Vec<RouteDef>,
    protected: Vec<RouteDef>,
}

impl Router {
    pub fn new() -> Self {
        Self {
            public: public_routes(),
            protected: protected_routes(),
        }
    }

    pub fn resolve(&self, session: &Session, path: &str) -> Resolution {
        let path = normalize_path(path);

        if session.loading {
            return Resolution::Render(RouteMatch::bare(path, View::Loading));
        }

        if let Some(found) = Self::find(&self.public, &path) {
            return Resolution::Render(found);
        }

        if Self::find(&self.protected, &path).is_none() {
            tracing::debug!("No route for {}, redirecting home", path);
            return Resolution::Redirect {
                to: HOME_PATH.to_string(),
                replace: true,
            };
        }

        if let GuardDecision::Redirect { to, replace } = guard(session.is_authenticated()) {
            tracing::debug!("Guard redirect from {} to {}", path, to);
            return Resolution::Redirect {
                to: to.to_string(),
                replace,
            };
        }

        let permitted = routes_for_role(session.role());
        match Self::find(&permitted, &path) {
            Some(found) => Resolution::Render(found),
            None => {
                tracing::debug!(
                    "Route {} not permitted for role {:?}",
                    path,
                    session.role().map(|r| r.as_str())
                );
                Resolution::Render(RouteMatch::bare(path, View::NotFound))
            }
        }
    }

    fn find(routes: &[RouteDef], path: &str) -> Option<RouteMatch> {
        routes.iter().find_map(|route| {
            match_pattern(route.path, path).map(|params| RouteMatch {
                path: path.to_string(),
                view: route.view,
                params,
            })
        })
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}
