/// Where unauthenticated visitors of a protected route are sent.
pub const LOGIN_PATH: &str = "/login";

/// Outcome of the route guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    /// Navigate to `to`. With `replace` the guarded entry is overwritten in
    /// history, so going back does not land on the protected page again.
    Redirect { to: &'static str, replace: bool },
}

/// Decide whether protected content may render.
pub fn guard(is_authenticated: bool) -> GuardDecision {
    if is_authenticated {
        GuardDecision::Allow
    } else {
        GuardDecision::Redirect {
            to: LOGIN_PATH,
            replace: true,
        }
    }
}
