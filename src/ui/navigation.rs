// Sidebar and document-level presentation derived from the session

use crate::models::{Role, Session};
use crate::routing::{DASHBOARD_PATH, routes_for_role};

const SIDEBAR_ITEMS: [(&str, &str); 4] = [
    ("dashboard", DASHBOARD_PATH),
    ("students", "/students"),
    ("teachers", "/teachers"),
    ("courses", "/courses"),
];

/// One sidebar entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavItem {
    /// Translation key of the label
    pub key: &'static str,
    pub path: &'static str,
    pub active: bool,
}

/// Sidebar entries the role can actually open, in display order.
pub fn navigation_items(role: Option<&Role>, current_path: &str) -> Vec<NavItem> {
    let permitted = routes_for_role(role);

    SIDEBAR_ITEMS
        .iter()
        .filter(|(_, path)| permitted.iter().any(|route| route.path == *path))
        .map(|&(key, path)| NavItem {
            key,
            path,
            active: is_active(path, current_path),
        })
        .collect()
}

/// The dashboard entry only lights up on the dashboard itself; section
/// entries also cover their sub-pages (`/students/new`).
pub fn is_active(item_path: &str, current_path: &str) -> bool {
    if item_path == DASHBOARD_PATH {
        return current_path == DASHBOARD_PATH;
    }
    current_path == item_path
        || current_path
            .strip_prefix(item_path)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Attributes applied to the document root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentTheme {
    /// `dark` or `light`
    pub class: &'static str,
    /// `rtl` or `ltr`
    pub dir: &'static str,
    pub lang: String,
    pub primary_color: String,
}

pub fn document_theme(session: &Session) -> DocumentTheme {
    DocumentTheme {
        class: if session.theme.is_dark() { "dark" } else { "light" },
        dir: if session.language.is_rtl() { "rtl" } else { "ltr" },
        lang: session.language.code.clone(),
        primary_color: session.theme.primary_color.clone(),
    }
}
