//! Client-side routing: role route sets, the route guard and path resolution.
//!
//! - [`routes_for_role`]: which protected routes a role may see
//! - [`guard`]: allow protected content or redirect to `/login`
//! - [`Router`]: resolves a concrete path for the current [`Session`](crate::models::Session)
//!
//! Route sets are computed on demand from the role and never stored.

pub mod guard;
pub mod pattern;
pub mod roles;
pub mod router;

pub use guard::{GuardDecision, LOGIN_PATH, guard};
pub use pattern::{match_pattern, normalize_path};
pub use roles::{
    DASHBOARD_PATH, course_routes, protected_routes, public_routes, routes_for_role,
    student_routes, teacher_routes,
};
pub use router::{HOME_PATH, Resolution, RouteMatch, Router};

use std::fmt;

/// Screens the dashboard can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Landing,
    Login,
    Register,
    About,
    Contact,
    Dashboard,
    StudentList,
    StudentForm,
    TeacherList,
    TeacherForm,
    CourseList,
    CourseForm,
    Loading,
    NotFound,
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            View::Landing => "landing",
            View::Login => "login",
            View::Register => "register",
            View::About => "about",
            View::Contact => "contact",
            View::Dashboard => "dashboard",
            View::StudentList => "student-list",
            View::StudentForm => "student-form",
            View::TeacherList => "teacher-list",
            View::TeacherForm => "teacher-form",
            View::CourseList => "course-list",
            View::CourseForm => "course-form",
            View::Loading => "loading",
            View::NotFound => "not-found",
        };
        f.write_str(name)
    }
}

/// A path pattern and the view it mounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteDef {
    pub path: &'static str,
    pub view: View,
}

impl RouteDef {
    pub const fn new(path: &'static str, view: View) -> Self {
        Self { path, view }
    }
}
