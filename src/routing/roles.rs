use super::{RouteDef, View};
use crate::models::Role;

pub const DASHBOARD_PATH: &str = "/dashboard";

const DASHBOARD: RouteDef = RouteDef::new(DASHBOARD_PATH, View::Dashboard);

const STUDENT_ROUTES: [RouteDef; 3] = [
    RouteDef::new("/students", View::StudentList),
    RouteDef::new("/students/new", View::StudentForm),
    RouteDef::new("/students/:id/edit", View::StudentForm),
];

const TEACHER_ROUTES: [RouteDef; 3] = [
    RouteDef::new("/teachers", View::TeacherList),
    RouteDef::new("/teachers/new", View::TeacherForm),
    RouteDef::new("/teachers/:id/edit", View::TeacherForm),
];

const COURSE_ROUTES: [RouteDef; 3] = [
    RouteDef::new("/courses", View::CourseList),
    RouteDef::new("/courses/new", View::CourseForm),
    RouteDef::new("/courses/:id/edit", View::CourseForm),
];

const PUBLIC_ROUTES: [RouteDef; 5] = [
    RouteDef::new("/", View::Landing),
    RouteDef::new("/login", View::Login),
    RouteDef::new("/register", View::Register),
    RouteDef::new("/about", View::About),
    RouteDef::new("/contact", View::Contact),
];

pub fn student_routes() -> Vec<RouteDef> {
    STUDENT_ROUTES.to_vec()
}

pub fn teacher_routes() -> Vec<RouteDef> {
    TEACHER_ROUTES.to_vec()
}

pub fn course_routes() -> Vec<RouteDef> {
    COURSE_ROUTES.to_vec()
}

/// Routes reachable without signing in.
pub fn public_routes() -> Vec<RouteDef> {
    PUBLIC_ROUTES.to_vec()
}

/// The route set mounted for a role.
///
/// - admin: dashboard, students, teachers, courses
/// - teacher: dashboard, students, courses
/// - student: dashboard, courses
/// - every other role, unknown roles and no user: the dashboard alone
pub fn routes_for_role(role: Option<&Role>) -> Vec<RouteDef> {
    let groups: &[&[RouteDef]] = match role {
        Some(Role::Admin) => &[&STUDENT_ROUTES, &TEACHER_ROUTES, &COURSE_ROUTES],
        Some(Role::Teacher) => &[&STUDENT_ROUTES, &COURSE_ROUTES],
        Some(Role::Student) => &[&COURSE_ROUTES],
        _ => &[],
    };

    std::iter::once(DASHBOARD)
        .chain(groups.iter().flat_map(|group| group.iter().copied()))
        .collect()
}

/// Every route behind the guard, regardless of role.
pub fn protected_routes() -> Vec<RouteDef> {
    routes_for_role(Some(&Role::Admin))
}
