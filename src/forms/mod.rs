//! Sign-in and registration form validation.
//!
//! Validation failures stay with the form: they block submission and are
//! shown next to the offending field, and are never dispatched to the
//! session store. Authentication failures reported by the API are a
//! different class and land in [`Session::error`](crate::models::Session).

use crate::models::Role;
use indexmap::IndexMap;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

pub const LOGIN_PASSWORD_MIN: usize = 6;
pub const REGISTER_PASSWORD_MIN: usize = 8;
pub const PHONE_MIN: usize = 9;
pub const PHONE_MAX: usize = 15;

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid email regex"));

static PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[1-9]\d{0,15}$").expect("Invalid phone regex"));

static PHONE_SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s\-()]").expect("Invalid phone separator regex"));

static STUDENT_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z]{2,4}\d{4,6}$").expect("Invalid student id regex"));

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// Digits with an optional leading `+`, ignoring spaces, dashes and parentheses.
pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_PATTERN.is_match(&PHONE_SEPARATORS.replace_all(phone, ""))
}

/// Two to four letters followed by four to six digits, e.g. `STU240193`.
pub fn is_valid_student_id(id: &str) -> bool {
    STUDENT_ID_PATTERN.is_match(id)
}

/// Field-level messages, first failure per field, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: IndexMap<&'static str, String>,
}

impl ValidationErrors {
    fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.fields.entry(field).or_insert_with(|| message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.fields.iter().map(|(field, msg)| (*field, msg.as_str()))
    }

    fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.iter().map(|(field, msg)| format!("{field}: {msg}")).collect();
        f.write_str(&parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();

        if !is_valid_email(&self.email) {
            errors.add("email", "Invalid email address");
        }
        if self.password.chars().count() < LOGIN_PASSWORD_MIN {
            errors.add(
                "password",
                format!("Password must be at least {LOGIN_PASSWORD_MIN} characters long"),
            );
        }

        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub confirm_password: String,
    pub role: String,
}

impl RegisterForm {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();

        if self.first_name.trim().is_empty() {
            errors.add("firstName", "First name is required");
        }
        if self.last_name.trim().is_empty() {
            errors.add("lastName", "Last name is required");
        }

        if self.email.is_empty() {
            errors.add("email", "Please enter your email address");
        } else if !is_valid_email(&self.email) {
            errors.add("email", "Please enter a valid email address");
        }

        let phone_len = self.phone.chars().count();
        if phone_len < PHONE_MIN {
            errors.add(
                "phone",
                format!("Phone number must be at least {PHONE_MIN} characters long"),
            );
        } else if phone_len > PHONE_MAX {
            errors.add("phone", format!("Phone number should be at most {PHONE_MAX} characters"));
        }

        if self.password.is_empty() {
            errors.add("password", "Password is required");
        } else if self.password.chars().count() < REGISTER_PASSWORD_MIN {
            errors.add(
                "password",
                format!("Password must be at least {REGISTER_PASSWORD_MIN} characters long"),
            );
        }
        if self.password != self.confirm_password {
            errors.add("confirmPassword", "Passwords do not match");
        }

        if !Role::from(self.role.as_str()).is_known() {
            errors.add("role", "Role is required");
        }

        errors.into_result()
    }

    /// The role the form selects, once validated.
    pub fn role(&self) -> Role {
        Role::from(self.role.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_registration() -> RegisterForm {
        RegisterForm {
            first_name: "Amara".into(),
            last_name: "Diallo".into(),
            email: "amara@school.io".into(),
            phone: "0712345678".into(),
            password: "correct-horse".into(),
            confirm_password: "correct-horse".into(),
            role: "teacher".into(),
        }
    }

    #[test]
    fn test_field_validators() {
        assert!(is_valid_email("a@b.co"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@c.de"));

        assert!(is_valid_phone("+1 (555) 010-9999"));
        assert!(!is_valid_phone("0123"));
        assert!(!is_valid_phone("call me"));

        assert!(is_valid_student_id("STU240193"));
        assert!(!is_valid_student_id("S1234"));
        assert!(!is_valid_student_id("STUDENT1234"));
    }

    #[test]
    fn test_login_form() {
        let form = LoginForm {
            email: "t@school.io".into(),
            password: "secret1".into(),
        };
        assert!(form.validate().is_ok());

        let errors = LoginForm {
            email: "nope".into(),
            password: "123".into(),
        }
        .validate()
        .unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("email"), Some("Invalid email address"));
        assert_eq!(
            errors.get("password"),
            Some("Password must be at least 6 characters long")
        );
    }

    #[test]
    fn test_register_form_valid() {
        let form = valid_registration();
        assert!(form.validate().is_ok());
        assert_eq!(form.role(), Role::Teacher);
    }

    #[test]
    fn test_register_form_errors() {
        let form = RegisterForm {
            first_name: " ".into(),
            confirm_password: "different".into(),
            phone: "1234567890123456".into(),
            role: "janitor".into(),
            ..valid_registration()
        };

        let errors = form.validate().unwrap_err();
        assert_eq!(errors.get("firstName"), Some("First name is required"));
        assert_eq!(errors.get("confirmPassword"), Some("Passwords do not match"));
        assert_eq!(errors.get("role"), Some("Role is required"));
        assert!(errors.get("phone").is_some());
        assert!(errors.get("email").is_none());
        assert!(errors.to_string().starts_with("firstName: First name is required"));
    }

    #[test]
    fn test_register_short_password() {
        let form = RegisterForm {
            password: "short".into(),
            confirm_password: "short".into(),
            ..valid_registration()
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.get("password"),
            Some("Password must be at least 8 characters long")
        );
    }
}
