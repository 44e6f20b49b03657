use super::{LANGUAGE_KEY, StorageBackend, StorageError, THEME_KEY};
use chrono::{DateTime, Duration, Utc};
use indexmap::IndexMap;
use std::fmt;
use std::sync::{PoisonError, RwLock};

/// Days a session cookie (`user`, `token`) stays valid.
pub const SESSION_COOKIE_DAYS: u32 = 7;
/// Days a preference cookie (`theme`, `language`) stays valid.
pub const PREFERENCE_COOKIE_DAYS: u32 = 365;
/// Longest cookie lifetime browsers honor; configured retention is capped here.
pub const MAX_COOKIE_DAYS: u32 = 400;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SameSite {
    #[default]
    Lax,
    Strict,
    None,
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SameSite::Lax => "Lax",
            SameSite::Strict => "Strict",
            SameSite::None => "None",
        })
    }
}

/// How long each key's cookie lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CookieRetention {
    pub session_days: u32,
    pub preference_days: u32,
}

impl Default for CookieRetention {
    fn default() -> Self {
        Self {
            session_days: SESSION_COOKIE_DAYS,
            preference_days: PREFERENCE_COOKIE_DAYS,
        }
    }
}

impl CookieRetention {
    /// Retention with both lifetimes capped at [`MAX_COOKIE_DAYS`].
    pub fn bounded(self) -> Self {
        Self {
            session_days: self.session_days.min(MAX_COOKIE_DAYS),
            preference_days: self.preference_days.min(MAX_COOKIE_DAYS),
        }
    }

    pub fn days_for(&self, key: &str) -> u32 {
        match key {
            THEME_KEY | LANGUAGE_KEY => self.preference_days,
            _ => self.session_days,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub expires: DateTime<Utc>,
    pub path: String,
    pub same_site: SameSite,
}

impl Cookie {
    /// A root-path, `SameSite=Lax` cookie expiring `days` from `now`.
    ///
    /// Expiry saturates at the latest representable instant.
    pub fn new(name: &str, value: &str, days: u32, now: DateTime<Utc>) -> Self {
        let expires = Duration::try_days(i64::from(days))
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        Self {
            name: name.to_string(),
            value: value.to_string(),
            expires,
            path: "/".to_string(),
            same_site: SameSite::Lax,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires <= now
    }

    /// Render as a `Set-Cookie` value. The value is percent-encoded so JSON
    /// text cannot break the attribute list.
    pub fn to_set_cookie_string(&self) -> String {
        format!(
            "{}={}; expires={}; path={}; SameSite={}",
            self.name,
            urlencoding::encode(&self.value),
            self.expires.format("%a, %d %b %Y %H:%M:%S GMT"),
            self.path,
            self.same_site
        )
    }
}

/// Find `name` in a `Cookie` request header (`a=1; b=2`) and decode its value.
pub fn parse_cookie(header: &str, name: &str) -> Option<String> {
    header
        .split(';')
        .map(str::trim_start)
        .find_map(|pair| pair.strip_prefix(name)?.strip_prefix('='))
        .and_then(|raw| urlencoding::decode(raw).ok())
        .map(|value| value.into_owned())
}

/// Cookie-backed storage.
///
/// Each write replaces the named cookie with a fresh expiry taken from the
/// jar's [`CookieRetention`]. Expired cookies read as absent and are dropped
/// on the next write.
#[derive(Debug, Default)]
pub struct CookieJar {
    cookies: RwLock<IndexMap<String, Cookie>>,
    retention: CookieRetention,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_retention(retention: CookieRetention) -> Self {
        Self {
            cookies: RwLock::default(),
            retention,
        }
    }

    /// Seed a jar from a `Cookie` request header.
    ///
    /// Request headers carry no expiry, so each cookie gets the retention
    /// its key would receive on a fresh write.
    pub fn from_cookie_header(header: &str, retention: CookieRetention) -> Self {
        let jar = Self::with_retention(retention);
        let now = Utc::now();

        for pair in header.split(';').map(str::trim) {
            let Some((name, raw)) = pair.split_once('=') else {
                continue;
            };
            if name.is_empty() {
                continue;
            }
            match urlencoding::decode(raw) {
                Ok(value) => {
                    let days = retention.days_for(name);
                    jar.insert(Cookie::new(name, &value, days, now));
                }
                Err(e) => tracing::warn!("Skipping cookie '{}' with invalid encoding: {}", name, e),
            }
        }

        jar
    }

    pub fn retention(&self) -> CookieRetention {
        self.retention
    }

    /// Insert or replace a cookie as-is, keeping its expiry.
    pub fn insert(&self, cookie: Cookie) {
        self.cookies
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(cookie.name.clone(), cookie);
    }

    pub fn cookie(&self, name: &str) -> Option<Cookie> {
        self.cookies
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// `Set-Cookie` strings for every live cookie.
    pub fn set_cookie_headers(&self) -> Vec<String> {
        let now = Utc::now();
        self.cookies
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|c| !c.is_expired_at(now))
            .map(Cookie::to_set_cookie_string)
            .collect()
    }

    /// A `Cookie` request header for every live cookie.
    pub fn cookie_header(&self) -> String {
        let now = Utc::now();
        self.cookies
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|c| !c.is_expired_at(now))
            .map(|c| format!("{}={}", c.name, urlencoding::encode(&c.value)))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

impl StorageBackend for CookieJar {
    fn name(&self) -> &'static str {
        "cookie"
    }

    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let now = Utc::now();
        let cookies = self.cookies.read().unwrap_or_else(PoisonError::into_inner);
        Ok(cookies
            .get(key)
            .filter(|c| !c.is_expired_at(now))
            .map(|c| c.value.clone()))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let now = Utc::now();
        let mut cookies = self.cookies.write().unwrap_or_else(PoisonError::into_inner);
        cookies.retain(|_, c| !c.is_expired_at(now));
        cookies.insert(
            key.to_string(),
            Cookie::new(key, value, self.retention.days_for(key), now),
        );
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.cookies
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .shift_remove(key);
        Ok(())
    }

    fn wipe(&self) -> Result<(), StorageError> {
        self.cookies
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        Ok(())
    }
}
