use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

/// Name of the session cookie.
pub const AUTH_COOKIE: &str = "auth-token";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl std::fmt::Display for SameSite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Strict => write!(f, "Strict"),
            Self::Lax => write!(f, "Lax"),
            Self::None => write!(f, "None"),
        }
    }
}

/// A cookie with the attributes this system actually sets.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub http_only: bool,
    pub same_site: SameSite,
    pub path: String,
    pub secure: bool,
    pub expires: Option<DateTime<Utc>>,
}

impl Cookie {
    /// The session cookie shape: HttpOnly, SameSite=Lax, Path=/.
    pub fn session(
        name: impl Into<String>,
        value: impl Into<String>,
        expires: DateTime<Utc>,
        secure: bool,
    ) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            http_only: true,
            same_site: SameSite::Lax,
            path: "/".into(),
            secure,
            expires: Some(expires),
        }
    }

    /// A clearing cookie: empty value, expired at the epoch. Browsers drop
    /// the stored cookie on receipt.
    pub fn expired(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: String::new(),
            http_only: true,
            same_site: SameSite::Lax,
            path: "/".into(),
            secure: false,
            expires: Some(DateTime::<Utc>::UNIX_EPOCH),
        }
    }

    /// Render as a `Set-Cookie` header value.
    pub fn to_header_value(&self) -> String {
        let mut out = format!("{}={}", self.name, self.value);
        if self.http_only {
            out.push_str("; HttpOnly");
        }
        out.push_str(&format!("; SameSite={}", self.same_site));
        out.push_str(&format!("; Path={}", self.path));
        if self.secure {
            out.push_str("; Secure");
        }
        if let Some(expires) = self.expires {
            out.push_str(&format!(
                "; Expires={}",
                expires.format("%a, %d %b %Y %H:%M:%S GMT")
            ));
        }
        out
    }
}

/// Where cookies are read from and written to.
///
/// The token manager is parameterized by this capability instead of reaching
/// into an ambient request context; both "current request" and "in-memory"
/// call shapes are jar implementations.
pub trait CookieStore: Send + Sync {
    fn get(&self, name: &str) -> Option<String>;
    fn set(&self, cookie: Cookie);
    fn remove(&self, name: &str);
}

/// In-memory jar with one last-write-wins slot per cookie name.
#[derive(Default)]
pub struct MemoryJar {
    cookies: Mutex<HashMap<String, Cookie>>,
}

impl MemoryJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Full cookie record, for attribute inspection.
    pub fn cookie(&self, name: &str) -> Option<Cookie> {
        self.cookies.lock().get(name).cloned()
    }
}

impl CookieStore for MemoryJar {
    fn get(&self, name: &str) -> Option<String> {
        self.cookies.lock().get(name).map(|c| c.value.clone())
    }

    fn set(&self, cookie: Cookie) {
        self.cookies.lock().insert(cookie.name.clone(), cookie);
    }

    fn remove(&self, name: &str) {
        self.cookies.lock().remove(name);
    }
}

/// Extract one cookie's value from a `Cookie` request header.
pub fn parse_cookie_header(header: &str, name: &str) -> Option<String> {
    for part in header.split(';') {
        let part = part.trim();
        if let Some(eq) = part.find('=') {
            let (k, v) = part.split_at(eq);
            if k == name {
                return Some(v[1..].to_string());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn session_cookie_header_attributes() {
        let expires = Utc.with_ymd_and_hms(2026, 8, 15, 10, 30, 0).unwrap();
        let cookie = Cookie::session(AUTH_COOKIE, "tok123", expires, false);
        let header = cookie.to_header_value();
        assert!(header.starts_with("auth-token=tok123"));
        assert!(header.contains("HttpOnly"));
        assert!(header.contains("SameSite=Lax"));
        assert!(header.contains("Path=/"));
        assert!(!header.contains("Secure"));
        assert!(header.contains("Expires=Sat, 15 Aug 2026 10:30:00 GMT"));
    }

    #[test]
    fn secure_attribute_present_when_requested() {
        let cookie = Cookie::session(AUTH_COOKIE, "tok", Utc::now(), true);
        assert!(cookie.to_header_value().contains("; Secure"));
    }

    #[test]
    fn expired_cookie_clears_at_epoch() {
        let header = Cookie::expired(AUTH_COOKIE).to_header_value();
        assert!(header.starts_with("auth-token="));
        assert!(header.contains("Expires=Thu, 01 Jan 1970 00:00:00 GMT"));
    }

    #[test]
    fn memory_jar_set_get_remove() {
        let jar = MemoryJar::new();
        assert_eq!(jar.get(AUTH_COOKIE), None);

        jar.set(Cookie::session(AUTH_COOKIE, "first", Utc::now(), false));
        assert_eq!(jar.get(AUTH_COOKIE).as_deref(), Some("first"));

        jar.set(Cookie::session(AUTH_COOKIE, "second", Utc::now(), false));
        assert_eq!(jar.get(AUTH_COOKIE).as_deref(), Some("second"));

        jar.remove(AUTH_COOKIE);
        assert_eq!(jar.get(AUTH_COOKIE), None);
    }

    #[test]
    fn memory_jar_remove_absent_is_noop() {
        let jar = MemoryJar::new();
        jar.remove(AUTH_COOKIE);
        assert_eq!(jar.get(AUTH_COOKIE), None);
    }

    #[test]
    fn parse_cookie_header_finds_named_cookie() {
        let header = "theme=dark; auth-token=abc.def.ghi; lang=en";
        assert_eq!(
            parse_cookie_header(header, AUTH_COOKIE).as_deref(),
            Some("abc.def.ghi")
        );
    }

    #[test]
    fn parse_cookie_header_missing_returns_none() {
        assert_eq!(parse_cookie_header("theme=dark", AUTH_COOKIE), None);
        assert_eq!(parse_cookie_header("", AUTH_COOKIE), None);
    }

    #[test]
    fn parse_cookie_header_ignores_name_suffix_matches() {
        let header = "xauth-token=evil";
        assert_eq!(parse_cookie_header(header, AUTH_COOKIE), None);
    }

    #[test]
    fn parse_cookie_header_keeps_value_equals_signs() {
        let header = "auth-token=abc==";
        assert_eq!(parse_cookie_header(header, AUTH_COOKIE).as_deref(), Some("abc=="));
    }
}
