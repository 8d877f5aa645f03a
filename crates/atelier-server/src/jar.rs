use axum::http::{HeaderMap, HeaderValue};
use parking_lot::Mutex;

use atelier_auth::{parse_cookie_header, Cookie, CookieStore};

/// CookieStore over one HTTP exchange: reads come from the request's
/// `Cookie` header, writes accumulate as `Set-Cookie` values for the
/// response. Within the exchange a write shadows the inbound value, so a
/// freshly issued session is visible to later reads of the same jar.
pub struct HttpJar {
    incoming: Option<String>,
    outgoing: Mutex<Vec<Cookie>>,
}

impl HttpJar {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let incoming = headers
            .get("cookie")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        Self {
            incoming,
            outgoing: Mutex::new(Vec::new()),
        }
    }

    /// Render accumulated writes as `Set-Cookie` header values.
    pub fn set_cookie_headers(&self) -> Vec<HeaderValue> {
        self.outgoing
            .lock()
            .iter()
            .filter_map(|c| HeaderValue::from_str(&c.to_header_value()).ok())
            .collect()
    }
}

impl CookieStore for HttpJar {
    fn get(&self, name: &str) -> Option<String> {
        // Most recent write wins; an empty value is a pending deletion.
        let outgoing = self.outgoing.lock();
        if let Some(cookie) = outgoing.iter().rev().find(|c| c.name == name) {
            return if cookie.value.is_empty() {
                None
            } else {
                Some(cookie.value.clone())
            };
        }
        drop(outgoing);

        self.incoming
            .as_deref()
            .and_then(|raw| parse_cookie_header(raw, name))
    }

    fn set(&self, cookie: Cookie) {
        self.outgoing.lock().push(cookie);
    }

    fn remove(&self, name: &str) {
        self.outgoing.lock().push(Cookie::expired(name));
    }
}
