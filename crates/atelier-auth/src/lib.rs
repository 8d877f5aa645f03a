pub mod cookie;
pub mod session;

pub use cookie::{parse_cookie_header, Cookie, CookieStore, MemoryJar, SameSite, AUTH_COOKIE};
pub use session::{AuthError, Session, SessionManager};
