use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use atelier_core::ids::UserId;

use crate::cookie::{Cookie, CookieStore, AUTH_COOKIE};

/// How long an issued session stays valid.
pub const SESSION_TTL_DAYS: i64 = 7;

/// Tolerated clock skew between issuer and verifier.
const EXPIRY_LEEWAY_SECS: u64 = 30;

/// Decoded view of a verified session token. Derived on every verification,
/// never persisted on its own.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub user_id: UserId,
    pub email: String,
    pub expires_at: DateTime<Utc>,
}

/// Signed token payload.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    user_id: UserId,
    email: String,
    expires_at: DateTime<Utc>,
    iat: i64,
    exp: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("token signing failed: {0}")]
    Signing(String),
}

/// Why a token was rejected. Never leaves this module: callers only see
/// `None`, so a forged token is indistinguishable from no token at all.
#[derive(Debug, PartialEq, Eq)]
enum VerifyFailure {
    Malformed,
    BadSignature,
    Expired,
}

/// Issues, verifies, and deletes the `auth-token` session cookie.
///
/// Stateless beyond the signing key: there is no session table, so a token
/// stays valid until its natural expiry.
pub struct SessionManager {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
    secure: bool,
}

impl SessionManager {
    /// `production` controls the cookie's `Secure` attribute.
    pub fn new(secret: &SecretString, production: bool) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = EXPIRY_LEEWAY_SECS;
        Self {
            encoding: EncodingKey::from_secret(secret.expose_secret().as_bytes()),
            decoding: DecodingKey::from_secret(secret.expose_secret().as_bytes()),
            validation,
            ttl: Duration::days(SESSION_TTL_DAYS),
            secure: production,
        }
    }

    /// Sign a session for `user_id` and store it in the jar. The raw token
    /// never leaves this method; the cookie store is the only transport.
    pub fn create_session(
        &self,
        jar: &dyn CookieStore,
        user_id: &UserId,
        email: &str,
    ) -> Result<(), AuthError> {
        let now = Utc::now();
        let expires_at = now + self.ttl;
        let claims = Claims {
            user_id: user_id.clone(),
            email: email.to_string(),
            expires_at,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::Signing(e.to_string()))?;
        jar.set(Cookie::session(AUTH_COOKIE, token, expires_at, self.secure));
        debug!(user_id = %user_id, "session issued");
        Ok(())
    }

    /// Current session, or `None` when the cookie is absent or fails
    /// verification for any reason.
    pub fn session(&self, jar: &dyn CookieStore) -> Option<Session> {
        let token = jar.get(AUTH_COOKIE)?;
        match self.verify(&token) {
            Ok(session) => Some(session),
            Err(reason) => {
                debug!(?reason, "session token rejected");
                None
            }
        }
    }

    /// Remove the session cookie. Idempotent.
    pub fn delete_session(&self, jar: &dyn CookieStore) {
        jar.remove(AUTH_COOKIE);
    }

    fn verify(&self, token: &str) -> Result<Session, VerifyFailure> {
        let data =
            decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
                match e.kind() {
                    ErrorKind::ExpiredSignature => VerifyFailure::Expired,
                    ErrorKind::InvalidSignature => VerifyFailure::BadSignature,
                    _ => VerifyFailure::Malformed,
                }
            })?;
        Ok(Session {
            user_id: data.claims.user_id,
            email: data.claims.email,
            expires_at: data.claims.expires_at,
        })
    }
}
