use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use atelier_core::ids::UserId;

use crate::database::Database;
use crate::error::StoreError;
use crate::row_helpers;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserRow {
    pub id: UserId,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: String,
}

pub struct UserRepo {
    db: Database,
}

impl UserRepo {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Create a user with an Argon2id-hashed password.
    /// A duplicate email is a Conflict error.
    #[instrument(skip(self, password))]
    pub fn create(&self, email: &str, password: &str) -> Result<UserRow, StoreError> {
        let email = normalize_email(email);
        let password_hash = hash_password(password)?;
        let id = UserId::new();
        let now = Utc::now().to_rfc3339();

        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, email, password_hash, created_at) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![id.as_str(), email, password_hash, now],
            )
            .map_err(|e| match e {
                rusqlite::Error::SqliteFailure(f, _)
                    if f.code == rusqlite::ErrorCode::ConstraintViolation =>
                {
                    StoreError::Conflict(format!("user {email} already exists"))
                }
                other => other.into(),
            })?;

            Ok(UserRow {
                id: id.clone(),
                email: email.clone(),
                password_hash: password_hash.clone(),
                created_at: now.clone(),
            })
        })
    }

    /// Check an email/password pair. Unknown email and wrong password are
    /// indistinguishable: both yield `Ok(None)`.
    #[instrument(skip(self, password))]
    pub fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<UserRow>, StoreError> {
        let email = normalize_email(email);
        let user = self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, email, password_hash, created_at FROM users WHERE email = ?1",
            )?;
            let mut rows = stmt.query([email.as_str()])?;
            match rows.next()? {
                Some(row) => Ok(Some(row_to_user(row)?)),
                None => Ok(None),
            }
        })?;

        match user {
            Some(user) if verify_password(&user.password_hash, password) => Ok(Some(user)),
            _ => Ok(None),
        }
    }

    /// Get a user by ID.
    #[instrument(skip(self), fields(user_id = %id))]
    pub fn get(&self, id: &UserId) -> Result<UserRow, StoreError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, email, password_hash, created_at FROM users WHERE id = ?1",
            )?;
            let mut rows = stmt.query([id.as_str()])?;
            match rows.next()? {
                Some(row) => row_to_user(row),
                None => Err(StoreError::NotFound(format!("user {id}"))),
            }
        })
    }
}

fn row_to_user(row: &rusqlite::Row<'_>) -> Result<UserRow, StoreError> {
    Ok(UserRow {
        id: UserId::from_raw(row_helpers::get::<String>(row, 0, "users", "id")?),
        email: row_helpers::get(row, 1, "users", "email")?,
        password_hash: row_helpers::get(row, 2, "users", "password_hash")?,
        created_at: row_helpers::get(row, 3, "users", "created_at")?,
    })
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn hash_password(password: &str) -> Result<String, StoreError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|phc| phc.to_string())
        .map_err(|e| StoreError::PasswordHash(e.to_string()))
}

fn verify_password(hash: &str, password: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo() -> UserRepo {
        UserRepo::new(Database::in_memory().unwrap())
    }

    #[test]
    fn create_user() {
        let repo = repo();
        let user = repo.create("test@example.com", "password123").unwrap();
        assert!(user.id.as_str().starts_with("user_"));
        assert_eq!(user.email, "test@example.com");
        assert!(user.password_hash.starts_with("$argon2"));
    }

    #[test]
    fn email_is_normalized() {
        let repo = repo();
        let user = repo.create("  Mixed.Case@Example.COM ", "pw").unwrap();
        assert_eq!(user.email, "mixed.case@example.com");

        let found = repo.verify_credentials("mixed.case@example.com", "pw").unwrap();
        assert!(found.is_some());
    }

    #[test]
    fn duplicate_email_is_conflict() {
        let repo = repo();
        repo.create("dup@example.com", "first").unwrap();
        let result = repo.create("DUP@example.com", "second");
        assert!(matches!(result, Err(StoreError::Conflict(_))));
    }

    #[test]
    fn verify_correct_password() {
        let repo = repo();
        let created = repo.create("login@example.com", "hunter2hunter2").unwrap();
        let verified = repo
            .verify_credentials("login@example.com", "hunter2hunter2")
            .unwrap()
            .expect("credentials accepted");
        assert_eq!(verified.id, created.id);
    }

    #[test]
    fn wrong_password_and_unknown_email_look_alike() {
        let repo = repo();
        repo.create("known@example.com", "rightpassword").unwrap();

        let wrong_pw = repo.verify_credentials("known@example.com", "wrongpassword").unwrap();
        let unknown = repo.verify_credentials("nobody@example.com", "rightpassword").unwrap();
        assert!(wrong_pw.is_none());
        assert!(unknown.is_none());
    }

    #[test]
    fn get_by_id() {
        let repo = repo();
        let created = repo.create("byid@example.com", "pw").unwrap();
        let fetched = repo.get(&created.id).unwrap();
        assert_eq!(fetched.email, "byid@example.com");
    }

    #[test]
    fn get_nonexistent_fails() {
        let repo = repo();
        let result = repo.get(&UserId::from_raw("user_nonexistent"));
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash_password("same-password").unwrap();
        let b = hash_password("same-password").unwrap();
        assert_ne!(a, b);
        assert!(verify_password(&a, "same-password"));
        assert!(verify_password(&b, "same-password"));
    }

    #[test]
    fn verify_rejects_garbage_hash() {
        assert!(!verify_password("not-a-phc-string", "anything"));
    }
}
