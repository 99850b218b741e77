//! Session tokens and session resolution.
//!
//! ARCHITECTURE
//! ============
//! A browser holds a long-lived session token in an HttpOnly cookie. Every
//! gated page resolves that token into a `gate::Session` snapshot through a
//! `SessionDirectory`, which is the server-side session provider.
//!
//! The admin role is a claim on the user row (`users.role`). Emails listed in
//! `ADMIN_EMAILS` are promoted at resolution time so operators can bootstrap
//! the first admin without touching the database.

use std::fmt::Write;

use gate::{Role, Session};
use rand::Rng;
use sqlx::{PgPool, Row};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

pub(crate) fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

/// Generate a cryptographically random 32-byte hex token.
#[must_use]
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    bytes_to_hex(&bytes)
}

/// Combine the stored role claim with the configured admin allowlist.
#[must_use]
pub fn resolve_role(stored: &str, email: Option<&str>, admin_emails: &[String]) -> Role {
    let listed = email.is_some_and(|e| {
        let e = e.trim().to_ascii_lowercase();
        admin_emails.iter().any(|a| *a == e)
    });
    if listed { Role::Admin } else { Role::parse(stored) }
}

/// Server-side session provider.
#[async_trait::async_trait]
pub trait SessionDirectory: Send + Sync {
    /// Resolve a token. `Ok(None)` means unknown or expired.
    async fn resolve(&self, token: &str) -> Result<Option<Session>, SessionError>;
}

/// `SessionDirectory` backed by the `sessions` and `users` tables.
pub struct PgSessionDirectory {
    pool: PgPool,
    admin_emails: Vec<String>,
}

impl PgSessionDirectory {
    #[must_use]
    pub fn new(pool: PgPool, admin_emails: Vec<String>) -> Self {
        Self { pool, admin_emails }
    }
}

#[async_trait::async_trait]
impl SessionDirectory for PgSessionDirectory {
    async fn resolve(&self, token: &str) -> Result<Option<Session>, SessionError> {
        let row = sqlx::query(
            r"SELECT u.id, u.email, u.role, u.onboarding, u.new_account
              FROM sessions s
              JOIN users u ON u.id = s.user_id
              WHERE s.token = $1 AND s.expires_at > now()",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| {
            let email: Option<String> = r.get("email");
            let role: String = r.get("role");
            let onboarding: Option<bool> = r.get("onboarding");
            let new_account: Option<bool> = r.get("new_account");

            Session::signed_in(r.get("id"))
                .with_profile(onboarding.unwrap_or(false), new_account.unwrap_or(false))
                .with_role(resolve_role(&role, email.as_deref(), &self.admin_emails))
        }))
    }
}

/// Create a session for the given user, returning the token.
pub async fn create_session(pool: &PgPool, user_id: Uuid) -> Result<String, sqlx::Error> {
    let token = generate_token();
    sqlx::query("INSERT INTO sessions (token, user_id) VALUES ($1, $2)")
        .bind(&token)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(token)
}

/// Delete a session by token.
pub async fn delete_session(pool: &PgPool, token: &str) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM sessions WHERE token = $1")
        .bind(token)
        .execute(pool)
        .await?;
    Ok(())
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
