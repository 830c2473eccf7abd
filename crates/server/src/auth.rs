use argon2::{
    password_hash::{rand_core::OsRng, rand_core::RngCore, SaltString},
    Argon2,
    PasswordHash,
    PasswordHasher,
    PasswordVerifier,
};
use axum::http::StatusCode;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use inkpost_core::domain::{post_management_access, Access, SessionUser};
use sha2::{Digest, Sha256};
use sqlx::{Executor, Postgres, Sqlite};

use crate::app_state::AppState;
use crate::errors::{db_error, ServerError};

pub const SESSION_COOKIE: &str = "session";

/// Resolve the session cookie to a user. Missing, unknown and expired
/// tokens all mean anonymous.
pub async fn session_user(
    state: &AppState,
    jar: &CookieJar,
) -> Result<Option<SessionUser>, ServerError> {
    let Some(token) = session_token(jar) else {
        return Ok(None);
    };
    let token_hash = hash_token(&token);

    let row = if let Some(pool) = &state.postgres {
        sqlx::query_as::<_, (i64, String, String)>(
            "SELECT u.id, u.email, u.name FROM user_tokens t JOIN users u ON u.id = t.user_id WHERE t.token_hash = $1 AND t.expires_at > NOW()",
        )
        .bind(&token_hash)
        .fetch_optional(pool)
        .await
        .map_err(db_error)?
    } else {
        let pool = state.sqlite_pool()?;
        sqlx::query_as::<_, (i64, String, String)>(
            "SELECT u.id, u.email, u.name FROM user_tokens t JOIN users u ON u.id = t.user_id WHERE t.token_hash = ?1 AND t.expires_at > datetime('now')",
        )
        .bind(&token_hash)
        .fetch_optional(pool)
        .await
        .map_err(db_error)?
    };

    Ok(row.map(|(id, email, name)| SessionUser { id, email, name }))
}

/// The current user when they manage posts; 401 for anonymous visitors,
/// 403 for everyone else.
pub async fn require_admin(state: &AppState, jar: &CookieJar) -> Result<SessionUser, ServerError> {
    let viewer = session_user(state, jar).await?;
    match (post_management_access(viewer.as_ref(), state.admin_user_id), viewer) {
        (Access::Allowed, Some(user)) => Ok(user),
        (Access::Forbidden, _) => Err(ServerError::new(
            StatusCode::FORBIDDEN,
            "Only the blog administrator can do that.",
        )),
        _ => Err(ServerError::new(
            StatusCode::UNAUTHORIZED,
            "Please log in to continue.",
        )),
    }
}

/// A freshly minted token; only its hash reaches the database.
pub struct NewSession {
    token: String,
    token_hash: String,
    ttl_seconds: i64,
}

impl NewSession {
    pub fn mint(state: &AppState) -> Result<Self, ServerError> {
        let ttl_seconds = i64::try_from(state.token_ttl_seconds)
            .map_err(|_| ServerError::internal("auth.token_ttl_seconds out of range"))?;
        let token = generate_token();
        let token_hash = hash_token(&token);
        Ok(Self {
            token,
            token_hash,
            ttl_seconds,
        })
    }

    pub async fn store_postgres<'e, E>(&self, executor: E, user_id: i64) -> Result<(), sqlx::Error>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            "INSERT INTO user_tokens (user_id, token_hash, expires_at, created_at) VALUES ($1, $2, NOW() + $3 * INTERVAL '1 second', NOW())",
        )
        .bind(user_id)
        .bind(&self.token_hash)
        .bind(self.ttl_seconds)
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn store_sqlite<'e, E>(&self, executor: E, user_id: i64) -> Result<(), sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query(
            "INSERT INTO user_tokens (user_id, token_hash, expires_at, created_at) VALUES (?1, ?2, datetime('now', '+' || ?3 || ' seconds'), datetime('now'))",
        )
        .bind(user_id)
        .bind(&self.token_hash)
        .bind(self.ttl_seconds)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Hand the token to the browser.
    pub fn into_cookie(self, state: &AppState) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, self.token))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(state.secure_cookies)
            .max_age(time::Duration::seconds(self.ttl_seconds))
            .build()
    }
}

pub async fn start_session(
    state: &AppState,
    jar: CookieJar,
    user_id: i64,
) -> Result<CookieJar, ServerError> {
    let session = NewSession::mint(state)?;

    if let Some(pool) = &state.postgres {
        session.store_postgres(pool, user_id).await.map_err(db_error)?;
    } else {
        let pool = state.sqlite_pool()?;
        session.store_sqlite(pool, user_id).await.map_err(db_error)?;
    }

    tracing::info!(user_id, "session started");
    Ok(jar.add(session.into_cookie(state)))
}

pub async fn end_session(state: &AppState, jar: CookieJar) -> Result<CookieJar, ServerError> {
    if let Some(token) = session_token(&jar) {
        let token_hash = hash_token(&token);

        if let Some(pool) = &state.postgres {
            sqlx::query("DELETE FROM user_tokens WHERE token_hash = $1")
                .bind(&token_hash)
                .execute(pool)
                .await
                .map_err(db_error)?;
        } else {
            let pool = state.sqlite_pool()?;
            sqlx::query("DELETE FROM user_tokens WHERE token_hash = ?1")
                .bind(&token_hash)
                .execute(pool)
                .await
                .map_err(db_error)?;
        }
    }

    Ok(jar.remove(Cookie::build(SESSION_COOKIE).path("/")))
}

fn session_token(jar: &CookieJar) -> Option<String> {
    jar.get(SESSION_COOKIE)
        .map(|c| c.value().trim().to_string())
        .filter(|t| !t.is_empty())
}

pub fn hash_password(password: &str) -> Result<String, String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| format!("password hash error: {e}"))?
        .to_string();
    Ok(hash)
}

pub fn verify_password(hash: &str, password: &str) -> Result<(), String> {
    let parsed = PasswordHash::new(hash).map_err(|e| format!("password hash parse error: {e}"))?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|e| format!("password verify error: {e}"))
}

pub fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_round_trips() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password(&hash, "correct horse").is_ok());
        assert!(verify_password(&hash, "wrong horse").is_err());
    }

    #[test]
    fn tokens_are_random_and_hashed() {
        let a = generate_token();
        let b = generate_token();
        assert_eq!(a.len(), 64);
        assert_ne!(a, b);
        assert_eq!(hash_token(&a), hash_token(&a));
        assert_ne!(hash_token(&a), a);
    }
}
