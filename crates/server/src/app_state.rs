use axum::http::StatusCode;
use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use inkpost_core::gravatar::GravatarOptions;
use sqlx::{Pool, Postgres, Sqlite};

use crate::errors::ServerError;

#[derive(Clone)]
pub struct AppState {
    pub sqlite: Option<Pool<Sqlite>>,
    pub postgres: Option<Pool<Postgres>>,
    pub token_ttl_seconds: u64,
    pub admin_user_id: i64,
    pub secure_cookies: bool,
    pub timezone: Option<Tz>,
    pub gravatar: GravatarOptions,
}

impl AppState {
    /// State over an already connected SQLite pool with default settings.
    pub fn with_sqlite(pool: Pool<Sqlite>) -> Self {
        Self {
            sqlite: Some(pool),
            postgres: None,
            token_ttl_seconds: 60 * 60 * 24 * 30,
            admin_user_id: 1,
            secure_cookies: false,
            timezone: None,
            gravatar: GravatarOptions::default(),
        }
    }

    pub fn sqlite_pool(&self) -> Result<&Pool<Sqlite>, ServerError> {
        self.sqlite
            .as_ref()
            .ok_or_else(|| ServerError::new(StatusCode::INTERNAL_SERVER_ERROR, "database pool missing"))
    }

    /// Calendar day in the configured timezone, UTC otherwise.
    pub fn today(&self) -> NaiveDate {
        let now = Utc::now();
        match self.timezone {
            Some(tz) => now.with_timezone(&tz).date_naive(),
            None => now.date_naive(),
        }
    }
}
