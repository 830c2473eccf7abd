use sqlx::{Pool, Postgres, Sqlite};

use crate::app_state::AppState;
use crate::config::{ConfigError, ServerConfig, SqlDialect};
use crate::db::quote_ident;

pub const SQLITE_SCHEMA: &str = include_str!("../res/sql/sqlite/schema.sql");
pub const POSTGRES_SCHEMA: &str = include_str!("../res/sql/postgres/schema.sql");

pub async fn apply_server_schema(
    config: &ServerConfig,
    state: &AppState,
) -> Result<(), ConfigError> {
    match config.dialect()? {
        SqlDialect::Sqlite => {
            let pool = state
                .sqlite
                .as_ref()
                .ok_or_else(|| ConfigError::Invalid("sqlite pool missing".into()))?;
            execute_schema_sqlite(pool, SQLITE_SCHEMA).await?;
        }
        SqlDialect::Postgres => {
            let pool = state
                .postgres
                .as_ref()
                .ok_or_else(|| ConfigError::Invalid("postgres pool missing".into()))?;
            let schema = config.postgres_schema()?;
            execute_schema_postgres(pool, POSTGRES_SCHEMA, &schema).await?;
        }
    }
    tracing::info!("server schema applied");
    Ok(())
}

pub async fn execute_schema_sqlite(pool: &Pool<Sqlite>, content: &str) -> Result<(), ConfigError> {
    for stmt in content.split(';') {
        let trimmed = stmt.trim();
        if trimmed.is_empty() {
            continue;
        }
        sqlx::query(trimmed)
            .execute(pool)
            .await
            .map_err(|e| ConfigError::Invalid(format!("schema apply error: {e}")))?;
    }
    Ok(())
}

async fn execute_schema_postgres(
    pool: &Pool<Postgres>,
    content: &str,
    schema: &str,
) -> Result<(), ConfigError> {
    let mut conn = pool
        .acquire()
        .await
        .map_err(|e| ConfigError::Invalid(format!("schema apply error: {e}")))?;
    let search_stmt = format!("SET search_path TO {}", quote_ident(schema));
    sqlx::query(&search_stmt)
        .execute(&mut *conn)
        .await
        .map_err(|e| ConfigError::Invalid(format!("schema apply error: {e}")))?;

    for stmt in content.split(';') {
        let trimmed = stmt.trim();
        if trimmed.is_empty() {
            continue;
        }
        sqlx::query(trimmed)
            .execute(&mut *conn)
            .await
            .map_err(|e| ConfigError::Invalid(format!("schema apply error: {e}")))?;
    }
    Ok(())
}
