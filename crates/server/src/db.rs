use std::path::Path;
use std::str::FromStr;

use sqlx::postgres::PgPoolOptions;
use sqlx::sqlite::{
  SqliteConnectOptions,
  SqlitePoolOptions
};

use crate::app_state::AppState;
use crate::auth::hash_password;
use crate::config::{
  ConfigError,
  ServerConfig,
  SqlDialect,
  SeedConfig
};

pub async fn connect_db(
  config: &ServerConfig,
  config_path: &Path
) -> Result<AppState, ConfigError> {
  let (sqlite, postgres) = match config
    .dialect()?
  {
    | SqlDialect::Sqlite => {
      let base_dir = config_path
        .parent()
        .ok_or_else(|| {
          ConfigError::Invalid(
            "config path has no parent"
              .into()
          )
        })?;

      let url =
        config.sqlite_url(base_dir);

      let options =
        SqliteConnectOptions::from_str(
          &url
        )
        .map_err(|e| {
          ConfigError::Invalid(format!(
            "invalid sqlite url: {e}"
          ))
        })?
        .create_if_missing(true)
        .foreign_keys(true);

      let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .map_err(|e| {
          ConfigError::Invalid(format!(
            "sqlite connect failed: {e}"
          ))
        })?;

      tracing::info!(
        url = %url,
        "sqlite pool ready"
      );

      (Some(pool), None)
    }
    | SqlDialect::Postgres => {
      let schema =
        config.postgres_schema()?;

      let url = config.postgres_url()?;

      let pool = PgPoolOptions::new()
        .max_connections(10)
        .after_connect(set_search_path(
          schema.clone()
        ))
        .connect(&url)
        .await
        .map_err(|e| {
          ConfigError::Invalid(format!(
            "postgres connect failed: \
             {e}"
          ))
        })?;

      tracing::info!(
        schema = %schema,
        "postgres pool ready"
      );

      (None, Some(pool))
    }
  };

  Ok(AppState {
    sqlite,
    postgres,
    token_ttl_seconds: config
      .auth
      .token_ttl_seconds,
    admin_user_id: config
      .auth
      .admin_user_id,
    secure_cookies: config
      .auth
      .secure_cookies,
    timezone: config.timezone()?,
    gravatar: config.gravatar.clone()
  })
}

pub async fn reset_server_data(
  config: &ServerConfig,
  state: &AppState
) -> Result<(), ConfigError> {
  let tables = [
    "user_tokens",
    "comments",
    "blog_posts",
    "users"
  ];

  match config.dialect()? {
    | SqlDialect::Sqlite => {
      let pool = state
        .sqlite
        .as_ref()
        .ok_or_else(|| {
          ConfigError::Invalid(
            "sqlite pool missing"
              .into()
          )
        })?;

      for table in tables {
        let query = format!(
          "DELETE FROM {table}"
        );

        sqlx::query(&query)
          .execute(pool)
          .await
          .map_err(|e| {
            ConfigError::Invalid(
              format!(
                "cleanup {table} \
                 failed: {e}"
              )
            )
          })?;
      }

      // Restart ids so the first
      // account is the admin again.
      sqlx::query(
        "DELETE FROM sqlite_sequence"
      )
      .execute(pool)
      .await
      .map_err(|e| {
        ConfigError::Invalid(format!(
          "cleanup sqlite_sequence \
           failed: {e}"
        ))
      })?;
    }
    | SqlDialect::Postgres => {
      let pool = state
        .postgres
        .as_ref()
        .ok_or_else(|| {
          ConfigError::Invalid(
            "postgres pool missing"
              .into()
          )
        })?;

      let schema =
        config.postgres_schema()?;

      let table_list = tables
        .iter()
        .map(|t| {
          format!(
            "{}.{}",
            quote_ident(&schema),
            quote_ident(t)
          )
        })
        .collect::<Vec<_>>()
        .join(", ");

      let stmt = format!(
        "TRUNCATE TABLE {table_list} \
         RESTART IDENTITY CASCADE"
      );

      if let Err(e) = sqlx::query(&stmt)
        .execute(pool)
        .await
        && !is_missing_table_error(&e)
      {
        return Err(
          ConfigError::Invalid(
            format!(
              "cleanup failed: {e}"
            )
          )
        );
      }
    }
  }

  tracing::warn!("server data reset");

  Ok(())
}

#[allow(clippy::type_complexity)]
pub fn set_search_path(
  schema: String
) -> impl Fn(
  &mut sqlx::PgConnection,
  sqlx::pool::PoolConnectionMetadata
) -> std::pin::Pin<
  Box<
    dyn std::future::Future<
        Output = Result<
          (),
          sqlx::Error
        >
      > + Send
      + '_
  >
> {
  let schema_name = schema;

  move |conn, _meta| {
    let schema_copy =
      schema_name.clone();

    Box::pin(async move {
      let schema_ident =
        quote_ident(&schema_copy);

      let create_stmt = format!(
        "CREATE SCHEMA IF NOT EXISTS \
         {schema_ident}"
      );

      sqlx::query(&create_stmt)
        .execute(&mut *conn)
        .await?;

      let search_stmt = format!(
        "SET search_path TO \
         {schema_ident}"
      );

      sqlx::query(&search_stmt)
        .execute(&mut *conn)
        .await?;

      Ok(())
    })
  }
}

fn is_missing_table_error(
  e: &sqlx::Error
) -> bool {
  matches!(
      e,
      sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("42P01")
  )
}

pub fn quote_ident(
  name: &str
) -> String {
  format!(
    "\"{}\"",
    name.replace('"', "\"\"")
  )
}

/// Register the configured seed account
/// unless its email already exists.
pub async fn ensure_default_user(
  state: &AppState,
  seed: &SeedConfig
) -> Result<(), ConfigError> {
  let email = seed.email.trim();
  let name = seed.name.trim();

  let password_hash = hash_password(
    &seed.password
  )
  .map_err(|e| {
    ConfigError::Invalid(format!(
      "hash password: {e}"
    ))
  })?;

  let rows = if let Some(pool) =
    &state.postgres
  {
    sqlx::query(
      "INSERT INTO users (email, \
       password_hash, name, \
       created_at) VALUES ($1, $2, \
       $3, NOW()) ON CONFLICT (email) \
       DO NOTHING"
    )
    .bind(email)
    .bind(password_hash)
    .bind(name)
    .execute(pool)
    .await
    .map_err(|e| {
      ConfigError::Invalid(format!(
        "default user insert \
         failed: {e}"
      ))
    })?
    .rows_affected()
  } else {
    let pool = state
      .sqlite
      .as_ref()
      .ok_or_else(|| {
        ConfigError::Invalid(
          "sqlite pool missing".into()
        )
      })?;

    sqlx::query(
      "INSERT OR IGNORE INTO users \
       (email, password_hash, name, \
       created_at) VALUES (?1, ?2, \
       ?3, datetime('now'))"
    )
    .bind(email)
    .bind(password_hash)
    .bind(name)
    .execute(pool)
    .await
    .map_err(|e| {
      ConfigError::Invalid(format!(
        "default user insert \
         failed: {e}"
      ))
    })?
    .rows_affected()
  };

  if rows > 0 {
    tracing::info!(
      email,
      "default user created"
    );
  }

  Ok(())
}
