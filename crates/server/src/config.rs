use std::path::{
  Path,
  PathBuf
};

use chrono_tz::Tz;
use inkpost_core::gravatar::GravatarOptions;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]

pub enum ConfigError {
  #[error("config IO error: {0}")]
  Io(#[from] std::io::Error),
  #[error("config parse error: {0}")]
  Parse(#[from] toml::de::Error),
  #[error("config invalid: {0}")]
  Invalid(String)
}

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Deserialize,
)]
#[serde(rename_all = "lowercase")]

pub enum AppMode {
  Dev,
  Prod
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]

pub enum SqlDialect {
  Sqlite,
  Postgres
}

#[derive(Debug, Deserialize)]

pub struct ServerConfig {
  pub app:          AppConfig,
  pub http:         HttpConfig,
  pub database:     DatabaseConfig,
  pub sqlite:       SqliteConfig,
  pub postgres:     Option<PostgresConfig>,
  pub logging:      LoggingConfig,
  pub auth:         AuthConfig,
  pub dev:          DevConfig,
  pub seed:         Option<SeedConfig>,
  #[serde(default)]
  pub gravatar:     GravatarOptions,
  /// Set from `DATABASE_URL`; wins
  /// over the dialect sections.
  #[serde(skip)]
  pub database_url: Option<String>
}

#[derive(Debug, Deserialize)]

pub struct AppConfig {
  pub mode:     AppMode,
  pub timezone: Option<String>
}

#[derive(Debug, Deserialize)]

pub struct HttpConfig {
  pub host: String,
  pub port: u16
}

#[derive(Debug, Deserialize)]

pub struct DatabaseConfig {
  pub dialect: String
}

#[derive(Debug, Deserialize)]

pub struct SqliteConfig {
  pub path: String
}

#[derive(Debug, Deserialize)]

pub struct PostgresConfig {
  pub host:     String,
  pub port:     u16,
  pub database: String,
  pub user:     String,
  pub password: String,
  pub ssl_mode: String,
  pub schema:   String
}

#[derive(Debug, Deserialize)]

pub struct LoggingConfig {
  pub level: Option<String>
}

#[derive(Debug, Deserialize)]

pub struct AuthConfig {
  pub token_ttl_seconds: u64,
  #[serde(default = "default_admin_user_id")]
  pub admin_user_id:     i64,
  #[serde(default)]
  pub secure_cookies:    bool
}

#[derive(Debug, Deserialize)]

pub struct DevConfig {
  pub reset_on_start: bool
}

#[derive(Debug, Deserialize)]

pub struct SeedConfig {
  pub email:    String,
  pub name:     String,
  pub password: String
}

fn default_admin_user_id() -> i64 {
  1
}

impl ServerConfig {
  pub async fn load(
    path: &Path
  ) -> Result<Self, ConfigError> {
    let base_dir = path
      .parent()
      .ok_or_else(|| {
        ConfigError::Invalid(
          "config path has no parent"
            .into()
        )
      })?;

    let schema_path = base_dir
      .join("schemas")
      .join("server.schema.json");

    let schema =
      load_schema(&schema_path).await?;

    let content =
      tokio::fs::read_to_string(path)
        .await?;

    let mut config = Self::parse(
      &schema,
      &content,
      &path.display().to_string()
    )?;

    config.apply_env_overrides(
      std::env::var("DATABASE_URL")
        .ok(),
      std::env::var("PORT").ok()
    )?;

    Ok(config)
  }

  /// Validate against the JSON schema,
  /// then deserialize.
  pub fn parse(
    schema: &str,
    content: &str,
    name: &str
  ) -> Result<Self, ConfigError> {
    validate_toml(
      schema, content, name
    )?;

    let config: ServerConfig =
      toml::from_str(content)?;

    config.dialect()?;
    config.timezone()?;

    Ok(config)
  }

  pub fn apply_env_overrides(
    &mut self,
    database_url: Option<String>,
    port: Option<String>
  ) -> Result<(), ConfigError> {
    if let Some(url) = database_url
      .map(|u| u.trim().to_string())
      .filter(|u| !u.is_empty())
    {
      dialect_from_url(&url)?;
      self.database_url = Some(url);
    }

    if let Some(raw) = port
      .map(|p| p.trim().to_string())
      .filter(|p| !p.is_empty())
    {
      self.http.port =
        raw.parse().map_err(|_| {
          ConfigError::Invalid(format!(
            "invalid PORT '{raw}'"
          ))
        })?;
    }

    Ok(())
  }

  pub fn dialect(
    &self
  ) -> Result<SqlDialect, ConfigError>
  {
    if let Some(url) =
      self.database_url.as_deref()
    {
      return dialect_from_url(url);
    }

    match self
      .database
      .dialect
      .trim()
      .to_lowercase()
      .as_str()
    {
      | "sqlite" => {
        Ok(SqlDialect::Sqlite)
      }
      | "postgres" => {
        Ok(SqlDialect::Postgres)
      }
      | other => {
        Err(ConfigError::Invalid(
          format!(
            "invalid database.dialect \
             '{other}'"
          )
        ))
      }
    }
  }

  pub fn sqlite_path(
    &self,
    base_dir: &Path
  ) -> PathBuf {
    let raw = self.sqlite.path.trim();

    if raw.is_empty() {
      return base_dir
        .join("blog.sqlite");
    }

    base_dir.join(raw)
  }

  pub fn sqlite_url(
    &self,
    base_dir: &Path
  ) -> String {
    if let Some(url) =
      self.database_url.as_deref()
    {
      return url.to_string();
    }

    format!(
      "sqlite://{}",
      self.sqlite_path(base_dir).display()
    )
  }

  pub fn postgres_url(
    &self
  ) -> Result<String, ConfigError> {
    if let Some(url) =
      self.database_url.as_deref()
    {
      return Ok(url.to_string());
    }

    let pg =
      self.postgres.as_ref().ok_or_else(
        || {
          ConfigError::Invalid(
            "postgres section missing"
              .into()
          )
        }
      )?;

    Ok(format!(
      "postgres://{}:{}@{}:{}/{}?\
       sslmode={}",
      pg.user,
      pg.password,
      pg.host,
      pg.port,
      pg.database,
      pg.ssl_mode
    ))
  }

  /// Schema used for the blog tables;
  /// `public` when only `DATABASE_URL`
  /// is given.
  pub fn postgres_schema(
    &self
  ) -> Result<String, ConfigError> {
    match self.postgres.as_ref() {
      | Some(pg) => {
        validate_schema_name(&pg.schema)
      }
      | None => Ok("public".into())
    }
  }

  pub fn timezone(
    &self
  ) -> Result<Option<Tz>, ConfigError>
  {
    let Some(raw) = self
      .app
      .timezone
      .as_deref()
      .map(str::trim)
      .filter(|t| !t.is_empty())
    else {
      return Ok(None);
    };

    raw.parse::<Tz>().map(Some).map_err(
      |e| {
        ConfigError::Invalid(format!(
          "invalid app.timezone \
           '{raw}': {e}"
        ))
      }
    )
  }
}

fn dialect_from_url(
  url: &str
) -> Result<SqlDialect, ConfigError> {
  if url.starts_with("sqlite:") {
    return Ok(SqlDialect::Sqlite);
  }

  if url.starts_with("postgres://")
    || url.starts_with("postgresql://")
  {
    return Ok(SqlDialect::Postgres);
  }

  Err(ConfigError::Invalid(
    "DATABASE_URL must start with \
     sqlite: or postgres://"
      .into()
  ))
}

async fn load_schema(
  path: &Path
) -> Result<String, ConfigError> {
  let content =
    tokio::fs::read_to_string(path)
      .await
      .map_err(|_| {
        ConfigError::Invalid(format!(
          "schema not found at {}",
          path.display()
        ))
      })?;

  Ok(content)
}

fn validate_toml(
  schema: &str,
  toml_input: &str,
  name: &str
) -> Result<(), ConfigError> {
  let schema_json: serde_json::Value =
    serde_json::from_str(schema)
      .map_err(|e| {
        ConfigError::Invalid(format!(
          "schema parse error: {e}"
        ))
      })?;

  let compiled =
    jsonschema::validator_for(
      &schema_json
    )
    .map_err(|e| {
      ConfigError::Invalid(format!(
        "schema compile error: {e}"
      ))
    })?;

  let toml_value: toml::Value =
    toml::from_str(toml_input)
      .map_err(|e| {
        ConfigError::Invalid(format!(
          "{name}: {e}"
        ))
      })?;

  let json_value =
    serde_json::to_value(toml_value)
      .map_err(|e| {
        ConfigError::Invalid(
          e.to_string()
        )
      })?;

  let mut errors =
    compiled.iter_errors(&json_value);

  if let Some(err) = errors.next() {
    let mut messages =
      vec![err.to_string()];

    for e in errors.take(4) {
      messages.push(e.to_string());
    }

    return Err(ConfigError::Invalid(
      format!(
        "schema validation failed for \
         {name}: {}",
        messages.join("; ")
      )
    ));
  }

  Ok(())
}

pub(crate) fn validate_schema_name(
  raw: &str
) -> Result<String, ConfigError> {
  let trimmed = raw.trim();

  if trimmed.is_empty() {
    return Err(ConfigError::Invalid(
      "postgres schema cannot be empty"
        .into()
    ));
  }

  if !trimmed.chars().all(|c| {
    c.is_ascii_alphanumeric()
      || c == '_'
  }) {
    return Err(ConfigError::Invalid(
      format!(
        "invalid postgres schema \
         '{trimmed}': only \
         alphanumeric and '_' allowed"
      )
    ));
  }

  Ok(trimmed.to_string())
}
