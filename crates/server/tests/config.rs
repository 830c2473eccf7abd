use chrono_tz::Tz;
use inkpost_server::config::{AppMode, ConfigError, ServerConfig, SqlDialect};

const SCHEMA: &str = include_str!("../res/schemas/server.schema.json");
const SHIPPED: &str = include_str!("../res/config.toml");

fn parse(content: &str) -> Result<ServerConfig, ConfigError> {
    ServerConfig::parse(SCHEMA, content, "test.toml")
}

#[test]
fn shipped_config_is_valid() {
    let config = parse(SHIPPED).unwrap();

    assert_eq!(config.app.mode, AppMode::Dev);
    assert_eq!(config.http.port, 5000);
    assert_eq!(config.dialect().unwrap(), SqlDialect::Sqlite);
    assert_eq!(config.auth.admin_user_id, 1);
    assert!(!config.auth.secure_cookies);
    assert!(config.seed.is_none());
    assert_eq!(config.gravatar.size, 100);
    assert_eq!(config.timezone().unwrap(), Some(Tz::UTC));
    assert_eq!(config.postgres_schema().unwrap(), "public");
}

#[test]
fn unknown_keys_fail_schema_validation() {
    let content = SHIPPED.replace("port = 5000", "port = 5000\nworkers = 4");
    let err = parse(&content).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(ref msg) if msg.contains("schema validation failed")));
}

#[test]
fn port_out_of_range_fails_schema_validation() {
    let content = SHIPPED.replace("port = 5000", "port = 70000");
    assert!(matches!(parse(&content), Err(ConfigError::Invalid(_))));
}

#[test]
fn unknown_timezone_is_rejected() {
    let content = SHIPPED.replace(r#"timezone = "UTC""#, r#"timezone = "Mars/Olympus""#);
    let err = parse(&content).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(ref msg) if msg.contains("app.timezone")));
}

#[test]
fn seed_section_is_read() {
    let content = format!(
        "{SHIPPED}\n[seed]\nemail = \"admin@example.com\"\nname = \"Admin\"\npassword = \"change-me\"\n"
    );
    let config = parse(&content).unwrap();
    let seed = config.seed.unwrap();
    assert_eq!(seed.email, "admin@example.com");
    assert_eq!(seed.name, "Admin");
}

#[test]
fn environment_overrides_win() {
    let mut config = parse(SHIPPED).unwrap();

    config
        .apply_env_overrides(Some("postgres://blog:pw@db:5432/blog".into()), Some(" 8080 ".into()))
        .unwrap();
    assert_eq!(config.http.port, 8080);
    assert_eq!(config.dialect().unwrap(), SqlDialect::Postgres);
    assert_eq!(config.postgres_url().unwrap(), "postgres://blog:pw@db:5432/blog");

    let mut config = parse(SHIPPED).unwrap();
    config
        .apply_env_overrides(Some("sqlite::memory:".into()), None)
        .unwrap();
    assert_eq!(config.dialect().unwrap(), SqlDialect::Sqlite);
    assert_eq!(config.sqlite_url(std::path::Path::new(".")), "sqlite::memory:");
}

#[test]
fn blank_overrides_are_ignored_and_bad_ones_rejected() {
    let mut config = parse(SHIPPED).unwrap();
    config
        .apply_env_overrides(Some("   ".into()), Some(String::new()))
        .unwrap();
    assert_eq!(config.http.port, 5000);
    assert!(config.database_url.is_none());

    assert!(config.apply_env_overrides(None, Some("http".into())).is_err());
    assert!(config
        .apply_env_overrides(Some("mysql://localhost/blog".into()), None)
        .is_err());
    assert!(config.database_url.is_none());
    assert_eq!(config.dialect().unwrap(), SqlDialect::Sqlite);
}

#[test]
fn session_lifetime_is_capped_at_ten_years() {
    let content = SHIPPED.replace("token_ttl_seconds = 2592000", "token_ttl_seconds = 400000000000");
    let err = parse(&content).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(ref msg) if msg.contains("schema validation failed")));

    let content = SHIPPED.replace("token_ttl_seconds = 2592000", "token_ttl_seconds = 315360000");
    assert_eq!(parse(&content).unwrap().auth.token_ttl_seconds, 315_360_000);
}
