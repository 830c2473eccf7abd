#![allow(dead_code)]

use std::collections::BTreeMap;

use axum::body::Body;
use axum::http::header::{COOKIE, LOCATION, SET_COOKIE};
use axum::http::{Request, StatusCode};
use axum::Router;
use inkpost_server::app_state::AppState;
use inkpost_server::config::ServerConfig;
use inkpost_server::handlers::router;
use inkpost_server::schema::{execute_schema_sqlite, SQLITE_SCHEMA};
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;

pub async fn test_state() -> AppState {
    // One connection keeps every query on the same in-memory database.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    execute_schema_sqlite(&pool, SQLITE_SCHEMA).await.unwrap();
    AppState::with_sqlite(pool)
}

/// The shipped config, which selects SQLite.
pub fn shipped_config() -> ServerConfig {
    ServerConfig::parse(
        include_str!("../../res/schemas/server.schema.json"),
        include_str!("../../res/config.toml"),
        "config.toml",
    )
    .unwrap()
}

pub async fn count(state: &AppState, table: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(state.sqlite.as_ref().unwrap())
        .await
        .unwrap()
}

pub struct Reply {
    pub status: StatusCode,
    pub location: Option<String>,
    pub set_cookies: Vec<String>,
    pub body: String,
}

impl Reply {
    /// The raw `Set-Cookie` header for `name`, attributes included.
    pub fn set_cookie(&self, name: &str) -> Option<&str> {
        let prefix = format!("{name}=");
        self.set_cookies
            .iter()
            .find(|c| c.starts_with(&prefix))
            .map(String::as_str)
    }
}

/// A cookie-keeping client driving the router in-process.
pub struct Browser {
    app: Router,
    cookies: BTreeMap<String, String>,
}

impl Browser {
    pub fn new(state: &AppState) -> Self {
        Self {
            app: router(state.clone()),
            cookies: BTreeMap::new(),
        }
    }

    pub fn has_cookie(&self, name: &str) -> bool {
        self.cookies.contains_key(name)
    }

    pub async fn get(&mut self, uri: &str) -> Reply {
        let request = self.request("GET", uri).body(Body::empty()).unwrap();
        self.send(request).await
    }

    pub async fn post(&mut self, uri: &str, fields: &[(&str, &str)]) -> Reply {
        let body = fields
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        let request = self
            .request("POST", uri)
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    pub async fn post_raw(&mut self, uri: &str, content_type: &str, body: &str) -> Reply {
        let request = self
            .request("POST", uri)
            .header("content-type", content_type)
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    pub async fn register(&mut self, email: &str, password: &str, name: &str) -> Reply {
        self.post(
            "/register",
            &[("email", email), ("password", password), ("name", name)],
        )
        .await
    }

    pub async fn login(&mut self, email: &str, password: &str) -> Reply {
        self.post("/login", &[("email", email), ("password", password)])
            .await
    }

    fn request(&self, method: &str, uri: &str) -> axum::http::request::Builder {
        let mut builder = Request::builder().method(method).uri(uri);
        if !self.cookies.is_empty() {
            let header = self
                .cookies
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join("; ");
            builder = builder.header(COOKIE, header);
        }
        builder
    }

    async fn send(&mut self, request: Request<Body>) -> Reply {
        let response = self.app.clone().oneshot(request).await.unwrap();

        let mut set_cookies = Vec::new();
        for value in response.headers().get_all(SET_COOKIE) {
            let raw = value.to_str().unwrap();
            set_cookies.push(raw.to_string());
            let pair = raw.split(';').next().unwrap_or_default();
            let Some((name, value)) = pair.split_once('=') else {
                continue;
            };
            let expired = raw.contains("Max-Age=0");
            if value.is_empty() || expired {
                self.cookies.remove(name.trim());
            } else {
                self.cookies
                    .insert(name.trim().to_string(), value.trim().to_string());
            }
        }

        let status = response.status();
        let location = response
            .headers()
            .get(LOCATION)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        Reply {
            status,
            location,
            set_cookies,
            body: String::from_utf8(bytes.to_vec()).unwrap(),
        }
    }
}

/// Registers the first account, which becomes the admin.
pub async fn admin_browser(state: &AppState) -> Browser {
    let mut admin = Browser::new(state);
    let reply = admin
        .register("angela@example.com", "admin-password", "Angela")
        .await;
    assert_eq!(reply.status, StatusCode::SEE_OTHER);
    admin
}

pub async fn create_post(admin: &mut Browser, title: &str) -> Reply {
    admin
        .post(
            "/new-post",
            &[
                ("title", title),
                ("subtitle", "Who knew that cacti lived such interesting lives."),
                ("img_url", "https://images.example.com/cactus.jpg"),
                ("body", "<p>Nori grape silver <em>beet</em> broccoli.</p>"),
            ],
        )
        .await
}
