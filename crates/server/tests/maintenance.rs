mod support;

use axum::http::StatusCode;
use inkpost_server::config::SeedConfig;
use inkpost_server::db::{ensure_default_user, reset_server_data};

use support::{admin_browser, count, create_post, shipped_config, test_state, Browser};

fn seed() -> SeedConfig {
    SeedConfig {
        email: "admin@example.com".into(),
        name: "Admin".into(),
        password: "change-me".into(),
    }
}

#[tokio::test]
async fn seed_account_is_created_once() {
    let state = test_state().await;

    ensure_default_user(&state, &seed()).await.unwrap();
    ensure_default_user(&state, &seed()).await.unwrap();
    assert_eq!(count(&state, "users").await, 1);

    let mut admin = Browser::new(&state);
    let reply = admin.login("admin@example.com", "change-me").await;
    assert_eq!(reply.status, StatusCode::SEE_OTHER);
    assert_eq!(reply.location.as_deref(), Some("/"));
    assert!(admin.get("/").await.body.contains("Create New Post"));
}

#[tokio::test]
async fn seed_leaves_an_existing_account_alone() {
    let state = test_state().await;
    let mut first = Browser::new(&state);
    first.register("admin@example.com", "own-password", "Owner").await;

    ensure_default_user(&state, &seed()).await.unwrap();
    assert_eq!(count(&state, "users").await, 1);

    let mut again = Browser::new(&state);
    let reply = again.login("admin@example.com", "own-password").await;
    assert_eq!(reply.location.as_deref(), Some("/"));
}

#[tokio::test]
async fn reset_clears_everything_and_restarts_ids() {
    let state = test_state().await;
    let config = shipped_config();

    let mut admin = admin_browser(&state).await;
    create_post(&mut admin, "Before the reset").await;
    admin.post("/post/1", &[("body", "gone soon")]).await;
    let mut reader = Browser::new(&state);
    reader.register("bob@example.com", "pw", "Bob").await;

    reset_server_data(&config, &state).await.unwrap();

    for table in ["users", "blog_posts", "comments", "user_tokens"] {
        assert_eq!(count(&state, table).await, 0, "{table}");
    }

    // The old cookie names a token that no longer exists.
    assert!(admin.get("/").await.body.contains(r#"href="/login""#));

    let mut newcomer = Browser::new(&state);
    newcomer.register("carol@example.com", "pw", "Carol").await;
    let id: i64 = sqlx::query_scalar("SELECT id FROM users WHERE email = 'carol@example.com'")
        .fetch_one(state.sqlite.as_ref().unwrap())
        .await
        .unwrap();
    assert_eq!(id, 1);
    assert!(newcomer.get("/").await.body.contains("Create New Post"));
}
