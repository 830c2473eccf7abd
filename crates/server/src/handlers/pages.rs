use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::response::{Html, IntoResponse};
use axum_extra::extract::cookie::CookieJar;

use crate::app_state::AppState;
use crate::auth::session_user;
use crate::errors::{db_error, ServerError};
use crate::flash;
use crate::models::PostSummary;
use crate::views::{self, PageContext};

const STYLES_CSS: &str = include_str!("../../res/static/styles.css");

pub async fn index(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Html<String>), ServerError> {
    let viewer = session_user(&state, &jar).await?;

    let posts = if let Some(pool) = &state.postgres {
        sqlx::query_as::<_, PostSummary>(
            "SELECT p.id, p.title, p.subtitle, p.date, u.name AS author_name FROM blog_posts p LEFT JOIN users u ON u.id = p.author_id ORDER BY p.id",
        )
        .fetch_all(pool)
        .await
        .map_err(db_error)?
    } else {
        let pool = state.sqlite_pool()?;
        sqlx::query_as::<_, PostSummary>(
            "SELECT p.id, p.title, p.subtitle, p.date, u.name AS author_name FROM blog_posts p LEFT JOIN users u ON u.id = p.author_id ORDER BY p.id",
        )
        .fetch_all(pool)
        .await
        .map_err(db_error)?
    };

    let (jar, flash) = flash::take(jar);
    let ctx = PageContext::new(viewer.as_ref(), state.admin_user_id, flash);
    Ok((jar, views::index(&ctx, &posts)))
}

pub async fn about(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Html<String>), ServerError> {
    let viewer = session_user(&state, &jar).await?;
    let (jar, flash) = flash::take(jar);
    let ctx = PageContext::new(viewer.as_ref(), state.admin_user_id, flash);
    Ok((jar, views::about(&ctx)))
}

pub async fn contact(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Html<String>), ServerError> {
    let viewer = session_user(&state, &jar).await?;
    let (jar, flash) = flash::take(jar);
    let ctx = PageContext::new(viewer.as_ref(), state.admin_user_id, flash);
    Ok((jar, views::contact(&ctx)))
}

pub async fn stylesheet() -> impl IntoResponse {
    ([(CONTENT_TYPE, "text/css; charset=utf-8")], STYLES_CSS)
}
