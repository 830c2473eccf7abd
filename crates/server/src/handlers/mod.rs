mod auth;
mod comments;
mod health;
mod pages;
mod posts;
mod users;

pub use auth::{INVALID_PASSWORD, NO_SUCH_EMAIL};
pub use comments::LOGIN_TO_COMMENT;
pub use users::ALREADY_REGISTERED;

use axum::extract::rejection::{FormRejection, PathRejection};
use axum::extract::Path;
use axum::http::StatusCode;
use axum::middleware;
use axum::routing::{get, post};
use axum::{Form, Router};
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;
use crate::errors::{render_error_page, ServerError};

/// Ids that do not parse as an integer cannot name a post.
pub(crate) fn parse_post_id(path: Result<Path<i64>, PathRejection>) -> Result<i64, ServerError> {
    path.map(|Path(id)| id).map_err(|rejection| {
        tracing::debug!(%rejection, "unparseable post id");
        ServerError::not_found("That post does not exist.")
    })
}

pub(crate) fn form_body<T>(form: Result<Form<T>, FormRejection>) -> Result<T, ServerError> {
    form.map(|Form(values)| values).map_err(|rejection| {
        ServerError::new(StatusCode::BAD_REQUEST, format!("The submitted form could not be read: {rejection}"))
    })
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/static/styles.css", get(pages::stylesheet))
        .route("/", get(pages::index))
        .route("/about", get(pages::about))
        .route("/contact", get(pages::contact))
        .route("/register", get(users::register_form).post(users::register))
        .route("/login", get(auth::login_form).post(auth::login))
        .route("/logout", get(auth::logout))
        .route("/post/:post_id", get(posts::show_post).post(comments::add_comment))
        .route("/new-post", get(posts::new_post_form).post(posts::create_post))
        .route("/edit-post/:post_id", get(posts::edit_post_form).post(posts::update_post))
        .route("/delete/:post_id", post(posts::delete_post))
        .layer(middleware::from_fn_with_state(state.clone(), render_error_page))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
