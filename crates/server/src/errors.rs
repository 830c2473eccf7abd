use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::app_state::AppState;
use crate::auth::session_user;
use crate::views::{self, PageContext};

#[derive(Debug, thiserror::Error)]
#[error("{code} ({}): {message}", .status.as_u16())]
pub struct ServerError {
    status: StatusCode,
    code: String,
    message: String,
}

impl ServerError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        let code = status_code_to_string(status);
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let shown = if self.status.is_server_error() {
            tracing::error!(code = %self.code, message = %self.message, "request failed");
            "Something went wrong on our side. Please try again later.".to_string()
        } else {
            self.message
        };
        let page = views::error_page(&PageContext::default(), self.status, &shown);
        let mut response = (self.status, page).into_response();
        response.extensions_mut().insert(ErrorPage {
            status: self.status,
            message: shown,
        });
        response
    }
}

/// Marks a response produced from a `ServerError`, so the page can be
/// rendered again once the viewer is known.
#[derive(Debug, Clone)]
struct ErrorPage {
    status: StatusCode,
    message: String,
}

/// Re-render error pages with the visitor's own navigation.
pub async fn render_error_page(
    State(state): State<AppState>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    let response = next.run(request).await;
    let Some(error) = response.extensions().get::<ErrorPage>().cloned() else {
        return response;
    };

    let viewer = match session_user(&state, &jar).await {
        Ok(viewer) => viewer,
        Err(e) => {
            tracing::warn!(error = %e, "viewer lookup failed while rendering error page");
            None
        }
    };
    let ctx = PageContext::new(viewer.as_ref(), state.admin_user_id, None);
    let (parts, _) = response.into_parts();
    (parts, views::error_page(&ctx, error.status, &error.message)).into_response()
}

pub fn db_error(err: sqlx::Error) -> ServerError {
    ServerError::internal(err.to_string())
}

pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db_err)
            if db_err.code().as_deref() == Some("23505")
                || db_err.code().as_deref() == Some("2067")
    )
}

fn status_code_to_string(status: StatusCode) -> String {
    match status {
        StatusCode::BAD_REQUEST => "bad_request",
        StatusCode::UNAUTHORIZED => "unauthorized",
        StatusCode::FORBIDDEN => "forbidden",
        StatusCode::NOT_FOUND => "not_found",
        StatusCode::CONFLICT => "conflict",
        StatusCode::INTERNAL_SERVER_ERROR => "internal_error",
        _ => status.canonical_reason().unwrap_or("error"),
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_code_and_status() {
        let err = ServerError::not_found("That post does not exist.");
        assert_eq!(err.to_string(), "not_found (404): That post does not exist.");

        let err = ServerError::internal("pool closed");
        assert_eq!(err.to_string(), "internal_error (500): pool closed");
    }

    #[test]
    fn server_errors_hide_details_from_the_page() {
        let response = ServerError::internal("pool closed").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let page = response.extensions().get::<ErrorPage>().cloned().unwrap();
        assert!(!page.message.contains("pool closed"));
    }
}
