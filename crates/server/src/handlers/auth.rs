use axum::{
    extract::{rejection::FormRejection, State},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::cookie::CookieJar;
use inkpost_core::forms::{check, FieldErrors, LoginForm};

use super::form_body;
use crate::app_state::AppState;
use crate::auth::{end_session, session_user, start_session, verify_password};
use crate::errors::{db_error, ServerError};
use crate::flash;
use crate::models::Credentials;
use crate::views::{self, PageContext};

pub const NO_SUCH_EMAIL: &str = "No such email exists, please try again";
pub const INVALID_PASSWORD: &str = "Invalid password, please try again";

pub async fn login_form(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Html<String>), ServerError> {
    let viewer = session_user(&state, &jar).await?;
    let (jar, flash) = flash::take(jar);
    let ctx = PageContext::new(viewer.as_ref(), state.admin_user_id, flash);
    Ok((jar, views::login(&ctx, &LoginForm::default(), &FieldErrors::new())))
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    form: Result<Form<LoginForm>, FormRejection>,
) -> Result<Response, ServerError> {
    let form = form_body(form)?.normalized();
    if let Err(errors) = check(&form) {
        let viewer = session_user(&state, &jar).await?;
        let ctx = PageContext::new(viewer.as_ref(), state.admin_user_id, None);
        return Ok(views::login(&ctx, &form, &errors).into_response());
    }

    let credentials = if let Some(pool) = &state.postgres {
        sqlx::query_as::<_, Credentials>("SELECT id, password_hash FROM users WHERE email = $1")
            .bind(&form.email)
            .fetch_optional(pool)
            .await
            .map_err(db_error)?
    } else {
        let pool = state.sqlite_pool()?;
        sqlx::query_as::<_, Credentials>("SELECT id, password_hash FROM users WHERE email = ?1")
            .bind(&form.email)
            .fetch_optional(pool)
            .await
            .map_err(db_error)?
    };

    let Some(credentials) = credentials else {
        let jar = flash::push(jar, NO_SUCH_EMAIL);
        return Ok((jar, Redirect::to("/login")).into_response());
    };

    if verify_password(&credentials.password_hash, &form.password).is_err() {
        tracing::info!(user_id = credentials.id, "login rejected");
        let jar = flash::push(jar, INVALID_PASSWORD);
        return Ok((jar, Redirect::to("/login")).into_response());
    }

    let jar = start_session(&state, jar, credentials.id).await?;
    Ok((jar, Redirect::to("/")).into_response())
}

pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect), ServerError> {
    let jar = end_session(&state, jar).await?;
    Ok((jar, Redirect::to("/")))
}
