use axum::Form;
use axum::extract::rejection::{
  FormRejection,
  PathRejection
};
use axum::extract::{
  Path as AxumPath,
  State
};
use axum::response::{
  IntoResponse,
  Redirect,
  Response
};
use axum_extra::extract::cookie::CookieJar;
use inkpost_core::domain::{
  Access,
  comment_access
};
use inkpost_core::forms::{
  CommentForm,
  check
};

use super::posts::{
  load_post,
  render_post
};
use super::{
  form_body,
  parse_post_id
};
use crate::app_state::AppState;
use crate::auth::session_user;
use crate::errors::{
  ServerError,
  db_error
};
use crate::flash;
use crate::views::PageContext;

pub const LOGIN_TO_COMMENT: &str =
  "You have to be logged in to leave \
   a comment. Please log in";

pub async fn add_comment(
  State(state): State<AppState>,
  jar: CookieJar,
  path: Result<AxumPath<i64>, PathRejection>,
  form: Result<Form<CommentForm>, FormRejection>
) -> Result<Response, ServerError> {
  let post_id = parse_post_id(path)?;

  // Unknown posts are a 404 for
  // everyone, logged in or not.
  load_post(&state, post_id).await?;

  let viewer =
    session_user(&state, &jar).await?;

  let user = match (
    comment_access(viewer.as_ref()),
    viewer.as_ref()
  ) {
    | (Access::Allowed, Some(user)) => {
      user
    }
    | _ => {
      let jar = flash::push(
        jar,
        LOGIN_TO_COMMENT
      );

      return Ok(
        (jar, Redirect::to("/login"))
          .into_response()
      );
    }
  };

  let form =
    form_body(form)?.normalized();

  if let Err(errors) = check(&form) {
    let ctx = PageContext::new(
      viewer.as_ref(),
      state.admin_user_id,
      None
    );

    let page = render_post(
      &state, &ctx, post_id, &form,
      &errors
    )
    .await?;

    return Ok(page.into_response());
  }

  let comment_id = if let Some(pool) =
    &state.postgres
  {
    sqlx::query_scalar::<_, i64>(
      "INSERT INTO comments \
       (author_id, blogpost_id, text, \
       created_at) VALUES ($1, $2, $3, \
       NOW()) RETURNING id"
    )
    .bind(user.id)
    .bind(post_id)
    .bind(&form.body)
    .fetch_one(pool)
    .await
    .map_err(db_error)?
  } else {
    let pool = state.sqlite_pool()?;

    sqlx::query(
      "INSERT INTO comments \
       (author_id, blogpost_id, text, \
       created_at) VALUES (?1, ?2, ?3, \
       datetime('now'))"
    )
    .bind(user.id)
    .bind(post_id)
    .bind(&form.body)
    .execute(pool)
    .await
    .map_err(db_error)?
    .last_insert_rowid()
  };

  tracing::info!(
    comment_id,
    post_id,
    user_id = user.id,
    "comment added"
  );

  Ok(
    Redirect::to(&format!(
      "/post/{post_id}#comment-{comment_id}"
    ))
    .into_response()
  )
}
