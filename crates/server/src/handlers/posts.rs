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
  Html,
  IntoResponse,
  Redirect,
  Response
};
use axum_extra::extract::cookie::CookieJar;
use inkpost_core::dates::format_post_date;
use inkpost_core::domain::SessionUser;
use inkpost_core::forms::{
  CommentForm,
  FieldErrors,
  PostForm,
  check
};

use super::{
  form_body,
  parse_post_id
};
use crate::app_state::AppState;
use crate::auth::{
  require_admin,
  session_user
};
use crate::errors::{
  ServerError,
  db_error,
  is_unique_violation
};
use crate::flash;
use crate::models::{
  CommentRow,
  PostDetail
};
use crate::views::{
  self,
  PageContext
};

const DUPLICATE_TITLE: &str =
  "A post with this title already \
   exists.";

pub(super) async fn load_post(
  state: &AppState,
  post_id: i64
) -> Result<PostDetail, ServerError> {
  let row = if let Some(pool) =
    &state.postgres
  {
    sqlx::query_as::<_, PostDetail>(
      "SELECT p.id, p.author_id, \
       u.name AS author_name, \
       p.title, p.subtitle, p.date, \
       p.body, p.img_url FROM \
       blog_posts p LEFT JOIN users u \
       ON u.id = p.author_id WHERE \
       p.id = $1"
    )
    .bind(post_id)
    .fetch_optional(pool)
    .await
    .map_err(db_error)?
  } else {
    let pool = state.sqlite_pool()?;

    sqlx::query_as::<_, PostDetail>(
      "SELECT p.id, p.author_id, \
       u.name AS author_name, \
       p.title, p.subtitle, p.date, \
       p.body, p.img_url FROM \
       blog_posts p LEFT JOIN users u \
       ON u.id = p.author_id WHERE \
       p.id = ?1"
    )
    .bind(post_id)
    .fetch_optional(pool)
    .await
    .map_err(db_error)?
  };

  row.ok_or_else(|| {
    ServerError::not_found(
      "That post does not exist."
    )
  })
}

pub(super) async fn load_comments(
  state: &AppState,
  post_id: i64
) -> Result<Vec<CommentRow>, ServerError>
{
  if let Some(pool) = &state.postgres {
    return sqlx::query_as::<_, CommentRow>(
      "SELECT c.id, c.text, u.name AS \
       author_name, u.email AS \
       author_email FROM comments c \
       LEFT JOIN users u ON u.id = \
       c.author_id WHERE \
       c.blogpost_id = $1 ORDER BY c.id"
    )
    .bind(post_id)
    .fetch_all(pool)
    .await
    .map_err(db_error);
  }

  let pool = state.sqlite_pool()?;

  sqlx::query_as::<_, CommentRow>(
    "SELECT c.id, c.text, u.name AS \
     author_name, u.email AS \
     author_email FROM comments c \
     LEFT JOIN users u ON u.id = \
     c.author_id WHERE c.blogpost_id \
     = ?1 ORDER BY c.id"
  )
  .bind(post_id)
  .fetch_all(pool)
  .await
  .map_err(db_error)
}

/// Post page with its comments and a
/// comment form.
pub(super) async fn render_post(
  state: &AppState,
  ctx: &PageContext<'_>,
  post_id: i64,
  form: &CommentForm,
  errors: &FieldErrors
) -> Result<Html<String>, ServerError> {
  let post =
    load_post(state, post_id).await?;

  let comments =
    load_comments(state, post_id)
      .await?;

  Ok(views::post(
    ctx,
    &post,
    &comments,
    &state.gravatar,
    form,
    errors
  ))
}

pub async fn show_post(
  State(state): State<AppState>,
  jar: CookieJar,
  path: Result<AxumPath<i64>, PathRejection>
) -> Result<
  (CookieJar, Html<String>),
  ServerError
> {
  let post_id = parse_post_id(path)?;

  let viewer =
    session_user(&state, &jar).await?;

  let (jar, flash) = flash::take(jar);

  let ctx = PageContext::new(
    viewer.as_ref(),
    state.admin_user_id,
    flash
  );

  let page = render_post(
    &state,
    &ctx,
    post_id,
    &CommentForm::default(),
    &FieldErrors::new()
  )
  .await?;

  Ok((jar, page))
}

fn editor_page(
  state: &AppState,
  admin: &SessionUser,
  post_id: Option<i64>,
  form: &PostForm,
  errors: &FieldErrors
) -> Html<String> {
  let ctx = PageContext::new(
    Some(admin),
    state.admin_user_id,
    None
  );

  views::editor(
    &ctx, post_id, form, errors
  )
}

fn duplicate_title() -> FieldErrors {
  let mut errors = FieldErrors::new();
  errors.insert(
    "title".into(),
    DUPLICATE_TITLE.into()
  );
  errors
}

pub async fn new_post_form(
  State(state): State<AppState>,
  jar: CookieJar
) -> Result<Html<String>, ServerError> {
  let admin =
    require_admin(&state, &jar).await?;

  Ok(editor_page(
    &state,
    &admin,
    None,
    &PostForm::default(),
    &FieldErrors::new()
  ))
}

pub async fn create_post(
  State(state): State<AppState>,
  jar: CookieJar,
  form: Result<Form<PostForm>, FormRejection>
) -> Result<Response, ServerError> {
  let admin =
    require_admin(&state, &jar).await?;

  let form =
    form_body(form)?.normalized();

  if let Err(errors) = check(&form) {
    return Ok(
      editor_page(
        &state, &admin, None, &form,
        &errors
      )
      .into_response()
    );
  }

  let date =
    format_post_date(state.today());

  let inserted = if let Some(pool) =
    &state.postgres
  {
    sqlx::query_scalar::<_, i64>(
      "INSERT INTO blog_posts \
       (author_id, title, subtitle, \
       date, body, img_url, \
       created_at) VALUES ($1, $2, $3, \
       $4, $5, $6, NOW()) RETURNING id"
    )
    .bind(admin.id)
    .bind(&form.title)
    .bind(&form.subtitle)
    .bind(&date)
    .bind(&form.body)
    .bind(&form.img_url)
    .fetch_one(pool)
    .await
  } else {
    let pool = state.sqlite_pool()?;

    sqlx::query(
      "INSERT INTO blog_posts \
       (author_id, title, subtitle, \
       date, body, img_url, \
       created_at) VALUES (?1, ?2, ?3, \
       ?4, ?5, ?6, datetime('now'))"
    )
    .bind(admin.id)
    .bind(&form.title)
    .bind(&form.subtitle)
    .bind(&date)
    .bind(&form.body)
    .bind(&form.img_url)
    .execute(pool)
    .await
    .map(|r| r.last_insert_rowid())
  };

  let post_id = match inserted {
    | Ok(id) => id,
    | Err(e)
      if is_unique_violation(&e) =>
    {
      return Ok(
        editor_page(
          &state,
          &admin,
          None,
          &form,
          &duplicate_title()
        )
        .into_response()
      );
    }
    | Err(e) => return Err(db_error(e))
  };

  tracing::info!(
    post_id,
    title = %form.title,
    "post created"
  );

  Ok(Redirect::to("/").into_response())
}

pub async fn edit_post_form(
  State(state): State<AppState>,
  jar: CookieJar,
  path: Result<AxumPath<i64>, PathRejection>
) -> Result<Html<String>, ServerError> {
  let post_id = parse_post_id(path)?;

  let admin =
    require_admin(&state, &jar).await?;

  let post =
    load_post(&state, post_id).await?;

  let form = PostForm {
    title:    post.title,
    subtitle: post.subtitle,
    img_url:  post.img_url,
    author:   post.author_name,
    body:     post.body
  };

  Ok(editor_page(
    &state,
    &admin,
    Some(post_id),
    &form,
    &FieldErrors::new()
  ))
}

pub async fn update_post(
  State(state): State<AppState>,
  jar: CookieJar,
  path: Result<AxumPath<i64>, PathRejection>,
  form: Result<Form<PostForm>, FormRejection>
) -> Result<Response, ServerError> {
  let post_id = parse_post_id(path)?;

  let admin =
    require_admin(&state, &jar).await?;

  let post =
    load_post(&state, post_id).await?;

  let form =
    form_body(form)?.normalized();

  if let Err(errors) = check(&form) {
    return Ok(
      editor_page(
        &state,
        &admin,
        Some(post_id),
        &form,
        &errors
      )
      .into_response()
    );
  }

  // Renaming applies to the post's
  // author account.
  let rename = match (
    post.author_id,
    form.author.as_deref()
  ) {
    | (Some(author_id), Some(name))
      if post.author_name.as_deref()
        != Some(name) =>
    {
      Some((author_id, name))
    }
    | _ => None
  };

  let updated = if let Some(pool) =
    &state.postgres
  {
    let mut tx = pool
      .begin()
      .await
      .map_err(db_error)?;

    let result = sqlx::query(
      "UPDATE blog_posts SET title = \
       $1, subtitle = $2, img_url = \
       $3, body = $4 WHERE id = $5"
    )
    .bind(&form.title)
    .bind(&form.subtitle)
    .bind(&form.img_url)
    .bind(&form.body)
    .bind(post_id)
    .execute(&mut *tx)
    .await;

    match result {
      | Ok(_) => {
        if let Some((author_id, name)) =
          rename
        {
          sqlx::query(
            "UPDATE users SET name = $1 \
             WHERE id = $2"
          )
          .bind(name)
          .bind(author_id)
          .execute(&mut *tx)
          .await
          .map_err(db_error)?;
        }

        tx.commit()
          .await
          .map_err(db_error)?;

        Ok(())
      }
      | Err(e) => Err(e)
    }
  } else {
    let pool = state.sqlite_pool()?;

    let mut tx = pool
      .begin()
      .await
      .map_err(db_error)?;

    let result = sqlx::query(
      "UPDATE blog_posts SET title = \
       ?1, subtitle = ?2, img_url = ?3, \
       body = ?4 WHERE id = ?5"
    )
    .bind(&form.title)
    .bind(&form.subtitle)
    .bind(&form.img_url)
    .bind(&form.body)
    .bind(post_id)
    .execute(&mut *tx)
    .await;

    match result {
      | Ok(_) => {
        if let Some((author_id, name)) =
          rename
        {
          sqlx::query(
            "UPDATE users SET name = ?1 \
             WHERE id = ?2"
          )
          .bind(name)
          .bind(author_id)
          .execute(&mut *tx)
          .await
          .map_err(db_error)?;
        }

        tx.commit()
          .await
          .map_err(db_error)?;

        Ok(())
      }
      | Err(e) => Err(e)
    }
  };

  match updated {
    | Ok(()) => {}
    | Err(e)
      if is_unique_violation(&e) =>
    {
      return Ok(
        editor_page(
          &state,
          &admin,
          Some(post_id),
          &form,
          &duplicate_title()
        )
        .into_response()
      );
    }
    | Err(e) => return Err(db_error(e))
  }

  tracing::info!(
    post_id,
    "post updated"
  );

  Ok(
    Redirect::to(&format!(
      "/post/{post_id}"
    ))
    .into_response()
  )
}

pub async fn delete_post(
  State(state): State<AppState>,
  jar: CookieJar,
  path: Result<AxumPath<i64>, PathRejection>
) -> Result<Response, ServerError> {
  let post_id = parse_post_id(path)?;

  require_admin(&state, &jar).await?;

  let rows = if let Some(pool) =
    &state.postgres
  {
    sqlx::query(
      "DELETE FROM blog_posts WHERE id \
       = $1"
    )
    .bind(post_id)
    .execute(pool)
    .await
    .map_err(db_error)?
    .rows_affected()
  } else {
    let pool = state.sqlite_pool()?;

    sqlx::query(
      "DELETE FROM blog_posts WHERE id \
       = ?1"
    )
    .bind(post_id)
    .execute(pool)
    .await
    .map_err(db_error)?
    .rows_affected()
  };

  if rows == 0 {
    return Err(ServerError::not_found(
      "That post does not exist."
    ));
  }

  tracing::info!(
    post_id,
    "post deleted"
  );

  Ok(Redirect::to("/").into_response())
}
