use axum::Form;
use axum::extract::rejection::FormRejection;
use axum::extract::State;
use axum::response::{
  Html,
  IntoResponse,
  Redirect,
  Response
};
use axum_extra::extract::cookie::CookieJar;
use inkpost_core::forms::{
  FieldErrors,
  RegisterForm,
  check
};

use super::form_body;
use crate::app_state::AppState;
use crate::auth::{
  NewSession,
  hash_password,
  session_user
};
use crate::errors::{
  ServerError,
  db_error,
  is_unique_violation
};
use crate::flash;
use crate::views::{
  self,
  PageContext
};

pub const ALREADY_REGISTERED: &str =
  "You are already registered. Please \
   log in";

pub async fn register_form(
  State(state): State<AppState>,
  jar: CookieJar
) -> Result<
  (CookieJar, Html<String>),
  ServerError
> {
  let viewer =
    session_user(&state, &jar).await?;

  let (jar, flash) = flash::take(jar);

  let ctx = PageContext::new(
    viewer.as_ref(),
    state.admin_user_id,
    flash
  );

  Ok((
    jar,
    views::register(
      &ctx,
      &RegisterForm::default(),
      &FieldErrors::new()
    )
  ))
}

async fn email_registered(
  state: &AppState,
  email: &str
) -> Result<bool, ServerError> {
  let found = if let Some(pool) =
    &state.postgres
  {
    sqlx::query_scalar::<_, i64>(
      "SELECT id FROM users WHERE \
       email = $1"
    )
    .bind(email)
    .fetch_optional(pool)
    .await
    .map_err(db_error)?
  } else {
    let pool = state.sqlite_pool()?;

    sqlx::query_scalar::<_, i64>(
      "SELECT id FROM users WHERE \
       email = ?1"
    )
    .bind(email)
    .fetch_optional(pool)
    .await
    .map_err(db_error)?
  };

  Ok(found.is_some())
}

pub async fn register(
  State(state): State<AppState>,
  jar: CookieJar,
  form: Result<Form<RegisterForm>, FormRejection>
) -> Result<Response, ServerError> {
  let form =
    form_body(form)?.normalized();

  if let Err(errors) = check(&form) {
    let viewer =
      session_user(&state, &jar)
        .await?;

    let ctx = PageContext::new(
      viewer.as_ref(),
      state.admin_user_id,
      None
    );

    return Ok(
      views::register(
        &ctx, &form, &errors
      )
      .into_response()
    );
  }

  if email_registered(
    &state,
    &form.email
  )
  .await?
  {
    let jar = flash::push(
      jar,
      ALREADY_REGISTERED
    );

    return Ok(
      (jar, Redirect::to("/login"))
        .into_response()
    );
  }

  let password_hash = hash_password(
    &form.password
  )
  .map_err(ServerError::internal)?;

  let session = NewSession::mint(&state)?;

  // Account and first session land
  // together or not at all.
  let inserted = if let Some(pool) =
    &state.postgres
  {
    let mut tx = pool
      .begin()
      .await
      .map_err(db_error)?;

    let inserted =
      sqlx::query_scalar::<_, i64>(
        "INSERT INTO users (email, \
         password_hash, name, \
         created_at) VALUES ($1, $2, \
         $3, NOW()) RETURNING id"
      )
      .bind(&form.email)
      .bind(&password_hash)
      .bind(&form.name)
      .fetch_one(&mut *tx)
      .await;

    match inserted {
      | Ok(user_id) => {
        session
          .store_postgres(
            &mut *tx, user_id
          )
          .await
          .map_err(db_error)?;

        tx.commit()
          .await
          .map_err(db_error)?;

        Ok(user_id)
      }
      | Err(e) => Err(e)
    }
  } else {
    let pool = state.sqlite_pool()?;

    let mut tx = pool
      .begin()
      .await
      .map_err(db_error)?;

    let inserted = sqlx::query(
      "INSERT INTO users (email, \
       password_hash, name, \
       created_at) VALUES (?1, ?2, \
       ?3, datetime('now'))"
    )
    .bind(&form.email)
    .bind(&password_hash)
    .bind(&form.name)
    .execute(&mut *tx)
    .await
    .map(|r| r.last_insert_rowid());

    match inserted {
      | Ok(user_id) => {
        session
          .store_sqlite(
            &mut *tx, user_id
          )
          .await
          .map_err(db_error)?;

        tx.commit()
          .await
          .map_err(db_error)?;

        Ok(user_id)
      }
      | Err(e) => Err(e)
    }
  };

  let user_id = match inserted {
    | Ok(id) => id,
    | Err(e)
      if is_unique_violation(&e) =>
    {
      // Lost a race with another
      // signup for the same email.
      let jar = flash::push(
        jar,
        ALREADY_REGISTERED
      );

      return Ok(
        (jar, Redirect::to("/login"))
          .into_response()
      );
    }
    | Err(e) => return Err(db_error(e))
  };

  tracing::info!(
    user_id,
    "user registered"
  );

  let jar =
    jar.add(session.into_cookie(&state));

  Ok(
    (jar, Redirect::to("/"))
      .into_response()
  )
}
