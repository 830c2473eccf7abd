//! Form payloads submitted by the
//! browser, with their validation rules.
//!
//! Every field defaults to empty so a
//! missing input surfaces as a field
//! error instead of a rejected request.

use std::collections::BTreeMap;

use serde::Deserialize;
use validator::{
  Validate,
  ValidationErrors
};

/// First message per invalid field,
/// keyed by field name.
pub type FieldErrors =
  BTreeMap<String, String>;

#[derive(
  Debug, Clone, Default, Deserialize, Validate,
)]
#[serde(default)]
pub struct RegisterForm {
  #[validate(email(
    message = "Enter a valid email \
               address"
  ))]
  pub email:    String,
  #[validate(length(
    min = 1,
    message = "Password is required"
  ))]
  pub password: String,
  #[validate(length(
    min = 1,
    max = 250,
    message = "Name is required (250 \
               characters max)"
  ))]
  pub name:     String
}

impl RegisterForm {
  pub fn normalized(self) -> Self {
    Self {
      email:    self
        .email
        .trim()
        .to_string(),
      password: self.password,
      name:     self.name.trim().to_string()
    }
  }
}

#[derive(
  Debug, Clone, Default, Deserialize, Validate,
)]
#[serde(default)]
pub struct LoginForm {
  #[validate(email(
    message = "Enter a valid email \
               address"
  ))]
  pub email:    String,
  #[validate(length(
    min = 1,
    message = "Password is required"
  ))]
  pub password: String
}

impl LoginForm {
  pub fn normalized(self) -> Self {
    Self {
      email:    self
        .email
        .trim()
        .to_string(),
      password: self.password
    }
  }
}

#[derive(
  Debug, Clone, Default, Deserialize, Validate,
)]
#[serde(default)]
pub struct PostForm {
  #[validate(length(
    min = 1,
    max = 250,
    message = "Title is required (250 \
               characters max)"
  ))]
  pub title:    String,
  #[validate(length(
    min = 1,
    max = 250,
    message = "Subtitle is required \
               (250 characters max)"
  ))]
  pub subtitle: String,
  #[validate(
    url(
      message = "Enter a valid image \
                 URL"
    ),
    length(
      max = 250,
      message = "Image URL is too long"
    )
  )]
  pub img_url:  String,
  #[validate(length(
    max = 250,
    message = "Author name is too \
               long"
  ))]
  pub author:   Option<String>,
  #[validate(length(
    min = 1,
    message = "Body is required"
  ))]
  pub body:     String
}

impl PostForm {
  pub fn normalized(self) -> Self {
    Self {
      title:    self
        .title
        .trim()
        .to_string(),
      subtitle: self
        .subtitle
        .trim()
        .to_string(),
      img_url:  self
        .img_url
        .trim()
        .to_string(),
      author:   self
        .author
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty()),
      body:     self.body.trim().to_string()
    }
  }
}

#[derive(
  Debug, Clone, Default, Deserialize, Validate,
)]
#[serde(default)]
pub struct CommentForm {
  #[validate(length(
    min = 1,
    message = "Comment cannot be empty"
  ))]
  pub body: String
}

impl CommentForm {
  pub fn normalized(self) -> Self {
    Self {
      body: self.body.trim().to_string()
    }
  }
}

/// Validate a form, collecting the
/// first message for each failing field.
pub fn check<F: Validate>(
  form: &F
) -> Result<(), FieldErrors> {
  form
    .validate()
    .map_err(|e| field_errors(&e))
}

pub fn field_errors(
  errors: &ValidationErrors
) -> FieldErrors {
  let mut out = FieldErrors::new();

  for (field, errs) in
    errors.field_errors()
  {
    let message = errs
      .first()
      .map(|e| {
        e.message
          .as_ref()
          .map(|m| m.to_string())
          .unwrap_or_else(|| {
            format!("invalid {field}")
          })
      })
      .unwrap_or_else(|| {
        format!("invalid {field}")
      });

    out.insert(
      field.to_string(),
      message
    );
  }

  out
}
