//! Gravatar avatar links for comment
//! authors.

use serde::Deserialize;

const PLAIN_BASE: &str =
  "http://www.gravatar.com/avatar/";
const SSL_BASE: &str =
  "https://secure.gravatar.com/avatar/";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GravatarOptions {
  pub size:          u32,
  pub rating:        String,
  pub default:       String,
  pub force_default: bool,
  pub force_lower:   bool,
  pub use_ssl:       bool,
  pub base_url:      Option<String>
}

impl Default for GravatarOptions {
  fn default() -> Self {
    Self {
      size:          100,
      rating:        "g".into(),
      default:       "retro".into(),
      force_default: false,
      force_lower:   false,
      use_ssl:       false,
      base_url:      None
    }
  }
}

impl GravatarOptions {
  fn base(&self) -> String {
    if let Some(base) = self
      .base_url
      .as_deref()
      .map(str::trim)
      .filter(|b| !b.is_empty())
    {
      let base =
        base.trim_end_matches('/');

      return format!("{base}/avatar/");
    }

    if self.use_ssl {
      SSL_BASE.to_string()
    } else {
      PLAIN_BASE.to_string()
    }
  }

  pub fn avatar_url(
    &self,
    email: &str
  ) -> String {
    let email = if self.force_lower {
      email.to_lowercase()
    } else {
      email.to_string()
    };

    let digest =
      md5::compute(email.as_bytes());

    let mut link = format!(
      "{}{:x}?s={}&d={}&r={}",
      self.base(),
      digest,
      self.size,
      urlencoding::encode(
        &self.default
      ),
      urlencoding::encode(&self.rating)
    );

    if self.force_default {
      link.push_str("&f=y");
    }

    link
  }
}
