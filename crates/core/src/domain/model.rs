//! Domain models: the logged-in
//! viewer, roles, and the access rules
//! guarding posts and comments.

use serde::{
  Deserialize,
  Serialize
};

/// A user resolved from a live
/// session.
#[derive(
  Debug,
  Clone,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
)]
pub struct SessionUser {
  pub id:    i64,
  pub email: String,
  pub name:  String
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum Role {
  Reader,
  Admin
}

impl Role {
  pub fn of(
    user_id: i64,
    admin_user_id: i64
  ) -> Self {
    if user_id == admin_user_id {
      Role::Admin
    } else {
      Role::Reader
    }
  }
}

impl SessionUser {
  pub fn role(
    &self,
    admin_user_id: i64
  ) -> Role {
    Role::of(self.id, admin_user_id)
  }

  pub fn is_admin(
    &self,
    admin_user_id: i64
  ) -> bool {
    self.role(admin_user_id)
      == Role::Admin
  }
}

/// Outcome of an access check.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum Access {
  Allowed,
  NeedsLogin,
  Forbidden
}

/// Creating, editing and deleting
/// posts is reserved for the admin.
pub fn post_management_access(
  viewer: Option<&SessionUser>,
  admin_user_id: i64
) -> Access {
  match viewer {
    | None => Access::NeedsLogin,
    | Some(user)
      if user
        .is_admin(admin_user_id) =>
    {
      Access::Allowed
    }
    | Some(_) => Access::Forbidden
  }
}

/// Any logged-in user may comment.
pub fn comment_access(
  viewer: Option<&SessionUser>
) -> Access {
  match viewer {
    | None => Access::NeedsLogin,
    | Some(_) => Access::Allowed
  }
}
