pub mod model;

pub use model::{
  Access,
  Role,
  SessionUser,
  comment_access,
  post_management_access
};
