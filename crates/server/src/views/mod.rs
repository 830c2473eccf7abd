//! Server-rendered HTML. Every value that comes from a user or the database
//! goes through `escape` except post bodies, which are admin-authored HTML.

pub mod forms;
pub mod layout;
pub mod pages;

pub use layout::PageContext;
pub use pages::{about, contact, editor, error_page, index, login, post, register};
