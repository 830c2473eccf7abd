//! Shared building blocks for the
//! inkpost blog: domain types and access
//! rules, form validation, and the small
//! rendering helpers the server needs.

pub mod dates;
pub mod domain;
pub mod flash;
pub mod forms;
pub mod gravatar;
pub mod html;
