pub mod app_state;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod flash;
pub mod handlers;
pub mod logging;
pub mod models;
pub mod schema;
pub mod views;
