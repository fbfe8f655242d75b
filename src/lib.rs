pub mod config;
pub mod error;
pub mod i18n;
pub mod prerequisites;
pub mod routes;
pub mod server;
pub mod templates;
pub mod texts;
pub mod views;
