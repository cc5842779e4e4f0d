mod config;
pub mod db;
pub mod logging;

pub use config::{AppConfig, GMAIL_API_URL, GOOGLE_OAUTH_TOKEN_URL};
