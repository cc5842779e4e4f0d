use std::env;
use std::time::Duration;

use crate::payments::ScanSettings;
use crate::payments::mailbox::{DEFAULT_QUERY, DEFAULT_SCAN_LIMIT};

pub const GMAIL_API_URL: &str = "https://gmail.googleapis.com";
pub const GOOGLE_OAUTH_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub storage_path: String,
    pub db_path: String,
    pub static_dir: String,
    // Google credentials are optional here; a scan without them fails
    // as unauthorized instead of the process refusing to start
    pub gmail_api_client_id: Option<String>,
    pub gmail_api_client_secret: Option<String>,
    pub gmail_redirect_uri: String,
    pub gmail_credentials_path: String,
    pub gmail_account: Option<String>,
    pub gmail_api_url: String,
    pub oauth_token_url: String,
    pub scan_query: String,
    pub scan_limit: usize,
    pub fetch_timeout_secs: u64,
    pub scan_interval_secs: u64,
}

impl AppConfig {
    pub fn scan_settings(&self) -> ScanSettings {
        ScanSettings {
            query: self.scan_query.clone(),
            limit: self.scan_limit,
            fetch_timeout: Duration::from_secs(self.fetch_timeout_secs),
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parsed_var<T: std::str::FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(v) => v.parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring invalid value {:?} for {}", v, key);
            default
        }),
        Err(_) => default,
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        let storage_path = env::var("PAYSCAN_STORAGE_PATH").unwrap_or("./".to_string());
        let db_path = format!("{}/db", storage_path);
        let static_dir = env::var("PAYSCAN_STATIC_DIR").unwrap_or_else(|_| "./public".to_string());
        let gmail_api_client_id = non_empty_var("PAYSCAN_GMAIL_CLIENT_ID");
        let gmail_api_client_secret = non_empty_var("PAYSCAN_GMAIL_CLIENT_SECRET");
        let gmail_redirect_uri = env::var("PAYSCAN_GMAIL_REDIRECT_URI")
            .unwrap_or_else(|_| "urn:ietf:wg:oauth:2.0:oob".to_string());
        let gmail_credentials_path = env::var("PAYSCAN_GMAIL_CREDENTIALS_PATH")
            .unwrap_or_else(|_| "credentials.json".to_string());
        let gmail_account = non_empty_var("PAYSCAN_GMAIL_ACCOUNT");
        let gmail_api_url =
            env::var("PAYSCAN_GMAIL_API_URL").unwrap_or_else(|_| GMAIL_API_URL.to_string());
        let oauth_token_url = env::var("PAYSCAN_OAUTH_TOKEN_URL")
            .unwrap_or_else(|_| GOOGLE_OAUTH_TOKEN_URL.to_string());
        let scan_query =
            env::var("PAYSCAN_SCAN_QUERY").unwrap_or_else(|_| DEFAULT_QUERY.to_string());
        let scan_limit = parsed_var("PAYSCAN_SCAN_LIMIT", DEFAULT_SCAN_LIMIT);
        let fetch_timeout_secs = parsed_var("PAYSCAN_FETCH_TIMEOUT_SECS", 15);
        let scan_interval_secs = parsed_var("PAYSCAN_SCAN_INTERVAL_SECS", 0);

        Self {
            storage_path,
            db_path,
            static_dir,
            gmail_api_client_id,
            gmail_api_client_secret,
            gmail_redirect_uri,
            gmail_credentials_path,
            gmail_account,
            gmail_api_url,
            oauth_token_url,
            scan_query,
            scan_limit,
            fetch_timeout_secs,
            scan_interval_secs,
        }
    }
}
