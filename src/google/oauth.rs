//! Google OAuth token endpoints, client credential loading, and the
//! authorizer that turns a stored refresh token into a Gmail handle.

use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tokio_rusqlite::Connection;

use super::gmail::GmailClient;
use crate::core::AppConfig;
use crate::core::db::find_gmail_refresh_token;
use crate::payments::{Authorizer, Mailbox, PaymentError};

pub const GMAIL_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/gmail.readonly";

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: Option<i64>,
    pub refresh_token: Option<String>,
    pub scope: Option<String>,
    pub token_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Deserialize)]
struct ClientSecretsEntry {
    client_id: String,
    client_secret: String,
}

/// Shape of the client secrets file downloaded from the Google console
#[derive(Deserialize)]
struct ClientSecretsFile {
    installed: Option<ClientSecretsEntry>,
    web: Option<ClientSecretsEntry>,
}

impl ClientCredentials {
    pub fn from_json(json: &str) -> Result<Self> {
        let file: ClientSecretsFile =
            serde_json::from_str(json).context("Invalid client secrets json")?;
        let entry = file
            .installed
            .or(file.web)
            .ok_or(anyhow!("Client secrets need an `installed` or `web` entry"))?;
        Ok(Self {
            client_id: entry.client_id,
            client_secret: entry.client_secret,
        })
    }

    /// Env vars win; otherwise read the client secrets file
    pub fn resolve(config: &AppConfig) -> Result<Self> {
        if let (Some(client_id), Some(client_secret)) = (
            &config.gmail_api_client_id,
            &config.gmail_api_client_secret,
        ) {
            return Ok(Self {
                client_id: client_id.clone(),
                client_secret: client_secret.clone(),
            });
        }

        let json = std::fs::read_to_string(&config.gmail_credentials_path)
            .with_context(|| format!("Error loading {}", config.gmail_credentials_path))?;
        Self::from_json(&json)
    }
}

pub fn consent_url(client_id: &str, redirect_uri: &str) -> String {
    format!(
        "https://accounts.google.com/o/oauth2/v2/auth?client_id={}&redirect_uri={}&response_type=code&scope={}&access_type=offline&prompt=consent",
        urlencoding::encode(client_id),
        urlencoding::encode(redirect_uri),
        urlencoding::encode(GMAIL_READONLY_SCOPE)
    )
}

async fn post_token_form(token_url: &str, form: &[(&str, &str)]) -> Result<TokenResponse> {
    let res = Client::new().post(token_url).form(form).send().await?;
    let status = res.status();
    let text = res.text().await.unwrap_or_default();
    if !status.is_success() {
        anyhow::bail!("Token request failed: {} ({})", status, text);
    }
    let token: TokenResponse = serde_json::from_str(&text)?;
    Ok(token)
}

pub async fn exchange_code_for_token(
    token_url: &str,
    credentials: &ClientCredentials,
    code: &str,
    redirect_uri: &str,
) -> Result<TokenResponse> {
    post_token_form(
        token_url,
        &[
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
            ("code", code),
            ("redirect_uri", redirect_uri),
            ("grant_type", "authorization_code"),
        ],
    )
    .await
}

pub async fn refresh_access_token(
    token_url: &str,
    credentials: &ClientCredentials,
    refresh_token: &str,
) -> Result<TokenResponse> {
    post_token_form(
        token_url,
        &[
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ],
    )
    .await
}

/// Builds a `GmailClient` from the configured client credentials and the
/// refresh token stored by `payscan auth`.
pub struct GmailAuthorizer {
    db: Connection,
    config: AppConfig,
}

impl GmailAuthorizer {
    pub fn new(db: Connection, config: AppConfig) -> Self {
        Self { db, config }
    }
}

#[async_trait]
impl Authorizer for GmailAuthorizer {
    async fn authorize(&self) -> Result<Arc<dyn Mailbox>, PaymentError> {
        let unavailable = |e: anyhow::Error| PaymentError::CredentialsUnavailable(format!("{:#}", e));

        let credentials = ClientCredentials::resolve(&self.config).map_err(unavailable)?;
        let (account, refresh_token) =
            find_gmail_refresh_token(&self.db, self.config.gmail_account.clone())
                .await
                .map_err(unavailable)?
                .ok_or_else(|| {
                    PaymentError::CredentialsUnavailable(
                        "No gmail refresh token found, run `payscan auth --service gmail`"
                            .to_string(),
                    )
                })?;

        let client = GmailClient::connect(
            &self.config.gmail_api_url,
            &self.config.oauth_token_url,
            credentials,
            refresh_token,
        )
        .await
        .map_err(unavailable)?;
        tracing::debug!("Authorized gmail account {}", account);

        Ok(Arc::new(client))
    }
}
