//! Gmail API client for searching messages and reading their snippets

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::oauth::{ClientCredentials, refresh_access_token};
use crate::payments::{MessageBody, MessageFetch, MessageRef, MessageSearch, PaymentError};

/// Message and list structures from Gmail API documentation
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MessageResponse {
    pub id: String,
    #[serde(rename = "threadId")]
    pub thread_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ListMessagesResponse {
    pub messages: Option<Vec<MessageResponse>>,
    #[serde(rename = "nextPageToken")]
    pub next_page_token: Option<String>,
}

/// A message as returned with `format=minimal`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    #[serde(rename = "threadId")]
    pub thread_id: String,
    pub snippet: Option<String>,
    #[serde(rename = "labelIds")]
    pub label_ids: Option<Vec<String>>,
    #[serde(rename = "internalDate")]
    pub internal_date: String,
}

impl From<Message> for MessageBody {
    fn from(message: Message) -> Self {
        MessageBody {
            snippet: message.snippet.unwrap_or_default(),
            internal_date: message.internal_date,
        }
    }
}

/// Search messages matching a Gmail query
/// curl: GET /gmail/v1/users/me/messages?maxResults=N&q=QUERY
pub async fn list_messages(
    base_url: &str,
    access_token: &str,
    query: &str,
    limit: usize,
) -> Result<Vec<MessageResponse>, anyhow::Error> {
    let client = Client::new();
    let url = format!(
        "{}/gmail/v1/users/me/messages?maxResults={}&q={}",
        base_url,
        limit,
        urlencoding::encode(query)
    );
    let res = client.get(&url).bearer_auth(access_token).send().await?;
    let status = res.status();
    let text = res.text().await.unwrap_or_default();
    if status == StatusCode::UNAUTHORIZED {
        return Err(PaymentError::CredentialsUnavailable(format!(
            "Message search rejected the access token: {} ({})",
            status, text
        ))
        .into());
    }
    if !status.is_success() {
        anyhow::bail!("Message search failed: {} ({})", status, text);
    }
    let msgs: ListMessagesResponse = serde_json::from_str(&text)?;
    Ok(msgs.messages.unwrap_or_default())
}

/// Fetch a single message with its snippet
/// curl: GET /gmail/v1/users/me/messages/ID?format=minimal
pub async fn fetch_message(
    base_url: &str,
    access_token: &str,
    message_id: &str,
) -> Result<Message, anyhow::Error> {
    let client = Client::new();
    let url = format!(
        "{}/gmail/v1/users/me/messages/{}?format=minimal",
        base_url,
        urlencoding::encode(message_id)
    );
    let res = client.get(&url).bearer_auth(access_token).send().await?;
    let status = res.status();
    let text = res.text().await.unwrap_or_default();
    if status == StatusCode::UNAUTHORIZED {
        return Err(PaymentError::CredentialsUnavailable(format!(
            "Message fetch rejected the access token: {} ({})",
            status, text
        ))
        .into());
    }
    if !status.is_success() {
        anyhow::bail!("Message fetch failed: {} ({})", status, text);
    }
    let message: Message = serde_json::from_str(&text)?;
    Ok(message)
}

struct AccessToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    fn is_fresh(&self) -> bool {
        self.expires_at - Utc::now() > Duration::seconds(60)
    }
}

/// An authorized Gmail mailbox. Keeps the current access token and
/// swaps it for a new one shortly before it expires.
pub struct GmailClient {
    base_url: String,
    token_url: String,
    credentials: ClientCredentials,
    refresh_token: String,
    token: Mutex<AccessToken>,
}

impl GmailClient {
    /// Exchange the refresh token for a first access token. Fails when
    /// Google rejects the credentials.
    pub async fn connect(
        base_url: &str,
        token_url: &str,
        credentials: ClientCredentials,
        refresh_token: String,
    ) -> Result<Self> {
        let token = Self::refresh(token_url, &credentials, &refresh_token).await?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token_url: token_url.to_string(),
            credentials,
            refresh_token,
            token: Mutex::new(token),
        })
    }

    async fn refresh(
        token_url: &str,
        credentials: &ClientCredentials,
        refresh_token: &str,
    ) -> Result<AccessToken> {
        let resp = refresh_access_token(token_url, credentials, refresh_token).await?;
        // Google issues one hour tokens when it omits the lifetime
        let expires_in = resp.expires_in.unwrap_or(3600);
        Ok(AccessToken {
            value: resp.access_token,
            expires_at: Utc::now() + Duration::seconds(expires_in),
        })
    }

    /// The current access token. A failed refresh means the stored
    /// refresh token no longer works, so it is reported as
    /// `CredentialsUnavailable`.
    async fn access_token(&self) -> Result<String> {
        let mut token = self.token.lock().await;
        if !token.is_fresh() {
            tracing::debug!("Refreshing gmail access token");
            *token = Self::refresh(&self.token_url, &self.credentials, &self.refresh_token)
                .await
                .map_err(|e| PaymentError::CredentialsUnavailable(format!("{:#}", e)))?;
        }
        Ok(token.value.clone())
    }
}

#[async_trait]
impl MessageSearch for GmailClient {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<MessageRef>> {
        let access_token = self.access_token().await?;
        let messages = list_messages(&self.base_url, &access_token, query, limit).await?;
        Ok(messages.into_iter().map(|m| MessageRef::new(m.id)).collect())
    }
}

#[async_trait]
impl MessageFetch for GmailClient {
    async fn fetch(&self, message: &MessageRef) -> Result<MessageBody> {
        let access_token = self.access_token().await?;
        let message = fetch_message(&self.base_url, &access_token, &message.id).await?;
        Ok(message.into())
    }
}
