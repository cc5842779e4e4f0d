//! Test utilities for integration tests
#![allow(dead_code)]

use std::sync::{Arc, RwLock};

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use axum::{Router, body::Body};

use payscan::api::AppState;
use payscan::api::app;
use payscan::core::AppConfig;
use payscan::core::db::{async_db, initialize_db};
use payscan::payments::{
    Authorizer, Mailbox, MessageBody, MessageFetch, MessageRef, MessageSearch, PaymentError,
};

/// Mailbox backed by a vector the test can append to between requests
#[derive(Default)]
pub struct TestInbox {
    messages: RwLock<Vec<(String, MessageBody)>>,
    pub broken: RwLock<Option<String>>,
}

impl TestInbox {
    pub fn deliver(&self, id: &str, snippet: &str, internal_date: &str) {
        self.messages.write().unwrap().push((
            id.to_string(),
            MessageBody {
                snippet: snippet.to_string(),
                internal_date: internal_date.to_string(),
            },
        ));
    }

    /// Make fetching `id` fail from now on
    pub fn break_message(&self, id: &str) {
        *self.broken.write().unwrap() = Some(id.to_string());
    }
}

#[async_trait]
impl MessageSearch for TestInbox {
    async fn search(&self, _query: &str, limit: usize) -> Result<Vec<MessageRef>> {
        Ok(self
            .messages
            .read()
            .unwrap()
            .iter()
            .take(limit)
            .map(|(id, _)| MessageRef::new(id.clone()))
            .collect())
    }
}

#[async_trait]
impl MessageFetch for TestInbox {
    async fn fetch(&self, message: &MessageRef) -> Result<MessageBody> {
        if self.broken.read().unwrap().as_deref() == Some(message.id.as_str()) {
            return Err(anyhow!("Message fetch failed: 500 Internal Server Error"));
        }
        self.messages
            .read()
            .unwrap()
            .iter()
            .find(|(id, _)| *id == message.id)
            .map(|(_, body)| body.clone())
            .ok_or_else(|| anyhow!("Message fetch failed: 404 Not Found"))
    }
}

/// Grants the test inbox, or refuses when there is none
pub struct TestAuthorizer {
    pub inbox: Option<Arc<TestInbox>>,
}

#[async_trait]
impl Authorizer for TestAuthorizer {
    async fn authorize(&self) -> Result<Arc<dyn Mailbox>, PaymentError> {
        match &self.inbox {
            Some(inbox) => Ok(inbox.clone()),
            None => Err(PaymentError::CredentialsUnavailable(
                "Error loading credentials.json".to_string(),
            )),
        }
    }
}

/// Creates a test application router backed by a temporary db
/// directory. The returned `TempDir` must outlive the router.
pub async fn test_app_with(inbox: Option<Arc<TestInbox>>) -> (tempfile::TempDir, Router) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = dir.path().join("db");
    let db_path = db_path.to_str().unwrap().to_string();

    let db = async_db(&db_path)
        .await
        .expect("Failed to connect to async db");
    db.call(|conn| {
        initialize_db(conn).expect("Failed to migrate db");
        Ok(())
    })
    .await
    .unwrap();

    let app_config = AppConfig {
        storage_path: dir.path().display().to_string(),
        db_path,
        static_dir: dir.path().join("public").display().to_string(),
        gmail_api_client_id: Some(String::from("test_client_id")),
        gmail_api_client_secret: Some(String::from("test_client_secret")),
        gmail_redirect_uri: String::from("urn:ietf:wg:oauth:2.0:oob"),
        gmail_credentials_path: String::from("test_credentials.json"),
        gmail_account: None,
        gmail_api_url: String::from("http://localhost:1"),
        oauth_token_url: String::from("http://localhost:1/token"),
        scan_query: String::from("subject:payment OR transaction OR upi OR credited OR received"),
        scan_limit: 30,
        fetch_timeout_secs: 5,
        scan_interval_secs: 0,
    };
    let app_state = AppState::new(db, app_config, Arc::new(TestAuthorizer { inbox }));
    (dir, app(Arc::new(app_state)))
}

/// Test app whose mailbox is the given inbox
pub async fn test_app(inbox: Arc<TestInbox>) -> (tempfile::TempDir, Router) {
    test_app_with(Some(inbox)).await
}

pub async fn body_to_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Failed to read body");
    String::from_utf8(bytes.to_vec()).expect("Body is not utf8")
}

pub async fn body_to_json(body: Body) -> serde_json::Value {
    serde_json::from_str(&body_to_string(body).await).expect("Body is not json")
}
