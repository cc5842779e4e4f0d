use std::sync::Arc;

use anyhow::Result;
use tokio_rusqlite::Connection;

use crate::core::AppConfig;
use crate::core::db::{async_db, initialize_db};
use crate::google::oauth::GmailAuthorizer;
use crate::payments::{Authorizer, PaymentService};

pub struct AppState {
    pub db: Connection,
    pub config: AppConfig,
    // Evidence and submissions live here for the lifetime of the server
    pub payments: Arc<PaymentService>,
}

impl AppState {
    pub fn new(db: Connection, config: AppConfig, authorizer: Arc<dyn Authorizer>) -> Self {
        let payments = Arc::new(PaymentService::new(authorizer, config.scan_settings()));
        Self {
            db,
            config,
            payments,
        }
    }

    /// Open the db, make sure the schema exists and wire the Gmail
    /// authorizer in.
    pub async fn from_config(config: AppConfig) -> Result<Self> {
        let db = async_db(&config.db_path).await?;
        db.call(|conn| {
            initialize_db(conn)?;
            Ok(())
        })
        .await?;

        let authorizer = Arc::new(GmailAuthorizer::new(db.clone(), config.clone()));
        Ok(Self::new(db, config, authorizer))
    }
}
