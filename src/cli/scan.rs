use anyhow::Result;

use crate::api::AppState;
use crate::core::{AppConfig, logging};

/// Run a single scan cycle outside the server and print the evidence
/// along with the scan counts
pub async fn run(limit: Option<usize>) -> Result<()> {
    logging::init();

    let state = AppState::from_config(AppConfig::default()).await?;
    let report = match limit {
        Some(limit) => state.payments.run_scan_with_limit(limit).await?,
        None => state.payments.run_scan().await?,
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
