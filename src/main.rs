use anyhow::Result;
use payscan::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run().await
}
