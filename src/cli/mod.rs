use anyhow::Result;
use clap::{Parser, Subcommand};
use std::env;

pub mod auth;
pub mod init;
pub mod scan;
pub mod serve;

use auth::ServiceKind;

#[derive(Subcommand)]
enum Command {
    /// Initialize the db
    Init {
        #[arg(long, action, default_value = "false")]
        db: bool,
    },
    /// Run the API server
    Serve {
        /// Set the server host address
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Set the server port
        #[arg(long, default_value = "3000")]
        port: String,
    },
    /// Perform OAuth authentication and store the refresh token
    Auth {
        #[arg(long, value_enum)]
        service: ServiceKind,
    },
    /// Scan the inbox once and print the payments found
    Scan {
        /// Maximum number of messages to examine
        #[arg(long)]
        limit: Option<usize>,
    },
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

pub async fn run() -> Result<()> {
    let args = Cli::parse();

    let storage_path = env::var("PAYSCAN_STORAGE_PATH").unwrap_or("./".to_string());
    let db_path = format!("{}/db", storage_path);

    // Handle each sub command
    match args.command {
        Some(Command::Init { db }) => {
            init::run(db, &db_path).await?;
        }
        Some(Command::Serve { host, port }) => {
            serve::run(host, port).await?;
        }
        Some(Command::Auth { service }) => {
            auth::run(service).await?;
        }
        Some(Command::Scan { limit }) => {
            scan::run(limit).await?;
        }
        None => {}
    }

    Ok(())
}
