use anyhow::{Context, Result, anyhow};
use std::io::{self, Write};

use crate::core::AppConfig;
use crate::core::db::{async_db, initialize_db, save_refresh_token};
use crate::google::oauth::{ClientCredentials, consent_url, exchange_code_for_token};

#[derive(clap::ValueEnum, Clone)]
pub enum ServiceKind {
    Gmail,
}

impl ServiceKind {
    pub fn to_str(&self) -> &'static str {
        match self {
            ServiceKind::Gmail => "gmail",
        }
    }
}

fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin()
        .read_line(&mut line)
        .context("Failed to read from stdin")?;
    Ok(line.trim().to_owned())
}

pub async fn run(service: ServiceKind) -> Result<()> {
    let config = AppConfig::default();

    match service {
        ServiceKind::Gmail => {
            let user_email = prompt("Enter the email address you are authenticating: ")?;
            let credentials = ClientCredentials::resolve(&config)?;

            println!(
                "\nPlease open the following URL in your browser and authorize access:\n\n{}\n",
                consent_url(&credentials.client_id, &config.gmail_redirect_uri)
            );
            let code = prompt("Paste the authorization code shown by Google here: ")?;

            let token = exchange_code_for_token(
                &config.oauth_token_url,
                &credentials,
                &code,
                &config.gmail_redirect_uri,
            )
            .await?;

            // Store the refresh token in the DB and use that to fetch an access token from now on.
            let refresh_token = token
                .refresh_token
                .ok_or(anyhow!("No refresh token in response"))?;
            let db = async_db(&config.db_path).await?;
            db.call(|conn| {
                initialize_db(conn)?;
                Ok(())
            })
            .await?;
            save_refresh_token(&db, &user_email, service.to_str(), &refresh_token).await?;
            println!("Refresh token for {} saved to DB.", user_email);
        }
    }

    Ok(())
}
