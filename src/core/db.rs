//! Sqlite storage for OAuth refresh tokens

use anyhow::{Context, Result};
use rusqlite::OptionalExtension;
use tokio_rusqlite::Connection;

const DB_FILE: &str = "payscan.sqlite";

/// Open (creating if needed) the database in the `db_path` directory
pub async fn async_db(db_path: &str) -> Result<Connection> {
    std::fs::create_dir_all(db_path)
        .with_context(|| format!("Failed to create db directory {}", db_path))?;
    let path = format!("{}/{}", db_path, DB_FILE);
    let conn = Connection::open(&path)
        .await
        .with_context(|| format!("Failed to open db at {}", path))?;
    Ok(conn)
}

pub fn initialize_db(conn: &rusqlite::Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS auth (
            id TEXT PRIMARY KEY,
            service TEXT NOT NULL,
            refresh_token TEXT NOT NULL
        );",
    )
}

pub async fn save_refresh_token(
    db: &Connection,
    account: &str,
    service: &str,
    refresh_token: &str,
) -> Result<()> {
    let account = account.to_string();
    let service = service.to_string();
    let refresh_token = refresh_token.to_string();
    db.call(move |conn| {
        conn.execute(
            "INSERT INTO auth (id, service, refresh_token) VALUES (?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET service = excluded.service, refresh_token = excluded.refresh_token",
            (&account, &service, &refresh_token),
        )?;
        Ok(())
    })
    .await?;
    Ok(())
}

/// Refresh token for `account`, or for the first gmail account on
/// record when none is given. Returns the account id with the token.
pub async fn find_gmail_refresh_token(
    db: &Connection,
    account: Option<String>,
) -> Result<Option<(String, String)>> {
    let row: Option<(String, String)> = db
        .call(move |conn| {
            let row = conn
                .prepare(
                    "SELECT id, refresh_token FROM auth
                     WHERE service = 'gmail' AND (?1 IS NULL OR id = ?1)
                     ORDER BY id LIMIT 1",
                )?
                .query_row([account], |row| Ok((row.get(0)?, row.get(1)?)))
                .optional()?;
            Ok(row)
        })
        .await?;
    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_db() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let db = async_db(dir.path().to_str().unwrap()).await.unwrap();
        db.call(|conn| {
            initialize_db(conn)?;
            Ok(())
        })
        .await
        .unwrap();
        (dir, db)
    }

    #[tokio::test]
    async fn it_finds_nothing_in_an_empty_db() {
        let (_dir, db) = test_db().await;
        assert!(find_gmail_refresh_token(&db, None).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn it_upserts_and_finds_refresh_tokens() {
        let (_dir, db) = test_db().await;
        save_refresh_token(&db, "b@x.com", "gmail", "tok-b").await.unwrap();
        save_refresh_token(&db, "a@x.com", "gmail", "old").await.unwrap();
        save_refresh_token(&db, "a@x.com", "gmail", "tok-a").await.unwrap();

        let first = find_gmail_refresh_token(&db, None).await.unwrap();
        assert_eq!(first, Some(("a@x.com".to_string(), "tok-a".to_string())));

        let named = find_gmail_refresh_token(&db, Some("b@x.com".to_string()))
            .await
            .unwrap();
        assert_eq!(named, Some(("b@x.com".to_string(), "tok-b".to_string())));

        let missing = find_gmail_refresh_token(&db, Some("c@x.com".to_string()))
            .await
            .unwrap();
        assert!(missing.is_none());
    }
}
