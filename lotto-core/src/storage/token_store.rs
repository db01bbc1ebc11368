use crate::error::Result;
use crate::storage::Storage;
use crate::token::TokenLedger;
use rusqlite::{params, Connection};

pub struct TokenStore<'a> {
    storage: &'a Storage,
}

impl<'a> TokenStore<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    pub async fn save(&self, token: &TokenLedger) -> Result<()> {
        let conn = self.storage.get_connection().await;
        Self::put(&conn, token)
    }

    pub fn put(conn: &Connection, token: &TokenLedger) -> Result<()> {
        let snapshot = serde_json::to_string(token)?;

        conn.execute(
            "INSERT OR REPLACE INTO tokens (id, name, created_at, snapshot)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                token.id().to_string(),
                token.name(),
                token.created_at().timestamp(),
                snapshot,
            ],
        )?;

        Ok(())
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<TokenLedger>> {
        let conn = self.storage.get_connection().await;

        let mut stmt = conn.prepare("SELECT snapshot FROM tokens WHERE name = ?1")?;
        let mut rows = stmt.query(params![name])?;

        match rows.next()? {
            Some(row) => {
                let snapshot: String = row.get(0)?;
                Ok(Some(serde_json::from_str(&snapshot)?))
            }
            None => Ok(None),
        }
    }

    pub async fn exists(&self, name: &str) -> Result<bool> {
        let conn = self.storage.get_connection().await;

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM tokens WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )?;

        Ok(count > 0)
    }
}
