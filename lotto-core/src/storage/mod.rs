pub mod lottery_store;
pub mod settlement_store;
pub mod token_store;

pub use lottery_store::LotteryStore;
pub use settlement_store::SettlementStore;
pub use token_store::TokenStore;

use crate::error::Result;
use rusqlite::Connection;
use std::path::Path;
use tokio::sync::Mutex;

pub struct Storage {
    conn: Mutex<Connection>,
}

impl Storage {
    pub async fn new(db_path: &Path) -> Result<Self> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = db_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let conn = Connection::open(db_path)?;
        let storage = Self {
            conn: Mutex::new(conn),
        };

        storage.init_schema().await?;
        Ok(storage)
    }

    async fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock().await;

        // Lotteries table; full aggregate state lives in the snapshot column
        conn.execute(
            "CREATE TABLE IF NOT EXISTS lotteries (
                id TEXT PRIMARY KEY,
                name TEXT UNIQUE NOT NULL,
                created_at INTEGER NOT NULL,
                snapshot TEXT NOT NULL
            )",
            [],
        )?;

        // Token ledgers table
        conn.execute(
            "CREATE TABLE IF NOT EXISTS tokens (
                id TEXT PRIMARY KEY,
                name TEXT UNIQUE NOT NULL,
                created_at INTEGER NOT NULL,
                snapshot TEXT NOT NULL
            )",
            [],
        )?;

        // One settlement per lottery, ever
        conn.execute(
            "CREATE TABLE IF NOT EXISTS settlements (
                lottery_id TEXT PRIMARY KEY,
                lottery_name TEXT NOT NULL,
                winner TEXT,
                amount_disbursed INTEGER NOT NULL,
                operator_take INTEGER NOT NULL,
                settled_at INTEGER NOT NULL
            )",
            [],
        )?;

        Ok(())
    }

    pub async fn get_connection(&self) -> tokio::sync::MutexGuard<'_, Connection> {
        self.conn.lock().await
    }
}
