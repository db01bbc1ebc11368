use crate::error::Result;
use crate::lottery::Lottery;
use crate::storage::Storage;
use rusqlite::{params, Connection};

pub struct LotteryStore<'a> {
    storage: &'a Storage,
}

impl<'a> LotteryStore<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    pub async fn save(&self, lottery: &Lottery) -> Result<()> {
        let conn = self.storage.get_connection().await;
        Self::put(&conn, lottery)
    }

    /// Write a snapshot on an already-held connection, so callers can batch
    /// several writes into one transaction.
    pub fn put(conn: &Connection, lottery: &Lottery) -> Result<()> {
        let snapshot = serde_json::to_string(lottery)?;

        conn.execute(
            "INSERT OR REPLACE INTO lotteries (id, name, created_at, snapshot)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                lottery.id().to_string(),
                lottery.name(),
                lottery.created_at().timestamp(),
                snapshot,
            ],
        )?;

        Ok(())
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<Lottery>> {
        let conn = self.storage.get_connection().await;

        let mut stmt = conn.prepare("SELECT snapshot FROM lotteries WHERE name = ?1")?;
        let mut rows = stmt.query(params![name])?;

        match rows.next()? {
            Some(row) => {
                let snapshot: String = row.get(0)?;
                Ok(Some(serde_json::from_str(&snapshot)?))
            }
            None => Ok(None),
        }
    }

    pub async fn list(&self) -> Result<Vec<Lottery>> {
        let conn = self.storage.get_connection().await;

        let mut stmt =
            conn.prepare("SELECT snapshot FROM lotteries ORDER BY created_at DESC")?;
        let snapshot_iter = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut lotteries = Vec::new();
        for snapshot in snapshot_iter {
            lotteries.push(serde_json::from_str(&snapshot?)?);
        }

        Ok(lotteries)
    }

    pub async fn exists(&self, name: &str) -> Result<bool> {
        let conn = self.storage.get_connection().await;

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM lotteries WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )?;

        Ok(count > 0)
    }
}
