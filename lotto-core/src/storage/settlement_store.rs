use crate::error::{LottoError, Result};
use crate::storage::Storage;
use crate::types::{AccountId, Settlement};
use chrono::Utc;
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

pub struct SettlementStore<'a> {
    storage: &'a Storage,
}

impl<'a> SettlementStore<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    pub async fn save(&self, settlement: &Settlement) -> Result<()> {
        let conn = self.storage.get_connection().await;
        Self::put(&conn, settlement)
    }

    pub fn put(conn: &Connection, settlement: &Settlement) -> Result<()> {
        conn.execute(
            "INSERT INTO settlements
                 (lottery_id, lottery_name, winner, amount_disbursed, operator_take, settled_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                settlement.lottery_id.to_string(),
                settlement.lottery_name,
                settlement.winner.as_ref().map(|w| w.as_str()),
                settlement.amount_disbursed as i64,
                settlement.operator_take as i64,
                settlement.settled_at.timestamp(),
            ],
        )?;

        Ok(())
    }

    pub async fn find_by_lottery(&self, lottery_name: &str) -> Result<Option<Settlement>> {
        let conn = self.storage.get_connection().await;

        let mut stmt = conn.prepare(
            "SELECT lottery_id, lottery_name, winner, amount_disbursed, operator_take, settled_at
             FROM settlements WHERE lottery_name = ?1",
        )?;
        let mut rows = stmt.query(params![lottery_name])?;

        match rows.next()? {
            Some(row) => Ok(Some(Self::from_row(row)?)),
            None => Ok(None),
        }
    }

    pub async fn list(&self) -> Result<Vec<Settlement>> {
        let conn = self.storage.get_connection().await;

        let mut stmt = conn.prepare(
            "SELECT lottery_id, lottery_name, winner, amount_disbursed, operator_take, settled_at
             FROM settlements ORDER BY settled_at DESC",
        )?;
        let mut rows = stmt.query([])?;

        let mut settlements = Vec::new();
        while let Some(row) = rows.next()? {
            settlements.push(Self::from_row(row)?);
        }

        Ok(settlements)
    }

    fn from_row(row: &Row<'_>) -> Result<Settlement> {
        let lottery_id: String = row.get(0)?;
        let winner: Option<String> = row.get(2)?;
        let amount_disbursed: i64 = row.get(3)?;
        let operator_take: i64 = row.get(4)?;
        let settled_at: i64 = row.get(5)?;

        Ok(Settlement {
            lottery_id: Uuid::parse_str(&lottery_id)
                .map_err(|e| LottoError::internal(format!("Invalid lottery id: {}", e)))?,
            lottery_name: row.get(1)?,
            winner: winner.map(AccountId::from),
            amount_disbursed: amount_disbursed as u64,
            operator_take: operator_take as u64,
            settled_at: chrono::DateTime::from_timestamp(settled_at, 0)
                .unwrap_or_else(Utc::now),
        })
    }
}
