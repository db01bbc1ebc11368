use crate::clock::{Clock, SystemClock};
use crate::draw::{EntropySource, OsEntropy};
use crate::error::{LottoError, Result};
use crate::lottery::{FundingMedium, Lottery, LotteryConfig, LotteryInfo};
use crate::storage::{LotteryStore, SettlementStore, Storage, TokenStore};
use crate::token::TokenLedger;
use crate::types::{AccountId, Settlement};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Storage-backed façade over the lottery and token aggregates.
///
/// Owns every named `Lottery` and `TokenLedger`, serializes mutations behind
/// per-aggregate locks, and persists a snapshot after each successful
/// operation. The clock and entropy source come from the host environment;
/// aggregates never read time or randomness on their own.
pub struct LottoEngine {
    storage: Arc<Storage>,
    lotteries: Arc<RwLock<HashMap<String, Arc<Mutex<Lottery>>>>>,
    tokens: Arc<RwLock<HashMap<String, Arc<Mutex<TokenLedger>>>>>,
    clock: Arc<dyn Clock>,
    entropy: Arc<dyn EntropySource>,
}

impl LottoEngine {
    pub async fn new(data_dir: &Path) -> Result<Self> {
        Self::with_env(data_dir, Arc::new(SystemClock), Arc::new(OsEntropy)).await
    }

    pub async fn with_env(
        data_dir: &Path,
        clock: Arc<dyn Clock>,
        entropy: Arc<dyn EntropySource>,
    ) -> Result<Self> {
        let db_path = data_dir.join("lotto.db");
        let storage = Arc::new(Storage::new(&db_path).await?);

        Ok(Self {
            storage,
            lotteries: Arc::new(RwLock::new(HashMap::new())),
            tokens: Arc::new(RwLock::new(HashMap::new())),
            clock,
            entropy,
        })
    }

    pub async fn create_lottery(
        &self,
        name: &str,
        owner: AccountId,
        config: LotteryConfig,
    ) -> Result<LotteryInfo> {
        let store = LotteryStore::new(&self.storage);
        if store.exists(name).await? {
            return Err(LottoError::config(format!(
                "Lottery '{}' already exists",
                name
            )));
        }

        // A token-funded lottery needs its funding medium in place first
        if let FundingMedium::Token { ledger } = &config.funding {
            if !TokenStore::new(&self.storage).exists(ledger).await? {
                return Err(LottoError::TokenNotFound {
                    name: ledger.clone(),
                });
            }
        }

        let lottery = Lottery::new(name, owner, config, self.clock.now())?;
        store.save(&lottery).await?;
        let info = lottery.info();

        {
            let mut lotteries = self.lotteries.write();
            lotteries.insert(name.to_string(), Arc::new(Mutex::new(lottery)));
        }

        tracing::info!("Created lottery '{}' (ends {})", name, info.end_time);
        Ok(info)
    }

    pub async fn create_token(
        &self,
        name: &str,
        owner: AccountId,
        total_supply: u64,
    ) -> Result<()> {
        let store = TokenStore::new(&self.storage);
        if store.exists(name).await? {
            return Err(LottoError::config(format!(
                "Token ledger '{}' already exists",
                name
            )));
        }

        let token = TokenLedger::new(name, owner, total_supply, self.clock.now())?;
        store.save(&token).await?;

        {
            let mut tokens = self.tokens.write();
            tokens.insert(name.to_string(), Arc::new(Mutex::new(token)));
        }

        tracing::info!("Created token ledger '{}' with supply {}", name, total_supply);
        Ok(())
    }

    /// Base-currency purchase: attached `value` buys tickets 1:1.
    pub async fn buy_tickets(
        &self,
        lottery_name: &str,
        buyer: &AccountId,
        value: u64,
    ) -> Result<u64> {
        let handle = self.load_lottery(lottery_name).await?;
        let mut lottery = handle.lock();

        let tickets = lottery.buy_tickets(buyer, value, self.clock.now())?;
        LotteryStore::new(&self.storage).save(&lottery).await?;

        Ok(tickets)
    }

    pub async fn transfer(
        &self,
        token_name: &str,
        from: &AccountId,
        to: &AccountId,
        amount: u64,
    ) -> Result<()> {
        let handle = self.load_token(token_name).await?;
        let mut token = handle.lock();

        token.transfer(from, to, amount)?;
        TokenStore::new(&self.storage).save(&token).await?;

        Ok(())
    }

    /// Token-mode purchase: redeems the buyer's token balance for tickets.
    /// Both ledgers change together or not at all; the snapshots are written
    /// in one storage transaction.
    pub async fn exchange_for_tickets(
        &self,
        token_name: &str,
        lottery_name: &str,
        buyer: &AccountId,
        ticket_count: u64,
    ) -> Result<u64> {
        let token_handle = self.load_token(token_name).await?;
        let lottery_handle = self.load_lottery(lottery_name).await?;
        let mut token = token_handle.lock();
        let mut lottery = lottery_handle.lock();

        let cost = token.exchange_for_tickets(buyer, &mut lottery, ticket_count, self.clock.now())?;

        let mut conn = self.storage.get_connection().await;
        let tx = conn.transaction()?;
        LotteryStore::put(&tx, &lottery)?;
        TokenStore::put(&tx, &token)?;
        tx.commit()?;

        Ok(cost)
    }

    /// Settle the lottery: draw a winner with host entropy and disburse 90%
    /// of the pool. In token mode the payout moves real token balance from
    /// the pool account to the winner; the remainder stays in the pool
    /// account under operator control.
    pub async fn end_lottery(&self, lottery_name: &str) -> Result<Settlement> {
        let handle = self.load_lottery(lottery_name).await?;
        let mut lottery = handle.lock();

        let settlement = lottery.end_lottery(self.clock.now(), self.entropy.seed())?;

        match lottery.token_ledger().map(str::to_string) {
            Some(token_name) => {
                let token_handle = self.load_token(&token_name).await?;
                let mut token = token_handle.lock();

                if let Some(winner) = &settlement.winner {
                    if settlement.amount_disbursed > 0 {
                        let pool_account = lottery.pool_account().clone();
                        token.transfer(&pool_account, winner, settlement.amount_disbursed)?;
                    }
                }

                let mut conn = self.storage.get_connection().await;
                let tx = conn.transaction()?;
                LotteryStore::put(&tx, &lottery)?;
                TokenStore::put(&tx, &token)?;
                SettlementStore::put(&tx, &settlement)?;
                tx.commit()?;
            }
            None => {
                let mut conn = self.storage.get_connection().await;
                let tx = conn.transaction()?;
                LotteryStore::put(&tx, &lottery)?;
                SettlementStore::put(&tx, &settlement)?;
                tx.commit()?;
            }
        }

        Ok(settlement)
    }

    pub async fn lottery_status(&self, lottery_name: &str) -> Result<LotteryInfo> {
        let handle = self.load_lottery(lottery_name).await?;
        let lottery = handle.lock();
        Ok(lottery.info())
    }

    pub async fn ticket_balance(&self, lottery_name: &str, account: &AccountId) -> Result<u64> {
        let handle = self.load_lottery(lottery_name).await?;
        let lottery = handle.lock();
        Ok(lottery.ticket_balance(account))
    }

    pub async fn token_balance(&self, token_name: &str, account: &AccountId) -> Result<u64> {
        let handle = self.load_token(token_name).await?;
        let token = handle.lock();
        Ok(token.balance_of(account))
    }

    pub async fn list_lotteries(&self) -> Result<Vec<LotteryInfo>> {
        let store = LotteryStore::new(&self.storage);
        let lotteries = store.list().await?;
        Ok(lotteries.iter().map(Lottery::info).collect())
    }

    pub async fn list_settlements(&self) -> Result<Vec<Settlement>> {
        SettlementStore::new(&self.storage).list().await
    }

    async fn load_lottery(&self, name: &str) -> Result<Arc<Mutex<Lottery>>> {
        // Check cache first
        {
            let lotteries = self.lotteries.read();
            if let Some(handle) = lotteries.get(name) {
                return Ok(handle.clone());
            }
        }

        // Load from storage
        let lottery = LotteryStore::new(&self.storage)
            .find_by_name(name)
            .await?
            .ok_or_else(|| LottoError::LotteryNotFound {
                name: name.to_string(),
            })?;

        let handle = Arc::new(Mutex::new(lottery));
        {
            let mut lotteries = self.lotteries.write();
            lotteries.insert(name.to_string(), handle.clone());
        }

        Ok(handle)
    }

    async fn load_token(&self, name: &str) -> Result<Arc<Mutex<TokenLedger>>> {
        // Check cache first
        {
            let tokens = self.tokens.read();
            if let Some(handle) = tokens.get(name) {
                return Ok(handle.clone());
            }
        }

        // Load from storage
        let token = TokenStore::new(&self.storage)
            .find_by_name(name)
            .await?
            .ok_or_else(|| LottoError::TokenNotFound {
                name: name.to_string(),
            })?;

        let handle = Arc::new(Mutex::new(token));
        {
            let mut tokens = self.tokens.write();
            tokens.insert(name.to_string(), handle.clone());
        }

        Ok(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::draw::FixedEntropy;
    use crate::lottery::LotteryPhase;
    use chrono::Utc;
    use std::time::Duration;
    use tempfile::tempdir;

    fn test_env() -> (Arc<ManualClock>, Arc<dyn EntropySource>) {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let entropy: Arc<dyn EntropySource> = Arc::new(FixedEntropy([42u8; 32]));
        (clock, entropy)
    }

    #[tokio::test]
    async fn base_currency_lifecycle() {
        let temp_dir = tempdir().unwrap();
        let (clock, entropy) = test_env();
        let engine = LottoEngine::with_env(temp_dir.path(), clock.clone(), entropy)
            .await
            .unwrap();

        let config = LotteryConfig::base_currency(Duration::from_secs(3600), 1000);
        engine
            .create_lottery("weekly", AccountId::from("operator"), config)
            .await
            .unwrap();

        let alice = AccountId::from("alice");
        engine.buy_tickets("weekly", &alice, 1000).await.unwrap();

        let status = engine.lottery_status("weekly").await.unwrap();
        assert_eq!(status.remaining_tickets, 0);
        assert_eq!(status.pool_balance, 1000);

        // Early settlement rejected
        let err = engine.end_lottery("weekly").await.unwrap_err();
        assert!(matches!(err, LottoError::LotteryNotYetEnded));

        clock.advance(chrono::Duration::seconds(3601));
        let settlement = engine.end_lottery("weekly").await.unwrap();
        assert_eq!(settlement.winner, Some(alice));
        assert_eq!(settlement.amount_disbursed, 900);
        assert_eq!(settlement.operator_take, 100);

        let err = engine.end_lottery("weekly").await.unwrap_err();
        assert!(matches!(err, LottoError::LotteryAlreadyEnded));

        let settlements = engine.list_settlements().await.unwrap();
        assert_eq!(settlements.len(), 1);
        assert_eq!(settlements[0].lottery_name, "weekly");
    }

    #[tokio::test]
    async fn token_mode_lifecycle() {
        let temp_dir = tempdir().unwrap();
        let (clock, entropy) = test_env();
        let engine = LottoEngine::with_env(temp_dir.path(), clock.clone(), entropy)
            .await
            .unwrap();

        let bank = AccountId::from("bank");
        engine.create_token("slt", bank.clone(), 100_000).await.unwrap();

        let config = LotteryConfig::token(Duration::from_secs(3600), 1000, 11, "slt");
        engine
            .create_lottery("token-run", AccountId::from("operator"), config)
            .await
            .unwrap();

        let alice = AccountId::from("alice");
        engine.transfer("slt", &bank, &alice, 11_000).await.unwrap();
        let cost = engine
            .exchange_for_tickets("slt", "token-run", &alice, 100)
            .await
            .unwrap();
        assert_eq!(cost, 1100);
        assert_eq!(engine.token_balance("slt", &alice).await.unwrap(), 9900);
        assert_eq!(
            engine.ticket_balance("token-run", &alice).await.unwrap(),
            100
        );

        clock.advance(chrono::Duration::seconds(3601));
        let settlement = engine.end_lottery("token-run").await.unwrap();
        assert_eq!(settlement.winner, Some(alice.clone()));
        // 1100 * 90 / 100
        assert_eq!(settlement.amount_disbursed, 990);
        assert_eq!(settlement.operator_take, 110);

        // Payout moved real token balance to the winner
        assert_eq!(engine.token_balance("slt", &alice).await.unwrap(), 10_890);
        let status = engine.lottery_status("token-run").await.unwrap();
        assert_eq!(
            engine.token_balance("slt", &status.pool_account).await.unwrap(),
            110
        );
    }

    #[tokio::test]
    async fn state_survives_reload() {
        let temp_dir = tempdir().unwrap();

        {
            let (clock, entropy) = test_env();
            let engine = LottoEngine::with_env(temp_dir.path(), clock.clone(), entropy)
                .await
                .unwrap();
            let config = LotteryConfig::base_currency(Duration::from_secs(60), 500);
            engine
                .create_lottery("reloaded", AccountId::from("operator"), config)
                .await
                .unwrap();
            engine
                .buy_tickets("reloaded", &AccountId::from("bob"), 42)
                .await
                .unwrap();
        }

        let (clock, entropy) = test_env();
        let engine = LottoEngine::with_env(temp_dir.path(), clock, entropy)
            .await
            .unwrap();
        let status = engine.lottery_status("reloaded").await.unwrap();
        assert_eq!(status.tickets_sold, 42);
        assert_eq!(
            status.ticket_balances.get(&AccountId::from("bob")),
            Some(&42)
        );
        assert!(matches!(status.phase, LotteryPhase::Open));
    }

    #[tokio::test]
    async fn settled_lottery_stays_settled_across_restart() {
        let temp_dir = tempdir().unwrap();
        let start = Utc::now();

        {
            let clock = Arc::new(ManualClock::new(start));
            let engine = LottoEngine::with_env(
                temp_dir.path(),
                clock.clone(),
                Arc::new(FixedEntropy([7u8; 32])),
            )
            .await
            .unwrap();
            let config = LotteryConfig::base_currency(Duration::from_secs(60), 500);
            engine
                .create_lottery("oneshot", AccountId::from("operator"), config)
                .await
                .unwrap();
            engine
                .buy_tickets("oneshot", &AccountId::from("bob"), 100)
                .await
                .unwrap();
            clock.advance(chrono::Duration::seconds(61));
            engine.end_lottery("oneshot").await.unwrap();
        }

        let clock = Arc::new(ManualClock::new(start + chrono::Duration::seconds(120)));
        let engine = LottoEngine::with_env(
            temp_dir.path(),
            clock,
            Arc::new(FixedEntropy([7u8; 32])),
        )
        .await
        .unwrap();

        let err = engine.end_lottery("oneshot").await.unwrap_err();
        assert!(matches!(err, LottoError::LotteryAlreadyEnded));
        let err = engine
            .buy_tickets("oneshot", &AccountId::from("bob"), 1)
            .await
            .unwrap_err();
        assert!(matches!(err, LottoError::LotteryAlreadyEnded));
    }

    #[tokio::test]
    async fn duplicate_and_missing_names_rejected() {
        let temp_dir = tempdir().unwrap();
        let (clock, entropy) = test_env();
        let engine = LottoEngine::with_env(temp_dir.path(), clock, entropy)
            .await
            .unwrap();

        let config = LotteryConfig::base_currency(Duration::from_secs(60), 500);
        engine
            .create_lottery("dup", AccountId::from("operator"), config.clone())
            .await
            .unwrap();
        let err = engine
            .create_lottery("dup", AccountId::from("operator"), config)
            .await
            .unwrap_err();
        assert!(matches!(err, LottoError::Config(_)));

        let err = engine
            .buy_tickets("nope", &AccountId::from("alice"), 1)
            .await
            .unwrap_err();
        assert!(matches!(err, LottoError::LotteryNotFound { .. }));

        // Token-funded lottery requires the token ledger to exist
        let config = LotteryConfig::token(Duration::from_secs(60), 500, 2, "ghost");
        let err = engine
            .create_lottery("ghost-run", AccountId::from("operator"), config)
            .await
            .unwrap_err();
        assert!(matches!(err, LottoError::TokenNotFound { .. }));
    }
}
