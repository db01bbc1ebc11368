//! Time-boxed lottery engine.
//!
//! Participants buy tickets while an entry window is open, either with
//! base-currency value (1 unit = 1 ticket) or by redeeming balance on a
//! fungible token ledger at a fixed price per ticket. Once the window closes,
//! anyone may trigger settlement: one weighted winner is drawn and 90% of the
//! pooled funds go to them, the remainder to the operator.

pub mod clock;
pub mod draw;
pub mod engine;
pub mod error;
pub mod lottery;
pub mod storage;
pub mod token;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use draw::{EntropySource, FixedEntropy, OsEntropy};
pub use engine::LottoEngine;
pub use error::{LottoError, Result};
pub use lottery::{FundingMedium, Lottery, LotteryConfig, LotteryInfo, LotteryPhase};
pub use token::TokenLedger;
pub use types::{AccountId, Settlement};

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_engine_creation() {
        let temp_dir = tempdir().unwrap();
        let engine = LottoEngine::new(temp_dir.path()).await.unwrap();

        let config = LotteryConfig::base_currency(Duration::from_secs(3600), 1000);
        let info = engine
            .create_lottery("smoke", AccountId::from("operator"), config)
            .await
            .unwrap();
        assert_eq!(info.name, "smoke");
        assert_eq!(info.remaining_tickets, 1000);
    }
}
