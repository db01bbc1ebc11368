pub mod config;
pub mod ledger;

pub use config::{FundingMedium, LotteryConfig};
pub use ledger::{Lottery, LotteryInfo, LotteryPhase};
