use crate::error::{LottoError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How ticket purchases are funded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FundingMedium {
    /// Value attached to the purchase buys tickets 1:1.
    BaseCurrency,
    /// Tickets are paid by redeeming balance on the named token ledger,
    /// at `ticket_price` units per ticket.
    Token { ledger: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LotteryConfig {
    /// Length of the entry window, starting at creation.
    pub duration: Duration,
    /// Maximum tickets sellable across the whole lottery.
    pub ticket_capacity: u64,
    /// Token units per ticket; 0 in base-currency mode.
    pub ticket_price: u64,
    pub funding: FundingMedium,
}

impl LotteryConfig {
    pub fn base_currency(duration: Duration, ticket_capacity: u64) -> Self {
        Self {
            duration,
            ticket_capacity,
            ticket_price: 0,
            funding: FundingMedium::BaseCurrency,
        }
    }

    pub fn token(
        duration: Duration,
        ticket_capacity: u64,
        ticket_price: u64,
        ledger: impl Into<String>,
    ) -> Self {
        Self {
            duration,
            ticket_capacity,
            ticket_price,
            funding: FundingMedium::Token {
                ledger: ledger.into(),
            },
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.ticket_capacity == 0 {
            return Err(LottoError::config("Ticket capacity must be greater than 0"));
        }

        match &self.funding {
            FundingMedium::BaseCurrency => {
                if self.ticket_price != 0 {
                    return Err(LottoError::config(
                        "Base-currency lotteries price tickets 1:1; ticket price must be 0",
                    ));
                }
            }
            FundingMedium::Token { ledger } => {
                if ledger.is_empty() {
                    return Err(LottoError::config("Token ledger name cannot be empty"));
                }
                if self.ticket_price == 0 {
                    return Err(LottoError::config(
                        "Token-funded lotteries need a ticket price greater than 0",
                    ));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_currency_config_is_valid() {
        let config = LotteryConfig::base_currency(Duration::from_secs(3600), 1000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_capacity_rejected() {
        let config = LotteryConfig::base_currency(Duration::from_secs(3600), 0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn token_config_requires_price() {
        let mut config = LotteryConfig::token(Duration::from_secs(3600), 1000, 11, "slt");
        assert!(config.validate().is_ok());

        config.ticket_price = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn base_currency_config_rejects_price() {
        let mut config = LotteryConfig::base_currency(Duration::from_secs(3600), 1000);
        config.ticket_price = 5;
        assert!(config.validate().is_err());
    }
}
