use crate::error::{LottoError, Result};
use crate::lottery::Lottery;
use crate::types::AccountId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Fungible balance store backing token-funded lotteries.
///
/// The creator receives the entire supply at creation; the sum of all
/// balances equals `total_supply` forever after. Value moves only through
/// [`transfer`](TokenLedger::transfer) and
/// [`exchange_for_tickets`](TokenLedger::exchange_for_tickets).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenLedger {
    id: Uuid,
    name: String,
    owner: AccountId,
    created_at: DateTime<Utc>,
    total_supply: u64,
    balances: BTreeMap<AccountId, u64>,
}

impl TokenLedger {
    pub fn new(
        name: impl Into<String>,
        owner: AccountId,
        total_supply: u64,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        if total_supply == 0 {
            return Err(LottoError::config("Total supply must be greater than 0"));
        }

        let mut balances = BTreeMap::new();
        balances.insert(owner.clone(), total_supply);

        Ok(Self {
            id: Uuid::new_v4(),
            name: name.into(),
            owner,
            created_at: now,
            total_supply,
            balances,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn owner(&self) -> &AccountId {
        &self.owner
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn total_supply(&self) -> u64 {
        self.total_supply
    }

    /// Current balance; 0 for accounts that never received tokens.
    pub fn balance_of(&self, account: &AccountId) -> u64 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    /// Move `amount` from `from` to `to`. All checks precede any mutation;
    /// there is no partial transfer.
    pub fn transfer(&mut self, from: &AccountId, to: &AccountId, amount: u64) -> Result<()> {
        if amount == 0 {
            return Err(LottoError::InvalidAmount);
        }

        let available = self.balance_of(from);
        if available < amount {
            return Err(LottoError::InsufficientBalance {
                need: amount,
                available,
            });
        }

        self.debit(from, amount);
        self.credit(to, amount);

        tracing::info!(
            "Transferred {} {} from {} to {}",
            amount,
            self.name,
            from,
            to
        );
        Ok(())
    }

    /// Redeem `spender`'s balance for lottery tickets at the lottery's
    /// ticket price: debits the spender, credits the lottery's pool account,
    /// and records the tickets, as one all-or-nothing operation.
    ///
    /// The ticket credit runs first and its result is checked before any
    /// balance moves, so a rejected credit (window closed, capacity hit)
    /// leaves both ledgers untouched.
    pub fn exchange_for_tickets(
        &mut self,
        spender: &AccountId,
        lottery: &mut Lottery,
        ticket_count: u64,
        now: DateTime<Utc>,
    ) -> Result<u64> {
        if ticket_count == 0 {
            return Err(LottoError::InvalidAmount);
        }

        match lottery.token_ledger() {
            Some(ledger) if ledger == self.name => {}
            _ => {
                return Err(LottoError::wrong_funding(format!(
                    "Lottery '{}' is not funded by token ledger '{}'",
                    lottery.name(),
                    self.name
                )))
            }
        }

        let cost = ticket_count
            .checked_mul(lottery.ticket_price())
            .ok_or(LottoError::InvalidAmount)?;
        let available = self.balance_of(spender);
        if available < cost {
            return Err(LottoError::InsufficientBalance {
                need: cost,
                available,
            });
        }

        // Credit tickets first; only a successful credit commits the debit
        let cost = lottery.credit_tickets(spender, ticket_count, now)?;
        self.debit(spender, cost);
        self.credit(&lottery.pool_account().clone(), cost);

        tracing::info!(
            "{} exchanged {} {} for {} tickets in lottery '{}'",
            spender,
            cost,
            self.name,
            ticket_count,
            lottery.name()
        );
        Ok(cost)
    }

    fn debit(&mut self, account: &AccountId, amount: u64) {
        if let Some(balance) = self.balances.get_mut(account) {
            *balance -= amount;
        }
    }

    fn credit(&mut self, account: &AccountId, amount: u64) {
        *self.balances.entry(account.clone()).or_insert(0) += amount;
    }
}
