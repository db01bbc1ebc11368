use crate::draw;
use crate::error::{LottoError, Result};
use crate::lottery::config::{FundingMedium, LotteryConfig};
use crate::types::{AccountId, Settlement};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Lifecycle of a lottery. Tickets sell only while `Open`; `Settled` is
/// terminal and records the draw outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LotteryPhase {
    Open,
    Settled {
        winner: Option<AccountId>,
        amount_disbursed: u64,
    },
}

/// The ticket ledger and settlement state machine for one lottery.
///
/// All mutation goes through the entry points below; fields stay private so
/// the ticket-sum and capacity invariants are enforced in one place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lottery {
    id: Uuid,
    name: String,
    owner: AccountId,
    created_at: DateTime<Utc>,
    end_time: DateTime<Utc>,
    ticket_price: u64,
    ticket_capacity: u64,
    tickets_sold: u64,
    ticket_balances: BTreeMap<AccountId, u64>,
    pool_balance: u64,
    pool_account: AccountId,
    phase: LotteryPhase,
    funding: FundingMedium,
}

impl Lottery {
    pub fn new(
        name: impl Into<String>,
        owner: AccountId,
        config: LotteryConfig,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        config.validate()?;

        let duration = chrono::Duration::from_std(config.duration)
            .map_err(|e| LottoError::config(format!("Invalid duration: {}", e)))?;

        let id = Uuid::new_v4();
        let pool_account = AccountId::from(format!("lottery-pool-{}", id));

        Ok(Self {
            id,
            name: name.into(),
            owner,
            created_at: now,
            end_time: now + duration,
            ticket_price: config.ticket_price,
            ticket_capacity: config.ticket_capacity,
            tickets_sold: 0,
            ticket_balances: BTreeMap::new(),
            pool_balance: 0,
            pool_account,
            phase: LotteryPhase::Open,
            funding: config.funding,
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

    /// Absolute close of the entry window.
    pub fn end_time(&self) -> DateTime<Utc> {
        self.end_time
    }

    pub fn ticket_price(&self) -> u64 {
        self.ticket_price
    }

    pub fn ticket_capacity(&self) -> u64 {
        self.ticket_capacity
    }

    pub fn tickets_sold(&self) -> u64 {
        self.tickets_sold
    }

    pub fn remaining_tickets(&self) -> u64 {
        self.ticket_capacity - self.tickets_sold
    }

    /// Pooled funds awaiting settlement (or retained by the operator after).
    pub fn pool_balance(&self) -> u64 {
        self.pool_balance
    }

    /// Account the funding medium credits ticket payments to.
    pub fn pool_account(&self) -> &AccountId {
        &self.pool_account
    }

    pub fn phase(&self) -> &LotteryPhase {
        &self.phase
    }

    pub fn funding(&self) -> &FundingMedium {
        &self.funding
    }

    /// Name of the backing token ledger, if token funded.
    pub fn token_ledger(&self) -> Option<&str> {
        match &self.funding {
            FundingMedium::Token { ledger } => Some(ledger),
            FundingMedium::BaseCurrency => None,
        }
    }

    /// Tickets held by `account`; 0 for accounts that never bought.
    pub fn ticket_balance(&self, account: &AccountId) -> u64 {
        self.ticket_balances.get(account).copied().unwrap_or(0)
    }

    pub fn ticket_balances(&self) -> &BTreeMap<AccountId, u64> {
        &self.ticket_balances
    }

    pub fn is_open(&self, now: DateTime<Utc>) -> bool {
        matches!(self.phase, LotteryPhase::Open) && now < self.end_time
    }

    /// Buy tickets with attached base-currency value, 1 smallest unit = 1
    /// ticket. The value stays in the pool until settlement.
    pub fn buy_tickets(&mut self, buyer: &AccountId, value: u64, now: DateTime<Utc>) -> Result<u64> {
        if self.funding != FundingMedium::BaseCurrency {
            return Err(LottoError::wrong_funding(format!(
                "Lottery '{}' sells tickets through its token ledger",
                self.name
            )));
        }

        self.admit(value, now)?;
        self.record_purchase(buyer, value, value);

        Ok(value)
    }

    /// Token-mode ticket credit, reachable only through the registered
    /// funding medium's exchange call. Returns the cost the caller must have
    /// already verified the buyer can cover.
    pub(crate) fn credit_tickets(
        &mut self,
        buyer: &AccountId,
        ticket_count: u64,
        now: DateTime<Utc>,
    ) -> Result<u64> {
        if !matches!(self.funding, FundingMedium::Token { .. }) {
            return Err(LottoError::wrong_funding(format!(
                "Lottery '{}' takes base-currency purchases only",
                self.name
            )));
        }

        self.admit(ticket_count, now)?;
        let cost = ticket_count
            .checked_mul(self.ticket_price)
            .ok_or(LottoError::InvalidAmount)?;
        self.record_purchase(buyer, ticket_count, cost);

        Ok(cost)
    }

    /// Settle the lottery: draw the winner from `seed`, disburse 90% of the
    /// pool (integer floor), retain the remainder for the operator. Callable
    /// by anyone once the entry window has closed; executes at most once.
    ///
    /// With zero tickets sold the lottery still settles, with no winner and
    /// no disbursement.
    pub fn end_lottery(&mut self, now: DateTime<Utc>, seed: [u8; 32]) -> Result<Settlement> {
        if matches!(self.phase, LotteryPhase::Settled { .. }) {
            return Err(LottoError::LotteryAlreadyEnded);
        }
        if now < self.end_time {
            return Err(LottoError::LotteryNotYetEnded);
        }

        let winner = draw::pick_winner(&self.ticket_balances, self.tickets_sold, seed);
        let amount_disbursed = match winner {
            // Floor division; the remainder stays with the operator
            Some(_) => (self.pool_balance as u128 * 90 / 100) as u64,
            None => 0,
        };
        let operator_take = self.pool_balance - amount_disbursed;

        self.pool_balance -= amount_disbursed;
        self.phase = LotteryPhase::Settled {
            winner: winner.clone(),
            amount_disbursed,
        };

        match &winner {
            Some(account) => tracing::info!(
                "Lottery '{}' settled: winner {}, disbursed {}",
                self.name,
                account,
                amount_disbursed
            ),
            None => tracing::info!("Lottery '{}' settled with no tickets sold", self.name),
        }

        Ok(Settlement {
            lottery_id: self.id,
            lottery_name: self.name.clone(),
            winner,
            amount_disbursed,
            operator_take,
            settled_at: now,
        })
    }

    /// Eligibility checks shared by both purchase paths. Nothing mutates
    /// until every check has passed.
    fn admit(&self, requested: u64, now: DateTime<Utc>) -> Result<()> {
        if requested == 0 {
            return Err(LottoError::InvalidAmount);
        }

        if !self.is_open(now) {
            return Err(LottoError::LotteryAlreadyEnded);
        }

        let remaining = self.remaining_tickets();
        if requested > remaining {
            return Err(LottoError::TicketBalanceOverflow {
                requested,
                remaining,
            });
        }

        Ok(())
    }

    fn record_purchase(&mut self, buyer: &AccountId, tickets: u64, funds: u64) {
        *self.ticket_balances.entry(buyer.clone()).or_insert(0) += tickets;
        self.tickets_sold += tickets;
        self.pool_balance += funds;

        tracing::info!(
            "{} bought {} tickets in lottery '{}' ({} remaining)",
            buyer,
            tickets,
            self.name,
            self.remaining_tickets()
        );
    }

    pub fn info(&self) -> LotteryInfo {
        LotteryInfo {
            id: self.id,
            name: self.name.clone(),
            owner: self.owner.clone(),
            phase: self.phase.clone(),
            end_time: self.end_time,
            funding: self.funding.clone(),
            ticket_price: self.ticket_price,
            ticket_capacity: self.ticket_capacity,
            tickets_sold: self.tickets_sold,
            remaining_tickets: self.remaining_tickets(),
            pool_balance: self.pool_balance,
            pool_account: self.pool_account.clone(),
            ticket_balances: self.ticket_balances.clone(),
        }
    }
}

/// Lottery snapshot for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LotteryInfo {
    pub id: Uuid,
    pub name: String,
    pub owner: AccountId,
    pub phase: LotteryPhase,
    pub end_time: DateTime<Utc>,
    pub funding: FundingMedium,
    pub ticket_price: u64,
    pub ticket_capacity: u64,
    pub tickets_sold: u64,
    pub remaining_tickets: u64,
    pub pool_balance: u64,
    pub pool_account: AccountId,
    pub ticket_balances: BTreeMap<AccountId, u64>,
}
