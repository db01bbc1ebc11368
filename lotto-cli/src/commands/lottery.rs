use clap::Subcommand;
use comfy_table::{presets::UTF8_FULL, Table};
use dialoguer::Confirm;
use lotto_core::{
    AccountId, LottoEngine, LottoError, LotteryConfig, LotteryPhase, Result,
};
use std::time::Duration;

#[derive(Subcommand)]
pub enum LotteryCommands {
    /// Create a new lottery
    Create {
        /// Lottery name
        name: String,
        /// Operator account that retains the 10% cut
        owner: String,
        /// Maximum tickets sellable
        #[arg(short, long)]
        capacity: u64,
        /// Entry window length in seconds
        #[arg(long)]
        duration_secs: u64,
        /// Fund purchases from this token ledger instead of base currency
        #[arg(short, long, requires = "ticket_price")]
        token: Option<String>,
        /// Token units per ticket (token mode only)
        #[arg(short = 'p', long, requires = "token")]
        ticket_price: Option<u64>,
    },
    /// Buy tickets with base-currency value (1 unit = 1 ticket)
    Buy {
        /// Lottery name
        name: String,
        /// Buyer account
        buyer: String,
        /// Attached value
        value: u64,
    },
    /// Settle the lottery: draw the winner and disburse the pool
    End {
        /// Lottery name
        name: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Show lottery status
    Status {
        /// Lottery name
        name: String,
    },
    /// List all lotteries
    List,
    /// List settlement records
    Settlements,
}

pub async fn handle_lottery_command(cmd: LotteryCommands, engine: &LottoEngine) -> Result<()> {
    match cmd {
        LotteryCommands::Create {
            name,
            owner,
            capacity,
            duration_secs,
            token,
            ticket_price,
        } => {
            let duration = Duration::from_secs(duration_secs);
            let config = match (token, ticket_price) {
                (Some(token), Some(price)) => {
                    LotteryConfig::token(duration, capacity, price, token)
                }
                _ => LotteryConfig::base_currency(duration, capacity),
            };

            let info = engine
                .create_lottery(&name, AccountId::from(owner), config)
                .await?;
            println!("Created lottery '{}'", info.name);
            println!("  Capacity: {} tickets", info.ticket_capacity);
            println!("  Entries close: {}", info.end_time.format("%Y-%m-%d %H:%M:%S"));
            match info.funding {
                lotto_core::FundingMedium::BaseCurrency => {
                    println!("  Funding: base currency (1 unit = 1 ticket)");
                }
                lotto_core::FundingMedium::Token { ledger } => {
                    println!(
                        "  Funding: token ledger '{}' at {} per ticket",
                        ledger, info.ticket_price
                    );
                    println!("  Pool account: {}", info.pool_account);
                }
            }
        }

        LotteryCommands::Buy { name, buyer, value } => {
            let tickets = engine
                .buy_tickets(&name, &AccountId::from(buyer.as_str()), value)
                .await?;
            let status = engine.lottery_status(&name).await?;
            println!(
                "{} bought {} tickets in '{}' ({} remaining)",
                buyer, tickets, name, status.remaining_tickets
            );
        }

        LotteryCommands::End { name, yes } => {
            if !yes {
                let confirm = Confirm::new()
                    .with_prompt(format!(
                        "Settle lottery '{}'? The draw is final and cannot be repeated.",
                        name
                    ))
                    .default(false)
                    .interact()
                    .map_err(|e| LottoError::internal(e.to_string()))?;

                if !confirm {
                    println!("Settlement cancelled.");
                    return Ok(());
                }
            }

            let settlement = engine.end_lottery(&name).await?;
            match &settlement.winner {
                Some(winner) => {
                    println!("Lottery '{}' settled.", name);
                    println!("  Winner: {}", winner);
                    println!("  Disbursed: {}", settlement.amount_disbursed);
                    println!("  Operator take: {}", settlement.operator_take);
                }
                None => {
                    println!(
                        "Lottery '{}' settled with no tickets sold; nothing to disburse.",
                        name
                    );
                }
            }
        }

        LotteryCommands::Status { name } => {
            let info = engine.lottery_status(&name).await?;

            println!("Lottery '{}':", info.name);
            println!("  Owner: {}", info.owner);
            match &info.phase {
                LotteryPhase::Open => println!("  Phase: open"),
                LotteryPhase::Settled {
                    winner,
                    amount_disbursed,
                } => match winner {
                    Some(winner) => println!(
                        "  Phase: settled (winner {}, disbursed {})",
                        winner, amount_disbursed
                    ),
                    None => println!("  Phase: settled (no tickets sold)"),
                },
            }
            println!(
                "  Entries close: {}",
                info.end_time.format("%Y-%m-%d %H:%M:%S")
            );
            println!(
                "  Tickets: {} sold / {} capacity ({} remaining)",
                info.tickets_sold, info.ticket_capacity, info.remaining_tickets
            );
            println!("  Pool: {}", info.pool_balance);

            if !info.ticket_balances.is_empty() {
                let mut table = Table::new();
                table.load_preset(UTF8_FULL);
                table.set_header(vec!["Account", "Tickets"]);

                for (account, tickets) in &info.ticket_balances {
                    table.add_row(vec![account.to_string(), tickets.to_string()]);
                }

                println!("{}", table);
            }
        }

        LotteryCommands::List => {
            let lotteries = engine.list_lotteries().await?;
            if lotteries.is_empty() {
                println!("No lotteries found.");
                return Ok(());
            }

            let mut table = Table::new();
            table.load_preset(UTF8_FULL);
            table.set_header(vec!["Name", "Phase", "Sold", "Capacity", "Pool", "Ends"]);

            for info in lotteries {
                let phase = match &info.phase {
                    LotteryPhase::Open => "open".to_string(),
                    LotteryPhase::Settled { .. } => "settled".to_string(),
                };
                table.add_row(vec![
                    info.name.clone(),
                    phase,
                    info.tickets_sold.to_string(),
                    info.ticket_capacity.to_string(),
                    info.pool_balance.to_string(),
                    info.end_time.format("%Y-%m-%d %H:%M").to_string(),
                ]);
            }

            println!("{}", table);
        }

        LotteryCommands::Settlements => {
            let settlements = engine.list_settlements().await?;
            if settlements.is_empty() {
                println!("No settlements recorded.");
                return Ok(());
            }

            let mut table = Table::new();
            table.load_preset(UTF8_FULL);
            table.set_header(vec![
                "Lottery",
                "Winner",
                "Disbursed",
                "Operator take",
                "Settled at",
            ]);

            for settlement in settlements {
                table.add_row(vec![
                    settlement.lottery_name.clone(),
                    settlement
                        .winner
                        .as_ref()
                        .map(|w| w.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                    settlement.amount_disbursed.to_string(),
                    settlement.operator_take.to_string(),
                    settlement.settled_at.format("%Y-%m-%d %H:%M").to_string(),
                ]);
            }

            println!("{}", table);
        }
    }

    Ok(())
}
