use clap::Subcommand;
use lotto_core::{AccountId, LottoEngine, Result};

#[derive(Subcommand)]
pub enum TokenCommands {
    /// Create a new token ledger; the owner receives the entire supply
    Create {
        /// Token ledger name
        name: String,
        /// Owner account
        owner: String,
        /// Total supply, fixed at creation
        supply: u64,
    },
    /// Transfer tokens between accounts
    Transfer {
        /// Token ledger name
        name: String,
        /// Sender account
        from: String,
        /// Recipient account
        to: String,
        /// Amount to move
        amount: u64,
    },
    /// Show an account's balance
    Balance {
        /// Token ledger name
        name: String,
        /// Account to query
        account: String,
    },
    /// Redeem token balance for lottery tickets
    Exchange {
        /// Token ledger name
        name: String,
        /// Target lottery
        lottery: String,
        /// Buyer account
        buyer: String,
        /// Number of tickets to buy
        tickets: u64,
    },
}

pub async fn handle_token_command(cmd: TokenCommands, engine: &LottoEngine) -> Result<()> {
    match cmd {
        TokenCommands::Create {
            name,
            owner,
            supply,
        } => {
            engine
                .create_token(&name, AccountId::from(owner.as_str()), supply)
                .await?;
            println!(
                "Created token ledger '{}'; {} holds the full supply of {}",
                name, owner, supply
            );
        }

        TokenCommands::Transfer {
            name,
            from,
            to,
            amount,
        } => {
            engine
                .transfer(
                    &name,
                    &AccountId::from(from.as_str()),
                    &AccountId::from(to.as_str()),
                    amount,
                )
                .await?;
            println!("Transferred {} {} from {} to {}", amount, name, from, to);
        }

        TokenCommands::Balance { name, account } => {
            let balance = engine
                .token_balance(&name, &AccountId::from(account.as_str()))
                .await?;
            println!("{} holds {} {}", account, balance, name);
        }

        TokenCommands::Exchange {
            name,
            lottery,
            buyer,
            tickets,
        } => {
            let cost = engine
                .exchange_for_tickets(&name, &lottery, &AccountId::from(buyer.as_str()), tickets)
                .await?;
            println!(
                "{} exchanged {} {} for {} tickets in '{}'",
                buyer, cost, name, tickets, lottery
            );
        }
    }

    Ok(())
}
