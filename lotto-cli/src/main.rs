mod commands;

use clap::{Parser, Subcommand};
use lotto_core::{LottoEngine, LottoError};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "lotto")]
#[command(about = "Time-boxed lottery engine - ticket ledgers and one-shot draws")]
#[command(version)]
struct Cli {
    /// Data directory for ledger storage
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lottery commands
    #[command(subcommand)]
    Lottery(commands::LotteryCommands),

    /// Token ledger commands
    #[command(subcommand)]
    Token(commands::TokenCommands),
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(format!(
            "lotto={},lotto_core={}",
            log_level, log_level
        )))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Get data directory
    let data_dir = cli.data_dir.unwrap_or_else(|| {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("lotto")
    });

    // Ensure data directory exists
    tokio::fs::create_dir_all(&data_dir).await?;

    // Initialize the engine
    let engine = LottoEngine::new(&data_dir).await?;

    // Execute command
    let result = match cli.command {
        Commands::Lottery(cmd) => commands::handle_lottery_command(cmd, &engine).await,
        Commands::Token(cmd) => commands::handle_token_command(cmd, &engine).await,
    };

    if let Err(e) = result {
        match e {
            LottoError::LotteryNotFound { name } => {
                eprintln!("Error: Lottery '{}' not found", name);
                eprintln!("Use 'lotto lottery list' to see available lotteries");
            }
            LottoError::TokenNotFound { name } => {
                eprintln!("Error: Token ledger '{}' not found", name);
            }
            LottoError::InsufficientBalance { need, available } => {
                eprintln!("Error: Insufficient balance");
                eprintln!("Need: {}, Available: {}", need, available);
            }
            LottoError::TicketBalanceOverflow {
                requested,
                remaining,
            } => {
                eprintln!("Error: Not enough tickets left");
                eprintln!(
                    "Requested: {}, Remaining: {} - reduce the ticket count",
                    requested, remaining
                );
            }
            _ => {
                eprintln!("Error: {}", e);
            }
        }
        std::process::exit(1);
    }

    Ok(())
}
