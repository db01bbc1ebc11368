use lotto_core::{AccountId, LottoEngine, LotteryConfig};
use std::time::Duration;
use tempfile::tempdir;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Create temp dir
    let temp_dir = tempdir()?;
    println!("Using temporary directory: {:?}", temp_dir.path());

    // Initialize the engine
    let engine = LottoEngine::new(temp_dir.path()).await?;

    println!("Creating lottery...");
    let config = LotteryConfig::base_currency(Duration::from_secs(2), 1000);
    let info = engine
        .create_lottery("example-lottery", AccountId::from("operator"), config)
        .await?;

    println!("Lottery created!");
    println!("Entries close: {}", info.end_time);

    // Buy tickets for two participants
    let alice = AccountId::from("alice");
    let bob = AccountId::from("bob");
    engine.buy_tickets("example-lottery", &alice, 600).await?;
    engine.buy_tickets("example-lottery", &bob, 400).await?;

    let status = engine.lottery_status("example-lottery").await?;
    println!(
        "\nTickets sold: {} / {}",
        status.tickets_sold, status.ticket_capacity
    );
    println!("Pool: {}", status.pool_balance);

    // Wait out the entry window
    tokio::time::sleep(Duration::from_secs(3)).await;

    let settlement = engine.end_lottery("example-lottery").await?;
    match settlement.winner {
        Some(winner) => println!("\nWinner: {} takes {}", winner, settlement.amount_disbursed),
        None => println!("\nNo tickets sold, nothing disbursed"),
    }
    println!("Operator retains: {}", settlement.operator_take);

    println!("\nExample completed successfully!");

    Ok(())
}
