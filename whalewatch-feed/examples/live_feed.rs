//! Stream live whale alerts to stdout, after a historical backfill.
//!
//! Point `WHALEWATCH_API_BASE` at the dashboard API, optionally pass a
//! symbol filter: `cargo run --example live_feed -- BTC/USD`

use whalewatch_feed::{ApiClient, FeedConfig, StreamClient};

#[tokio::main]
async fn main() {
    // Initialise INFO Tracing log subscriber
    init_logging();

    let symbol = std::env::args().nth(1);

    println!("\n🐋 WHALE ALERT LIVE FEED");
    match &symbol {
        Some(symbol) => println!("🎯 Tracking: {symbol}"),
        None => println!("🎯 Tracking: all symbols"),
    }

    // Backfill: show the most recent historical alerts first
    let api = ApiClient::new();
    match api.whale_history(symbol.as_deref(), Some(10)).await {
        Ok(history) => {
            println!("📜 Last {} historical alerts:", history.data.len());
            for alert in history.data.iter().rev() {
                println!(
                    "   {} | {:>8} | {:>4} | {:>12.4}",
                    alert.timestamp.format("%H:%M:%S"),
                    alert.symbol,
                    alert.side,
                    alert.quantity,
                );
            }
        }
        Err(e) => eprintln!("⚠️  Backfill failed: {e}"),
    }

    println!("\n💡 Streaming live alerts (ctrl-c to quit)...\n");

    let mut config = FeedConfig::default();
    if let Some(symbol) = symbol {
        config = config.with_symbol(symbol);
    }

    let mut client = StreamClient::new(config);
    let mut alerts = client.connect();

    while let Some(alert) = alerts.recv().await {
        let arrow = if alert.side.is_buy() { "🟢" } else { "🔴" };
        println!(
            "{arrow} {} | {:>8} | {:>4} | {:>12.4}",
            alert.timestamp.format("%H:%M:%S"),
            alert.symbol,
            alert.side,
            alert.quantity,
        );
    }
}

fn init_logging() {
    tracing_subscriber::fmt()
        // Filter messages based on the INFO
        .with_env_filter(
            tracing_subscriber::filter::EnvFilter::builder()
                .with_default_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        // Disable colours on release builds
        .with_ansi(cfg!(debug_assertions))
        // Install this Tracing subscriber as global default
        .init()
}
