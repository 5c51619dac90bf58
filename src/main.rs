use anyhow::Result;
use clap::Parser;
use funding_ticker::{
    cli::Cli,
    clock::SystemClock,
    config::AppConfig,
    console::{ConsoleBoard, spawn_console_printer},
    feed::{BinanceMarkPriceFeed, BinancePremiumIndex},
    ticker::{TickerIo, spawn_ticker},
    utils,
};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load()?.with_cli(cli)?;
    utils::init_logging(config.debug);

    tracing::info!(
        symbol = %config.symbol,
        ws_url = %config.ws_url,
        rest_url = %config.rest_url,
        poll_secs = config.poll_interval.as_secs(),
        "[INIT] funding-ticker starting"
    );

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()?;
    let io = TickerIo {
        feed: Arc::new(BinanceMarkPriceFeed::new(config.ws_url.clone())),
        snapshots: Arc::new(BinancePremiumIndex::new(http, config.rest_url.clone())),
        clock: Arc::new(SystemClock),
    };

    let board = Arc::new(ConsoleBoard::default());
    let handle = spawn_ticker(config.ticker_config(), board.renderer(config.local_zone()), io);
    let _printer = spawn_console_printer(board.clone(), Duration::from_secs(1));

    tokio::signal::ctrl_c().await?;
    let state = handle.state();
    tracing::info!(
        next_funding_ms = ?state.next_funding_ms,
        quote = ?state.quote,
        last_mark_price = ?state.last_mark_price,
        "received Ctrl-C, shutting down"
    );
    Ok(())
}
