//! Command-line flags. Each one overrides the matching environment setting.

use clap::Parser;

#[derive(Parser, Debug, Default)]
#[command(
    name = "funding-ticker",
    version,
    about = "Live funding countdown and mark price for one perpetual futures pair"
)]
pub struct Cli {
    /// Trading pair, e.g. BTCUSDT
    #[arg(short, long, value_name = "SYMBOL")]
    pub symbol: Option<String>,
    #[arg(long = "ws-url", value_name = "URL")]
    pub ws_url: Option<String>,
    #[arg(long = "rest-url", value_name = "URL")]
    pub rest_url: Option<String>,
    #[arg(long = "poll-secs", value_name = "SECS")]
    pub poll_secs: Option<u64>,
    /// Verbose zone name used to label times, e.g. "Central European Time"
    #[arg(long = "tz-name", value_name = "NAME")]
    pub tz_name: Option<String>,
    /// Enable verbose logging
    #[arg(short, long)]
    pub debug: bool,
}
