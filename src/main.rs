mod config;
mod error;
mod models;
mod pipeline;
mod render;
mod scraper;
mod shell;
mod utils;

#[cfg(test)]
mod test_support;

use anyhow::Result;
use clap::Parser;
use std::io;
use std::sync::Arc;
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::AppConfig;
use crate::scraper::{DexScreenerFeed, WebDriverConnector};
use crate::shell::Shell;

#[derive(Parser)]
#[command(
    name = "organic-scan",
    about = "Scrape Jupiter organic scores for fresh DexScreener token profiles",
    version
)]
struct Cli {
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Run one command (e.g. `scan <address>`, `scan-auto`) and exit
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "organic_scan=warn",
        1 => "organic_scan=info",
        2 => "organic_scan=debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false).with_writer(io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    let config = AppConfig::load()?;
    info!(
        "Feed {} ({}), WebDriver {}, {} session(s)",
        config.feed.url, config.feed.chain, config.browser.webdriver_url, config.scan.concurrency
    );

    let feed = Arc::new(DexScreenerFeed::new(&config.feed)?);
    let connector = WebDriverConnector::new(&config.browser);
    let mut shell = Shell::new(config, feed, connector);
    let mut stdout = io::stdout();

    if cli.command.is_empty() {
        shell.run(BufReader::new(tokio::io::stdin()), &mut stdout).await?;
    } else {
        shell.run_once(&cli.command.join(" "), &mut stdout).await?;
    }

    Ok(())
}
