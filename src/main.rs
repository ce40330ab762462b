//! Backpack trader - main entry point
//!
//! Subcommands:
//! - trade: run the limit-order loop
//! - account, balances, orders, positions, price: read-only queries
//! - cancel-all, close-positions: account housekeeping
//! - market: one-shot market order sized in quote currency

use anyhow::Result;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use backpack_trader::backpack::Side;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "backpack-trader")]
#[command(about = "Backpack exchange client and limit-order trading loop", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to configuration file
    #[arg(short, long, global = true, default_value = "configs/sol_usdc_perp.json")]
    config: String,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the limit-order trading loop
    Trade {
        /// Number of cycles (overrides config file)
        #[arg(long)]
        cycles: Option<u32>,

        /// Seconds between cycles (overrides config file)
        #[arg(long)]
        interval: Option<u64>,
    },

    /// Show account settings
    Account,

    /// Show balances
    Balances,

    /// List open orders
    Orders {
        /// Only orders for this market
        #[arg(short, long)]
        symbol: Option<String>,
    },

    /// List open positions
    Positions,

    /// Show mark and index price for a market
    Price {
        symbol: String,
    },

    /// Cancel all open orders
    CancelAll,

    /// Close all open positions with reduce-only market orders
    ClosePositions,

    /// Place a market order sized in quote currency
    Market {
        symbol: String,

        /// Quote amount to spend (Bid) or receive (Ask)
        amount: Decimal,

        /// Bid or Ask
        #[arg(long, default_value = "bid", value_parser = parse_side)]
        side: Side,
    },
}

fn parse_side(value: &str) -> Result<Side, String> {
    match value.to_ascii_lowercase().as_str() {
        "bid" | "buy" => Ok(Side::Bid),
        "ask" | "sell" => Ok(Side::Ask),
        other => Err(format!("unknown side '{}', expected bid or ask", other)),
    }
}

fn setup_logging(verbose: bool, command_name: &str) -> Result<()> {
    // Create logs directory
    std::fs::create_dir_all("logs")?;

    // Create log file with naming pattern: {command}_{date}.log
    let log_filename = format!(
        "{}_{}.log",
        command_name,
        chrono::Local::now().format("%Y-%m-%d_%H-%M-%S")
    );
    let log_path = PathBuf::from("logs").join(&log_filename);

    // Set log level - filter out noisy external crates
    let level = if verbose { "debug" } else { "info" };
    let filter_str = format!(
        "{},hyper=warn,hyper_util=warn,reqwest=warn,rustls=warn,h2=warn",
        level
    );
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    let file_appender = tracing_appender::rolling::never("logs", &log_filename);

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(true);

    // File layer - same format but without ANSI colors
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(file_appender)
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    info!("Log file: {}", log_path.display());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let command_name = match &cli.command {
        Commands::Trade { .. } => "trade",
        Commands::Account => "account",
        Commands::Balances => "balances",
        Commands::Orders { .. } => "orders",
        Commands::Positions => "positions",
        Commands::Price { .. } => "price",
        Commands::CancelAll => "cancel_all",
        Commands::ClosePositions => "close_positions",
        Commands::Market { .. } => "market",
    };
    setup_logging(cli.verbose, command_name)?;

    let config = cli.config;
    match cli.command {
        Commands::Trade { cycles, interval } => commands::trade::run(config, cycles, interval).await,
        Commands::Account => commands::account::show_account(&config).await,
        Commands::Balances => commands::account::show_balances(&config).await,
        Commands::Orders { symbol } => commands::account::show_orders(&config, symbol.as_deref()).await,
        Commands::Positions => commands::account::show_positions(&config).await,
        Commands::Price { symbol } => commands::account::show_price(&config, &symbol).await,
        Commands::CancelAll => commands::account::cancel_all(&config).await,
        Commands::ClosePositions => commands::account::close_positions(&config).await,
        Commands::Market {
            symbol,
            amount,
            side,
        } => commands::trade::market(&config, &symbol, side, amount).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_side() {
        assert_eq!(parse_side("bid"), Ok(Side::Bid));
        assert_eq!(parse_side("SELL"), Ok(Side::Ask));
        assert!(parse_side("long").is_err());
    }

    #[test]
    fn test_cli_parses_market() {
        let cli = Cli::try_parse_from([
            "backpack-trader",
            "market",
            "ES_USDC",
            "5",
            "--side",
            "ask",
        ])
        .unwrap();

        match cli.command {
            Commands::Market {
                symbol,
                amount,
                side,
            } => {
                assert_eq!(symbol, "ES_USDC");
                assert_eq!(amount, Decimal::from(5));
                assert_eq!(side, Side::Ask);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cli_trade_overrides() {
        let cli = Cli::try_parse_from([
            "backpack-trader",
            "trade",
            "--cycles",
            "3",
            "--interval",
            "10",
            "-v",
        ])
        .unwrap();

        assert!(cli.verbose);
        assert_eq!(cli.config, "configs/sol_usdc_perp.json");
        assert!(matches!(
            cli.command,
            Commands::Trade {
                cycles: Some(3),
                interval: Some(10)
            }
        ));
    }
}
