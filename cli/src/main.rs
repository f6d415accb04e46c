//! spotlend CLI - bootstrap a spot-priced lending market and drive it
//!
//! Every invocation builds a fresh market from the config (or the built-in
//! 100 DVT : 10 WETH deployment), optionally replays a setup script, then
//! runs one command against it.

use anyhow::Result;
use clap::{Parser, Subcommand};
use spotlend::Asset;
use std::path::PathBuf;

mod config;
mod lending;
mod manipulate;
mod run;
mod script;
mod session;
mod status;
mod trading;

use config::MarketConfig;
use session::Session;

#[derive(Parser)]
#[command(name = "spotlend")]
#[command(
    about = "Spot-priced lending market - quotes, trades and manipulation runs",
    long_about = None
)]
#[command(version)]
struct Cli {
    /// Market config file (TOML); defaults to the built-in deployment
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Script whose units are committed before the command runs
    #[arg(short, long)]
    setup: Option<PathBuf>,

    /// Verbose output (debug logging)
    #[arg(short, long)]
    verbose: bool,

    /// Print reports as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show reserves, prices, pool state and balances
    Status,

    /// Collateral required to borrow an amount at current reserves
    Quote {
        /// Amount of the borrow asset, in whole tokens
        #[arg(short, long)]
        amount: String,
    },

    /// Swap against the pair
    Swap {
        #[arg(long)]
        account: String,

        /// Asset paid in (a or b)
        #[arg(long, value_parser = parse_asset)]
        asset: Asset,

        /// Amount paid in, in whole tokens
        #[arg(long)]
        amount: String,

        /// Minimum received, in whole tokens of the other asset
        #[arg(long)]
        min_out: Option<String>,
    },

    /// Borrow from the lending pool
    Borrow {
        #[arg(long)]
        account: String,

        #[arg(long)]
        amount: String,
    },

    /// Repay a loan (use --setup to open one first)
    Repay {
        #[arg(long)]
        account: String,

        #[arg(long)]
        amount: String,
    },

    /// Dump the borrow asset into the pair and borrow in the same unit
    Manipulate {
        #[arg(long, default_value = "attacker")]
        account: String,

        /// Amount sold into the pair
        #[arg(long, default_value = "10000")]
        dump: String,

        /// Amount borrowed afterwards
        #[arg(long, default_value = "1000000")]
        borrow: String,
    },

    /// Execute the units of a script file
    Run {
        #[arg(long)]
        script: PathBuf,
    },
}

fn parse_asset(value: &str) -> Result<Asset, String> {
    match value.to_ascii_lowercase().as_str() {
        "a" => Ok(Asset::A),
        "b" => Ok(Asset::B),
        other => Err(format!("unknown asset {:?}, expected a or b", other)),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let config = MarketConfig::load(cli.config.as_deref())?;
    let mut session = Session::new(config, cli.json)?;

    if let Some(setup) = &cli.setup {
        session.run_setup(setup)?;
    }

    match cli.command {
        Commands::Status => status::show_status(&session)?,
        Commands::Quote { amount } => status::show_quote(&session, &amount)?,
        Commands::Swap {
            account,
            asset,
            amount,
            min_out,
        } => trading::swap(&mut session, &account, asset, &amount, min_out.as_deref())?,
        Commands::Borrow { account, amount } => lending::borrow(&mut session, &account, &amount)?,
        Commands::Repay { account, amount } => lending::repay(&mut session, &account, &amount)?,
        Commands::Manipulate {
            account,
            dump,
            borrow,
        } => manipulate::manipulate(&mut session, &account, &dump, &borrow)?,
        Commands::Run { script } => run::run_script(&mut session, &script)?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_asset() {
        assert_eq!(parse_asset("A"), Ok(Asset::A));
        assert_eq!(parse_asset("b"), Ok(Asset::B));
        assert!(parse_asset("c").is_err());
    }

    #[test]
    fn test_manipulate_defaults_drain_the_pool() {
        let mut session = Session::new(MarketConfig::default(), true).unwrap();
        manipulate::manipulate(&mut session, "attacker", "10000", "1000000").unwrap();
        let pool = session.market.pool();
        assert_eq!(session.market.balance_of(Asset::A, pool.address()), 0);
    }

    #[test]
    fn test_repay_needs_setup() {
        let mut session = Session::new(MarketConfig::default(), true).unwrap();
        assert!(lending::repay(&mut session, "attacker", "1").is_err());

        lending::borrow(&mut session, "attacker", "10").unwrap();
        lending::repay(&mut session, "attacker", "10").unwrap();
        assert_eq!(session.market.position(&"attacker".into()), None);
    }
}
