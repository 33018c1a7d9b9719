//! slv: solvency auditor for concentrated-liquidity pools.
//!
//! Reconstructs each pool's closed liquidity intervals from its tick
//! deltas, prices them into per-token reserve requirements, and compares
//! the totals against custody balances.
//!
//! Exit codes: 0 reconciled, 1 shortfall, 2 structural violation in tick
//! data. Anything else that goes wrong (transport, config, curve failure
//! in delegating mode) surfaces as a plain error.

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod config;
mod pipeline;

use commands::audit::AuditOutcome;

#[derive(Parser)]
#[command(name = "slv")]
#[command(about = "Concentrated-liquidity solvency auditor", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Full audit: reconstruct, price, and verify every pool
    Audit {
        /// YAML config path
        #[arg(long)]
        config: Option<String>,

        /// Ledger base url (overrides env and config)
        #[arg(long = "ledger-url")]
        ledger_url: Option<String>,

        /// Custody account holding pool reserves
        #[arg(long)]
        custody: Option<String>,

        /// Reserve computation mode: delegating | independent
        #[arg(long)]
        mode: Option<String>,

        /// Max pools audited concurrently
        #[arg(long)]
        concurrency: Option<usize>,
    },

    /// Print required reserves without checking custody balances
    Reserves {
        /// YAML config path
        #[arg(long)]
        config: Option<String>,

        /// Ledger base url (overrides env and config)
        #[arg(long = "ledger-url")]
        ledger_url: Option<String>,

        /// Reserve computation mode: delegating | independent
        #[arg(long)]
        mode: Option<String>,

        /// Max pools priced concurrently
        #[arg(long)]
        concurrency: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Dev convenience; production injects env vars directly.
    let _ = dotenvy::from_filename(".env.local");

    init_tracing();

    let cli = Cli::parse();
    match cli.cmd {
        Commands::Audit { config, ledger_url, custody, mode, concurrency } => {
            let cfg = config::load(
                config.as_deref(),
                config::Overrides { ledger_url, custody, mode, concurrency },
            )?;
            match commands::audit::run(&cfg).await? {
                AuditOutcome::Pass => {}
                AuditOutcome::Shortfall => std::process::exit(1),
                AuditOutcome::Structural => std::process::exit(2),
            }
        }
        Commands::Reserves { config, ledger_url, mode, concurrency } => {
            let cfg = config::load(
                config.as_deref(),
                config::Overrides { ledger_url, custody: None, mode, concurrency },
            )?;
            commands::reserves::run(&cfg).await?;
        }
    }
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();
}
