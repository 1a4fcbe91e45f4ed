//! Monthly housekeeping for cron:
//!
//! ```text
//! maintenance reset-overrides [--force]   # clear master budgets (1st of month)
//! maintenance purge-orders                # drop lines past retention
//! maintenance all [--force]
//! ```

use clap::{Parser, Subcommand};
use kitchen_budget_api::{
    config::AppConfig,
    dto::admin::OverrideResetReport,
    services::maintenance_service,
    state::AppState,
};

#[derive(Debug, Parser)]
#[command(name = "maintenance", version, about = "Monthly housekeeping for the kitchen budget API")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Clear every master budget override. Only runs on the 1st of the month unless forced.
    ResetOverrides {
        #[arg(long)]
        force: bool,
    },
    /// Delete order lines older than the retention window
    PurgeOrders,
    /// Reset overrides, then purge old order lines
    All {
        #[arg(long)]
        force: bool,
    },
}

impl Command {
    /// `(reset, purge, force)`
    fn tasks(&self) -> (bool, bool, bool) {
        match *self {
            Command::ResetOverrides { force } => (true, false, force),
            Command::PurgeOrders => (false, true, false),
            Command::All { force } => (true, true, force),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,kitchen_budget_api=debug".into()),
        )
        .init();

    let (reset, purge, force) = cli.command.tasks();

    let config = AppConfig::from_env()?;
    let state = AppState::from_config(&config).await?;

    if reset {
        match maintenance_service::reset_overrides(&state, force).await? {
            OverrideResetReport::Completed { reset_count } => {
                println!("Master budget overrides reset: {reset_count}")
            }
            OverrideResetReport::Skipped => {
                println!("Not the first day of the month; overrides left alone (use --force)")
            }
        }
    }
    if purge {
        let report = maintenance_service::purge_orders(&state).await?;
        println!("Order lines purged: {} (older than {})", report.deleted, report.cutoff);
    }

    Ok(())
}
