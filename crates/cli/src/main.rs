//! Stockroom CLI - database migrations and operator tools.
//!
//! # Usage
//!
//! ```bash
//! # Create or update the schema (catalog tables and session table)
//! stockroom migrate
//!
//! # Bulk-load products from a CSV export
//! stockroom import amz_ca_total_products_data_processed.csv
//!
//! # Log everybody out
//! stockroom sessions purge
//!
//! # Delete expired sessions only
//! stockroom sessions prune
//! ```
//!
//! All commands read `STOCKROOM_DATABASE_URL` (or `DATABASE_URL`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "stockroom")]
#[command(author, version, about = "Stockroom CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Bulk-load products from a CSV file
    Import {
        /// CSV file with `asin,title,stars,reviews,price,categoryName` columns
        path: PathBuf,
    },
    /// Manage login sessions
    Sessions {
        #[command(subcommand)]
        action: SessionAction,
    },
}

#[derive(Subcommand)]
enum SessionAction {
    /// Delete every session, logging all users out
    Purge,
    /// Delete expired sessions
    Prune,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CliError> {
    let pool = commands::connect().await?;

    let result = match cli.command {
        Commands::Migrate => commands::migrate::run(&pool).await,
        Commands::Import { path } => commands::import::run(&pool, &path).await,
        Commands::Sessions { action } => match action {
            SessionAction::Purge => commands::sessions::purge(&pool).await,
            SessionAction::Prune => commands::sessions::prune(&pool).await,
        },
    };

    pool.close().await;
    result
}
