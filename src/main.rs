use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

mod db;
mod error;
mod isoweek;
mod models;
mod progress;
mod report;
mod routes;

#[derive(Parser)]
#[command(name = "weight-tracker")]
#[command(about = "Daily weight and calorie tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load realistic seed data
    Seed,
    /// Import entries from a CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Generate a markdown progress report
    Report {
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Run the HTTP API
    Serve {
        #[arg(long, default_value_t = 4000)]
        port: u16,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let database_url =
        std::env::var("DATABASE_URL").context("DATABASE_URL must be set to a Postgres instance")?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to Postgres")?;

    match cli.command {
        Commands::InitDb => {
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            db::seed(&pool).await?;
            println!("Seed data inserted.");
        }
        Commands::Import { csv } => {
            let imported = db::import_csv(&pool, &csv).await?;
            println!("Imported {imported} entries from {}.", csv.display());
        }
        Commands::Report { out } => {
            let entries = db::fetch_entries(&pool).await?;
            let report = report::build_report(Utc::now(), &entries);
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
        Commands::Serve { port } => {
            routes::serve(pool, port)
                .await
                .map_err(|e| anyhow::anyhow!("{}", e))?;
        }
    }

    Ok(())
}
