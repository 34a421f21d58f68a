//! Maintenance commands for the schema ledger.

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use streetreview::config::AppConfig;
use streetreview::database::init_db;
use streetreview::migration::{MIGRATIONS, Migrator};

#[derive(Parser)]
#[command(name = "streetreview-migrate")]
#[command(about = "Apply, revert and inspect schema migrations")]
struct Args {
    /// Database URL. Defaults to the configured `database.url`.
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Apply every pending migration.
    Up,
    /// Revert the most recently applied migration.
    Down,
    /// List migrations and whether each is applied.
    Status,
    /// Revert the most recently applied migration, then apply pending ones.
    Redo,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    let args = Args::parse();
    let mut config = AppConfig::load().context("Failed to load config")?;
    if let Some(url) = args.database_url {
        config.database.url = url;
    }

    let db = init_db(&config.database)
        .await
        .context("Failed to connect to database")?;
    let migrator = Migrator::new(MIGRATIONS)?;

    match args.command {
        Command::Up => {
            let applied = migrator.run(&db).await?;
            info!(?applied, "Migrations applied");
        }
        Command::Down => match migrator.revert_latest(&db).await? {
            Some(id) => info!(id, "Reverted"),
            None => info!("Nothing to revert"),
        },
        Command::Status => {
            for entry in migrator.status(&db).await? {
                let state = match entry.applied_at {
                    Some(at) => format!("applied {}", at.to_rfc3339()),
                    None => "pending".to_string(),
                };
                let marker = if entry.known { "" } else { " (unknown to this build)" };
                println!("{:<32} {state}{marker}", entry.id);
            }
        }
        Command::Redo => {
            if let Some(id) = migrator.revert_latest(&db).await? {
                info!(id, "Reverted");
            }
            let applied = migrator.run(&db).await?;
            info!(?applied, "Migrations applied");
        }
    }

    Ok(())
}
