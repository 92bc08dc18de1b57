/// Bulk load the finance tables from CSV files
///
/// Loads accounts, categories and transactions, in that order, each with a
/// single `COPY` command streamed from the client.
///
/// Usage:
///   DATABASE_URL=postgres://... SEED_DATA_DIR=data cargo run --bin seed
///
/// Environment variables:
///   - DATABASE_URL: PostgreSQL connection string
///   - SEED_DATA_DIR: directory holding the CSV files (default: data)
///   - RUN_MIGRATIONS: apply schema migrations first (default: true)
use anyhow::{Context, Result};
use tracing::{error, info};

use graphql_api::config::SeedConfig;
use graphql_api::seed::{seed_all, SeedReport};
use graphql_api::store::{PgStore, Store};
use graphql_api::SeedError;

async fn run(store: &PgStore, config: &SeedConfig) -> Result<Vec<SeedReport>, SeedError> {
    if config.run_migrations {
        store.migrate().await?;
    }
    seed_all(store, &config.data_dir).await
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("seed=info".parse()?)
                .add_directive("graphql_api=info".parse()?)
                .add_directive("sqlx=warn".parse()?),
        )
        .init();

    let config = SeedConfig::from_env()?;
    info!(data_dir = %config.data_dir.display(), "Configuration loaded");

    let store = PgStore::connect(config.db_config("seed"))
        .await
        .context("Failed to connect to PostgreSQL")?;

    let result = run(&store, &config).await;

    store.close().await;

    match result {
        Ok(reports) => {
            let total: u64 = reports.iter().map(|r| r.rows).sum();
            info!(tables = reports.len(), rows = total, "Seed complete");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Seeding failed");
            Err(e).context("Seeding failed")
        }
    }
}
