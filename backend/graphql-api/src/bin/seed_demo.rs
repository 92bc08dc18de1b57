/// Insert the demo category and print every category
///
/// Usage:
///   DATABASE_URL=postgres://... cargo run --bin seed-demo
use anyhow::{Context, Result};
use tracing::{error, info};

use graphql_api::config::DatabaseConfig;
use graphql_api::models::Category;
use graphql_api::store::Page;
use graphql_api::DataContext;

fn demo_category() -> Category {
    Category {
        id: "1235".to_string(),
        name: Some("Category 2".to_string()),
        color: Some("green".to_string()),
    }
}

async fn run(ctx: &DataContext) -> Result<()> {
    let created = ctx.store().create_category(demo_category()).await?;
    info!(category_id = %created.id, "Created category");

    let categories = ctx.store().list_categories(Page::default()).await?;
    println!("{}", serde_json::to_string_pretty(&categories)?);

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("seed_demo=info".parse()?)
                .add_directive("sqlx=warn".parse()?),
        )
        .init();

    let config = DatabaseConfig::from_env("seed-demo")?;
    let ctx = DataContext::connect(&config)
        .await
        .context("Failed to initialise data context")?;

    let result = run(&ctx).await;
    ctx.close().await;

    if let Err(e) = &result {
        error!(error = %e, "Demo seed failed");
    }
    result
}
