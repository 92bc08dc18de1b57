/// Write the GraphQL schema (SDL) to a file
///
/// Usage:
///   cargo run --bin export-schema -- [path]   (default: schema.graphql)
use anyhow::{Context, Result};
use std::path::PathBuf;

fn main() -> Result<()> {
    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("schema.graphql"));

    let sdl = graphql_api::schema::schema_sdl();
    std::fs::write(&path, sdl).with_context(|| format!("Failed to write {}", path.display()))?;

    eprintln!("Schema written to {}", path.display());
    Ok(())
}
