//! Configuration for the GraphQL API and the seed programs
//!
//! Loads settings from:
//! 1. Environment variables
//! 2. .env file (local development)

use anyhow::{anyhow, Result};
use db_pool::{parse_env_optional, parse_env_with_default, DbConfig};
use std::env;
use std::path::PathBuf;

/// Service name used for pool metrics and log fields
pub const SERVICE_NAME: &str = "graphql-api";

#[derive(Debug, Clone)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// GraphQL configuration
    pub graphql: GraphQLConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub pool: DbConfig,
    /// Apply bundled migrations on startup
    pub run_migrations: bool,
}

#[derive(Debug, Clone)]
pub struct GraphQLConfig {
    /// Serve the playground page
    pub playground: bool,
    /// Max query depth
    pub max_depth: usize,
    /// Max query complexity
    pub max_complexity: usize,
    /// Enable introspection
    pub introspection: bool,
}

impl Default for GraphQLConfig {
    fn default() -> Self {
        Self {
            playground: true,
            max_depth: 10,
            max_complexity: 1000,
            introspection: true,
        }
    }
}

impl GraphQLConfig {
    fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            playground: parse_env_with_default("GRAPHQL_PLAYGROUND", defaults.playground),
            max_depth: parse_env_with_default("GRAPHQL_MAX_DEPTH", defaults.max_depth),
            max_complexity: parse_env_with_default("GRAPHQL_MAX_COMPLEXITY", defaults.max_complexity),
            introspection: parse_env_with_default("GRAPHQL_INTROSPECTION", defaults.introspection),
        }
    }
}

impl DatabaseConfig {
    pub fn from_env(service_name: &str) -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            pool: DbConfig::from_env(service_name).map_err(|e| anyhow!(e))?,
            run_migrations: parse_env_with_default("RUN_MIGRATIONS", true),
        })
    }
}

impl Config {
    /// Load configuration from the environment, falling back to defaults
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_with_default("SERVER_PORT", 4000),
                workers: parse_env_optional("SERVER_WORKERS").unwrap_or_else(num_cpus::get),
            },
            database: DatabaseConfig::from_env(SERVICE_NAME)?,
            graphql: GraphQLConfig::from_env(),
        })
    }
}

/// Settings for the CSV bulk loader
#[derive(Debug, Clone)]
pub struct SeedConfig {
    pub database_url: String,
    /// Directory holding `accounts.csv`, `categories.csv`, `transactions_cleaned.csv`
    pub data_dir: PathBuf,
    /// Apply bundled migrations before loading
    pub run_migrations: bool,
}

impl SeedConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow!("DATABASE_URL environment variable not set"))?;

        Ok(Self {
            database_url,
            data_dir: env::var("SEED_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data")),
            run_migrations: parse_env_with_default("RUN_MIGRATIONS", true),
        })
    }

    pub fn db_config(&self, service_name: &str) -> DbConfig {
        DbConfig::one_shot(service_name, &self.database_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[serial_test::serial]
    fn test_config_defaults() {
        for key in [
            "SERVER_HOST",
            "SERVER_PORT",
            "SERVER_WORKERS",
            "RUN_MIGRATIONS",
            "GRAPHQL_PLAYGROUND",
            "GRAPHQL_MAX_DEPTH",
            "GRAPHQL_MAX_COMPLEXITY",
            "GRAPHQL_INTROSPECTION",
        ] {
            env::remove_var(key);
        }
        env::set_var("DATABASE_URL", "memory://");

        let config = Config::from_env().unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 4000);
        assert!(config.server.workers >= 1);
        assert!(config.database.run_migrations);
        assert_eq!(config.database.pool.service_name, SERVICE_NAME);
        assert_eq!(config.graphql.max_depth, 10);
        assert_eq!(config.graphql.max_complexity, 1000);
        assert!(config.graphql.introspection);

        env::remove_var("DATABASE_URL");
    }

    #[test]
    #[serial_test::serial]
    fn test_graphql_config_from_env() {
        env::set_var("GRAPHQL_PLAYGROUND", "false");
        env::set_var("GRAPHQL_MAX_DEPTH", "4");
        env::set_var("GRAPHQL_INTROSPECTION", "false");

        let config = GraphQLConfig::from_env();
        assert!(!config.playground);
        assert_eq!(config.max_depth, 4);
        assert_eq!(config.max_complexity, 1000);
        assert!(!config.introspection);

        env::remove_var("GRAPHQL_PLAYGROUND");
        env::remove_var("GRAPHQL_MAX_DEPTH");
        env::remove_var("GRAPHQL_INTROSPECTION");
    }

    #[test]
    #[serial_test::serial]
    fn test_seed_config_defaults_data_dir() {
        env::set_var("DATABASE_URL", "postgres://localhost/seed");
        env::remove_var("SEED_DATA_DIR");
        env::remove_var("RUN_MIGRATIONS");

        let config = SeedConfig::from_env().unwrap();
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert!(config.run_migrations);
        assert_eq!(config.db_config("seed").max_connections, 1);

        env::remove_var("DATABASE_URL");
    }
}
