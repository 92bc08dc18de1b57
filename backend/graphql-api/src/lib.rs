//! GraphQL API over the blog and finance tables
//! Re-exports modules for the binaries and integration tests

pub mod config;
pub mod context;
pub mod error;
pub mod models;
pub mod schema;
pub mod seed;
pub mod store;

pub use context::DataContext;
pub use error::{SeedError, StoreError};
