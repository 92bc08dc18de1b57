//! CSV bulk loading for the finance tables
//!
//! Each table is filled by a single `COPY ... FROM STDIN` so rows never go
//! through per-row inserts. Tables load in foreign key order.

use async_trait::async_trait;
use sqlx::postgres::PgPoolCopyExt;
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;
use tracing::{debug, info};

use crate::error::SeedError;
use crate::store::PgStore;

/// Bytes forwarded to the server per `CopyData` message
const COPY_CHUNK_BYTES: usize = 64 * 1024;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeedTable {
    Account,
    Category,
    Transaction,
}

impl SeedTable {
    /// Load order; transactions reference both accounts and categories
    pub const ORDER: [SeedTable; 3] = [SeedTable::Account, SeedTable::Category, SeedTable::Transaction];

    pub fn table_name(self) -> &'static str {
        match self {
            SeedTable::Account => "Account",
            SeedTable::Category => "Category",
            SeedTable::Transaction => "Transaction",
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            SeedTable::Account => "accounts.csv",
            SeedTable::Category => "categories.csv",
            SeedTable::Transaction => "transactions_cleaned.csv",
        }
    }

    /// Comma delimited CSV with a header row, columns in table order
    pub fn copy_statement(self) -> String {
        format!(
            r#"COPY "{}" FROM STDIN WITH (FORMAT csv, HEADER true, DELIMITER ',')"#,
            self.table_name()
        )
    }
}

/// Sink able to bulk-load one CSV file into one table
#[async_trait]
pub trait CsvLoader: Send + Sync {
    /// Returns the number of rows copied
    async fn copy_csv(&self, table: SeedTable, path: &Path) -> Result<u64, SeedError>;
}

#[async_trait]
impl CsvLoader for PgStore {
    async fn copy_csv(&self, table: SeedTable, path: &Path) -> Result<u64, SeedError> {
        let io_error = |source| SeedError::Io {
            path: path.to_path_buf(),
            source,
        };

        let mut file = tokio::fs::File::open(path).await.map_err(io_error)?;

        let statement = table.copy_statement();
        debug!(statement = %statement, "Starting COPY");
        let mut copy = self.pool().copy_in_raw(&statement).await?;

        let mut buf = vec![0u8; COPY_CHUNK_BYTES];
        loop {
            let read = match file.read(&mut buf).await {
                Ok(read) => read,
                Err(e) => {
                    copy.abort(format!("failed reading {}", path.display()))
                        .await
                        .ok();
                    return Err(io_error(e));
                }
            };
            if read == 0 {
                break;
            }
            copy.send(&buf[..read]).await?;
        }

        Ok(copy.finish().await?)
    }
}

/// Outcome of loading one table
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeedReport {
    pub table: SeedTable,
    pub path: PathBuf,
    pub rows: u64,
}

/// Load every table from `data_dir` in [`SeedTable::ORDER`], stopping at the first failure
pub async fn seed_all(loader: &dyn CsvLoader, data_dir: &Path) -> Result<Vec<SeedReport>, SeedError> {
    let mut reports = Vec::with_capacity(SeedTable::ORDER.len());

    for table in SeedTable::ORDER {
        let path = data_dir.join(table.file_name());
        info!(table = table.table_name(), path = %path.display(), "Start seeding");

        let rows = loader.copy_csv(table, &path).await?;
        info!(table = table.table_name(), rows, "Seeded table");

        reports.push(SeedReport { table, path, rows });
    }

    info!("Seeding finished");
    Ok(reports)
}
