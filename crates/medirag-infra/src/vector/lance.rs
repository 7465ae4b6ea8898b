//! LanceDB connection wrapper for table lifecycle management.
//!
//! `LanceVectorStore` wraps a `lancedb::Connection` opened at a filesystem
//! path and creates tables from Arrow schemas on demand.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow_schema::Schema;

/// Directory of the vector store inside the data directory.
pub const VECTOR_DIR: &str = "vectors";

/// LanceDB connection and table management.
pub struct LanceVectorStore {
    db: lancedb::Connection,
    base_path: PathBuf,
}

impl LanceVectorStore {
    /// Open or create a LanceDB vector store at the given path.
    ///
    /// Creates the directory if it does not exist.
    pub async fn new(base_path: PathBuf) -> Result<Self, lancedb::Error> {
        std::fs::create_dir_all(&base_path).map_err(|e| lancedb::Error::CreateDir {
            path: base_path.display().to_string(),
            source: e,
        })?;

        let uri = base_path
            .to_str()
            .ok_or_else(|| lancedb::Error::InvalidInput {
                message: format!("Path contains invalid UTF-8: {}", base_path.display()),
            })?;

        let db = lancedb::connect(uri).execute().await?;
        tracing::debug!(path = %base_path.display(), "Opened LanceDB vector store");

        Ok(Self { db, base_path })
    }

    /// Open the vector store inside `data_dir`.
    pub async fn open(data_dir: &Path) -> Result<Self, lancedb::Error> {
        Self::new(data_dir.join(VECTOR_DIR)).await
    }

    /// Open the table, creating it empty with `schema` when missing.
    pub async fn ensure_table(
        &self,
        table_name: &str,
        schema: Arc<Schema>,
    ) -> Result<lancedb::Table, lancedb::Error> {
        match self.db.open_table(table_name).execute().await {
            Ok(table) => Ok(table),
            Err(lancedb::Error::TableNotFound { .. }) => {
                tracing::info!(table = table_name, "Creating LanceDB table");
                self.db
                    .create_empty_table(table_name, schema)
                    .execute()
                    .await
            }
            Err(e) => Err(e),
        }
    }

    pub async fn table_exists(&self, table_name: &str) -> bool {
        self.db.open_table(table_name).execute().await.is_ok()
    }

    /// Drop a table. Dropping a missing table is not an error.
    pub async fn drop_table(&self, table_name: &str) -> Result<(), lancedb::Error> {
        match self.db.drop_table(table_name, &[]).await {
            Ok(()) => Ok(()),
            Err(lancedb::Error::TableNotFound { .. }) => Ok(()),
            Err(e) => Err(e),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}
