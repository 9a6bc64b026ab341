//! MySQL schema inspector backed by `information_schema`.

use chatgate_core::repository::schema::SchemaInspector;
use chatgate_types::error::RepositoryError;

use super::errors::map_pool_error;
use super::pool::{DatabasePool, SqlParam};

const TABLE_EXISTS_SQL: &str =
    "SELECT 1 FROM information_schema.tables WHERE table_schema = ? AND table_name = ? LIMIT 1";

/// Checks table existence through the shared pool.
#[derive(Clone)]
pub struct MySqlSchemaInspector {
    pool: DatabasePool,
}

impl MySqlSchemaInspector {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

impl SchemaInspector for MySqlSchemaInspector {
    fn database_name(&self) -> Option<&str> {
        self.pool.database()
    }

    async fn table_exists(&self, database: &str, table: &str) -> Result<bool, RepositoryError> {
        let rows = self
            .pool
            .fetch_all(TABLE_EXISTS_SQL, &[SqlParam::from(database), SqlParam::from(table)])
            .await
            .map_err(map_pool_error)?;
        Ok(!rows.is_empty())
    }
}
