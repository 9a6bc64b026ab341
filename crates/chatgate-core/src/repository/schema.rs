//! Schema metadata port used by startup verification.

use chatgate_types::error::RepositoryError;

/// Read-only access to the store's catalog.
pub trait SchemaInspector: Send + Sync {
    /// The database (schema) the pool is configured against, if any.
    fn database_name(&self) -> Option<&str>;

    /// Whether `table` exists in `database`.
    fn table_exists(
        &self,
        database: &str,
        table: &str,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;
}
