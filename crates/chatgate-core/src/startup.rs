//! Startup table verification.
//!
//! Runs once before the listener is bound. Any failure here is fatal: the
//! process must not serve against an unprovisioned database.

use thiserror::Error;

use chatgate_types::error::RepositoryError;

use crate::repository::schema::SchemaInspector;

/// Tables the gateway reads or writes.
pub const REQUIRED_TABLES: [&str; 3] = ["agent", "conversation", "message"];

/// Errors from [`verify_tables`].
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("MySQL database name is not configured; set MYSQL_DATABASE")]
    DatabaseNameMissing,

    #[error("required table \"{table}\" was not found in database \"{database}\"")]
    MissingTable { database: String, table: String },

    #[error("failed to inspect schema: {0}")]
    Query(#[from] RepositoryError),
}

/// Confirm every table in [`REQUIRED_TABLES`] exists, stopping at the first
/// missing one.
pub async fn verify_tables<S: SchemaInspector>(inspector: &S) -> Result<(), VerifyError> {
    let database = inspector
        .database_name()
        .filter(|db| !db.is_empty())
        .ok_or(VerifyError::DatabaseNameMissing)?;

    for table in REQUIRED_TABLES {
        if !inspector.table_exists(database, table).await? {
            return Err(VerifyError::MissingTable {
                database: database.to_string(),
                table: table.to_string(),
            });
        }
    }

    tracing::info!(database, tables = ?REQUIRED_TABLES, "Verified required tables exist");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct MockInspector {
        database: Option<&'static str>,
        tables: Vec<&'static str>,
        fail: bool,
        checked: Mutex<Vec<String>>,
    }

    impl MockInspector {
        fn new(database: Option<&'static str>, tables: Vec<&'static str>) -> Self {
            Self {
                database,
                tables,
                fail: false,
                checked: Mutex::new(Vec::new()),
            }
        }
    }

    impl SchemaInspector for MockInspector {
        fn database_name(&self) -> Option<&str> {
            self.database
        }

        async fn table_exists(&self, database: &str, table: &str) -> Result<bool, RepositoryError> {
            assert_eq!(Some(database), self.database);
            self.checked.lock().unwrap().push(table.to_string());
            if self.fail {
                return Err(RepositoryError::Query("access denied".to_string()));
            }
            Ok(self.tables.contains(&table))
        }
    }

    #[tokio::test]
    async fn test_all_tables_present() {
        let inspector = MockInspector::new(Some("chat"), vec!["agent", "conversation", "message", "extra"]);
        verify_tables(&inspector).await.unwrap();
        assert_eq!(*inspector.checked.lock().unwrap(), vec!["agent", "conversation", "message"]);
    }

    #[tokio::test]
    async fn test_missing_table_stops_at_first() {
        let inspector = MockInspector::new(Some("chat"), vec!["agent", "message"]);
        let err = verify_tables(&inspector).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "required table \"conversation\" was not found in database \"chat\""
        );
        assert_eq!(inspector.checked.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_missing_database_name() {
        for database in [None, Some("")] {
            let inspector = MockInspector::new(database, vec![]);
            let err = verify_tables(&inspector).await.unwrap_err();
            assert!(matches!(err, VerifyError::DatabaseNameMissing));
            assert!(inspector.checked.lock().unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn test_query_failure_is_fatal() {
        let mut inspector = MockInspector::new(Some("chat"), vec![]);
        inspector.fail = true;
        let err = verify_tables(&inspector).await.unwrap_err();
        assert!(matches!(err, VerifyError::Query(RepositoryError::Query(_))));
    }
}
