//! Database trait definition

use crate::error::DbResult;
use async_trait::async_trait;

/// Database abstraction trait for Sift
///
/// Implementations must be Send + Sync for async operation. The transform
/// engine only writes through `execute`/`execute_batch`; everything the
/// validation engine needs is a read (`query_count`, `query_key_counts`,
/// `table_columns`).
#[async_trait]
pub trait Database: Send + Sync {
    /// Execute SQL that modifies data, returns affected rows
    async fn execute(&self, sql: &str) -> DbResult<usize>;

    /// Execute multiple SQL statements
    async fn execute_batch(&self, sql: &str) -> DbResult<()>;

    /// Count the rows produced by a SELECT statement
    async fn query_count(&self, sql: &str) -> DbResult<usize>;

    /// Run a SELECT producing (key, count) pairs, e.g. duplicate groups.
    /// The statement must project exactly two columns: a VARCHAR key and
    /// an integer count.
    async fn query_key_counts(&self, sql: &str) -> DbResult<Vec<(String, usize)>>;

    /// Column names of a table or view, in declaration order
    async fn table_columns(&self, table: &str) -> DbResult<Vec<String>>;

    /// Check if a table or view exists
    async fn relation_exists(&self, name: &str) -> DbResult<bool>;

    /// Drop a table or view if it exists
    async fn drop_if_exists(&self, name: &str) -> DbResult<()>;

    /// Load a CSV file into a fresh table, every column as VARCHAR
    async fn load_csv(&self, table: &str, path: &str) -> DbResult<()>;

    /// Load a JSON array-of-objects file into a fresh table
    async fn load_json(&self, table: &str, path: &str) -> DbResult<()>;

    /// Database type identifier for logging
    fn db_type(&self) -> &'static str;
}
