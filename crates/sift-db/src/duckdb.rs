//! DuckDB database backend implementation

use crate::error::{DbError, DbResult};
use crate::traits::Database;
use async_trait::async_trait;
use duckdb::{params, Connection};
use sift_core::sql_utils::escape_sql_string;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// DuckDB database backend
///
/// The connection is owned for the backend's lifetime and released when
/// the backend drops, on every exit path.
pub struct DuckDbBackend {
    conn: Mutex<Connection>,
}

impl DuckDbBackend {
    /// Create a new in-memory DuckDB connection
    pub fn in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| DbError::Connection(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create a new DuckDB connection from a file path
    pub fn from_path(path: &Path) -> DbResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| DbError::Connection(e.to_string()))?;
            }
        }
        let conn = Connection::open(path).map_err(|e| DbError::Connection(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create from a path string (handles the :memory: special case)
    pub fn new(path: &str) -> DbResult<Self> {
        if path == ":memory:" {
            Self::in_memory()
        } else {
            Self::from_path(Path::new(path))
        }
    }

    fn lock(&self) -> DbResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))
    }

    fn execute_sync(&self, sql: &str) -> DbResult<usize> {
        let conn = self.lock()?;
        conn.execute(sql, [])
            .map_err(|e| DbError::Execution(format!("{}: {}", e, sql)))
    }

    fn execute_batch_sync(&self, sql: &str) -> DbResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(sql)
            .map_err(|e| DbError::Execution(e.to_string()))
    }

    fn query_count_sync(&self, sql: &str) -> DbResult<usize> {
        let conn = self.lock()?;
        let count: i64 = conn
            .query_row(&format!("SELECT COUNT(*) FROM ({})", sql), [], |row| {
                row.get(0)
            })
            .map_err(|e| DbError::Execution(e.to_string()))?;
        Ok(count as usize)
    }

    fn query_key_counts_sync(&self, sql: &str) -> DbResult<Vec<(String, usize)>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| DbError::Execution(e.to_string()))?;
        let rows = stmt
            .query_map([], |row| {
                let key: String = row.get(0)?;
                let count: i64 = row.get(1)?;
                Ok((key, count as usize))
            })
            .map_err(|e| DbError::Execution(e.to_string()))?;

        let mut pairs = Vec::new();
        for row in rows {
            pairs.push(row.map_err(|e| DbError::Execution(e.to_string()))?);
        }
        Ok(pairs)
    }

    fn table_columns_sync(&self, table: &str) -> DbResult<Vec<String>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT column_name FROM information_schema.columns \
                 WHERE table_name = ? ORDER BY ordinal_position",
            )
            .map_err(|e| DbError::Execution(e.to_string()))?;
        let rows = stmt
            .query_map(params![table], |row| row.get::<_, String>(0))
            .map_err(|e| DbError::Execution(e.to_string()))?;

        let mut columns = Vec::new();
        for row in rows {
            columns.push(row.map_err(|e| DbError::Execution(e.to_string()))?);
        }
        if columns.is_empty() {
            return Err(DbError::Execution(format!(
                "table or view not found: {}",
                table
            )));
        }
        Ok(columns)
    }

    fn relation_exists_sync(&self, name: &str) -> DbResult<bool> {
        let conn = self.lock()?;
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM information_schema.tables WHERE table_name = ?",
                params![name],
                |row| row.get(0),
            )
            .map_err(|e| DbError::Execution(e.to_string()))?;
        Ok(count > 0)
    }
}

#[async_trait]
impl Database for DuckDbBackend {
    async fn execute(&self, sql: &str) -> DbResult<usize> {
        self.execute_sync(sql)
    }

    async fn execute_batch(&self, sql: &str) -> DbResult<()> {
        self.execute_batch_sync(sql)
    }

    async fn query_count(&self, sql: &str) -> DbResult<usize> {
        self.query_count_sync(sql)
    }

    async fn query_key_counts(&self, sql: &str) -> DbResult<Vec<(String, usize)>> {
        self.query_key_counts_sync(sql)
    }

    async fn table_columns(&self, table: &str) -> DbResult<Vec<String>> {
        self.table_columns_sync(table)
    }

    async fn relation_exists(&self, name: &str) -> DbResult<bool> {
        self.relation_exists_sync(name)
    }

    async fn drop_if_exists(&self, name: &str) -> DbResult<()> {
        // Try dropping as view first, then as table
        let quoted = sift_core::sql_utils::quote_ident(name);
        let _ = self.execute_sync(&format!("DROP VIEW IF EXISTS {}", quoted));
        let _ = self.execute_sync(&format!("DROP TABLE IF EXISTS {}", quoted));
        Ok(())
    }

    async fn load_csv(&self, table: &str, path: &str) -> DbResult<()> {
        let sql = format!(
            "CREATE OR REPLACE TABLE {} AS SELECT * FROM read_csv_auto('{}', all_varchar=true)",
            sift_core::sql_utils::quote_ident(table),
            escape_sql_string(path)
        );
        self.execute_sync(&sql).map_err(|e| DbError::SourceLoad {
            table: table.to_string(),
            path: path.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    async fn load_json(&self, table: &str, path: &str) -> DbResult<()> {
        let sql = format!(
            "CREATE OR REPLACE TABLE {} AS SELECT * FROM read_json_auto('{}')",
            sift_core::sql_utils::quote_ident(table),
            escape_sql_string(path)
        );
        self.execute_sync(&sql).map_err(|e| DbError::SourceLoad {
            table: table.to_string(),
            path: path.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    fn db_type(&self) -> &'static str {
        "duckdb"
    }
}
