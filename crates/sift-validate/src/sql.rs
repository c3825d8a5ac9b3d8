//! Check SQL generation
//!
//! Pure functions producing the SELECTs the checks execute. Table and
//! column names are quoted; key values travel as result rows, never as
//! interpolated SQL.

use sift_core::sql_utils::quote_ident;

/// Full scan of a table, for row counting
pub fn scan_table_sql(table: &str) -> String {
    format!("SELECT * FROM {}", quote_ident(table))
}

/// Rows where a column is NULL
pub fn null_rows_sql(table: &str, column: &str) -> String {
    format!(
        "SELECT * FROM {} WHERE {} IS NULL",
        quote_ident(table),
        quote_ident(column)
    )
}

/// Key groups with more than one row, largest group first.
///
/// Projects (key AS VARCHAR, count) for `Database::query_key_counts`.
pub fn duplicate_keys_sql(table: &str, key: &str) -> String {
    let qt = quote_ident(table);
    let qk = quote_ident(key);
    format!(
        "SELECT CAST({qk} AS VARCHAR), COUNT(*) AS cnt\n\
         FROM {qt}\n\
         WHERE {qk} IS NOT NULL\n\
         GROUP BY {qk}\n\
         HAVING COUNT(*) > 1\n\
         ORDER BY cnt DESC, {qk}"
    )
}

/// Child rows whose non-null key has no match in the parent column.
///
/// Values are compared raw - no trimming, no case folding. The parent
/// side excludes NULLs so a single null parent key cannot blank the
/// whole NOT IN result.
pub fn orphan_keys_sql(
    child_table: &str,
    child_key: &str,
    parent_table: &str,
    parent_key: &str,
) -> String {
    let qct = quote_ident(child_table);
    let qck = quote_ident(child_key);
    let qpt = quote_ident(parent_table);
    let qpk = quote_ident(parent_key);
    format!(
        "SELECT * FROM {qct}\n\
         WHERE {qck} IS NOT NULL\n\
         \x20 AND {qck} NOT IN (SELECT {qpk} FROM {qpt} WHERE {qpk} IS NOT NULL)"
    )
}

/// Distinct non-null values of a column, for uniqueness comparison
pub fn distinct_values_sql(table: &str, column: &str) -> String {
    format!(
        "SELECT DISTINCT {col} FROM {table} WHERE {col} IS NOT NULL",
        col = quote_ident(column),
        table = quote_ident(table)
    )
}
