//! Individual data-quality checks
//!
//! Each check is a pure read and owns its failure: a query error becomes
//! the `error` field of that check's result instead of propagating.

use sift_core::report::{
    DuplicateCheck, DuplicateGroup, NullRateWarning, OrphanKeyCheck, ReferentialIntegrityCheck,
    TableDiagnostics,
};
use sift_core::schema::is_reserved_column;
use sift_db::{Database, DbResult};
use std::collections::BTreeMap;

use crate::sql;

/// Profile a table: row count, data columns, high-null-rate columns.
///
/// A column is flagged strictly when its null rate exceeds the
/// threshold; a rate exactly at the threshold passes. A zero-row table
/// yields rate 0 for every column.
pub async fn profile_table(
    db: &dyn Database,
    table: &str,
    null_rate_warning: f64,
) -> TableDiagnostics {
    match profile_table_inner(db, table, null_rate_warning).await {
        Ok(diagnostics) => diagnostics,
        Err(e) => {
            log::error!("Error validating {}: {}", table, e);
            TableDiagnostics::failed(e.to_string())
        }
    }
}

async fn profile_table_inner(
    db: &dyn Database,
    table: &str,
    null_rate_warning: f64,
) -> DbResult<TableDiagnostics> {
    let row_count = db.query_count(&sql::scan_table_sql(table)).await?;
    let columns: Vec<String> = db
        .table_columns(table)
        .await?
        .into_iter()
        .filter(|c| !is_reserved_column(c))
        .collect();

    let mut high_null_columns = BTreeMap::new();
    for column in &columns {
        let null_count = db.query_count(&sql::null_rows_sql(table, column)).await?;
        let null_rate = if row_count > 0 {
            null_count as f64 / row_count as f64
        } else {
            0.0
        };
        if null_rate > null_rate_warning {
            high_null_columns.insert(
                column.clone(),
                NullRateWarning {
                    null_count,
                    null_rate,
                    warning: format!("High null rate: {:.1}%", null_rate * 100.0),
                },
            );
        }
    }

    Ok(TableDiagnostics::profiled(
        row_count,
        columns,
        high_null_columns,
    ))
}

/// Find keys with more than one row, excluding NULL keys.
pub async fn find_duplicates(db: &dyn Database, table: &str, key: &str) -> DuplicateCheck {
    match db
        .query_key_counts(&sql::duplicate_keys_sql(table, key))
        .await
    {
        Ok(pairs) if pairs.is_empty() => DuplicateCheck::clean(),
        Ok(pairs) => DuplicateCheck::with_groups(
            pairs
                .into_iter()
                .map(|(key, occurrences)| DuplicateGroup { key, occurrences })
                .collect(),
        ),
        Err(e) => {
            log::error!("Error finding duplicates in {}: {}", table, e);
            DuplicateCheck::failed(e.to_string())
        }
    }
}

/// Count child rows whose non-null key is absent from the parent column.
///
/// Comparison is on raw values - a key differing only in case or
/// whitespace counts as orphaned here even though the transform would
/// match it after normalization.
pub async fn find_orphan_keys(
    db: &dyn Database,
    child_table: &str,
    child_key: &str,
    parent_table: &str,
    parent_key: &str,
) -> OrphanKeyCheck {
    match db
        .query_count(&sql::orphan_keys_sql(
            child_table,
            child_key,
            parent_table,
            parent_key,
        ))
        .await
    {
        Ok(count) => OrphanKeyCheck {
            found: count > 0,
            count,
            note: if count > 0 {
                format!(
                    "{} rows with {} not present in {}",
                    child_table, child_key, parent_table
                )
            } else {
                "None".to_string()
            },
            error: None,
        },
        Err(e) => {
            log::error!("Error finding orphan keys in {}: {}", child_table, e);
            OrphanKeyCheck {
                found: false,
                count: 0,
                note: String::new(),
                error: Some(e.to_string()),
            }
        }
    }
}

/// Check that every fact row's foreign key resolves in the dimension.
pub async fn check_referential_integrity(
    db: &dyn Database,
    fact_table: &str,
    foreign_key: &str,
    dim_table: &str,
    dim_key: &str,
) -> ReferentialIntegrityCheck {
    match db
        .query_count(&sql::orphan_keys_sql(
            fact_table,
            foreign_key,
            dim_table,
            dim_key,
        ))
        .await
    {
        Ok(orphan_count) => ReferentialIntegrityCheck {
            valid: orphan_count == 0,
            orphan_count,
            note: if orphan_count == 0 {
                "All foreign keys valid".to_string()
            } else {
                format!("{} orphan rows", orphan_count)
            },
            error: None,
        },
        Err(e) => {
            log::error!(
                "Error checking referential integrity of {}: {}",
                fact_table,
                e
            );
            ReferentialIntegrityCheck {
                valid: false,
                orphan_count: 0,
                note: String::new(),
                error: Some(e.to_string()),
            }
        }
    }
}

/// Whether a column's non-null values cover every row exactly once:
/// total row count equals distinct non-null value count.
pub async fn check_unique(db: &dyn Database, table: &str, column: &str) -> DbResult<bool> {
    let total = db.query_count(&sql::scan_table_sql(table)).await?;
    let distinct = db
        .query_count(&sql::distinct_values_sql(table, column))
        .await?;
    Ok(total == distinct)
}
