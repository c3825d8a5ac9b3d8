//! Ingest command implementation
//!
//! A thin I/O wrapper around the staging store: reads the configured
//! input files into the staging tables, assigning monotonic `_row_id`
//! sequence numbers and letting the store stamp `_load_timestamp`.
//! Staging rows are append-only; re-ingesting appends with fresh ids.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sift_core::schema::{self, SourceFormat, StagingSource};
use sift_core::sql_utils::quote_ident;
use sift_db::Database;
use std::collections::BTreeMap;
use std::path::Path;

use crate::cli::{GlobalArgs, IngestArgs};
use crate::commands::common::{self, PipelineContext};

/// Summary of one ingestion pass
#[derive(Debug, Clone, Serialize)]
pub(crate) struct IngestSummary {
    /// When the pass ran
    pub timestamp: DateTime<Utc>,

    /// Rows appended per source
    pub row_counts: BTreeMap<String, usize>,

    /// Per-source load problems; a bad file never aborts the others
    pub issues: BTreeMap<String, Vec<String>>,
}

impl IngestSummary {
    fn new() -> Self {
        Self {
            timestamp: Utc::now(),
            row_counts: BTreeMap::new(),
            issues: BTreeMap::new(),
        }
    }

    /// True if any source failed to load
    pub fn has_issues(&self) -> bool {
        self.issues.values().any(|v| !v.is_empty())
    }
}

/// Build the INSERT that moves allow-listed columns from a loaded source
/// table into staging.
///
/// Only columns on the source's fixed allow-list AND present in the file
/// are moved; anything else in the file is ignored, and missing
/// allow-listed columns land as NULL. `_row_id` continues from the
/// staging table's current maximum, so sequence numbers are never
/// reused across ingestion passes.
///
/// Returns `None` when the file shares no columns with the allow-list.
pub(crate) fn staging_insert_sql(
    source: &StagingSource,
    file_columns: &[String],
    src_table: &str,
) -> Option<String> {
    let accepted: Vec<&str> = source
        .columns
        .iter()
        .copied()
        .filter(|col| file_columns.iter().any(|f| f == col))
        .collect();
    if accepted.is_empty() {
        return None;
    }

    let target_columns = std::iter::once("_row_id".to_string())
        .chain(accepted.iter().map(|c| quote_ident(c)))
        .collect::<Vec<_>>()
        .join(", ");
    // Everything is cast to VARCHAR: staging is loosely typed, and JSON
    // sources can surface numbers or arrays in otherwise-string fields.
    let select_columns = accepted
        .iter()
        .map(|c| format!("CAST({} AS VARCHAR)", quote_ident(c)))
        .collect::<Vec<_>>()
        .join(", ");

    Some(format!(
        "INSERT INTO {staging} ({target_columns})\n\
         SELECT (SELECT COALESCE(MAX(_row_id), -1) FROM {staging}) + row_number() OVER (), \
         {select_columns}\n\
         FROM {src}",
        staging = quote_ident(source.table),
        src = quote_ident(src_table),
    ))
}

/// Load one source file into its staging table, returning appended rows
async fn ingest_source(
    db: &dyn Database,
    source: &StagingSource,
    path: &Path,
) -> std::result::Result<usize, String> {
    let path_str = path
        .to_str()
        .ok_or_else(|| format!("non-UTF-8 path: {}", path.display()))?;
    let src_table = format!("_src_{}", source.name);

    let load_result = match source.format {
        SourceFormat::Csv => db.load_csv(&src_table, path_str).await,
        SourceFormat::Json => db.load_json(&src_table, path_str).await,
    };
    load_result.map_err(|e| e.to_string())?;

    let result = async {
        let file_columns = db
            .table_columns(&src_table)
            .await
            .map_err(|e| e.to_string())?;
        let insert = staging_insert_sql(source, &file_columns, &src_table).ok_or_else(|| {
            format!(
                "no accepted columns found in {} (expected some of: {})",
                path.display(),
                source.columns.join(", ")
            )
        })?;
        db.execute(&insert).await.map_err(|e| e.to_string())
    }
    .await;

    // The intermediate source table is scratch either way
    let _ = db.drop_if_exists(&src_table).await;
    result
}

/// Load all (or the filtered) sources into staging
pub(crate) async fn ingest_all(
    ctx: &PipelineContext,
    sources_filter: Option<&str>,
) -> Result<IngestSummary> {
    let db = ctx.db.as_ref();
    let ddl = schema::STAGING_DDL.join("\n");
    db.execute_batch(&ddl)
        .await
        .context("Failed to create staging tables")?;

    let filter: Option<Vec<&str>> =
        sources_filter.map(|f| f.split(',').map(|s| s.trim()).collect());

    let (customers_path, transactions_path, sentiment_path) =
        ctx.config.data_paths_absolute(&ctx.root);

    let mut summary = IngestSummary::new();
    for source in &schema::STAGING_SOURCES {
        if let Some(ref names) = filter {
            if !names.contains(&source.name) {
                continue;
            }
        }

        let path = match source.name {
            "customers" => &customers_path,
            "transactions" => &transactions_path,
            _ => &sentiment_path,
        };

        log::info!("Loading {} from {}", source.name, path.display());
        match ingest_source(db, source, path).await {
            Ok(rows) => {
                summary.row_counts.insert(source.name.to_string(), rows);
            }
            Err(message) => {
                log::error!("Error loading {}: {}", source.name, message);
                summary.row_counts.insert(source.name.to_string(), 0);
                summary
                    .issues
                    .entry(source.name.to_string())
                    .or_default()
                    .push(message);
            }
        }
    }

    Ok(summary)
}

/// Execute the ingest command
pub async fn execute(args: &IngestArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = common::load_context(global)?;

    println!("Loading staging sources...\n");
    let summary = ingest_all(&ctx, args.sources.as_deref()).await?;

    let mut total_rows = 0;
    for (source, rows) in &summary.row_counts {
        match summary.issues.get(source).filter(|v| !v.is_empty()) {
            Some(issues) => println!("  ✗ {} - {}", source, issues.join("; ")),
            None => {
                total_rows += rows;
                println!("  ✓ {} ({} rows)", source, rows);
            }
        }
    }

    println!();
    println!(
        "Loaded {} sources ({} total rows)",
        summary
            .row_counts
            .iter()
            .filter(|(name, _)| !summary.issues.contains_key(*name))
            .count(),
        total_rows
    );

    Ok(())
}

#[cfg(test)]
#[path = "ingest_test.rs"]
mod tests;
