//! Transform execution
//!
//! Runs the transform steps in their load-bearing order (the transaction
//! filter resolves foreign keys against the already-loaded customer
//! dimension) and records every outcome in a step log. A failed step is
//! logged and recorded, and the run continues - best-effort, not
//! transactional.

use sift_core::config::ValidationConfig;
use sift_core::report::TransformReport;
use sift_core::schema;
use sift_core::sql_utils::quote_ident;
use sift_db::{Database, DbResult};
use std::sync::Arc;
use std::time::Instant;

use crate::sql;

/// Step name for target-table creation
const STEP_CREATE_TABLES: &str = "create_tables";

/// Transform engine over a staging store
pub struct TransformEngine {
    db: Arc<dyn Database>,
    min_amount: f64,
    max_amount: f64,
}

impl TransformEngine {
    /// Create an engine bound to a store, with amount bounds from config
    pub fn new(db: Arc<dyn Database>, validation: &ValidationConfig) -> Self {
        Self {
            db,
            min_amount: validation.min_transaction_amount,
            max_amount: validation.max_transaction_amount,
        }
    }

    /// Run the full transformation pipeline.
    ///
    /// Always returns a complete report; errors are recorded per step
    /// and never propagate to the caller.
    pub async fn transform_all(&self) -> TransformReport {
        log::info!("Starting data transformation");
        let mut report = TransformReport::new();

        self.create_tables(&mut report).await;
        self.run_load_step(
            &mut report,
            schema::DIM_CUSTOMERS,
            Ok(sql::load_dim_customers_sql()),
        )
        .await;
        self.run_load_step(
            &mut report,
            schema::FACT_TRANSACTIONS,
            sql::load_fact_transactions_sql(self.min_amount, self.max_amount)
                .map_err(|e| e.to_string()),
        )
        .await;
        self.run_load_step(
            &mut report,
            schema::FACT_SENTIMENT,
            Ok(sql::load_fact_sentiment_sql()),
        )
        .await;
        self.run_load_step(
            &mut report,
            schema::CUSTOMER_PROFILE,
            Ok(sql::load_customer_profile_sql()),
        )
        .await;

        log::info!(
            "Transformation complete ({} steps, errors: {})",
            report.steps.len(),
            report.has_errors()
        );
        report
    }

    /// Drop all target tables, newest dependency first.
    ///
    /// The explicit path to an idempotent re-run: the plain transform is
    /// additive and will record constraint errors against populated
    /// targets rather than reload them.
    pub async fn full_refresh(&self) -> DbResult<()> {
        for table in schema::TARGET_TABLES.iter().rev() {
            self.db.drop_if_exists(table).await?;
        }
        Ok(())
    }

    async fn create_tables(&self, report: &mut TransformReport) {
        let start = Instant::now();
        let ddl = schema::TARGET_DDL.join("\n");
        match self.db.execute_batch(&ddl).await {
            Ok(()) => {
                report.record_success(STEP_CREATE_TABLES, None, elapsed_ms(start));
            }
            Err(e) => {
                log::error!("Error creating target tables: {}", e);
                report.record_error(STEP_CREATE_TABLES, e.to_string(), elapsed_ms(start));
            }
        }
    }

    async fn run_load_step(
        &self,
        report: &mut TransformReport,
        table: &str,
        load_sql: Result<String, String>,
    ) {
        let start = Instant::now();
        let load_sql = match load_sql {
            Ok(sql) => sql,
            Err(e) => {
                log::error!("Error generating SQL for {}: {}", table, e);
                report.record_error(table, e, elapsed_ms(start));
                return;
            }
        };

        match self.db.execute(&load_sql).await {
            Ok(_) => {
                let row_count = self
                    .db
                    .query_count(&format!("SELECT * FROM {}", quote_ident(table)))
                    .await
                    .ok();
                log::info!(
                    "Loaded {}: {} rows",
                    table,
                    row_count.map_or_else(|| "?".to_string(), |n| n.to_string())
                );
                report.record_success(table, row_count, elapsed_ms(start));
            }
            Err(e) => {
                log::error!("Error loading {}: {}", table, e);
                report.record_error(table, e.to_string(), elapsed_ms(start));
            }
        }
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

#[cfg(test)]
#[path = "engine_test.rs"]
mod tests;
