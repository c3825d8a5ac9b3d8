//! Validation pass orchestration
//!
//! Runs the checks over the staging tables (pre-transform) and the
//! cleaned tables (post-transform), assembling both halves into one
//! quality report.

use sift_core::config::ValidationConfig;
use sift_core::report::{QualityReport, StageValidation};
use sift_core::schema;
use sift_db::Database;
use std::sync::Arc;

use crate::checks;

/// Validation engine over a staging/cleaned store
pub struct Validator {
    db: Arc<dyn Database>,
    config: ValidationConfig,
}

impl Validator {
    /// Create a validator bound to a store
    pub fn new(db: Arc<dyn Database>, config: ValidationConfig) -> Self {
        Self { db, config }
    }

    /// Validate the staging tables into the report's raw half.
    ///
    /// Profiles each staging table, attaches duplicate detection on the
    /// natural key, the raw orphan-key check on transactions, and
    /// appends advisory volume warnings to the report's issues.
    pub async fn validate_raw(&self, report: &mut QualityReport) {
        log::info!("Validating raw data");
        let db = self.db.as_ref();
        let mut stage = StageValidation::new();

        for source in &schema::STAGING_SOURCES {
            let mut diagnostics =
                checks::profile_table(db, source.table, self.config.null_rate_warning).await;
            diagnostics.duplicates =
                Some(checks::find_duplicates(db, source.table, source.key_column).await);

            if source.table == schema::RAW_TRANSACTIONS {
                diagnostics.orphan_keys = Some(
                    checks::find_orphan_keys(
                        db,
                        schema::RAW_TRANSACTIONS,
                        "customer_id",
                        schema::RAW_CUSTOMERS,
                        "customer_id",
                    )
                    .await,
                );
            }

            self.check_expected_volume(source.name, &diagnostics, report);
            stage.insert(source.name.to_string(), diagnostics);
        }

        report.raw_data = Some(stage);
    }

    /// Validate the cleaned tables into the report's transformed half.
    ///
    /// Profiles the dimension, transaction fact, and profile tables,
    /// attaches referential integrity to the fact and a uniqueness check
    /// to the dimension's natural key.
    pub async fn validate_transformed(&self, report: &mut QualityReport) {
        log::info!("Validating transformed data");
        let db = self.db.as_ref();
        let mut stage = StageValidation::new();

        for table in [
            schema::DIM_CUSTOMERS,
            schema::FACT_TRANSACTIONS,
            schema::CUSTOMER_PROFILE,
        ] {
            let mut diagnostics =
                checks::profile_table(db, table, self.config.null_rate_warning).await;

            if table == schema::FACT_TRANSACTIONS {
                diagnostics.referential_integrity = Some(
                    checks::check_referential_integrity(
                        db,
                        schema::FACT_TRANSACTIONS,
                        "customer_id",
                        schema::DIM_CUSTOMERS,
                        "customer_id",
                    )
                    .await,
                );
            }

            if table == schema::DIM_CUSTOMERS {
                match checks::check_unique(db, schema::DIM_CUSTOMERS, "customer_id").await {
                    Ok(unique) => diagnostics.customer_id_unique = Some(unique),
                    Err(e) => {
                        log::error!("Error checking customer_id uniqueness: {}", e);
                        if diagnostics.error.is_none() {
                            diagnostics.error = Some(e.to_string());
                        }
                    }
                }
            }

            stage.insert(table.to_string(), diagnostics);
        }

        report.transformed_data = Some(stage);
    }

    /// Run both halves into a fresh report
    pub async fn run(&self) -> QualityReport {
        let mut report = QualityReport::new();
        self.validate_raw(&mut report).await;
        self.validate_transformed(&mut report).await;
        report
    }

    /// Advisory only: a shortfall is an issue entry, never a failure.
    fn check_expected_volume(
        &self,
        source_name: &str,
        diagnostics: &sift_core::report::TableDiagnostics,
        report: &mut QualityReport,
    ) {
        let expected = match source_name {
            "customers" => self.config.min_expected_customers,
            "transactions" => self.config.min_expected_transactions,
            _ => return,
        };
        if let Some(row_count) = diagnostics.row_count {
            if row_count < expected {
                report.issues.push(format!(
                    "Advisory: {} staging rows number {}, expected at least {}",
                    source_name, row_count, expected
                ));
            }
        }
    }
}

#[cfg(test)]
#[path = "validator_test.rs"]
mod tests;
