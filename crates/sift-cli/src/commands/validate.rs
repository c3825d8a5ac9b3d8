//! Validate command implementation

use anyhow::Result;
use sift_core::report::{write_json_atomic, QualityReport, StageValidation};
use sift_validate::Validator;

use crate::cli::{GlobalArgs, StageArg, ValidateArgs};
use crate::commands::common;

/// File name of the persisted quality report
pub(crate) const VALIDATION_REPORT_FILE: &str = "validation_report.json";

/// Execute the validate command
pub async fn execute(args: &ValidateArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = common::load_context(global)?;
    let validator = Validator::new(ctx.db.clone(), ctx.config.validation.clone());

    let mut report = QualityReport::new();
    if matches!(args.stage, StageArg::Raw | StageArg::Both) {
        println!("Validating raw data...");
        validator.validate_raw(&mut report).await;
    }
    if matches!(args.stage, StageArg::Transformed | StageArg::Both) {
        println!("Validating transformed data...");
        validator.validate_transformed(&mut report).await;
    }

    print_summary(&report);

    let report_path = ctx
        .config
        .output_dir_absolute(&ctx.root)
        .join(VALIDATION_REPORT_FILE);
    write_json_atomic(&report_path, &report)?;
    println!("\nQuality report written to {}", report_path.display());

    Ok(())
}

/// Print a per-table one-liner for each validated stage
pub(crate) fn print_summary(report: &QualityReport) {
    if let Some(stage) = &report.raw_data {
        print_stage("raw", stage);
    }
    if let Some(stage) = &report.transformed_data {
        print_stage("transformed", stage);
    }
    for issue in &report.issues {
        println!("  ! {}", issue);
    }
}

fn print_stage(label: &str, stage: &StageValidation) {
    for (table, diagnostics) in stage {
        match (&diagnostics.error, diagnostics.row_count) {
            (Some(error), _) => println!("  ✗ [{}] {} - {}", label, table, error),
            (None, Some(rows)) => {
                let flagged = diagnostics
                    .high_null_columns
                    .as_ref()
                    .map_or(0, |m| m.len());
                println!(
                    "  ✓ [{}] {} ({} rows, {} high-null columns)",
                    label, table, rows, flagged
                );
            }
            (None, None) => println!("  ✓ [{}] {}", label, table),
        }
    }
}
