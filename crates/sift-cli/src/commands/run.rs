//! Run command implementation
//!
//! The full pipeline in its fixed order: ingest, validate raw,
//! transform, validate transformed. Every stage records its own errors
//! internally; the command only fails on environment-level problems
//! (missing config, unreachable database). The pipeline report is
//! written even when a stage aborts, carrying a failed status.

use anyhow::Result;
use sift_core::report::{write_json_atomic, PipelineReport, QualityReport};
use sift_transform::TransformEngine;
use sift_validate::Validator;

use crate::cli::{GlobalArgs, RunArgs};
use crate::commands::common::{self, PipelineContext};
use crate::commands::ingest;
use crate::commands::transform::print_steps;
use crate::commands::validate::{print_summary, VALIDATION_REPORT_FILE};

/// File name of the persisted pipeline report
const PIPELINE_REPORT_FILE: &str = "pipeline_report.json";

/// Execute the run command
pub async fn execute(args: &RunArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = common::load_context(global)?;
    let mut pipeline = PipelineReport::new();

    println!(
        "Pipeline run {} ({})",
        pipeline.pipeline_run_id, ctx.config.name
    );

    let outcome = run_stages(&ctx, args, &mut pipeline).await;
    if let Err(e) = &outcome {
        pipeline.mark_failed(format!("{:#}", e));
    }

    let pipeline_path = ctx
        .config
        .output_dir_absolute(&ctx.root)
        .join(PIPELINE_REPORT_FILE);
    write_json_atomic(&pipeline_path, &pipeline)?;
    println!("\nPipeline report: {}", pipeline_path.display());

    outcome
}

async fn run_stages(
    ctx: &PipelineContext,
    args: &RunArgs,
    pipeline: &mut PipelineReport,
) -> Result<()> {
    // Stage 1: ingestion
    println!("\n[1/4] Ingesting raw data");
    let ingest_summary = ingest::ingest_all(ctx, None).await?;
    for (source, rows) in &ingest_summary.row_counts {
        match ingest_summary.issues.get(source).filter(|v| !v.is_empty()) {
            Some(issues) => println!("  ✗ {} - {}", source, issues.join("; ")),
            None => println!("  ✓ {} ({} rows)", source, rows),
        }
    }
    pipeline.add_stage("ingestion", &ingest_summary)?;

    // Stage 2: raw validation
    println!("\n[2/4] Validating raw data");
    let validator = Validator::new(ctx.db.clone(), ctx.config.validation.clone());
    let mut quality = QualityReport::new();
    validator.validate_raw(&mut quality).await;
    pipeline.add_stage("raw_validation", &quality.raw_data)?;

    // Stage 3: transformation
    println!("\n[3/4] Transforming");
    let engine = TransformEngine::new(ctx.db.clone(), &ctx.config.validation);
    if args.full_refresh {
        engine.full_refresh().await?;
    }
    let transform_report = engine.transform_all().await;
    print_steps(&transform_report);
    pipeline.add_stage("transformation", &transform_report)?;

    // Stage 4: transformed validation
    println!("\n[4/4] Validating transformed data");
    validator.validate_transformed(&mut quality).await;
    pipeline.add_stage("transformed_validation", &quality.transformed_data)?;
    print_summary(&quality);

    let validation_path = ctx
        .config
        .output_dir_absolute(&ctx.root)
        .join(VALIDATION_REPORT_FILE);
    write_json_atomic(&validation_path, &quality)?;
    println!("\nQuality report: {}", validation_path.display());

    if transform_report.has_errors() || ingest_summary.has_issues() {
        println!("\nPipeline completed with recorded errors (see reports).");
    } else {
        println!("\nPipeline completed successfully.");
    }

    Ok(())
}

#[cfg(test)]
#[path = "run_test.rs"]
mod tests;
