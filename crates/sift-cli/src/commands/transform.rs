//! Transform command implementation

use anyhow::Result;
use sift_core::report::{StepStatus, TransformReport};
use sift_transform::TransformEngine;

use crate::cli::{GlobalArgs, TransformArgs};
use crate::commands::common;

/// Execute the transform command
pub async fn execute(args: &TransformArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = common::load_context(global)?;
    let engine = TransformEngine::new(ctx.db.clone(), &ctx.config.validation);

    if args.full_refresh {
        if global.verbose {
            eprintln!("[verbose] Dropping target tables before transform");
        }
        engine.full_refresh().await?;
    }

    println!("Transforming staging data...\n");
    let report = engine.transform_all().await;
    print_steps(&report);

    if report.has_errors() {
        println!("\nTransform finished with recorded step errors (see above).");
    } else {
        println!("\nTransform complete.");
    }

    Ok(())
}

/// Print one line per step, seed-command style
pub(crate) fn print_steps(report: &TransformReport) {
    for step in &report.steps {
        match step.status {
            StepStatus::Success => match step.row_count {
                Some(rows) => println!("  ✓ {} ({} rows)", step.name, rows),
                None => println!("  ✓ {}", step.name),
            },
            StepStatus::Error => println!(
                "  ✗ {} - {}",
                step.name,
                step.error.as_deref().unwrap_or("unknown error")
            ),
        }
    }
}
