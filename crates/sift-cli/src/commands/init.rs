//! Init command implementation

use anyhow::{bail, Context, Result};
use std::path::Path;

use crate::cli::{GlobalArgs, InitArgs};

const CONFIG_TEMPLATE: &str = r#"name: my-pipeline

data:
  customers: data/customers.csv
  transactions: data/transactions.csv
  sentiment: data/sentiment.json

database:
  path: output/sift.duckdb

output_dir: output

validation:
  null_rate_warning: 0.30
  min_transaction_amount: -1000.0
  max_transaction_amount: 50000.0
  min_expected_customers: 190
  min_expected_transactions: 2400
"#;

/// Execute the init command
pub async fn execute(args: &InitArgs, global: &GlobalArgs) -> Result<()> {
    let root = Path::new(&global.project_dir);
    let config_path = root.join(sift_core::config::CONFIG_FILE_NAME);

    if config_path.exists() && !args.force {
        bail!(
            "{} already exists (use --force to overwrite)",
            config_path.display()
        );
    }

    std::fs::create_dir_all(root.join("data")).context("Failed to create data directory")?;
    std::fs::create_dir_all(root.join("output")).context("Failed to create output directory")?;
    std::fs::write(&config_path, CONFIG_TEMPLATE)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    println!("Initialized pipeline project at {}", root.display());
    println!("  ✓ {}", config_path.display());
    println!("\nDrop your input files into data/ and run `sift run`.");

    Ok(())
}
