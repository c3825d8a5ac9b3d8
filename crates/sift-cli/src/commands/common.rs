//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use sift_core::Config;
use sift_db::{Database, DuckDbBackend};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cli::GlobalArgs;

/// Everything a command needs: the loaded config, the project root, and
/// an open store handle. The handle is acquired here and released by
/// scope exit on every path - commands never close it explicitly.
pub(crate) struct PipelineContext {
    pub config: Config,
    pub root: PathBuf,
    pub db: Arc<dyn Database>,
}

/// Load config and open the database connection (honoring --config and
/// --target overrides).
pub(crate) fn load_context(global: &GlobalArgs) -> Result<PipelineContext> {
    let root = PathBuf::from(&global.project_dir);
    let config = match &global.config {
        Some(path) => Config::load(Path::new(path)),
        None => Config::load_from_dir(&root),
    }
    .context("Failed to load pipeline config")?;

    let db_path = global
        .target
        .clone()
        .unwrap_or_else(|| config.database_path_absolute(&root));

    if global.verbose {
        eprintln!("[verbose] Opening database at {}", db_path);
    }

    let db: Arc<dyn Database> =
        Arc::new(DuckDbBackend::new(&db_path).context("Failed to connect to database")?);

    Ok(PipelineContext { config, root, db })
}
