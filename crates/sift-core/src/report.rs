//! Report types produced by the transform and validation engines
//!
//! These types serialize to the JSON documents downstream consumers read,
//! so the field names here are a stable contract: `row_count`, `columns`,
//! `high_null_columns`, `duplicates`, `orphan_keys`,
//! `referential_integrity`, `customer_id_unique`, and `error`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};

/// Outcome of a single transform step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    /// Step executed and its target table was loaded
    Success,
    /// Step failed; the error is recorded and the run continued
    Error,
}

/// One entry in the transform step log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepRecord {
    /// Step name (matches the target table for load steps)
    pub name: String,

    /// Step outcome
    pub status: StepStatus,

    /// Row count of the target table after the step, when it succeeded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_count: Option<usize>,

    /// Error message when the step failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// How long the step took to execute (in milliseconds)
    pub duration_ms: u64,
}

/// Ordered step log for one transform run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformReport {
    /// When the transform run started
    pub timestamp: DateTime<Utc>,

    /// Step outcomes in execution order
    pub steps: Vec<StepRecord>,
}

impl TransformReport {
    /// Create an empty report stamped with the current time
    pub fn new() -> Self {
        Self {
            timestamp: Utc::now(),
            steps: Vec::new(),
        }
    }

    /// Record a successful step
    pub fn record_success(&mut self, name: &str, row_count: Option<usize>, duration_ms: u64) {
        self.steps.push(StepRecord {
            name: name.to_string(),
            status: StepStatus::Success,
            row_count,
            error: None,
            duration_ms,
        });
    }

    /// Record a failed step
    pub fn record_error(&mut self, name: &str, error: String, duration_ms: u64) {
        self.steps.push(StepRecord {
            name: name.to_string(),
            status: StepStatus::Error,
            row_count: None,
            error: Some(error),
            duration_ms,
        });
    }

    /// True if any step failed
    pub fn has_errors(&self) -> bool {
        self.steps.iter().any(|s| s.status == StepStatus::Error)
    }
}

impl Default for TransformReport {
    fn default() -> Self {
        Self::new()
    }
}

/// A column flagged for a high null rate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NullRateWarning {
    /// Number of NULL values in the column
    pub null_count: usize,

    /// NULL fraction of the table's rows (0 for an empty table)
    pub null_rate: f64,

    /// Human-readable warning string
    pub warning: String,
}

/// One group of rows sharing a natural key
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateGroup {
    /// The duplicated key value
    pub key: String,

    /// How many staging rows carry this key
    pub occurrences: usize,
}

/// Result of duplicate detection on one (table, key column)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateCheck {
    /// Whether any duplicated key exists
    pub found: bool,

    /// Number of duplicated key groups (not total rows)
    pub count: usize,

    /// Duplicated keys sorted by descending occurrence count
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub duplicates: Vec<DuplicateGroup>,

    /// Set when the check itself failed to execute
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DuplicateCheck {
    /// No duplicates found
    pub fn clean() -> Self {
        Self {
            found: false,
            count: 0,
            duplicates: Vec::new(),
            error: None,
        }
    }

    /// Duplicates found
    pub fn with_groups(groups: Vec<DuplicateGroup>) -> Self {
        Self {
            found: !groups.is_empty(),
            count: groups.len(),
            duplicates: groups,
            error: None,
        }
    }

    /// The check failed to execute
    pub fn failed(error: String) -> Self {
        Self {
            found: false,
            count: 0,
            duplicates: Vec::new(),
            error: Some(error),
        }
    }
}

/// Result of the raw orphan-key check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrphanKeyCheck {
    /// Whether any orphaned foreign-key value exists
    pub found: bool,

    /// Number of orphaned child rows
    pub count: usize,

    /// Human-readable note
    pub note: String,

    /// Set when the check itself failed to execute
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of the cleaned referential-integrity check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferentialIntegrityCheck {
    /// True only when the orphan count is exactly zero
    pub valid: bool,

    /// Number of fact rows whose foreign key is missing from the dimension
    pub orphan_count: usize,

    /// Human-readable note
    pub note: String,

    /// Set when the check itself failed to execute
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Diagnostics for a single table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableDiagnostics {
    /// Total row count
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_count: Option<usize>,

    /// Data columns (reserved `_`-prefixed columns excluded)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<String>>,

    /// Columns whose null rate exceeds the configured threshold
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high_null_columns: Option<BTreeMap<String, NullRateWarning>>,

    /// Duplicate-key diagnostics, when requested for this table
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duplicates: Option<DuplicateCheck>,

    /// Raw orphan-key diagnostics, when requested for this table
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orphan_keys: Option<OrphanKeyCheck>,

    /// Cleaned referential-integrity diagnostics, when requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referential_integrity: Option<ReferentialIntegrityCheck>,

    /// Whether the customer natural key is unique, when requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id_unique: Option<bool>,

    /// Set when profiling the table failed entirely
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TableDiagnostics {
    /// Diagnostics for a successfully profiled table
    pub fn profiled(
        row_count: usize,
        columns: Vec<String>,
        high_null_columns: BTreeMap<String, NullRateWarning>,
    ) -> Self {
        Self {
            row_count: Some(row_count),
            columns: Some(columns),
            high_null_columns: Some(high_null_columns),
            ..Default::default()
        }
    }

    /// Diagnostics for a table that could not be profiled
    pub fn failed(error: String) -> Self {
        Self {
            error: Some(error),
            ..Default::default()
        }
    }
}

/// Per-table diagnostics for one validation stage, keyed by table name
pub type StageValidation = BTreeMap<String, TableDiagnostics>;

/// The full quality report: raw and transformed halves plus advisory issues
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityReport {
    /// When the validation pass ran
    pub timestamp: DateTime<Utc>,

    /// Diagnostics over the staging tables
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_data: Option<StageValidation>,

    /// Diagnostics over the cleaned tables
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transformed_data: Option<StageValidation>,

    /// Advisory warnings (expected-volume shortfalls and the like)
    #[serde(default)]
    pub issues: Vec<String>,
}

impl QualityReport {
    /// Create an empty report stamped with the current time
    pub fn new() -> Self {
        Self {
            timestamp: Utc::now(),
            raw_data: None,
            transformed_data: None,
            issues: Vec::new(),
        }
    }
}

impl Default for QualityReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Overall pipeline run status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    /// All stages ran; per-step errors may still be recorded inside stages
    Completed,
    /// The run aborted on an environment-level failure
    Failed,
}

/// Top-level report for one full pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineReport {
    /// Unique identifier for this run
    pub pipeline_run_id: String,

    /// When the run started
    pub timestamp: DateTime<Utc>,

    /// Overall status
    pub status: RunStatus,

    /// Environment-level failure that aborted the run, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Per-stage payloads in execution order
    pub stages: BTreeMap<String, serde_json::Value>,
}

impl PipelineReport {
    /// Create a report with a fresh 8-character run id
    pub fn new() -> Self {
        Self {
            pipeline_run_id: format!("run-{}", &Uuid::new_v4().to_string()[..8]),
            timestamp: Utc::now(),
            status: RunStatus::Completed,
            error: None,
            stages: BTreeMap::new(),
        }
    }

    /// Mark the run as aborted by an environment-level failure
    pub fn mark_failed(&mut self, error: String) {
        self.status = RunStatus::Failed;
        self.error = Some(error);
    }

    /// Attach a stage payload
    pub fn add_stage<T: Serialize>(&mut self, name: &str, payload: &T) -> CoreResult<()> {
        self.stages
            .insert(name.to_string(), serde_json::to_value(payload)?);
        Ok(())
    }
}

impl Default for PipelineReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Write a report as pretty-printed JSON, atomically.
///
/// Uses write-to-temp-then-rename so a crash mid-write never leaves a
/// truncated report behind.
pub fn write_json_atomic<T: Serialize>(path: &Path, report: &T) -> CoreResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| CoreError::ReportWrite {
            path: path.display().to_string(),
            source: e,
        })?;
    }

    let json = serde_json::to_string_pretty(report)?;
    let temp_path = path.with_extension("json.tmp");
    fs::write(&temp_path, json).map_err(|e| CoreError::ReportWrite {
        path: path.display().to_string(),
        source: e,
    })?;
    fs::rename(&temp_path, path).map_err(|e| CoreError::ReportWrite {
        path: path.display().to_string(),
        source: e,
    })?;

    Ok(())
}

#[cfg(test)]
#[path = "report_test.rs"]
mod tests;
