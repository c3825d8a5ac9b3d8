//! sift-core - Core library for Sift
//!
//! This crate provides shared types used across all Sift components:
//! configuration parsing, the staging/star schema registry, SQL quoting
//! utilities, and the report types produced by the transform and
//! validation engines.

pub mod config;
pub mod error;
pub mod report;
pub mod schema;
pub mod sql_utils;

pub use config::{Config, DataConfig, DatabaseConfig, ValidationConfig};
pub use error::{CoreError, CoreResult};
pub use report::{
    DuplicateCheck, DuplicateGroup, NullRateWarning, OrphanKeyCheck, PipelineReport,
    QualityReport, ReferentialIntegrityCheck, StageValidation, StepRecord, StepStatus,
    TableDiagnostics, TransformReport,
};
pub use schema::{SourceFormat, StagingSource};
