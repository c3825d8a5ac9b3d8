//! sift-db - Database abstraction layer for Sift
//!
//! This crate provides the `Database` trait the transform and validation
//! engines run against, and its DuckDB implementation.

pub mod duckdb;
pub mod error;
pub mod traits;

pub use duckdb::DuckDbBackend;
pub use error::{DbError, DbResult};
pub use traits::Database;
