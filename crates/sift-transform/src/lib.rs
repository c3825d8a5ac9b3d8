//! sift-transform - Transform engine for Sift
//!
//! Turns the loosely-typed staging tables into the cleaned star schema:
//! deduplicated dimension and fact tables plus the derived per-customer
//! profile aggregate. Each step's SQL comes from a pure generator
//! function in [`sql`]; [`engine::TransformEngine`] executes the steps
//! best-effort and records a step log.

pub mod engine;
pub mod sql;

pub use engine::TransformEngine;
pub use sql::{SqlGenError, SqlGenResult};
