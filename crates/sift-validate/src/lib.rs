//! sift-validate - Validation engine for Sift
//!
//! Read-only data-quality diagnostics over staging and cleaned tables:
//! null-rate profiles, duplicate keys, orphan foreign keys, referential
//! integrity, and uniqueness, assembled into the quality report. Every
//! check catches its own query failure; one broken table never aborts a
//! validation pass.

pub mod checks;
pub mod sql;
pub mod validator;

pub use validator::Validator;
