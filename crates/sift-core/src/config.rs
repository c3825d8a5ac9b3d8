//! Configuration types and parsing for sift.yml

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file name searched for in the project directory
pub const CONFIG_FILE_NAME: &str = "sift.yml";

/// Main pipeline configuration from sift.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Pipeline name
    pub name: String,

    /// Pipeline version
    #[serde(default = "default_version")]
    pub version: String,

    /// Input data file locations
    #[serde(default)]
    pub data: DataConfig,

    /// Database connection configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Output directory for reports and the database file
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Validation thresholds and transaction amount bounds
    #[serde(default)]
    pub validation: ValidationConfig,
}

/// Input data file locations, relative to the project directory
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DataConfig {
    /// Customers CSV file
    #[serde(default = "default_customers_file")]
    pub customers: String,

    /// Transactions CSV file
    #[serde(default = "default_transactions_file")]
    pub transactions: String,

    /// Sentiment posts JSON file
    #[serde(default = "default_sentiment_file")]
    pub sentiment: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            customers: default_customers_file(),
            transactions: default_transactions_file(),
            sentiment: default_sentiment_file(),
        }
    }
}

/// Database connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Path to the DuckDB database file, or ":memory:"
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Validation thresholds consumed by the transform and validation engines
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValidationConfig {
    /// Flag a column when its null rate is strictly above this threshold
    #[serde(default = "default_null_rate_warning")]
    pub null_rate_warning: f64,

    /// Exclusive lower bound for cleaned transaction amounts
    #[serde(default = "default_min_amount")]
    pub min_transaction_amount: f64,

    /// Exclusive upper bound for cleaned transaction amounts
    #[serde(default = "default_max_amount")]
    pub max_transaction_amount: f64,

    /// Advisory: warn when staging customers fall below this count
    #[serde(default = "default_min_expected_customers")]
    pub min_expected_customers: usize,

    /// Advisory: warn when staging transactions fall below this count
    #[serde(default = "default_min_expected_transactions")]
    pub min_expected_transactions: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            null_rate_warning: default_null_rate_warning(),
            min_transaction_amount: default_min_amount(),
            max_transaction_amount: default_max_amount(),
            min_expected_customers: default_min_expected_customers(),
            min_expected_transactions: default_min_expected_transactions(),
        }
    }
}

fn default_version() -> String {
    "1.0".to_string()
}

fn default_output_dir() -> String {
    "output".to_string()
}

fn default_customers_file() -> String {
    "data/customers.csv".to_string()
}

fn default_transactions_file() -> String {
    "data/transactions.csv".to_string()
}

fn default_sentiment_file() -> String {
    "data/sentiment.json".to_string()
}

fn default_db_path() -> String {
    "output/sift.duckdb".to_string()
}

fn default_null_rate_warning() -> f64 {
    0.30
}

fn default_min_amount() -> f64 {
    -1000.0
}

fn default_max_amount() -> f64 {
    50000.0
}

fn default_min_expected_customers() -> usize {
    190
}

fn default_min_expected_transactions() -> usize {
    2400
}

impl Config {
    /// Load configuration from an explicit file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config =
            serde_yaml::from_str(&content).map_err(|e| CoreError::ConfigParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Load `sift.yml` from a project directory
    pub fn load_from_dir(project_dir: &Path) -> CoreResult<Self> {
        Self::load(&project_dir.join(CONFIG_FILE_NAME))
    }

    /// Check cross-field constraints that serde cannot express
    pub fn validate(&self) -> CoreResult<()> {
        let v = &self.validation;
        if !(0.0..=1.0).contains(&v.null_rate_warning) {
            return Err(CoreError::ConfigInvalid {
                message: format!(
                    "null_rate_warning must be within [0, 1], got {}",
                    v.null_rate_warning
                ),
            });
        }
        if v.min_transaction_amount >= v.max_transaction_amount {
            return Err(CoreError::ConfigInvalid {
                message: format!(
                    "min_transaction_amount ({}) must be below max_transaction_amount ({})",
                    v.min_transaction_amount, v.max_transaction_amount
                ),
            });
        }
        Ok(())
    }

    /// Absolute database path. ":memory:" is passed through untouched.
    pub fn database_path_absolute(&self, root: &Path) -> String {
        if self.database.path == ":memory:" {
            self.database.path.clone()
        } else {
            root.join(&self.database.path).display().to_string()
        }
    }

    /// Absolute output directory
    pub fn output_dir_absolute(&self, root: &Path) -> PathBuf {
        root.join(&self.output_dir)
    }

    /// Absolute input paths for (customers, transactions, sentiment)
    pub fn data_paths_absolute(&self, root: &Path) -> (PathBuf, PathBuf, PathBuf) {
        (
            root.join(&self.data.customers),
            root.join(&self.data.transactions),
            root.join(&self.data.sentiment),
        )
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
