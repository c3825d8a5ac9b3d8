//! Staging and star-schema registry
//!
//! DDL for every relation the pipeline touches, plus the fixed per-source
//! column allow-lists. Ingestion intersects a file's columns with the
//! allow-list for its source; columns outside the list are ignored no
//! matter what the file's header claims.

use serde::{Deserialize, Serialize};

/// Staging table names
pub const RAW_CUSTOMERS: &str = "raw_customers";
/// Staging transactions table
pub const RAW_TRANSACTIONS: &str = "raw_transactions";
/// Staging sentiment table
pub const RAW_SENTIMENT: &str = "raw_sentiment";

/// Cleaned customer dimension
pub const DIM_CUSTOMERS: &str = "dim_customers";
/// Cleaned transaction fact
pub const FACT_TRANSACTIONS: &str = "fact_transactions";
/// Cleaned sentiment fact
pub const FACT_SENTIMENT: &str = "fact_sentiment";
/// Derived per-customer aggregate
pub const CUSTOMER_PROFILE: &str = "customer_profile";

/// Transform target tables, in load order
pub const TARGET_TABLES: [&str; 4] = [
    DIM_CUSTOMERS,
    FACT_TRANSACTIONS,
    FACT_SENTIMENT,
    CUSTOMER_PROFILE,
];

/// Accepted data columns for the customers source
pub const RAW_CUSTOMER_COLUMNS: [&str; 10] = [
    "customer_id",
    "name",
    "email",
    "age",
    "city",
    "country",
    "signup_date",
    "favorite_team",
    "membership_tier",
    "gender",
];

/// Accepted data columns for the transactions source
pub const RAW_TRANSACTION_COLUMNS: [&str; 8] = [
    "transaction_id",
    "customer_id",
    "timestamp",
    "amount",
    "currency",
    "category",
    "merchant",
    "description",
];

/// Accepted data columns for the sentiment source
pub const RAW_SENTIMENT_COLUMNS: [&str; 9] = [
    "id",
    "user",
    "source",
    "text",
    "published_at",
    "topic",
    "tags",
    "sentiment_score",
    "engagement",
];

/// Reserved columns are pipeline bookkeeping, excluded from validation
/// profiles and never accepted from input files.
pub fn is_reserved_column(name: &str) -> bool {
    name.starts_with('_')
}

/// Input file format of a staging source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    /// Comma-separated values, read with every column as VARCHAR
    Csv,
    /// A JSON array of objects
    Json,
}

/// A staging source: target table, accepted columns, and file format
#[derive(Debug, Clone)]
pub struct StagingSource {
    /// Short name used in summaries ("customers", "transactions", "sentiment")
    pub name: &'static str,
    /// Staging table the source loads into
    pub table: &'static str,
    /// Natural-key column used for deduplication
    pub key_column: &'static str,
    /// Fixed column allow-list
    pub columns: &'static [&'static str],
    /// Input file format
    pub format: SourceFormat,
}

/// The three staging sources, in ingestion order
pub const STAGING_SOURCES: [StagingSource; 3] = [
    StagingSource {
        name: "customers",
        table: RAW_CUSTOMERS,
        key_column: "customer_id",
        columns: &RAW_CUSTOMER_COLUMNS,
        format: SourceFormat::Csv,
    },
    StagingSource {
        name: "transactions",
        table: RAW_TRANSACTIONS,
        key_column: "transaction_id",
        columns: &RAW_TRANSACTION_COLUMNS,
        format: SourceFormat::Csv,
    },
    StagingSource {
        name: "sentiment",
        table: RAW_SENTIMENT,
        key_column: "id",
        columns: &RAW_SENTIMENT_COLUMNS,
        format: SourceFormat::Json,
    },
];

/// DDL for the raw_customers staging table
pub const CREATE_RAW_CUSTOMERS: &str = r#"
CREATE TABLE IF NOT EXISTS raw_customers (
    _row_id INTEGER PRIMARY KEY,
    customer_id VARCHAR,
    name VARCHAR,
    email VARCHAR,
    age VARCHAR,
    city VARCHAR,
    country VARCHAR,
    signup_date VARCHAR,
    favorite_team VARCHAR,
    membership_tier VARCHAR,
    gender VARCHAR,
    _load_timestamp TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);
"#;

/// DDL for the raw_transactions staging table
pub const CREATE_RAW_TRANSACTIONS: &str = r#"
CREATE TABLE IF NOT EXISTS raw_transactions (
    _row_id INTEGER PRIMARY KEY,
    transaction_id VARCHAR,
    customer_id VARCHAR,
    timestamp VARCHAR,
    amount VARCHAR,
    currency VARCHAR,
    category VARCHAR,
    merchant VARCHAR,
    description VARCHAR,
    _load_timestamp TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);
"#;

/// DDL for the raw_sentiment staging table
pub const CREATE_RAW_SENTIMENT: &str = r#"
CREATE TABLE IF NOT EXISTS raw_sentiment (
    _row_id INTEGER PRIMARY KEY,
    id VARCHAR,
    "user" VARCHAR,
    source VARCHAR,
    text VARCHAR,
    published_at VARCHAR,
    topic VARCHAR,
    tags VARCHAR,
    sentiment_score VARCHAR,
    engagement VARCHAR,
    _load_timestamp TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);
"#;

/// DDL for the cleaned customer dimension
pub const CREATE_DIM_CUSTOMERS: &str = r#"
CREATE TABLE IF NOT EXISTS dim_customers (
    customer_id VARCHAR PRIMARY KEY,
    name VARCHAR NOT NULL,
    email VARCHAR,
    age INTEGER CHECK (age >= 0 AND age <= 150),
    city VARCHAR,
    country VARCHAR,
    favorite_team VARCHAR,
    membership_tier VARCHAR,
    signup_date DATE,
    _loaded_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);
"#;

/// DDL for the cleaned transaction fact
pub const CREATE_FACT_TRANSACTIONS: &str = r#"
CREATE TABLE IF NOT EXISTS fact_transactions (
    transaction_id VARCHAR PRIMARY KEY,
    customer_id VARCHAR NOT NULL,
    transaction_date TIMESTAMP NOT NULL,
    amount_eur DECIMAL(10, 2) NOT NULL,
    category VARCHAR NOT NULL,
    merchant VARCHAR,
    _source_row_id INTEGER,
    _loaded_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    FOREIGN KEY (customer_id) REFERENCES dim_customers(customer_id)
);
"#;

/// DDL for the cleaned sentiment fact
pub const CREATE_FACT_SENTIMENT: &str = r#"
CREATE TABLE IF NOT EXISTS fact_sentiment (
    post_id VARCHAR PRIMARY KEY,
    user_name VARCHAR,
    topic VARCHAR,
    sentiment_score DECIMAL(3, 2),
    engagement INTEGER,
    published_at TIMESTAMP,
    _source_row_id INTEGER,
    _loaded_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);
"#;

/// DDL for the derived customer profile
pub const CREATE_CUSTOMER_PROFILE: &str = r#"
CREATE TABLE IF NOT EXISTS customer_profile (
    customer_id VARCHAR PRIMARY KEY,
    txn_count INTEGER,
    total_spend DECIMAL(10, 2),
    avg_txn DECIMAL(10, 2),
    last_txn_date DATE,
    match_ticket_count INTEGER,
    sports_affinity_ratio DECIMAL(3, 2),
    avg_days_between_txns DECIMAL(5, 1),
    _loaded_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);
"#;

/// All staging DDL, in creation order
pub const STAGING_DDL: [&str; 3] = [
    CREATE_RAW_CUSTOMERS,
    CREATE_RAW_TRANSACTIONS,
    CREATE_RAW_SENTIMENT,
];

/// All target DDL, in creation order
pub const TARGET_DDL: [&str; 4] = [
    CREATE_DIM_CUSTOMERS,
    CREATE_FACT_TRANSACTIONS,
    CREATE_FACT_SENTIMENT,
    CREATE_CUSTOMER_PROFILE,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allow_lists_exclude_reserved_columns() {
        for source in &STAGING_SOURCES {
            for col in source.columns {
                assert!(
                    !is_reserved_column(col),
                    "{} allow-list contains reserved column {}",
                    source.name,
                    col
                );
            }
        }
    }

    #[test]
    fn test_key_column_is_allow_listed() {
        for source in &STAGING_SOURCES {
            assert!(
                source.columns.contains(&source.key_column),
                "{} key column missing from allow-list",
                source.name
            );
        }
    }

    #[test]
    fn test_is_reserved_column() {
        assert!(is_reserved_column("_row_id"));
        assert!(is_reserved_column("_load_timestamp"));
        assert!(!is_reserved_column("customer_id"));
    }

    #[test]
    fn test_ddl_is_idempotent_create() {
        for ddl in STAGING_DDL.iter().chain(TARGET_DDL.iter()) {
            assert!(ddl.contains("IF NOT EXISTS"));
        }
    }

    #[test]
    fn test_target_tables_in_load_order() {
        // dim_customers must precede fact_transactions: the FK filter
        // resolves against the already-loaded dimension.
        let dim_pos = TARGET_TABLES.iter().position(|t| *t == DIM_CUSTOMERS);
        let fact_pos = TARGET_TABLES.iter().position(|t| *t == FACT_TRANSACTIONS);
        assert!(dim_pos < fact_pos);
    }
}
