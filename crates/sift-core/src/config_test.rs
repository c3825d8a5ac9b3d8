use super::*;
use std::io::Write;

fn parse(yaml: &str) -> Config {
    serde_yaml::from_str(yaml).unwrap()
}

#[test]
fn test_minimal_config_uses_defaults() {
    let config = parse("name: my-pipeline");

    assert_eq!(config.name, "my-pipeline");
    assert_eq!(config.version, "1.0");
    assert_eq!(config.output_dir, "output");
    assert_eq!(config.data.customers, "data/customers.csv");
    assert_eq!(config.data.transactions, "data/transactions.csv");
    assert_eq!(config.data.sentiment, "data/sentiment.json");
    assert_eq!(config.database.path, "output/sift.duckdb");
}

#[test]
fn test_validation_defaults() {
    let config = parse("name: p\nvalidation: {}");

    assert_eq!(config.validation.null_rate_warning, 0.30);
    assert_eq!(config.validation.min_transaction_amount, -1000.0);
    assert_eq!(config.validation.max_transaction_amount, 50000.0);
    assert_eq!(config.validation.min_expected_customers, 190);
    assert_eq!(config.validation.min_expected_transactions, 2400);
}

#[test]
fn test_full_config_overrides() {
    let yaml = r#"
name: analytics
version: "2.3"
data:
  customers: input/c.csv
  transactions: input/t.csv
  sentiment: input/s.json
database:
  path: ":memory:"
output_dir: out
validation:
  null_rate_warning: 0.5
  min_transaction_amount: -10.0
  max_transaction_amount: 100.0
  min_expected_customers: 5
  min_expected_transactions: 10
"#;
    let config = parse(yaml);

    assert_eq!(config.version, "2.3");
    assert_eq!(config.database.path, ":memory:");
    assert_eq!(config.validation.null_rate_warning, 0.5);
    assert_eq!(config.validation.min_expected_transactions, 10);
}

#[test]
fn test_unknown_field_rejected() {
    let result: Result<Config, _> = serde_yaml::from_str("name: p\nbogus: 1");
    assert!(result.is_err());
}

#[test]
fn test_load_missing_file() {
    let err = Config::load(std::path::Path::new("/nonexistent/sift.yml")).unwrap_err();
    assert!(err.to_string().contains("[E001]"));
}

#[test]
fn test_load_malformed_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "name: [unclosed").unwrap();

    let err = Config::load(file.path()).unwrap_err();
    assert!(err.to_string().contains("[E002]"));
}

#[test]
fn test_validate_rejects_inverted_amount_bounds() {
    let mut config = parse("name: p");
    config.validation.min_transaction_amount = 100.0;
    config.validation.max_transaction_amount = -100.0;

    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("[E003]"));
}

#[test]
fn test_validate_rejects_out_of_range_null_threshold() {
    let mut config = parse("name: p");
    config.validation.null_rate_warning = 1.5;

    assert!(config.validate().is_err());
}

#[test]
fn test_database_path_absolute_memory_passthrough() {
    let mut config = parse("name: p");
    config.database.path = ":memory:".to_string();

    let path = config.database_path_absolute(std::path::Path::new("/tmp/project"));
    assert_eq!(path, ":memory:");
}

#[test]
fn test_database_path_absolute_joins_root() {
    let config = parse("name: p");
    let path = config.database_path_absolute(std::path::Path::new("/tmp/project"));
    assert!(path.ends_with("output/sift.duckdb"));
    assert!(path.starts_with("/tmp/project"));
}
