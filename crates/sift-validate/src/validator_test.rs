use super::*;
use sift_core::schema::STAGING_DDL;
use sift_db::DuckDbBackend;
use sift_transform::TransformEngine;

async fn staging_db() -> Arc<DuckDbBackend> {
    let db = Arc::new(DuckDbBackend::in_memory().unwrap());
    db.execute_batch(&STAGING_DDL.join("\n")).await.unwrap();
    db
}

fn validator_for(db: &Arc<DuckDbBackend>) -> Validator {
    Validator::new(db.clone() as Arc<dyn Database>, ValidationConfig::default())
}

async fn transform(db: &Arc<DuckDbBackend>) {
    let engine =
        TransformEngine::new(db.clone() as Arc<dyn Database>, &ValidationConfig::default());
    let report = engine.transform_all().await;
    assert!(!report.has_errors());
}

#[tokio::test]
async fn test_duplicate_detection_reports_group_and_occurrences() {
    let db = staging_db().await;
    for row_id in 0..5 {
        db.execute(&format!(
            "INSERT INTO raw_transactions (_row_id, transaction_id, customer_id, amount) \
             VALUES ({}, 'TXN-DUP', 'CUST-1', '10.00')",
            row_id
        ))
        .await
        .unwrap();
    }

    let mut report = QualityReport::new();
    validator_for(&db).validate_raw(&mut report).await;

    let duplicates = report.raw_data.unwrap()["transactions"]
        .duplicates
        .clone()
        .unwrap();
    assert!(duplicates.found);
    assert_eq!(duplicates.count, 1);
    assert_eq!(duplicates.duplicates.len(), 1);
    assert_eq!(duplicates.duplicates[0].key, "TXN-DUP");
    assert_eq!(duplicates.duplicates[0].occurrences, 5);
}

#[tokio::test]
async fn test_duplicate_detection_sorted_by_occurrences_descending() {
    let db = staging_db().await;
    let mut row_id = 0;
    for (key, copies) in [("TXN-A", 2), ("TXN-B", 4), ("TXN-C", 1)] {
        for _ in 0..copies {
            db.execute(&format!(
                "INSERT INTO raw_transactions (_row_id, transaction_id) VALUES ({}, '{}')",
                row_id, key
            ))
            .await
            .unwrap();
            row_id += 1;
        }
    }

    let check = checks::find_duplicates(db.as_ref(), "raw_transactions", "transaction_id").await;
    assert_eq!(check.count, 2);
    assert_eq!(check.duplicates[0].key, "TXN-B");
    assert_eq!(check.duplicates[0].occurrences, 4);
    assert_eq!(check.duplicates[1].key, "TXN-A");
}

#[tokio::test]
async fn test_duplicate_detection_absence() {
    let db = staging_db().await;
    db.execute(
        "INSERT INTO raw_transactions (_row_id, transaction_id) VALUES (0, 'TXN-1'), (1, 'TXN-2')",
    )
    .await
    .unwrap();
    // NULL keys never form a duplicate group
    db.execute(
        "INSERT INTO raw_transactions (_row_id, transaction_id) VALUES (2, NULL), (3, NULL)",
    )
    .await
    .unwrap();

    let check = checks::find_duplicates(db.as_ref(), "raw_transactions", "transaction_id").await;
    assert!(!check.found);
    assert_eq!(check.count, 0);
    assert!(check.duplicates.is_empty());
    assert!(check.error.is_none());
}

#[tokio::test]
async fn test_null_rate_flag_is_strictly_greater_than_threshold() {
    let db = staging_db().await;
    // 10 rows: email NULL in exactly 3 (rate 0.30, not flagged),
    // city NULL in 4 (rate 0.40, flagged).
    for row_id in 0..10 {
        let email = if row_id < 3 { "NULL" } else { "'a@example.com'" };
        let city = if row_id < 4 { "NULL" } else { "'Lyon'" };
        db.execute(&format!(
            "INSERT INTO raw_customers (_row_id, customer_id, name, email, city) \
             VALUES ({}, 'CUST-{}', 'n', {}, {})",
            row_id, row_id, email, city
        ))
        .await
        .unwrap();
    }

    let diagnostics =
        checks::profile_table(db.as_ref(), "raw_customers", 0.30).await;
    let high_nulls = diagnostics.high_null_columns.unwrap();

    assert!(!high_nulls.contains_key("email"));
    let city = high_nulls.get("city").unwrap();
    assert_eq!(city.null_count, 4);
    assert!((city.null_rate - 0.4).abs() < 1e-9);
    assert_eq!(city.warning, "High null rate: 40.0%");
    // Columns never ingested are entirely NULL and flagged too
    assert!(high_nulls.contains_key("gender"));
}

#[tokio::test]
async fn test_zero_row_table_profiles_without_division() {
    let db = staging_db().await;

    let diagnostics = checks::profile_table(db.as_ref(), "raw_sentiment", 0.30).await;

    assert_eq!(diagnostics.row_count, Some(0));
    assert!(diagnostics.high_null_columns.unwrap().is_empty());
    assert!(diagnostics.error.is_none());
}

#[tokio::test]
async fn test_profile_excludes_reserved_columns() {
    let db = staging_db().await;

    let diagnostics = checks::profile_table(db.as_ref(), "raw_customers", 0.30).await;
    let columns = diagnostics.columns.unwrap();

    assert!(columns.contains(&"customer_id".to_string()));
    assert!(!columns.iter().any(|c| c.starts_with('_')));
}

#[tokio::test]
async fn test_missing_tables_surface_as_error_fields() {
    // No staging tables at all: every diagnostic carries an error, the
    // pass itself completes.
    let db = Arc::new(DuckDbBackend::in_memory().unwrap());

    let mut report = QualityReport::new();
    validator_for(&db).validate_raw(&mut report).await;

    let stage = report.raw_data.unwrap();
    assert_eq!(stage.len(), 3);
    for diagnostics in stage.values() {
        assert!(diagnostics.error.is_some());
        assert!(diagnostics.row_count.is_none());
    }
    assert!(stage["transactions"]
        .orphan_keys
        .as_ref()
        .unwrap()
        .error
        .is_some());
}

#[tokio::test]
async fn test_raw_orphan_check_compares_unnormalized_values() {
    let db = staging_db().await;
    db.execute(
        "INSERT INTO raw_customers (_row_id, customer_id, name) VALUES (0, 'CUST-0001', 'Ann')",
    )
    .await
    .unwrap();
    db.execute(
        "INSERT INTO raw_transactions (_row_id, transaction_id, customer_id, amount) VALUES \
         (0, 'TXN-1', 'CUST-0001', '10.00'), \
         (1, 'TXN-2', 'cust-0001', '10.00'), \
         (2, 'TXN-3', 'CUST-MISSING', '10.00'), \
         (3, 'TXN-4', NULL, '10.00')",
    )
    .await
    .unwrap();

    let check = checks::find_orphan_keys(
        db.as_ref(),
        "raw_transactions",
        "customer_id",
        "raw_customers",
        "customer_id",
    )
    .await;

    // The case-mismatched id counts as orphaned; the NULL key does not.
    assert!(check.found);
    assert_eq!(check.count, 2);
}

#[tokio::test]
async fn test_raw_orphan_and_cleaned_ri_disagree_on_case_mismatch() {
    let db = staging_db().await;
    db.execute(
        "INSERT INTO raw_customers (_row_id, customer_id, name) VALUES (0, 'CUST-0001', 'Ann')",
    )
    .await
    .unwrap();
    db.execute(
        "INSERT INTO raw_transactions (_row_id, transaction_id, customer_id, \"timestamp\", amount, category) VALUES \
         (0, 'TXN-1', 'CUST-0001', '2024-01-01 00:00:00', '10.00', 'retail'), \
         (1, 'TXN-2', 'cust-0001', '2024-01-01 00:00:00', '10.00', 'retail')",
    )
    .await
    .unwrap();

    transform(&db).await;
    let report = validator_for(&db).run().await;

    // The raw check reports the case-mismatched id as an orphan...
    let raw = report.raw_data.as_ref().unwrap();
    let orphans = raw["transactions"].orphan_keys.as_ref().unwrap();
    assert!(orphans.found);
    assert_eq!(orphans.count, 1);

    // ...while the cleaned side is fully valid, because the transform
    // dropped that row at the foreign-key filter.
    let transformed = report.transformed_data.as_ref().unwrap();
    let ri = transformed["fact_transactions"]
        .referential_integrity
        .as_ref()
        .unwrap();
    assert!(ri.valid);
    assert_eq!(ri.orphan_count, 0);
    assert_eq!(transformed["fact_transactions"].row_count, Some(1));
}

#[tokio::test]
async fn test_check_unique() {
    let db = staging_db().await;
    db.execute_batch(
        "CREATE TABLE unique_keys (k VARCHAR); \
         INSERT INTO unique_keys VALUES ('a'), ('b'), ('c'); \
         CREATE TABLE dup_keys (k VARCHAR); \
         INSERT INTO dup_keys VALUES ('a'), ('a'), ('b'); \
         CREATE TABLE null_keys (k VARCHAR); \
         INSERT INTO null_keys VALUES ('a'), ('b'), (NULL);",
    )
    .await
    .unwrap();

    assert!(checks::check_unique(db.as_ref(), "unique_keys", "k")
        .await
        .unwrap());
    assert!(!checks::check_unique(db.as_ref(), "dup_keys", "k")
        .await
        .unwrap());
    // A NULL key cannot satisfy uniqueness over all rows
    assert!(!checks::check_unique(db.as_ref(), "null_keys", "k")
        .await
        .unwrap());
}

#[tokio::test]
async fn test_transformed_validation_attaches_checks_per_table() {
    let db = staging_db().await;
    db.execute(
        "INSERT INTO raw_customers (_row_id, customer_id, name) VALUES (0, 'CUST-1', 'Ann')",
    )
    .await
    .unwrap();
    db.execute(
        "INSERT INTO raw_transactions (_row_id, transaction_id, customer_id, \"timestamp\", amount, category) \
         VALUES (0, 'TXN-1', 'CUST-1', '2024-01-01 00:00:00', '25.00', 'retail')",
    )
    .await
    .unwrap();

    transform(&db).await;

    let mut report = QualityReport::new();
    validator_for(&db).validate_transformed(&mut report).await;
    let stage = report.transformed_data.unwrap();

    assert_eq!(stage["dim_customers"].customer_id_unique, Some(true));
    assert!(stage["dim_customers"].referential_integrity.is_none());
    assert!(stage["fact_transactions"]
        .referential_integrity
        .as_ref()
        .unwrap()
        .valid);
    assert_eq!(stage["customer_profile"].row_count, Some(1));
}

#[tokio::test]
async fn test_advisory_volume_warnings_are_issues_not_failures() {
    let db = staging_db().await;
    db.execute(
        "INSERT INTO raw_customers (_row_id, customer_id, name) VALUES (0, 'CUST-1', 'Ann')",
    )
    .await
    .unwrap();

    let mut report = QualityReport::new();
    validator_for(&db).validate_raw(&mut report).await;

    // Both staging volumes fall short of the default expectations
    assert_eq!(report.issues.len(), 2);
    assert!(report.issues[0].contains("Advisory"));
    // The shortfall never fails the diagnostics themselves
    assert!(report.raw_data.unwrap()["customers"].error.is_none());
}

#[tokio::test]
async fn test_quality_report_serializes_with_stable_keys() {
    let db = staging_db().await;
    db.execute(
        "INSERT INTO raw_customers (_row_id, customer_id, name) VALUES (0, 'CUST-1', 'Ann')",
    )
    .await
    .unwrap();
    db.execute(
        "INSERT INTO raw_transactions (_row_id, transaction_id, customer_id, \"timestamp\", amount, category) \
         VALUES (0, 'TXN-1', 'CUST-1', '2024-01-01 00:00:00', '25.00', 'retail')",
    )
    .await
    .unwrap();

    transform(&db).await;
    let report = validator_for(&db).run().await;
    let value = serde_json::to_value(&report).unwrap();

    assert!(value.get("timestamp").is_some());
    assert_eq!(value["raw_data"]["customers"]["row_count"], 1);
    assert_eq!(value["raw_data"]["transactions"]["orphan_keys"]["count"], 0);
    assert_eq!(
        value["transformed_data"]["fact_transactions"]["referential_integrity"]["valid"],
        true
    );
    assert_eq!(
        value["transformed_data"]["dim_customers"]["customer_id_unique"],
        true
    );
    assert!(value["raw_data"]["customers"]["columns"]
        .as_array()
        .unwrap()
        .iter()
        .any(|c| c == "customer_id"));
}
