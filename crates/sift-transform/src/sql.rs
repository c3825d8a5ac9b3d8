//! Transform step SQL generation
//!
//! Every statement the engine executes is produced here, as a pure
//! function of the schema registry and the configured amount bounds.
//! The dedup SELECTs are exposed separately from the INSERT wrappers so
//! they can be re-applied to arbitrary source tables (the dedup rules
//! are idempotent on their own output, and tests hold them to that).

use sift_core::schema;
use sift_core::sql_utils::{numeric_literal, quote_ident};
use thiserror::Error;

/// Error type for transform SQL generation
#[derive(Error, Debug)]
pub enum SqlGenError {
    /// Amount bound has no SQL spelling (NaN or Infinity)
    #[error("invalid transaction amount bound: {0}")]
    InvalidAmountBound(f64),
}

/// Result type alias for SQL generation
pub type SqlGenResult<T> = Result<T, SqlGenError>;

/// Dedup + normalize SELECT over a customer staging table.
///
/// One output row per distinct non-null customer_id; the earliest-loaded
/// row wins ties. Name falls back to the 'unknown' sentinel; name,
/// email, city, favorite_team, and membership_tier are trimmed and
/// lowercased (including the display name - source behavior carried
/// forward); age and signup_date are nulled on parse failure, never
/// dropping the row.
pub fn select_clean_customers(source: &str) -> String {
    format!(
        "WITH deduped AS (\n\
         \x20 SELECT DISTINCT ON (customer_id) *\n\
         \x20 FROM {src}\n\
         \x20 WHERE customer_id IS NOT NULL\n\
         \x20 ORDER BY customer_id, _load_timestamp\n\
         )\n\
         SELECT\n\
         \x20 customer_id,\n\
         \x20 LOWER(TRIM(COALESCE(name, 'Unknown'))) AS name,\n\
         \x20 LOWER(TRIM(email)) AS email,\n\
         \x20 TRY_CAST(age AS INTEGER) AS age,\n\
         \x20 LOWER(TRIM(city)) AS city,\n\
         \x20 country,\n\
         \x20 LOWER(TRIM(favorite_team)) AS favorite_team,\n\
         \x20 LOWER(TRIM(membership_tier)) AS membership_tier,\n\
         \x20 TRY_CAST(signup_date AS DATE) AS signup_date\n\
         FROM deduped",
        src = quote_ident(source)
    )
}

/// INSERT for the customer dimension
pub fn load_dim_customers_sql() -> String {
    format!(
        "INSERT INTO {table} (customer_id, name, email, age, city, country, \
         favorite_team, membership_tier, signup_date, _loaded_at)\n\
         SELECT *, CURRENT_TIMESTAMP FROM (\n{select}\n)",
        table = quote_ident(schema::DIM_CUSTOMERS),
        select = select_clean_customers(schema::RAW_CUSTOMERS)
    )
}

/// The amount expression used in both the projection and the filter.
///
/// Decimal-comma representations are accepted alongside decimal-point;
/// the replacement is applied consistently on both sides so a comma
/// amount that parses in range is kept, not filtered.
fn amount_expr() -> &'static str {
    "TRY_CAST(REPLACE(amount, ',', '.') AS DECIMAL(10, 2))"
}

/// Dedup + filter SELECT over a transaction staging table.
///
/// The earliest-ingested physical row wins ties (ordered by _row_id, not
/// load timestamp). A failed timestamp parse falls back to the current
/// processing time - bad timestamps never drop a row. Rows ARE dropped
/// when the customer key is null or absent from the dimension, or when
/// the amount fails to parse or falls outside the open interval
/// (min_amount, max_amount). Must run after the customer dimension is
/// loaded.
pub fn select_clean_transactions(
    source: &str,
    min_amount: f64,
    max_amount: f64,
) -> SqlGenResult<String> {
    let min =
        numeric_literal(min_amount).ok_or(SqlGenError::InvalidAmountBound(min_amount))?;
    let max =
        numeric_literal(max_amount).ok_or(SqlGenError::InvalidAmountBound(max_amount))?;

    Ok(format!(
        "WITH deduped AS (\n\
         \x20 SELECT DISTINCT ON (transaction_id) *\n\
         \x20 FROM {src}\n\
         \x20 WHERE transaction_id IS NOT NULL\n\
         \x20 ORDER BY transaction_id, _row_id\n\
         )\n\
         SELECT\n\
         \x20 transaction_id,\n\
         \x20 customer_id,\n\
         \x20 COALESCE(TRY_CAST(\"timestamp\" AS TIMESTAMP), CURRENT_TIMESTAMP) AS transaction_date,\n\
         \x20 {amount} AS amount_eur,\n\
         \x20 LOWER(TRIM(category)) AS category,\n\
         \x20 merchant,\n\
         \x20 _row_id\n\
         FROM deduped\n\
         WHERE customer_id IS NOT NULL\n\
         \x20 AND customer_id IN (SELECT customer_id FROM {dim})\n\
         \x20 AND {amount} IS NOT NULL\n\
         \x20 AND {amount} > {min}\n\
         \x20 AND {amount} < {max}",
        src = quote_ident(source),
        dim = quote_ident(schema::DIM_CUSTOMERS),
        amount = amount_expr(),
        min = min,
        max = max,
    ))
}

/// INSERT for the transaction fact
pub fn load_fact_transactions_sql(min_amount: f64, max_amount: f64) -> SqlGenResult<String> {
    Ok(format!(
        "INSERT INTO {table} (transaction_id, customer_id, transaction_date, \
         amount_eur, category, merchant, _source_row_id, _loaded_at)\n\
         SELECT *, CURRENT_TIMESTAMP FROM (\n{select}\n)",
        table = quote_ident(schema::FACT_TRANSACTIONS),
        select = select_clean_transactions(schema::RAW_TRANSACTIONS, min_amount, max_amount)?
    ))
}

/// Dedup + normalize SELECT over a sentiment staging table.
///
/// Earliest-loaded row wins ties. Score, engagement, and published
/// timestamp are nulled on parse failure; no row is rejected.
pub fn select_clean_sentiment(source: &str) -> String {
    format!(
        "WITH deduped AS (\n\
         \x20 SELECT DISTINCT ON (id) *\n\
         \x20 FROM {src}\n\
         \x20 WHERE id IS NOT NULL\n\
         \x20 ORDER BY id, _load_timestamp\n\
         )\n\
         SELECT\n\
         \x20 id AS post_id,\n\
         \x20 LOWER(TRIM(\"user\")) AS user_name,\n\
         \x20 LOWER(TRIM(topic)) AS topic,\n\
         \x20 TRY_CAST(sentiment_score AS DECIMAL(3, 2)) AS sentiment_score,\n\
         \x20 TRY_CAST(engagement AS INTEGER) AS engagement,\n\
         \x20 TRY_CAST(published_at AS TIMESTAMP) AS published_at,\n\
         \x20 _row_id\n\
         FROM deduped",
        src = quote_ident(source)
    )
}

/// INSERT for the sentiment fact
pub fn load_fact_sentiment_sql() -> String {
    format!(
        "INSERT INTO {table} (post_id, user_name, topic, sentiment_score, \
         engagement, published_at, _source_row_id, _loaded_at)\n\
         SELECT *, CURRENT_TIMESTAMP FROM (\n{select}\n)",
        table = quote_ident(schema::FACT_SENTIMENT),
        select = select_clean_sentiment(schema::RAW_SENTIMENT)
    )
}

/// INSERT for the derived customer profile.
///
/// Left join keeps zero-transaction customers. Every division is
/// NULLIF-guarded: a customer with no transactions gets NULL ratio and
/// NULL inter-transaction interval, never a divide-by-zero. The exact
/// 'match_tickets' category counts into both match_ticket_count and the
/// sports-affinity numerator (the LIKE clause ORs with the exact match).
pub fn load_customer_profile_sql() -> String {
    format!(
        "INSERT INTO {table} (customer_id, txn_count, total_spend, avg_txn, \
         last_txn_date, match_ticket_count, sports_affinity_ratio, \
         avg_days_between_txns, _loaded_at)\n\
         SELECT\n\
         \x20 c.customer_id,\n\
         \x20 COUNT(DISTINCT t.transaction_id) AS txn_count,\n\
         \x20 ROUND(SUM(t.amount_eur), 2) AS total_spend,\n\
         \x20 ROUND(AVG(t.amount_eur), 2) AS avg_txn,\n\
         \x20 MAX(CAST(t.transaction_date AS DATE)) AS last_txn_date,\n\
         \x20 COUNT(DISTINCT CASE WHEN t.category = '{ticket}' THEN t.transaction_id END) AS match_ticket_count,\n\
         \x20 ROUND(\n\
         \x20   CAST(\n\
         \x20     COUNT(DISTINCT CASE WHEN t.category LIKE '%sports%' OR t.category = '{ticket}' THEN t.transaction_id END)\n\
         \x20     AS DECIMAL\n\
         \x20   ) / NULLIF(COUNT(DISTINCT t.transaction_id), 0),\n\
         \x20   2\n\
         \x20 ) AS sports_affinity_ratio,\n\
         \x20 ROUND(\n\
         \x20   CAST(\n\
         \x20     (MAX(CAST(t.transaction_date AS DATE)) - MIN(CAST(t.transaction_date AS DATE)))\n\
         \x20     AS DECIMAL\n\
         \x20   ) / NULLIF(COUNT(DISTINCT t.transaction_id) - 1, 0),\n\
         \x20   1\n\
         \x20 ) AS avg_days_between_txns,\n\
         \x20 CURRENT_TIMESTAMP\n\
         FROM {dim} c\n\
         LEFT JOIN {fact} t ON c.customer_id = t.customer_id\n\
         GROUP BY c.customer_id",
        table = quote_ident(schema::CUSTOMER_PROFILE),
        dim = quote_ident(schema::DIM_CUSTOMERS),
        fact = quote_ident(schema::FACT_TRANSACTIONS),
        ticket = MATCH_TICKET_CATEGORY,
    )
}

/// The reserved high-affinity category
pub const MATCH_TICKET_CATEGORY: &str = "match_tickets";

#[cfg(test)]
#[path = "sql_test.rs"]
mod tests;
