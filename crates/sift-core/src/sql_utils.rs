//! SQL identifier and literal quoting
//!
//! All dynamically assembled SQL in Sift goes through these helpers.
//! Table and column names come from the fixed allow-lists in
//! [`crate::schema`], never from input-file headers, and are still quoted
//! here as a second line of defense.

/// Quote a SQL identifier, escaping embedded double quotes by doubling them.
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Escape a value for use inside a single-quoted SQL string literal.
pub fn escape_sql_string(value: &str) -> String {
    value.replace('\'', "''")
}

/// Render an f64 as a SQL numeric literal.
///
/// Returns `None` for NaN or infinite values, which have no SQL spelling.
pub fn numeric_literal(value: f64) -> Option<String> {
    value.is_finite().then(|| {
        if value == value.trunc() {
            format!("{:.1}", value)
        } else {
            value.to_string()
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_ident_plain() {
        assert_eq!(quote_ident("customer_id"), r#""customer_id""#);
    }

    #[test]
    fn test_quote_ident_embedded_quote() {
        assert_eq!(quote_ident(r#"a"b"#), r#""a""b""#);
    }

    #[test]
    fn test_escape_sql_string() {
        assert_eq!(escape_sql_string("plain"), "plain");
        assert_eq!(escape_sql_string("O'Brien"), "O''Brien");
    }

    #[test]
    fn test_numeric_literal_integral() {
        assert_eq!(numeric_literal(50000.0).as_deref(), Some("50000.0"));
        assert_eq!(numeric_literal(-1000.0).as_deref(), Some("-1000.0"));
    }

    #[test]
    fn test_numeric_literal_fractional() {
        assert_eq!(numeric_literal(49999.99).as_deref(), Some("49999.99"));
    }

    #[test]
    fn test_numeric_literal_rejects_non_finite() {
        assert!(numeric_literal(f64::NAN).is_none());
        assert!(numeric_literal(f64::INFINITY).is_none());
    }
}
